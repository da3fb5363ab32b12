//! `Session`: owns the `Connection` and the four sub-protocol handlers, and
//! routes inbound `Response`s to whichever one matches their tag.

use std::net::SocketAddr;
use std::sync::Arc;

use act_config::SessionConfig;
use act_network::{Connection, RequestInspector};
use act_types::wire::{FailureAction, Property, Response, ResponsePayload, SessionOption, SubProtocolType};
use parking_lot::RwLock;
use tokio::task::JoinHandle;

use crate::act_subsession::{ActSubSession, LogonRequest, LogonResponse};
use crate::algo::AlgoSubSession;
use crate::autocontrol::AutoControlSubSession;
use crate::dex::DexSubSession;
use crate::error::{ActError, Result};

type ResponseInspector = Arc<dyn Fn(&Response) + Send + Sync>;

#[derive(Default)]
struct SessionInspectors {
    incoming_responses: Vec<ResponseInspector>,
}

/// The single entry point: one `Connection`, one handler per `SubProtocolType`,
/// and a background task draining decoded responses into those handlers.
///
/// Grounded on the reference client's `ActSession`, which registers exactly
/// one handler per sub-protocol at construction time and logs-and-drops any
/// response whose tag doesn't match one of them.
pub struct Session {
    connection: Arc<Connection>,
    act: Arc<ActSubSession>,
    autocontrol: Arc<AutoControlSubSession>,
    algo: Arc<AlgoSubSession>,
    dex: Arc<DexSubSession>,
    inspectors: RwLock<SessionInspectors>,
    dispatch_task: RwLock<Option<JoinHandle<()>>>,
}

impl Session {
    pub fn new() -> Arc<Self> {
        let connection = Arc::new(Connection::new());
        Arc::new(Self {
            act: Arc::new(ActSubSession::new(Arc::clone(&connection))),
            autocontrol: Arc::new(AutoControlSubSession::new(Arc::clone(&connection))),
            algo: Arc::new(AlgoSubSession::new(Arc::clone(&connection))),
            dex: Arc::new(DexSubSession::new(Arc::clone(&connection))),
            connection,
            inspectors: RwLock::new(SessionInspectors::default()),
            dispatch_task: RwLock::new(None),
        })
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    pub fn autocontrol(&self) -> &Arc<AutoControlSubSession> {
        &self.autocontrol
    }

    pub fn algo(&self) -> &Arc<AlgoSubSession> {
        &self.algo
    }

    pub fn dex(&self) -> &Arc<DexSubSession> {
        &self.dex
    }

    /// Fires with every outgoing `Request`, regardless of which sub-session
    /// built it. Delegates to the connection, the single choke point every
    /// sub-session's requests pass through.
    pub fn add_outgoing_request_inspector(&self, inspector: RequestInspector) {
        self.connection.add_outgoing_request_inspector(inspector);
    }

    pub fn remove_outgoing_request_inspector(&self, inspector: &RequestInspector) {
        self.connection.remove_outgoing_request_inspector(inspector);
    }

    pub fn add_incoming_response_inspector(&self, inspector: ResponseInspector) {
        let mut inspectors = self.inspectors.write();
        if !inspectors.incoming_responses.iter().any(|existing| Arc::ptr_eq(existing, &inspector)) {
            inspectors.incoming_responses.push(inspector);
        }
    }

    pub fn remove_incoming_response_inspector(&self, inspector: &ResponseInspector) {
        self.inspectors.write().incoming_responses.retain(|existing| !Arc::ptr_eq(existing, inspector));
    }

    /// Connect to `addr` and start the response dispatch loop. Suspends until
    /// the TCP handshake completes.
    pub async fn connect(self: &Arc<Self>, addr: SocketAddr) -> Result<()> {
        self.connection.connect(addr).await?;
        let responses = self.connection.take_responses().await.ok_or(ActError::Disconnected)?;
        let session = Arc::clone(self);
        let handle = tokio::spawn(dispatch_loop(session, responses));
        *self.dispatch_task.write() = Some(handle);
        Ok(())
    }

    /// Suspend until the underlying connection is lost.
    pub async fn wait_on_disconnect(&self) {
        self.connection.wait_on_disconnect().await;
    }

    /// Log on using a [`SessionConfig`]. Suspends until the server responds.
    pub async fn logon_with_config(&self, config: &SessionConfig) -> Result<LogonResponse> {
        let failure_actions = config.failure_actions.iter().map(|name| parse_failure_action(name)).collect();
        let session_options =
            config.session_options.iter().map(|(name, value)| SessionOption { name: name.clone(), value: value.clone() }).collect();
        let client_properties =
            config.client_properties.iter().map(|(name, value)| Property { name: name.clone(), value: value.clone() }).collect();

        self.act
            .logon(LogonRequest {
                username: config.username.clone(),
                password: config.password.clone(),
                appname: config.appname.clone(),
                failure_actions,
                session_options,
                client_properties,
            })
            .await
    }

    pub async fn logon(&self, request: LogonRequest) -> Result<LogonResponse> {
        self.act.logon(request).await
    }

    /// Sends the logout request, then locally closes the connection —
    /// matching the reference client's `ActSession.logout`.
    pub async fn logout(&self) -> Result<()> {
        self.act.logout().await?;
        self.connection.disconnect().await;
        Ok(())
    }
}

fn parse_failure_action(name: &str) -> FailureAction {
    match name {
        "Disconnect" => FailureAction::Disconnect,
        "Reconnect" => FailureAction::Reconnect,
        _ => FailureAction::Unknown,
    }
}

async fn dispatch_loop(session: Arc<Session>, mut responses: tokio::sync::mpsc::UnboundedReceiver<Response>) {
    while let Some(response) = responses.recv().await {
        for inspector in session.inspectors.read().incoming_responses.iter() {
            inspector(&response);
        }
        route_response(&session, &response);
    }
    tracing::debug!("response dispatch loop ended");
}

fn route_response(session: &Arc<Session>, response: &Response) {
    let Some(payload) = &response.payload else {
        tracing::warn!("response with no payload");
        return;
    };
    let tag = response.sub_protocol_type;
    if tag == SubProtocolType::Act as i32 {
        session.act.on_response(payload);
    } else if tag == SubProtocolType::AutoControl as i32 {
        session.autocontrol.on_response(payload);
    } else if tag == SubProtocolType::Algo as i32 {
        session.algo.on_response(payload);
    } else if tag == SubProtocolType::Dex as i32 {
        session.dex.on_response(payload);
    } else {
        tracing::warn!(tag, "response with unmapped sub-protocol tag, dropping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use act_types::wire::{ActLoginResponse, ActResponse, ActResponseType};
    use prost::Message;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn login_response() -> Response {
        Response {
            sub_protocol_type: SubProtocolType::Act as i32,
            session_id: 42,
            payload: Some(ResponsePayload::Act(ActResponse {
                response_type: ActResponseType::Login as i32,
                operation_status: None,
                session_id: 42,
                login_response: Some(ActLoginResponse::default()),
                connections: vec![],
            })),
        }
    }

    #[tokio::test]
    async fn logon_round_trip_through_the_dispatch_loop() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0);
            let frame = act_codec::frame(&login_response().encode_to_vec());
            socket.write_all(&frame).await.unwrap();
        });

        let session = Session::new();
        session.connect(addr).await.unwrap();

        let response = session
            .logon(LogonRequest {
                username: "trader".into(),
                password: "hunter2".into(),
                appname: "demo".into(),
                failure_actions: vec![],
                session_options: vec![],
                client_properties: vec![],
            })
            .await
            .unwrap();
        assert_eq!(response.session_id, 42);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn incoming_response_inspector_fires_for_every_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            let frame = act_codec::frame(&login_response().encode_to_vec());
            socket.write_all(&frame).await.unwrap();
        });

        let session = Session::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        session.add_incoming_response_inspector(Arc::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        }));
        session.connect(addr).await.unwrap();

        let _ = session
            .logon(LogonRequest {
                username: "trader".into(),
                password: "hunter2".into(),
                appname: "demo".into(),
                failure_actions: vec![],
                session_options: vec![],
                client_properties: vec![],
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        server.await.unwrap();
    }
}
