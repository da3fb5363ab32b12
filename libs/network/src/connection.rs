//! The TCP connection state machine: `Unknown -> Connecting -> Connected ->
//! Disconnected`, with inspector hooks over the raw bytes crossing the wire.

use std::net::SocketAddr;
use std::sync::Arc;

use act_codec::{decode_response, encode_request, FrameDecoder};
use act_types::wire::{Request, Response};
use parking_lot::RwLock;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::error::{Result, TransportError};

/// Fires on every decoded `Request` just before it is framed and written.
pub type RequestInspector = Arc<dyn Fn(&Request) + Send + Sync>;

/// Lifecycle state of a [`Connection`]. Mirrors `ActConnectionState` in the
/// reference client one-for-one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Unknown,
    Connecting,
    Connected,
    Disconnected,
}

type RawInspector = Arc<dyn Fn(&[u8]) + Send + Sync>;
type StateChangeHandler = Arc<dyn Fn(ConnectionState) + Send + Sync>;

#[derive(Default)]
struct Inspectors {
    outgoing_bytes: Vec<RawInspector>,
    incoming_bytes: Vec<RawInspector>,
    outgoing_requests: Vec<RequestInspector>,
}

/// Owns one TCP socket to an ACT server and reassembles its frame stream
/// into `Response` values, dispatched to whoever is reading
/// [`Connection::responses`].
pub struct Connection {
    state: RwLock<ConnectionState>,
    state_handlers: RwLock<Vec<StateChangeHandler>>,
    inspectors: RwLock<Inspectors>,
    writer: Mutex<Option<tokio::net::tcp::OwnedWriteHalf>>,
    disconnected_rx: Mutex<Option<oneshot::Receiver<()>>>,
    responses_rx: Mutex<Option<mpsc::UnboundedReceiver<Response>>>,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ConnectionState::Unknown),
            state_handlers: RwLock::new(Vec::new()),
            inspectors: RwLock::new(Inspectors::default()),
            writer: Mutex::new(None),
            disconnected_rx: Mutex::new(None),
            responses_rx: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    fn set_state(&self, new_state: ConnectionState) {
        let changed = {
            let mut state = self.state.write();
            if *state == new_state {
                false
            } else {
                *state = new_state;
                true
            }
        };
        if changed {
            tracing::debug!(?new_state, "connection state changed");
            for handler in self.state_handlers.read().iter() {
                handler(new_state);
            }
        }
    }

    pub fn add_state_change_handler(&self, handler: StateChangeHandler) {
        self.state_handlers.write().push(handler);
    }

    pub fn add_outgoing_data_inspector(&self, inspector: RawInspector) {
        let mut inspectors = self.inspectors.write();
        if !inspectors.outgoing_bytes.iter().any(|existing| Arc::ptr_eq(existing, &inspector)) {
            inspectors.outgoing_bytes.push(inspector);
        }
    }

    pub fn remove_outgoing_data_inspector(&self, inspector: &RawInspector) {
        self.inspectors.write().outgoing_bytes.retain(|existing| !Arc::ptr_eq(existing, inspector));
    }

    pub fn add_incoming_data_inspector(&self, inspector: RawInspector) {
        let mut inspectors = self.inspectors.write();
        if !inspectors.incoming_bytes.iter().any(|existing| Arc::ptr_eq(existing, &inspector)) {
            inspectors.incoming_bytes.push(inspector);
        }
    }

    pub fn remove_incoming_data_inspector(&self, inspector: &RawInspector) {
        self.inspectors.write().incoming_bytes.retain(|existing| !Arc::ptr_eq(existing, inspector));
    }

    /// Higher-level than the raw-byte inspectors above: fires with the
    /// decoded `Request` before it is framed, regardless of which
    /// sub-protocol handler built it.
    pub fn add_outgoing_request_inspector(&self, inspector: RequestInspector) {
        let mut inspectors = self.inspectors.write();
        if !inspectors.outgoing_requests.iter().any(|existing| Arc::ptr_eq(existing, &inspector)) {
            inspectors.outgoing_requests.push(inspector);
        }
    }

    pub fn remove_outgoing_request_inspector(&self, inspector: &RequestInspector) {
        self.inspectors.write().outgoing_requests.retain(|existing| !Arc::ptr_eq(existing, inspector));
    }

    /// Connect to `addr`, spawning the reader task. Suspends until the TCP
    /// handshake completes or fails.
    pub async fn connect(self: &Arc<Self>, addr: SocketAddr) -> Result<()> {
        self.set_state(ConnectionState::Connecting);
        let stream = TcpStream::connect(addr).await.map_err(|e| {
            self.set_state(ConnectionState::Disconnected);
            TransportError::connection(e.to_string(), Some(addr))
        })?;
        stream.set_nodelay(true).ok();

        let (read_half, write_half) = stream.into_split();
        *self.writer.lock().await = Some(write_half);

        let (responses_tx, responses_rx) = mpsc::unbounded_channel();
        *self.responses_rx.lock().await = Some(responses_rx);

        let (disconnected_tx, disconnected_rx) = oneshot::channel();
        *self.disconnected_rx.lock().await = Some(disconnected_rx);

        self.set_state(ConnectionState::Connected);
        tracing::info!(%addr, "connected");

        tokio::spawn(read_loop(Arc::clone(self), read_half, responses_tx, disconnected_tx));
        Ok(())
    }

    /// Suspend until the reader task observes EOF or a fatal I/O error.
    pub async fn wait_on_disconnect(&self) {
        let rx = self.disconnected_rx.lock().await.take();
        if let Some(rx) = rx {
            let _ = rx.await;
        }
        self.set_state(ConnectionState::Disconnected);
    }

    /// Take the channel of decoded responses. Only one caller can drive the
    /// connection's response stream at a time.
    pub async fn take_responses(&self) -> Option<mpsc::UnboundedReceiver<Response>> {
        self.responses_rx.lock().await.take()
    }

    /// Encode and send a `Request`, running outgoing byte inspectors first.
    /// Returns `false` (never an error) if there is no live write half,
    /// matching the reference client's non-throwing `send_request`.
    pub async fn send_request(&self, request: &Request) -> bool {
        if self.state() != ConnectionState::Connected {
            return false;
        }
        for inspector in self.inspectors.read().outgoing_requests.iter() {
            inspector(request);
        }
        let frame = encode_request(request);
        for inspector in self.inspectors.read().outgoing_bytes.iter() {
            inspector(&frame);
        }
        let mut writer_guard = self.writer.lock().await;
        let Some(writer) = writer_guard.as_mut() else { return false };
        if let Err(err) = writer.write_all(&frame).await {
            tracing::warn!(error = %err, "send_request failed");
            return false;
        }
        true
    }

    /// Locally close the connection: shut down the write half and transition
    /// to `Disconnected`. A no-op if there is no live connection.
    pub async fn disconnect(&self) {
        if let Some(mut writer) = self.writer.lock().await.take() {
            if let Err(err) = writer.shutdown().await {
                tracing::warn!(error = %err, "error shutting down connection");
            }
        }
        self.set_state(ConnectionState::Disconnected);
    }
}

async fn read_loop(
    conn: Arc<Connection>,
    mut read_half: tokio::net::tcp::OwnedReadHalf,
    responses_tx: mpsc::UnboundedSender<Response>,
    disconnected_tx: oneshot::Sender<()>,
) {
    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = match read_half.read(&mut buf).await {
            Ok(0) => {
                tracing::info!("connection closed by peer");
                break;
            }
            Ok(n) => n,
            Err(err) => {
                tracing::warn!(error = %err, "read error, closing connection");
                break;
            }
        };
        for inspector in conn.inspectors.read().incoming_bytes.iter() {
            inspector(&buf[..n]);
        }
        decoder.feed(&buf[..n]);
        while let Some(payload) = decoder.next_frame() {
            if let Some(response) = decode_response(&payload) {
                if responses_tx.send(response).is_err() {
                    return;
                }
            }
        }
    }
    conn.set_state(ConnectionState::Disconnected);
    let _ = disconnected_tx.send(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use act_types::wire::{ActRequest, ActRequestType, ActResponse, ActResponseType, ResponsePayload, SubProtocolType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    fn sample_request() -> Request {
        Request {
            sub_protocol_type: SubProtocolType::Act as i32,
            payload: Some(act_types::wire::RequestPayload::Act(ActRequest {
                request_type: ActRequestType::Login as i32,
                client_id: 1,
                login_request: None,
            })),
        }
    }

    fn sample_response() -> Response {
        Response {
            sub_protocol_type: SubProtocolType::Act as i32,
            session_id: 7,
            payload: Some(ResponsePayload::Act(ActResponse {
                response_type: ActResponseType::Login as i32,
                operation_status: None,
                session_id: 7,
                login_response: None,
                connections: vec![],
            })),
        }
    }

    #[tokio::test]
    async fn connect_send_and_receive_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            use prost::Message;
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0);
            let frame = act_codec::frame(&sample_response().encode_to_vec());
            socket.write_all(&frame).await.unwrap();
        });

        let conn = Arc::new(Connection::new());
        assert_eq!(conn.state(), ConnectionState::Unknown);
        conn.connect(addr).await.unwrap();
        assert_eq!(conn.state(), ConnectionState::Connected);

        assert!(conn.send_request(&sample_request()).await);

        let mut responses = conn.take_responses().await.unwrap();
        let response = responses.recv().await.unwrap();
        assert_eq!(response.session_id, 7);

        server.await.unwrap();
    }

    #[test]
    fn inspector_registration_is_idempotent() {
        let conn = Connection::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let inspector: RawInspector = Arc::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        conn.add_outgoing_data_inspector(Arc::clone(&inspector));
        conn.add_outgoing_data_inspector(Arc::clone(&inspector));
        assert_eq!(conn.inspectors.read().outgoing_bytes.len(), 1);
        conn.remove_outgoing_data_inspector(&inspector);
        assert_eq!(conn.inspectors.read().outgoing_bytes.len(), 0);
    }

    #[test]
    fn state_change_only_fires_on_actual_change() {
        let conn = Connection::new();
        let fires = Arc::new(AtomicUsize::new(0));
        let fires_clone = Arc::clone(&fires);
        conn.add_state_change_handler(Arc::new(move |_| {
            fires_clone.fetch_add(1, Ordering::SeqCst);
        }));
        conn.set_state(ConnectionState::Connecting);
        conn.set_state(ConnectionState::Connecting);
        conn.set_state(ConnectionState::Connected);
        assert_eq!(fires.load(Ordering::SeqCst), 2);
    }
}
