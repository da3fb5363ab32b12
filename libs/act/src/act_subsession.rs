//! Login/logout over the ACT sub-protocol.

use std::sync::Arc;

use act_network::Connection;
use act_types::wire::{
    ActLoginRequest, ActLoginResponse, ActRequest, ActRequestType, ActResponse, ActResponseType, FailureAction,
    OperationStatus, Property, Request, RequestPayload, ResponsePayload, ServerConnection, SessionOption,
    SubProtocolType,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::{ActError, Result};

/// Login succeeds or fails as a unit: either the server accepted the
/// credentials and handed back session state, or it didn't.
#[derive(Debug, Clone)]
pub struct LogonResponse {
    pub login_response: ActLoginResponse,
    pub session_id: i64,
    pub server_connections: Vec<ServerConnection>,
}

pub struct LogonRequest {
    pub username: String,
    pub password: String,
    pub appname: String,
    pub failure_actions: Vec<FailureAction>,
    pub session_options: Vec<SessionOption>,
    pub client_properties: Vec<Property>,
}

/// Handles `REQ_LOGIN`/`REQ_LOGOUT`. The login request always uses
/// `client_id = 0`, matching the reference client — there is never more than
/// one login in flight per session.
pub struct ActSubSession {
    connection: Arc<Connection>,
    pending_login: Mutex<Option<oneshot::Sender<Result<LogonResponse>>>>,
}

impl ActSubSession {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection, pending_login: Mutex::new(None) }
    }

    pub fn sub_protocol_type(&self) -> SubProtocolType {
        SubProtocolType::Act
    }

    /// Suspends until the server's login response arrives.
    pub async fn logon(&self, request: LogonRequest) -> Result<LogonResponse> {
        let (tx, rx) = oneshot::channel();
        *self.pending_login.lock() = Some(tx);

        let wire_request = Request {
            sub_protocol_type: SubProtocolType::Act as i32,
            payload: Some(RequestPayload::Act(ActRequest {
                request_type: ActRequestType::Login as i32,
                client_id: 0,
                login_request: Some(ActLoginRequest {
                    username: request.username,
                    password: request.password,
                    appname: request.appname,
                    failure_actions: request.failure_actions.into_iter().map(|a| a as i32).collect(),
                    session_options: request.session_options,
                    client_properties: request.client_properties,
                }),
            })),
        };

        if !self.connection.send_request(&wire_request).await {
            self.pending_login.lock().take();
            return Err(ActError::SendFailed);
        }

        rx.await.unwrap_or(Err(ActError::Disconnected))
    }

    /// Sends the logout request and returns without waiting for a response,
    /// matching the reference client — there is no `REQ_LOGOUT` acknowledgement
    /// to wait for.
    pub async fn logout(&self) -> Result<()> {
        let wire_request = Request {
            sub_protocol_type: SubProtocolType::Act as i32,
            payload: Some(RequestPayload::Act(ActRequest {
                request_type: ActRequestType::Logout as i32,
                client_id: 0,
                login_request: None,
            })),
        };

        if !self.connection.send_request(&wire_request).await {
            return Err(ActError::SendFailed);
        }

        Ok(())
    }

    pub fn on_response(&self, response: &ResponsePayload) {
        let ResponsePayload::Act(act_response) = response else { return };
        let response_type = act_response.response_type;
        if response_type == ActResponseType::Login as i32 {
            self.handle_login(act_response);
        } else {
            tracing::info!(response_type, "unhandled act sub-protocol response type");
        }
    }

    fn handle_login(&self, response: &ActResponse) {
        let Some(tx) = self.pending_login.lock().take() else {
            tracing::warn!("login response with no pending logon");
            return;
        };
        let result = match &response.operation_status {
            Some(status) if status.has_error() => Err(ActError::ServerError(status.error_message.clone())),
            _ => Ok(LogonResponse {
                login_response: response.login_response.clone().unwrap_or_default(),
                session_id: response.session_id,
                server_connections: response.connections.clone(),
            }),
        };
        let _ = tx.send(result);
    }
}
