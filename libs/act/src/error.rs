use act_network::TransportError;
use thiserror::Error;

/// Errors surfaced by the session and its sub-session handlers.
#[derive(Debug, Error)]
pub enum ActError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("send_request failed: connection is not ready")]
    SendFailed,

    #[error("server reported an error: {0}")]
    ServerError(String),

    #[error("the connection was dropped before a response arrived")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, ActError>;
