//! Transport error types for the TCP connection to an ACT server.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors from the TCP transport layer.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network connectivity errors below the connection layer.
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Connection lifecycle errors (connect/disconnect failures).
    #[error("connection error: {message} (remote: {remote_addr:?})")]
    Connection {
        message: String,
        remote_addr: Option<SocketAddr>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Frame or message decode/encode errors.
    #[error("protocol error: {message}")]
    Protocol {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic I/O errors surfaced from the underlying socket.
    #[error("I/O error: {message}")]
    Io { message: String, source: std::io::Error },

    /// A send was attempted while the connection was not in the `Connected` state.
    #[error("not connected")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, TransportError>;

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into(), source: None }
    }

    pub fn connection(message: impl Into<String>, remote_addr: Option<SocketAddr>) -> Self {
        Self::Connection { message: message.into(), remote_addr, source: None }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol { message: message.into(), source: None }
    }

    pub fn protocol_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Protocol { message: message.into(), source: Some(Box::new(source)) }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Network { .. } | TransportError::Connection { .. } | TransportError::Io { .. })
    }

    pub fn category(&self) -> &'static str {
        match self {
            TransportError::Network { .. } => "network",
            TransportError::Connection { .. } => "connection",
            TransportError::Protocol { .. } => "protocol",
            TransportError::Io { .. } => "io",
            TransportError::NotConnected => "not_connected",
        }
    }
}

// Box<dyn Error> isn't Clone, so sources are dropped on clone.
impl Clone for TransportError {
    fn clone(&self) -> Self {
        match self {
            TransportError::Network { message, .. } => {
                TransportError::Network { message: message.clone(), source: None }
            }
            TransportError::Connection { message, remote_addr, .. } => {
                TransportError::Connection { message: message.clone(), remote_addr: *remote_addr, source: None }
            }
            TransportError::Protocol { message, .. } => {
                TransportError::Protocol { message: message.clone(), source: None }
            }
            TransportError::Io { message, source } => {
                TransportError::Io { message: message.clone(), source: std::io::Error::new(source.kind(), message.clone()) }
            }
            TransportError::NotConnected => TransportError::NotConnected,
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(error: std::io::Error) -> Self {
        TransportError::Io { message: error.to_string(), source: error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn construction_and_category() {
        let err = TransportError::network("refused");
        assert_eq!(err.category(), "network");
        assert!(err.is_retryable());
    }

    #[test]
    fn connection_error_carries_remote_addr() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 4722);
        let err = TransportError::connection("handshake failed", Some(addr));
        match err {
            TransportError::Connection { remote_addr, .. } => assert_eq!(remote_addr, Some(addr)),
            _ => panic!("expected Connection error"),
        }
    }

    #[test]
    fn not_connected_is_not_retryable() {
        assert!(!TransportError::NotConnected.is_retryable());
    }

    #[test]
    fn io_error_conversion_preserves_message() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "reset");
        let transport_err = TransportError::from(io_err);
        match transport_err {
            TransportError::Io { message, .. } => assert!(message.contains("reset")),
            _ => panic!("expected Io error"),
        }
    }
}
