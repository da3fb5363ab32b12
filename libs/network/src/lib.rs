//! TCP connection lifecycle and transport errors for the ACT protocol client.

pub mod connection;
pub mod error;

pub use connection::{Connection, ConnectionState, RequestInspector};
pub use error::{Result, TransportError};
