//! High-level client for the ACT trading-platform wire protocol: connection
//! lifecycle, login/logout, the AutoControl and Algo request/response
//! sub-sessions, and the DEX live-query engine with CSV import/export.
//!
//! [`Session`] is the entry point: it owns the [`act_network::Connection`]
//! and dispatches every decoded response to whichever sub-session matches
//! its [`act_types::wire::SubProtocolType`] tag.

pub mod act_subsession;
pub mod algo;
pub mod autocontrol;
pub mod dex;
pub mod error;
pub mod session;

pub use act_subsession::{ActSubSession, LogonRequest, LogonResponse};
pub use algo::{AlgoAck, AlgoSubSession};
pub use autocontrol::AutoControlSubSession;
pub use dex::{DexCell, DexColumn, DexQuery, DexQueryState, DexRow, DexRowKey, DexSubSession, StartQueryParams};
pub use error::{ActError, Result};
pub use session::Session;
