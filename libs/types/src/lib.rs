//! Wire message shapes, variant values, and fixed-point numerics for the
//! ACT protocol client.
//!
//! `wire` holds the hand-authored `prost` message types; `fixed_point` holds
//! [`DexPrice`]/[`DexQuantity`]; `variant` holds the typed cell-value union
//! built on top of both.

pub mod errors;
pub mod fixed_point;
pub mod variant;
pub mod wire;

pub use errors::FixedPointError;
pub use fixed_point::{DexPrice, DexQuantity};
pub use variant::VariantValue;
