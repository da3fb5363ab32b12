use thiserror::Error;

/// Errors from constructing or rescaling a fixed-point [`DexPrice`](crate::DexPrice)
/// or [`DexQuantity`](crate::DexQuantity).
///
/// Variant-value coercion (`VariantValue::as_price`, `as_quantity`, ...) never
/// surfaces this type: a failed coercion there falls back to the type's
/// default/invalid value instead of propagating an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixedPointError {
    #[error("value {value} overflows the fixed-point representation")]
    Overflow { value: String },

    #[error("'{input}' is not a valid decimal number")]
    InvalidDecimal { input: String },

    #[error("precision {precision} exceeds the maximum supported precision")]
    PrecisionTooLarge { precision: u32 },
}
