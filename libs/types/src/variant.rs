//! The typed variant-value union carried by DEX table cells, and the
//! cross-variant coercions used when a caller asks for a type other than the
//! one a cell actually holds.

use crate::fixed_point::{DexPrice, DexQuantity};
use crate::wire;

/// A single scalar cell value, or a homogeneous vector of them.
///
/// Coercion between variants never fails: asking a [`VariantValue::String`]
/// for [`VariantValue::as_price`] yields [`DexPrice::INVALID`] rather than an
/// error, matching the wire protocol's own tolerance for type mismatches.
#[derive(Clone, Debug, PartialEq)]
pub enum VariantValue {
    Unknown,
    Double(f64),
    Int32(i32),
    Price(DexPrice),
    String(String),
    Quantity(DexQuantity),
    Vector(Vec<VariantValue>),
}

/// The order in which a wire value with more than one field set is resolved,
/// and the order each `as_*` coercion falls back through when the cell isn't
/// already the requested type.
const COERCION_ORDER: [wire::VariantType; 4] = [
    wire::VariantType::Price,
    wire::VariantType::Double,
    wire::VariantType::Quantity,
    wire::VariantType::Int32,
];

impl VariantValue {
    pub fn kind(&self) -> wire::VariantType {
        match self {
            VariantValue::Unknown => wire::VariantType::Unknown,
            VariantValue::Double(_) => wire::VariantType::Double,
            VariantValue::Int32(_) => wire::VariantType::Int32,
            VariantValue::Price(_) => wire::VariantType::Price,
            VariantValue::String(_) => wire::VariantType::String,
            VariantValue::Quantity(_) => wire::VariantType::Quantity,
            VariantValue::Vector(_) => wire::VariantType::Unknown,
        }
    }

    /// Decode a wire `VariantValue`. If more than one scalar field happens
    /// to be set, [`COERCION_ORDER`] picks a winner; `var_string` is checked
    /// last, and an entirely empty message decodes to [`VariantValue::Unknown`].
    pub fn from_wire(wire: &wire::WireVariantValue) -> VariantValue {
        for kind in COERCION_ORDER {
            if let Some(v) = Self::scalar_for(wire, kind) {
                return v;
            }
        }
        if let Some(s) = &wire.var_string {
            return VariantValue::String(s.clone());
        }
        VariantValue::Unknown
    }

    fn scalar_for(wire: &wire::WireVariantValue, kind: wire::VariantType) -> Option<VariantValue> {
        match kind {
            wire::VariantType::Price => wire.var_price.map(DexPrice::from_raw).map(VariantValue::Price),
            wire::VariantType::Double => wire.var_double.map(VariantValue::Double),
            wire::VariantType::Quantity => wire.var_quantity.map(DexQuantity::from_raw).map(VariantValue::Quantity),
            wire::VariantType::Int32 => wire.var_int.map(VariantValue::Int32),
            _ => None,
        }
    }

    pub fn to_wire(&self) -> wire::WireVariantValue {
        let mut out = wire::WireVariantValue::default();
        match self {
            VariantValue::Unknown | VariantValue::Vector(_) => {}
            VariantValue::Double(d) => out.var_double = Some(*d),
            VariantValue::Int32(i) => out.var_int = Some(*i),
            VariantValue::Price(p) => out.var_price = Some(p.raw_value()),
            VariantValue::String(s) => out.var_string = Some(s.clone()),
            VariantValue::Quantity(q) => out.var_quantity = Some(q.raw_value()),
        }
        out
    }

    pub fn as_price(&self) -> DexPrice {
        match self {
            VariantValue::Price(p) => *p,
            VariantValue::Double(d) => DexPrice::from_decimal_str(&format!("{d}")).unwrap_or(DexPrice::INVALID),
            VariantValue::Quantity(q) => {
                DexPrice::from_value_and_precision(q.raw_value(), DexQuantity::PRECISION).unwrap_or(DexPrice::INVALID)
            }
            VariantValue::Int32(i) => DexPrice::from_value_and_precision(*i as i64, 0).unwrap_or(DexPrice::INVALID),
            VariantValue::String(s) => DexPrice::from_decimal_str(s).unwrap_or(DexPrice::INVALID),
            VariantValue::Unknown | VariantValue::Vector(_) => DexPrice::INVALID,
        }
    }

    pub fn as_quantity(&self) -> DexQuantity {
        match self {
            VariantValue::Quantity(q) => *q,
            VariantValue::Price(p) if !p.is_invalid() => {
                DexQuantity::from_value_and_precision(p.raw_value(), DexPrice::PRECISION).unwrap_or(DexQuantity::zero())
            }
            VariantValue::Double(d) => DexQuantity::from_decimal_str(&format!("{d}")).unwrap_or(DexQuantity::zero()),
            VariantValue::Int32(i) => {
                DexQuantity::from_value_and_precision(*i as i64, 0).unwrap_or(DexQuantity::zero())
            }
            VariantValue::String(s) => DexQuantity::from_decimal_str(s).unwrap_or(DexQuantity::zero()),
            VariantValue::Price(_) | VariantValue::Unknown | VariantValue::Vector(_) => DexQuantity::zero(),
        }
    }

    pub fn as_double(&self) -> f64 {
        match self {
            VariantValue::Double(d) => *d,
            VariantValue::Price(p) if !p.is_invalid() => p.to_str(-1).parse().unwrap_or(0.0),
            VariantValue::Quantity(q) => q.to_str(-1).parse().unwrap_or(0.0),
            VariantValue::Int32(i) => *i as f64,
            VariantValue::String(s) => s.parse().unwrap_or(0.0),
            VariantValue::Price(_) | VariantValue::Unknown | VariantValue::Vector(_) => 0.0,
        }
    }

    pub fn as_int32(&self) -> i32 {
        match self {
            VariantValue::Int32(i) => *i,
            VariantValue::Double(d) => *d as i32,
            VariantValue::Price(p) if !p.is_invalid() => (p.raw_value() / DexPrice::SCALE) as i32,
            VariantValue::Quantity(q) => (q.raw_value() / DexQuantity::SCALE) as i32,
            VariantValue::String(s) => s.parse().unwrap_or(0),
            VariantValue::Price(_) | VariantValue::Unknown | VariantValue::Vector(_) => 0,
        }
    }

    /// Render the cell's own type without coercion, the way a CSV data row does.
    pub fn as_str(&self) -> String {
        match self {
            VariantValue::Unknown => String::new(),
            VariantValue::Double(d) => format!("{d}"),
            VariantValue::Int32(i) => i.to_string(),
            VariantValue::Price(p) => p.to_str(-1),
            VariantValue::String(s) => s.clone(),
            VariantValue::Quantity(q) => q.to_str(-1),
            VariantValue::Vector(v) => v.iter().map(VariantValue::as_str).collect::<Vec<_>>().join(";"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_coerces_to_price() {
        let v = VariantValue::String("12.5".into());
        assert_eq!(v.as_price().to_str(-1), "12.5");
    }

    #[test]
    fn unknown_coerces_to_invalid_price_and_zero_quantity() {
        assert!(VariantValue::Unknown.as_price().is_invalid());
        assert_eq!(VariantValue::Unknown.as_quantity(), DexQuantity::zero());
    }

    #[test]
    fn wire_round_trip_price() {
        let v = VariantValue::Price(DexPrice::from_decimal_str("3.5").unwrap());
        let wire = v.to_wire();
        assert_eq!(VariantValue::from_wire(&wire), v);
    }
}
