//! Number normalization for session documents.
//!
//! Key-value backends store numbers as decimal strings without trailing
//! zeros, so `2.0` comes back as `2`. Every store applies [`normalize`]
//! before writing so a document reads back exactly as it was stored.

use serde_json::{Number, Value};

use super::SessionData;

/// Smallest f64 above the `i64` range (2^63).
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
/// Smallest f64 above the `u64` range (2^64).
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

/// Rewrites every integral float in `data` as an integer.
///
/// Floats with a fractional part, and integral floats outside the `u64` and
/// `i64` ranges, are kept as they are.
pub fn normalize(data: &mut SessionData) {
    for value in data.values_mut() {
        normalize_value(value);
    }
}

fn normalize_value(value: &mut Value) {
    match value {
        Value::Number(n) => {
            if let Some(integer) = integral(n) {
                *n = integer;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_value),
        Value::Object(map) => map.values_mut().for_each(normalize_value),
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
}

fn integral(n: &Number) -> Option<Number> {
    if !n.is_f64() {
        return None;
    }
    let f = n.as_f64()?;
    if !f.is_finite() || f.fract() != 0.0 {
        return None;
    }
    if (-I64_BOUND..I64_BOUND).contains(&f) {
        Some(Number::from(f as i64))
    } else if (0.0..U64_BOUND).contains(&f) {
        Some(Number::from(f as u64))
    } else {
        None
    }
}
