//! Serde module for `u128` amounts: written as a decimal string, read from a
//! string or any integer the format can carry.
//!
//! TOML integers stop at `i64::MAX`, which is under 10 tokens at 18 decimals,
//! so larger amounts have to travel as strings.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

/// Serialize an amount as a decimal string.
///
/// # Errors
/// Returns any serializer error when serialization fails.
pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

/// Deserialize an amount from an unsigned integer or a decimal string.
///
/// # Errors
/// Returns an error for negative numbers and strings that are not a decimal `u128`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DecimalU128Visitor)
}

struct DecimalU128Visitor;

impl Visitor<'_> for DecimalU128Visitor {
    type Value = u128;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
        Ok(u128::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
        u128::try_from(v).map_err(|_| E::custom(format!("amount must not be negative, got {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
        let digits = v.trim().replace('_', "");
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(E::custom(format!("invalid decimal amount: {v:?}")));
        }
        digits
            .parse::<u128>()
            .map_err(|_| E::custom(format!("amount out of range: {v}")))
    }
}
