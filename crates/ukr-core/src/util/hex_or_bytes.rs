//! Serde module for fixed-size byte arrays: `0x`-hex when human-readable, raw bytes otherwise.

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize a byte array.
///
/// # Errors
/// Returns any serializer error when serialization fails.
pub fn serialize<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    super::hex_or_bytes_vec::serialize(bytes.as_ref(), serializer)
}

/// Deserialize a byte array of length `N`.
///
/// # Errors
/// Returns an error if hex decoding fails or the length is incorrect.
pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
where
    D: Deserializer<'de>,
{
    let vec = if deserializer.is_human_readable() {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?
    } else {
        super::hex_or_bytes_vec::deserialize(deserializer)?
    };

    <[u8; N]>::try_from(vec.as_slice()).map_err(|_| {
        serde::de::Error::custom(format!("expected {N} bytes, got {}", vec.len()))
    })
}
