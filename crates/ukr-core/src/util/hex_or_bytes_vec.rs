//! Serde module for variable-length byte payloads: hex when human-readable, raw bytes otherwise.

use std::fmt;

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize a byte vector.
///
/// # Errors
/// Returns any serializer error when serialization fails.
pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if serializer.is_human_readable() {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    } else {
        serializer.serialize_bytes(bytes)
    }
}

/// Deserialize a byte vector.
///
/// # Errors
/// Returns an error if hex decoding fails or the underlying deserializer errors.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    if deserializer.is_human_readable() {
        let s = String::deserialize(deserializer)?;
        return hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom);
    }

    struct BytesVisitor;

    impl<'de> serde::de::Visitor<'de> for BytesVisitor {
        type Value = Vec<u8>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a byte string")
        }

        fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(v.to_vec())
        }

        fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(v)
        }

        // Some encoders emit byte strings as integer sequences
        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::SeqAccess<'de>,
        {
            let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(byte) = seq.next_element::<u8>()? {
                out.push(byte);
            }
            Ok(out)
        }
    }

    deserializer.deserialize_bytes(BytesVisitor)
}
