pub mod decimal_u128;
pub mod hex_or_bytes;
pub mod hex_or_bytes_vec;
