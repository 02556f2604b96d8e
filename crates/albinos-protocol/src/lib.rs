//! albinos-protocol
//!
//! Wire-level encoding/decoding for the configuration service.
//!
//! This crate is responsible for turning raw socket bytes into
//! `albinos_core::Request` values and `albinos_core::Answer` values back
//! into bytes.
//!
//! - [`framing`]    : splits a byte stream into complete JSON objects
//! - [`json_codec`] : JSON object ↔ typed request/answer

pub mod framing;
pub mod json_codec;

pub use framing::JsonFramer;
pub use json_codec::{decode_request, encode_answer, ProtocolError};
