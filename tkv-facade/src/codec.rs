//! # Value and Text Codecs
//!
//! Values cross the store boundary as JSON documents. Raw payloads that are
//! known to be text go through a `TextCodec` instead.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FacadeError, FacadeResult};

const JSON_NULL: &[u8] = b"null";

/// A value already encoded for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Returns `true` when the source value had no content (JSON `null`).
    pub fn is_null(&self) -> bool {
        self.0 == JSON_NULL
    }

    /// Encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// JSON value serializer backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    /// Encodes a value.
    pub fn serialize<V: Serialize + ?Sized>(&self, value: &V) -> FacadeResult<Payload> {
        serde_json::to_vec(value)
            .map(Payload)
            .map_err(FacadeError::Serialization)
    }

    /// Decodes a stored payload into `V`.
    pub fn deserialize<V: DeserializeOwned>(&self, bytes: &[u8]) -> FacadeResult<V> {
        serde_json::from_slice(bytes).map_err(FacadeError::Deserialization)
    }
}

/// Converts between raw store payloads and text.
pub trait TextCodec: Send + Sync {
    /// Decodes bytes into text. Undecodable input is replaced, never rejected.
    fn decode(&self, bytes: &[u8]) -> String;

    /// Encodes text into bytes.
    fn encode(&self, text: &str) -> Vec<u8>;
}

/// UTF-8 text, with U+FFFD substituted for invalid sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Codec;

impl TextCodec for Utf8Codec {
    fn decode(&self, bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }
}

/// ISO-8859-1: every byte maps to the code point of the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1Codec;

impl TextCodec for Latin1Codec {
    fn decode(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| char::from(b)).collect()
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect()
    }
}
