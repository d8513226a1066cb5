//! # Error Taxonomy
//!
//! `InvalidArgument` is the only error the facade raises itself. Everything
//! else comes from a collaborator and is passed through untouched.

use thiserror::Error;
use tkv_client::ClientError;

/// Result type for the byte-level store seam.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for the typed facade and its accessors.
pub type FacadeResult<T> = Result<T, FacadeError>;

/// Failures reported by a `ValueStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Remote store or transport failure.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Command issued against a key holding another data type.
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    /// Expiry of zero passed where the store requires a positive one.
    #[error("invalid expire time")]
    InvalidExpireTime,
}

/// Errors surfaced by the typed facade.
#[derive(Debug, Error)]
pub enum FacadeError {
    /// A required key, value or field list was missing.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The backing store failed; passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Value could not be encoded.
    #[error("failed to serialize value: {0}")]
    Serialization(#[source] serde_json::Error),
    /// Stored payload could not be decoded into the requested type.
    #[error("failed to deserialize value: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl FacadeError {
    /// Returns `true` if the call was rejected before reaching the store.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, FacadeError::InvalidArgument(_))
    }
}

impl From<ClientError> for FacadeError {
    fn from(err: ClientError) -> Self {
        FacadeError::Store(StoreError::Client(err))
    }
}
