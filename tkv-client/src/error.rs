//! # Client Errors
//!
//! Every failure the client can surface, from socket IO to server replies.

use thiserror::Error;

/// Result type for the sync client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the sync client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or IO failure while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// RESP2 framing or parse error.
    #[error("protocol error: {0}")]
    Protocol(&'static str),
    /// Server returned an error reply.
    #[error("server error: {}", String::from_utf8_lossy(.message))]
    Server { message: Vec<u8> },
    /// Reply type did not match what the command returns.
    #[error("unexpected response to {command}")]
    UnexpectedResponse { command: &'static str },
    /// Pool is at capacity and no idle connections are available.
    #[error("connection pool exhausted")]
    PoolExhausted,
    /// Address could not be parsed into a socket address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns the server's error text, if this is a server reply.
    pub fn server_message(&self) -> Option<String> {
        match self {
            ClientError::Server { message } => Some(String::from_utf8_lossy(message).into_owned()),
            _ => None,
        }
    }
}
