//! # TypedKV Sync Client
//!
//! Purpose: Provide a lightweight, synchronous Redis-compatible client with
//! connection pooling to minimize TCP handshake overhead.
//!
//! ## Design Principles
//! 1. **Object Pool Pattern**: Reuse TCP connections to avoid repeated connects.
//! 2. **Minimal Allocation**: Reuse buffers for RESP framing and parsing.
//! 3. **Protocol Clarity**: Encode/parse RESP2 explicitly for correctness.

mod client;
mod config;
mod error;
mod pool;
mod resp;

pub use client::{ClientTtl, KVClient};
pub use config::{ClientConfig, DEFAULT_ADDR};
pub use error::{ClientError, ClientResult};
pub use resp::{RespValue, MAX_REPLY_LEN};
