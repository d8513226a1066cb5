//! # TypedKV Facade
//!
//! Purpose: A typed key-value API (string get/set with optional expiry, hash
//! fields, existence checks, bulk delete) over a Redis-compatible store.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `KvFacade` validates arguments and delegates each
//!    call to its accessors; it owns no data and caches nothing.
//! 2. **Strategy Pattern**: backends implement `ValueStore`, so the remote
//!    `KVClient` and the in-process `MemoryStore` are interchangeable.
//! 3. **Typed Edges**: keys implement `StoreKey`, values are serde types.
//!
//! ## Structure Overview
//!
//! ```text
//! KvFacade<K, S>
//!   ├── values: Arc<ValueTemplate<S>>   (keys + JSON values -> ValueStore)
//!   │     └── store: S: ValueStore      (KVClient | MemoryStore)
//!   └── text:   Arc<TextTemplate>       (raw bytes -> text via TextCodec)
//! ```

mod codec;
mod error;
mod facade;
mod key;
mod memory;
mod store;
mod template;

pub use codec::{JsonSerializer, Latin1Codec, Payload, TextCodec, Utf8Codec};
pub use error::{FacadeError, FacadeResult, StoreError, StoreResult};
pub use facade::KvFacade;
pub use key::StoreKey;
pub use memory::MemoryStore;
pub use store::{TtlStatus, ValueStore};
pub use template::{TextTemplate, ValueTemplate};
pub use tkv_client::{ClientConfig, KVClient};
