//! # Store Seam
//!
//! `ValueStore` is the byte-level command set the facade needs from a
//! backend. `KVClient` implements it against a remote server and
//! `MemoryStore` implements it in-process, so callers can swap backends
//! without touching facade code.

use std::sync::Arc;
use std::time::Duration;

use tkv_client::{ClientTtl, KVClient};

use crate::error::StoreResult;

/// Remaining lifetime of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlStatus {
    /// Key is missing or already expired.
    Missing,
    /// Key exists without expiration.
    NoExpiry,
    /// Key expires after the provided duration.
    ExpiresIn(Duration),
}

/// Byte-level key-value operations with Redis semantics.
pub trait ValueStore: Send + Sync {
    /// Returns true when the key holds any value.
    fn exists(&self, key: &[u8]) -> StoreResult<bool>;

    /// Reads a string value.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Writes a string value and clears any expiry.
    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Writes a string value that expires after `ttl`.
    fn set_with_ttl(&self, key: &[u8], value: &[u8], ttl: Duration) -> StoreResult<()>;

    /// Attaches an expiry. Returns false when the key does not exist.
    fn expire(&self, key: &[u8], ttl: Duration) -> StoreResult<bool>;

    fn ttl(&self, key: &[u8]) -> StoreResult<TtlStatus>;

    /// Deletes keys of any type. Returns how many existed.
    fn delete(&self, keys: &[&[u8]]) -> StoreResult<u64>;

    /// Sets one hash field. Returns true when the field is new.
    fn hset(&self, key: &[u8], field: &[u8], value: &[u8]) -> StoreResult<bool>;

    /// Sets several hash fields. Returns how many are new.
    fn hset_multiple(&self, key: &[u8], entries: &[(&[u8], &[u8])]) -> StoreResult<u64>;

    /// Sets a hash field only if absent. Returns true when it was set.
    fn hset_nx(&self, key: &[u8], field: &[u8], value: &[u8]) -> StoreResult<bool>;

    /// Removes hash fields. Returns how many existed.
    fn hdel(&self, key: &[u8], fields: &[&[u8]]) -> StoreResult<u64>;

    fn hget(&self, key: &[u8], field: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    fn hgetall(&self, key: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>>;

    fn hexists(&self, key: &[u8], field: &[u8]) -> StoreResult<bool>;
}

impl<T: ValueStore + ?Sized> ValueStore for Arc<T> {
    fn exists(&self, key: &[u8]) -> StoreResult<bool> {
        (**self).exists(key)
    }

    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn set_with_ttl(&self, key: &[u8], value: &[u8], ttl: Duration) -> StoreResult<()> {
        (**self).set_with_ttl(key, value, ttl)
    }

    fn expire(&self, key: &[u8], ttl: Duration) -> StoreResult<bool> {
        (**self).expire(key, ttl)
    }

    fn ttl(&self, key: &[u8]) -> StoreResult<TtlStatus> {
        (**self).ttl(key)
    }

    fn delete(&self, keys: &[&[u8]]) -> StoreResult<u64> {
        (**self).delete(keys)
    }

    fn hset(&self, key: &[u8], field: &[u8], value: &[u8]) -> StoreResult<bool> {
        (**self).hset(key, field, value)
    }

    fn hset_multiple(&self, key: &[u8], entries: &[(&[u8], &[u8])]) -> StoreResult<u64> {
        (**self).hset_multiple(key, entries)
    }

    fn hset_nx(&self, key: &[u8], field: &[u8], value: &[u8]) -> StoreResult<bool> {
        (**self).hset_nx(key, field, value)
    }

    fn hdel(&self, key: &[u8], fields: &[&[u8]]) -> StoreResult<u64> {
        (**self).hdel(key, fields)
    }

    fn hget(&self, key: &[u8], field: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        (**self).hget(key, field)
    }

    fn hgetall(&self, key: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        (**self).hgetall(key)
    }

    fn hexists(&self, key: &[u8], field: &[u8]) -> StoreResult<bool> {
        (**self).hexists(key, field)
    }
}

impl ValueStore for KVClient {
    fn exists(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(KVClient::exists(self, key)?)
    }

    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(KVClient::get(self, key)?)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        Ok(KVClient::set(self, key, value)?)
    }

    fn set_with_ttl(&self, key: &[u8], value: &[u8], ttl: Duration) -> StoreResult<()> {
        Ok(KVClient::set_with_ttl(self, key, value, ttl)?)
    }

    fn expire(&self, key: &[u8], ttl: Duration) -> StoreResult<bool> {
        Ok(KVClient::expire(self, key, ttl)?)
    }

    fn ttl(&self, key: &[u8]) -> StoreResult<TtlStatus> {
        Ok(match KVClient::ttl(self, key)? {
            ClientTtl::Missing => TtlStatus::Missing,
            ClientTtl::NoExpiry => TtlStatus::NoExpiry,
            ClientTtl::ExpiresIn(remaining) => TtlStatus::ExpiresIn(remaining),
        })
    }

    fn delete(&self, keys: &[&[u8]]) -> StoreResult<u64> {
        Ok(self.delete_many(keys)?)
    }

    fn hset(&self, key: &[u8], field: &[u8], value: &[u8]) -> StoreResult<bool> {
        Ok(KVClient::hset(self, key, field, value)?)
    }

    fn hset_multiple(&self, key: &[u8], entries: &[(&[u8], &[u8])]) -> StoreResult<u64> {
        Ok(KVClient::hset_multiple(self, key, entries)?)
    }

    fn hset_nx(&self, key: &[u8], field: &[u8], value: &[u8]) -> StoreResult<bool> {
        Ok(KVClient::hset_nx(self, key, field, value)?)
    }

    fn hdel(&self, key: &[u8], fields: &[&[u8]]) -> StoreResult<u64> {
        Ok(KVClient::hdel(self, key, fields)?)
    }

    fn hget(&self, key: &[u8], field: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(KVClient::hget(self, key, field)?)
    }

    fn hgetall(&self, key: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(KVClient::hgetall(self, key)?)
    }

    fn hexists(&self, key: &[u8], field: &[u8]) -> StoreResult<bool> {
        Ok(KVClient::hexists(self, key, field)?)
    }
}
