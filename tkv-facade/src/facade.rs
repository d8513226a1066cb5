//! # Key-Value Facade
//!
//! Purpose: A typed, minimal API over a remote key-value store.
//!
//! ## Contract
//! 1. **Validate, then delegate**: keys and values are checked before the
//!    store is touched. A rejected call never reaches it.
//! 2. **One-to-one delegation**: each method maps to one accessor call
//!    (two when an expiry is attached to a hash). No caching or retries.
//! 3. **Zero means no expiry**: a TTL of `0` seconds never reaches the store.
//!
//! Only `None` is a null key; `""` is an ordinary key. A null value is one
//! that serializes to JSON `null`. That includes `None`, `()`, and non-finite
//! floats, which JSON cannot represent and `serde_json` writes as `null`.
//!
//! Store failures are returned unchanged as `FacadeError::Store`.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tkv_client::{ClientConfig, KVClient};
use tracing::trace;

use crate::codec::Payload;
use crate::error::{FacadeError, FacadeResult};
use crate::key::StoreKey;
use crate::store::{TtlStatus, ValueStore};
use crate::template::{TextTemplate, ValueTemplate};

const KEY_NULL: &str = "key must not be null";
const VALUE_NULL: &str = "value must not be null";
const FIELDS_EMPTY: &str = "hash fields must not be empty";

/// Typed facade over a key-value store.
///
/// `K` is the key type; values are any serde type, chosen per call. The
/// facade holds only shared handles to its two accessors and is cheap to
/// clone.
///
/// ```rust
/// use tkv_facade::{KvFacade, MemoryStore};
///
/// let kv: KvFacade<String, _> = KvFacade::from_store(MemoryStore::new());
/// kv.set("greeting", &"hello").unwrap();
/// let value: Option<String> = kv.get("greeting").unwrap();
/// assert_eq!(value.as_deref(), Some("hello"));
///
/// kv.hset("user:1", "name", &"ada").unwrap();
/// assert!(kv.has_field("user:1", "name").unwrap());
/// ```
pub struct KvFacade<K, S> {
    values: Arc<ValueTemplate<S>>,
    text: Arc<TextTemplate>,
    _key: PhantomData<fn(&K)>,
}

impl<K, S> Clone for KvFacade<K, S> {
    fn clone(&self) -> Self {
        KvFacade {
            values: Arc::clone(&self.values),
            text: Arc::clone(&self.text),
            _key: PhantomData,
        }
    }
}

impl<K: StoreKey> KvFacade<K, KVClient> {
    /// Connects a facade to a remote store through a pooled client.
    pub fn connect(config: ClientConfig) -> FacadeResult<Self> {
        Ok(Self::from_store(KVClient::with_config(config)?))
    }
}

impl<K: StoreKey, S: ValueStore> KvFacade<K, S> {
    /// Builds a facade from shared accessor handles.
    pub fn new(values: Arc<ValueTemplate<S>>, text: Arc<TextTemplate>) -> Self {
        KvFacade {
            values,
            text,
            _key: PhantomData,
        }
    }

    /// Builds a facade over `store` with JSON values and UTF-8 text.
    pub fn from_store(store: S) -> Self {
        Self::new(Arc::new(ValueTemplate::new(store)), Arc::new(TextTemplate::new()))
    }

    /// The value accessor this facade delegates to.
    pub fn values(&self) -> &ValueTemplate<S> {
        &self.values
    }

    /// Decodes raw bytes with the text accessor's codec.
    pub fn decode_text(&self, bytes: &[u8]) -> String {
        self.text.deserialize(bytes)
    }

    /// Returns true when `key` holds a value of any kind.
    pub fn exists<Q>(&self, key: &Q) -> FacadeResult<bool>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
    {
        check_key(key)?;
        self.values.has_key(key)
    }

    /// Reads the value stored under `key`.
    pub fn get<Q, V>(&self, key: &Q) -> FacadeResult<Option<V>>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
        V: DeserializeOwned,
    {
        check_key(key)?;
        self.values.get(key)
    }

    /// Stores `value` under `key` without expiry.
    pub fn set<Q, V>(&self, key: &Q, value: &V) -> FacadeResult<()>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
        V: Serialize + ?Sized,
    {
        self.set_with_ttl(key, value, 0)
    }

    /// Stores `value` under `key`, expiring after `ttl_secs` unless it is `0`.
    pub fn set_with_ttl<Q, V>(&self, key: &Q, value: &V, ttl_secs: u64) -> FacadeResult<()>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
        V: Serialize + ?Sized,
    {
        check_key(key)?;
        let payload = self.payload(value)?;
        self.values.set(key, &payload, expiry(ttl_secs))
    }

    /// Attaches an expiry to `key`. Returns false if the key is missing or
    /// `ttl_secs` is `0`.
    pub fn expire<Q>(&self, key: &Q, ttl_secs: u64) -> FacadeResult<bool>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
    {
        check_key(key)?;
        match expiry(ttl_secs) {
            Some(ttl) => self.values.expire(key, ttl),
            None => Ok(false),
        }
    }

    /// Reports whether `key` exists and how long it has left to live.
    pub fn ttl<Q>(&self, key: &Q) -> FacadeResult<TtlStatus>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
    {
        check_key(key)?;
        self.values.ttl(key)
    }

    /// Deletes `key` if it exists. Returns whether anything was removed.
    pub fn remove<Q>(&self, key: &Q) -> FacadeResult<bool>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
    {
        check_key(key)?;
        if !self.values.has_key(key)? {
            trace!(key = ?key, "remove skipped, key absent");
            return Ok(false);
        }
        self.values.delete(key)
    }

    /// Deletes every key in `keys` with one store call. Returns how many existed.
    /// An empty slice deletes nothing and makes no call.
    pub fn remove_all(&self, keys: &[K]) -> FacadeResult<u64> {
        for key in keys {
            check_key(key)?;
        }
        if keys.is_empty() {
            return Ok(0);
        }
        self.values.delete_many(keys)
    }

    /// Sets one hash field.
    pub fn hset<Q, V>(&self, key: &Q, field: &str, value: &V) -> FacadeResult<()>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
        V: Serialize + ?Sized,
    {
        self.hset_with_ttl(key, field, value, 0)
    }

    /// Sets one hash field, then expires the whole key after `ttl_secs`
    /// unless it is `0`.
    pub fn hset_with_ttl<Q, V>(&self, key: &Q, field: &str, value: &V, ttl_secs: u64) -> FacadeResult<()>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
        V: Serialize + ?Sized,
    {
        check_key(key)?;
        let payload = self.payload(value)?;
        self.values.hash_put(key, field, &payload)?;
        self.apply_ttl(key, ttl_secs)
    }

    /// Sets every field in `entries`.
    pub fn hset_all<Q, V>(&self, key: &Q, entries: &HashMap<String, V>) -> FacadeResult<()>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
        V: Serialize,
    {
        self.hset_all_with_ttl(key, entries, 0)
    }

    /// Sets every field in `entries`, then expires the key after `ttl_secs`
    /// unless it is `0`. An empty map is a no-op.
    pub fn hset_all_with_ttl<Q, V>(&self, key: &Q, entries: &HashMap<String, V>, ttl_secs: u64) -> FacadeResult<()>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
        V: Serialize,
    {
        check_key(key)?;
        if entries.is_empty() {
            trace!(key = ?key, "hash put skipped, no entries");
            return Ok(());
        }
        let mut encoded = Vec::with_capacity(entries.len());
        for (field, value) in entries {
            encoded.push((field.as_str(), self.payload(value)?));
        }
        self.values.hash_put_all(key, &encoded)?;
        self.apply_ttl(key, ttl_secs)
    }

    /// Sets a hash field only if it is not already present. Returns whether
    /// the value was written.
    pub fn hset_absent<Q, V>(&self, key: &Q, field: &str, value: &V) -> FacadeResult<bool>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
        V: Serialize + ?Sized,
    {
        check_key(key)?;
        let payload = self.payload(value)?;
        self.values.hash_put_if_absent(key, field, &payload)
    }

    /// Reads one hash field.
    pub fn hget<Q, V>(&self, key: &Q, field: &str) -> FacadeResult<Option<V>>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
        V: DeserializeOwned,
    {
        check_key(key)?;
        self.values.hash_get(key, field)
    }

    /// Reads every field of the hash at `key`; empty when the key is absent.
    pub fn hget_all<Q, V>(&self, key: &Q) -> FacadeResult<HashMap<String, V>>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
        V: DeserializeOwned,
    {
        check_key(key)?;
        self.values.hash_entries(key)
    }

    /// Removes hash fields. Returns how many existed.
    pub fn hdel<Q>(&self, key: &Q, fields: &[&str]) -> FacadeResult<u64>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
    {
        check_key(key)?;
        if fields.is_empty() {
            return Err(FacadeError::InvalidArgument(FIELDS_EMPTY));
        }
        self.values.hash_delete(key, fields)
    }

    /// Deletes the key with all of its fields.
    pub fn delete_key<Q>(&self, key: &Q) -> FacadeResult<bool>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
    {
        check_key(key)?;
        self.values.delete(key)
    }

    /// Returns true when `field` exists in the hash at `key`.
    pub fn has_field<Q>(&self, key: &Q, field: &str) -> FacadeResult<bool>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
    {
        check_key(key)?;
        self.values.hash_has_key(key, field)
    }

    /// Returns true when `key` exists.
    pub fn has_key<Q>(&self, key: &Q) -> FacadeResult<bool>
    where
        K: Borrow<Q>,
        Q: StoreKey + ?Sized,
    {
        check_key(key)?;
        self.values.has_key(key)
    }

    fn payload<V: Serialize + ?Sized>(&self, value: &V) -> FacadeResult<Payload> {
        let payload = self.values.serialize(value)?;
        // NaN and infinities land here too.
        if payload.is_null() {
            return Err(FacadeError::InvalidArgument(VALUE_NULL));
        }
        Ok(payload)
    }

    fn apply_ttl<Q: StoreKey + ?Sized>(&self, key: &Q, ttl_secs: u64) -> FacadeResult<()> {
        if let Some(ttl) = expiry(ttl_secs) {
            self.values.expire(key, ttl)?;
        }
        Ok(())
    }
}

fn check_key<Q: StoreKey + ?Sized>(key: &Q) -> FacadeResult<()> {
    if key.is_null() {
        return Err(FacadeError::InvalidArgument(KEY_NULL));
    }
    Ok(())
}

fn expiry(seconds: u64) -> Option<Duration> {
    if seconds == 0 {
        trace!("zero ttl, expiry left unchanged");
        return None;
    }
    Some(Duration::from_secs(seconds))
}
