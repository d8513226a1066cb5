//! # In-Memory Store
//!
//! An in-process `ValueStore` with the same observable semantics as a Redis
//! server for the commands the facade issues. Useful for tests and for
//! embedding the facade without a server.
//!
//! ## Semantics
//!
//! - Each key holds either a string or a hash; mixing them is `WrongType`.
//! - Expiry is checked lazily on access. Reads skip expired entries, writes
//!   drop them before mutating. An expired key that is never touched again
//!   keeps its memory until `purge_expired` runs; there is no background
//!   sweeper.
//! - A hash whose last field is removed disappears, like in Redis.
//! - `SET` clears any expiry; hash writes keep it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{TtlStatus, ValueStore};

#[derive(Debug)]
enum Value {
    String(Vec<u8>),
    Hash(HashMap<Vec<u8>, Vec<u8>>),
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    fn hash(&self) -> StoreResult<&HashMap<Vec<u8>, Vec<u8>>> {
        match &self.value {
            Value::Hash(fields) => Ok(fields),
            Value::String(_) => Err(StoreError::WrongType),
        }
    }

    fn hash_mut(&mut self) -> StoreResult<&mut HashMap<Vec<u8>, Vec<u8>>> {
        match &mut self.value {
            Value::Hash(fields) => Ok(fields),
            Value::String(_) => Err(StoreError::WrongType),
        }
    }
}

type Map = HashMap<Vec<u8>, Entry>;

/// Thread-safe in-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Map>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    /// Returns true when no live key exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every expired entry. Returns how many were removed.
    ///
    /// Long-lived stores that write many short-lived keys should call this
    /// periodically, since lazy expiry only reclaims keys that are accessed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    fn read<T>(&self, key: &[u8], f: impl FnOnce(Option<&Entry>) -> StoreResult<T>) -> StoreResult<T> {
        let now = Instant::now();
        let entries = self.entries.read();
        f(entries.get(key).filter(|entry| !entry.is_expired(now)))
    }

    fn write<T>(&self, key: &[u8], f: impl FnOnce(&mut Map) -> StoreResult<T>) -> StoreResult<T> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        f(&mut entries)
    }

    /// Runs `f` against the hash at `key`, creating it when absent.
    fn with_hash<T>(
        &self,
        key: &[u8],
        f: impl FnOnce(&mut HashMap<Vec<u8>, Vec<u8>>) -> T,
    ) -> StoreResult<T> {
        self.write(key, |entries| {
            let entry = entries.entry(key.to_vec()).or_insert_with(|| Entry {
                value: Value::Hash(HashMap::new()),
                expires_at: None,
            });
            let fields = entry.hash_mut()?;
            let out = f(fields);
            if fields.is_empty() {
                entries.remove(key);
            }
            Ok(out)
        })
    }
}

impl ValueStore for MemoryStore {
    fn exists(&self, key: &[u8]) -> StoreResult<bool> {
        self.read(key, |entry| Ok(entry.is_some()))
    }

    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.read(key, |entry| match entry.map(|entry| &entry.value) {
            Some(Value::String(data)) => Ok(Some(data.clone())),
            Some(Value::Hash(_)) => Err(StoreError::WrongType),
            None => Ok(None),
        })
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.write(key, |entries| {
            entries.insert(
                key.to_vec(),
                Entry {
                    value: Value::String(value.to_vec()),
                    expires_at: None,
                },
            );
            Ok(())
        })
    }

    fn set_with_ttl(&self, key: &[u8], value: &[u8], ttl: Duration) -> StoreResult<()> {
        if ttl.is_zero() {
            return Err(StoreError::InvalidExpireTime);
        }
        self.write(key, |entries| {
            entries.insert(
                key.to_vec(),
                Entry {
                    value: Value::String(value.to_vec()),
                    expires_at: Some(Instant::now() + ttl),
                },
            );
            Ok(())
        })
    }

    fn expire(&self, key: &[u8], ttl: Duration) -> StoreResult<bool> {
        self.write(key, |entries| {
            if ttl.is_zero() {
                // Expiring "now" deletes, as in Redis.
                return Ok(entries.remove(key).is_some());
            }
            match entries.get_mut(key) {
                Some(entry) => {
                    entry.expires_at = Some(Instant::now() + ttl);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn ttl(&self, key: &[u8]) -> StoreResult<TtlStatus> {
        let now = Instant::now();
        self.read(key, |entry| {
            Ok(match entry.map(|entry| entry.expires_at) {
                None => TtlStatus::Missing,
                Some(None) => TtlStatus::NoExpiry,
                Some(Some(deadline)) => TtlStatus::ExpiresIn(deadline.saturating_duration_since(now)),
            })
        })
    }

    fn delete(&self, keys: &[&[u8]]) -> StoreResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let mut removed = 0;
        for key in keys {
            if let Some(entry) = entries.remove(*key) {
                if !entry.is_expired(now) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    fn hset(&self, key: &[u8], field: &[u8], value: &[u8]) -> StoreResult<bool> {
        self.with_hash(key, |fields| fields.insert(field.to_vec(), value.to_vec()).is_none())
    }

    fn hset_multiple(&self, key: &[u8], pairs: &[(&[u8], &[u8])]) -> StoreResult<u64> {
        self.with_hash(key, |fields| {
            pairs
                .iter()
                .filter(|(field, value)| fields.insert(field.to_vec(), value.to_vec()).is_none())
                .count() as u64
        })
    }

    fn hset_nx(&self, key: &[u8], field: &[u8], value: &[u8]) -> StoreResult<bool> {
        self.with_hash(key, |fields| {
            if fields.contains_key(field) {
                return false;
            }
            fields.insert(field.to_vec(), value.to_vec());
            true
        })
    }

    fn hdel(&self, key: &[u8], names: &[&[u8]]) -> StoreResult<u64> {
        self.write(key, |entries| {
            let Some(entry) = entries.get_mut(key) else {
                return Ok(0);
            };
            let fields = entry.hash_mut()?;
            let removed = names.iter().filter(|name| fields.remove(**name).is_some()).count();
            if fields.is_empty() {
                entries.remove(key);
            }
            Ok(removed as u64)
        })
    }

    fn hget(&self, key: &[u8], field: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.read(key, |entry| match entry {
            Some(entry) => Ok(entry.hash()?.get(field).cloned()),
            None => Ok(None),
        })
    }

    fn hgetall(&self, key: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.read(key, |entry| match entry {
            Some(entry) => Ok(entry
                .hash()?
                .iter()
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect()),
            None => Ok(Vec::new()),
        })
    }

    fn hexists(&self, key: &[u8], field: &[u8]) -> StoreResult<bool> {
        self.read(key, |entry| match entry {
            Some(entry) => Ok(entry.hash()?.contains_key(field)),
            None => Ok(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn set_get_roundtrip() {
        let store = MemoryStore::new();
        store.set(b"alpha", b"value").unwrap();
        assert_eq!(store.get(b"alpha").unwrap(), Some(b"value".to_vec()));
        assert!(store.exists(b"alpha").unwrap());
        assert_eq!(store.get(b"missing").unwrap(), None);
    }

    #[test]
    fn expire_hides_value() {
        let store = MemoryStore::new();
        store.set(b"alpha", b"value").unwrap();
        assert!(store.expire(b"alpha", Duration::from_millis(1)).unwrap());
        thread::sleep(Duration::from_millis(5));
        assert!(!store.exists(b"alpha").unwrap());
        assert_eq!(store.ttl(b"alpha").unwrap(), TtlStatus::Missing);
        assert_eq!(store.purge_expired(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn expire_missing_key_is_false() {
        let store = MemoryStore::new();
        assert!(!store.expire(b"ghost", Duration::from_secs(1)).unwrap());
    }

    #[test]
    fn set_clears_previous_expiry() {
        let store = MemoryStore::new();
        store.set_with_ttl(b"alpha", b"1", Duration::from_secs(60)).unwrap();
        assert!(matches!(store.ttl(b"alpha").unwrap(), TtlStatus::ExpiresIn(_)));
        store.set(b"alpha", b"2").unwrap();
        assert_eq!(store.ttl(b"alpha").unwrap(), TtlStatus::NoExpiry);
    }

    #[test]
    fn zero_ttl_set_is_rejected() {
        let store = MemoryStore::new();
        let err = store.set_with_ttl(b"alpha", b"1", Duration::ZERO).unwrap_err();
        assert!(matches!(err, StoreError::InvalidExpireTime));
        assert!(!store.exists(b"alpha").unwrap());
    }

    #[test]
    fn delete_counts_live_keys() {
        let store = MemoryStore::new();
        store.set(b"a", b"1").unwrap();
        store.hset(b"b", b"f", b"1").unwrap();
        assert_eq!(store.delete(&[b"a", b"b", b"c"]).unwrap(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn hash_fields_lifecycle() {
        let store = MemoryStore::new();
        assert!(store.hset(b"h", b"f1", b"1").unwrap());
        assert!(!store.hset(b"h", b"f1", b"2").unwrap());
        assert_eq!(store.hset_multiple(b"h", &[(b"f1", b"3"), (b"f2", b"4")]).unwrap(), 1);
        assert!(!store.hset_nx(b"h", b"f2", b"5").unwrap());
        assert_eq!(store.hget(b"h", b"f2").unwrap(), Some(b"4".to_vec()));

        let mut all = store.hgetall(b"h").unwrap();
        all.sort();
        assert_eq!(all, vec![(b"f1".to_vec(), b"3".to_vec()), (b"f2".to_vec(), b"4".to_vec())]);

        assert_eq!(store.hdel(b"h", &[b"f1", b"zz"]).unwrap(), 1);
        assert!(store.exists(b"h").unwrap());
        assert_eq!(store.hdel(b"h", &[b"f2"]).unwrap(), 1);
        assert!(!store.exists(b"h").unwrap());
    }

    #[test]
    fn hash_write_keeps_expiry() {
        let store = MemoryStore::new();
        store.hset(b"h", b"f", b"1").unwrap();
        store.expire(b"h", Duration::from_secs(60)).unwrap();
        store.hset(b"h", b"g", b"2").unwrap();
        assert!(matches!(store.ttl(b"h").unwrap(), TtlStatus::ExpiresIn(_)));
    }

    #[test]
    fn type_mismatch_is_wrong_type() {
        let store = MemoryStore::new();
        store.set(b"s", b"1").unwrap();
        store.hset(b"h", b"f", b"1").unwrap();
        assert!(matches!(store.hset(b"s", b"f", b"1"), Err(StoreError::WrongType)));
        assert!(matches!(store.hget(b"s", b"f"), Err(StoreError::WrongType)));
        assert!(matches!(store.get(b"h"), Err(StoreError::WrongType)));
        // Failed write must not leave a stray hash behind.
        assert_eq!(store.get(b"s").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn expired_string_can_become_hash() {
        let store = MemoryStore::new();
        store.set_with_ttl(b"k", b"1", Duration::from_millis(1)).unwrap();
        thread::sleep(Duration::from_millis(5));
        assert!(store.hset(b"k", b"f", b"1").unwrap());
        assert_eq!(store.ttl(b"k").unwrap(), TtlStatus::NoExpiry);
    }
}
