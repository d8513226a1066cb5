//! # Store Accessors
//!
//! The facade's two collaborators:
//!
//! - `ValueTemplate` turns typed keys and values into store commands. Keys
//!   go through `StoreKey`, values through JSON.
//! - `TextTemplate` decodes raw payloads into text with a configured codec.
//!
//! Neither validates arguments; that is the facade's job.

use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{JsonSerializer, Payload, TextCodec, Utf8Codec};
use crate::error::FacadeResult;
use crate::key::StoreKey;
use crate::store::{TtlStatus, ValueStore};

/// Typed accessor over a `ValueStore`.
pub struct ValueTemplate<S> {
    store: S,
    serializer: JsonSerializer,
}

impl<S: ValueStore> ValueTemplate<S> {
    pub fn new(store: S) -> Self {
        ValueTemplate {
            store,
            serializer: JsonSerializer,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Encodes a value with this template's serializer.
    pub fn serialize<V: Serialize + ?Sized>(&self, value: &V) -> FacadeResult<Payload> {
        self.serializer.serialize(value)
    }

    fn decode<V: DeserializeOwned>(&self, raw: Option<Vec<u8>>) -> FacadeResult<Option<V>> {
        raw.map(|bytes| self.serializer.deserialize(&bytes)).transpose()
    }

    pub fn has_key<Q: StoreKey + ?Sized>(&self, key: &Q) -> FacadeResult<bool> {
        Ok(self.store.exists(&key.key_bytes())?)
    }

    pub fn get<Q, V>(&self, key: &Q) -> FacadeResult<Option<V>>
    where
        Q: StoreKey + ?Sized,
        V: DeserializeOwned,
    {
        let raw = self.store.get(&key.key_bytes())?;
        self.decode(raw)
    }

    /// Writes a value; `ttl` of `None` stores it without expiry.
    pub fn set<Q: StoreKey + ?Sized>(&self, key: &Q, value: &Payload, ttl: Option<Duration>) -> FacadeResult<()> {
        let key = key.key_bytes();
        match ttl {
            Some(ttl) => self.store.set_with_ttl(&key, value.as_bytes(), ttl)?,
            None => self.store.set(&key, value.as_bytes())?,
        }
        Ok(())
    }

    pub fn expire<Q: StoreKey + ?Sized>(&self, key: &Q, ttl: Duration) -> FacadeResult<bool> {
        Ok(self.store.expire(&key.key_bytes(), ttl)?)
    }

    pub fn ttl<Q: StoreKey + ?Sized>(&self, key: &Q) -> FacadeResult<TtlStatus> {
        Ok(self.store.ttl(&key.key_bytes())?)
    }

    /// Deletes one key. Returns true when it existed.
    pub fn delete<Q: StoreKey + ?Sized>(&self, key: &Q) -> FacadeResult<bool> {
        Ok(self.store.delete(&[&key.key_bytes()])? > 0)
    }

    /// Deletes all `keys` in a single store call.
    pub fn delete_many<K: StoreKey>(&self, keys: &[K]) -> FacadeResult<u64> {
        let encoded: Vec<Cow<'_, [u8]>> = keys.iter().map(|key| key.key_bytes()).collect();
        let refs: Vec<&[u8]> = encoded.iter().map(|key| key.as_ref()).collect();
        Ok(self.store.delete(&refs)?)
    }

    pub fn hash_put<Q: StoreKey + ?Sized>(&self, key: &Q, field: &str, value: &Payload) -> FacadeResult<bool> {
        Ok(self
            .store
            .hset(&key.key_bytes(), field.as_bytes(), value.as_bytes())?)
    }

    pub fn hash_put_all<Q: StoreKey + ?Sized>(&self, key: &Q, entries: &[(&str, Payload)]) -> FacadeResult<u64> {
        let pairs: Vec<(&[u8], &[u8])> = entries
            .iter()
            .map(|(field, value)| (field.as_bytes(), value.as_bytes()))
            .collect();
        Ok(self.store.hset_multiple(&key.key_bytes(), &pairs)?)
    }

    pub fn hash_put_if_absent<Q: StoreKey + ?Sized>(
        &self,
        key: &Q,
        field: &str,
        value: &Payload,
    ) -> FacadeResult<bool> {
        Ok(self
            .store
            .hset_nx(&key.key_bytes(), field.as_bytes(), value.as_bytes())?)
    }

    pub fn hash_delete<Q: StoreKey + ?Sized>(&self, key: &Q, fields: &[&str]) -> FacadeResult<u64> {
        let names: Vec<&[u8]> = fields.iter().map(|field| field.as_bytes()).collect();
        Ok(self.store.hdel(&key.key_bytes(), &names)?)
    }

    pub fn hash_get<Q, V>(&self, key: &Q, field: &str) -> FacadeResult<Option<V>>
    where
        Q: StoreKey + ?Sized,
        V: DeserializeOwned,
    {
        let raw = self.store.hget(&key.key_bytes(), field.as_bytes())?;
        self.decode(raw)
    }

    /// Every field of the hash at `key`. Field names are read as UTF-8.
    pub fn hash_entries<Q, V>(&self, key: &Q) -> FacadeResult<HashMap<String, V>>
    where
        Q: StoreKey + ?Sized,
        V: DeserializeOwned,
    {
        self.store
            .hgetall(&key.key_bytes())?
            .into_iter()
            .map(|(field, value)| -> FacadeResult<(String, V)> {
                let field = String::from_utf8_lossy(&field).into_owned();
                Ok((field, self.serializer.deserialize(&value)?))
            })
            .collect()
    }

    pub fn hash_has_key<Q: StoreKey + ?Sized>(&self, key: &Q, field: &str) -> FacadeResult<bool> {
        Ok(self.store.hexists(&key.key_bytes(), field.as_bytes())?)
    }
}

/// Text-oriented accessor.
pub struct TextTemplate {
    codec: Box<dyn TextCodec>,
}

impl TextTemplate {
    /// Creates a text accessor using UTF-8.
    pub fn new() -> Self {
        Self::with_codec(Utf8Codec)
    }

    pub fn with_codec(codec: impl TextCodec + 'static) -> Self {
        TextTemplate {
            codec: Box::new(codec),
        }
    }

    /// Decodes a raw payload into text.
    pub fn deserialize(&self, bytes: &[u8]) -> String {
        self.codec.decode(bytes)
    }

    /// Encodes text into a raw payload.
    pub fn serialize(&self, text: &str) -> Vec<u8> {
        self.codec.encode(text)
    }
}

impl Default for TextTemplate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Latin1Codec;
    use crate::memory::MemoryStore;

    #[test]
    fn delete_many_issues_one_call_for_all_keys() {
        let template = ValueTemplate::new(MemoryStore::new());
        let one = template.serialize(&1).unwrap();
        template.set("a", &one, None).unwrap();
        template.set("b", &one, None).unwrap();
        assert_eq!(template.delete_many(&["a", "b", "c"]).unwrap(), 2);
        assert!(template.store().is_empty());
    }

    #[test]
    fn hash_entries_decode_every_field() {
        let template = ValueTemplate::new(MemoryStore::new());
        let entries = vec![
            ("x", template.serialize(&1.5f64).unwrap()),
            ("y", template.serialize(&-2.0f64).unwrap()),
        ];
        assert_eq!(template.hash_put_all(&7u32, &entries).unwrap(), 2);
        let all: HashMap<String, f64> = template.hash_entries(&7u32).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["x"], 1.5);
        assert_eq!(all["y"], -2.0);
    }

    #[test]
    fn text_template_uses_configured_codec() {
        assert_eq!(TextTemplate::new().deserialize(b"plain"), "plain");
        let latin1 = TextTemplate::with_codec(Latin1Codec);
        assert_eq!(latin1.deserialize(&[0xe9]), "é");
        assert_eq!(latin1.serialize("é"), vec![0xe9]);
    }
}
