//! # Synchronous Client API
//!
//! Purpose: Expose a compact, blocking API for issuing Redis-compatible
//! string, key and hash commands over RESP2.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `KVClient` hides pooling and protocol details.
//! 2. **Borrow-Friendly API**: Accept `&[u8]` to avoid unnecessary copies.
//! 3. **Fail Fast**: Protocol violations surface immediately as errors.
//! 4. **One Command Per Call**: No hidden pipelining, batching or retries.

use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::pool::ConnectionPool;
use crate::resp::RespValue;

/// TTL state returned by the server, mirroring Redis semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientTtl {
    /// Key is missing or already expired.
    Missing,
    /// Key exists without expiration.
    NoExpiry,
    /// Key expires after the provided duration.
    ExpiresIn(Duration),
}

/// Synchronous client with connection pooling.
///
/// Each call acquires a connection, executes one command, and returns the
/// connection to the pool. The client is `Send + Sync` and meant to be shared.
pub struct KVClient {
    pool: ConnectionPool,
}

impl KVClient {
    /// Creates a client with default configuration.
    pub fn connect(addr: impl Into<String>) -> ClientResult<Self> {
        Self::with_config(ClientConfig::new(addr))
    }

    /// Creates a client with a custom configuration.
    pub fn with_config(config: ClientConfig) -> ClientResult<Self> {
        Ok(KVClient {
            pool: ConnectionPool::new(config)?,
        })
    }

    /// Creates a client configured from `TKV_*` environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Number of idle pooled connections.
    pub fn idle_connections(&self) -> usize {
        self.pool.idle_count()
    }

    fn exec(&self, args: &[&[u8]]) -> ClientResult<RespValue> {
        let mut conn = self.pool.acquire()?;
        conn.exec(args)?.into_result()
    }

    fn exec_ok(&self, args: &[&[u8]], command: &'static str) -> ClientResult<()> {
        match self.exec(args)? {
            RespValue::Simple(_) => Ok(()),
            _ => Err(ClientError::UnexpectedResponse { command }),
        }
    }

    fn exec_integer(&self, args: &[&[u8]], command: &'static str) -> ClientResult<i64> {
        match self.exec(args)? {
            RespValue::Integer(value) => Ok(value),
            _ => Err(ClientError::UnexpectedResponse { command }),
        }
    }

    fn exec_bulk(&self, args: &[&[u8]], command: &'static str) -> ClientResult<Option<Vec<u8>>> {
        match self.exec(args)? {
            RespValue::Bulk(data) => Ok(data),
            _ => Err(ClientError::UnexpectedResponse { command }),
        }
    }

    /// Pings the server. Returns the raw response payload.
    pub fn ping(&self, payload: Option<&[u8]>) -> ClientResult<Vec<u8>> {
        let response = match payload {
            Some(data) => self.exec(&[b"PING", data])?,
            None => self.exec(&[b"PING"])?,
        };
        match response {
            RespValue::Simple(text) => Ok(text),
            RespValue::Bulk(Some(data)) => Ok(data),
            _ => Err(ClientError::UnexpectedResponse { command: "PING" }),
        }
    }

    /// Fetches server INFO output.
    pub fn info(&self) -> ClientResult<Vec<u8>> {
        self.exec_bulk(&[b"INFO"], "INFO")?
            .ok_or(ClientError::UnexpectedResponse { command: "INFO" })
    }

    /// Fetches a value by key.
    ///
    /// Returns `Ok(None)` when the key is missing.
    pub fn get(&self, key: &[u8]) -> ClientResult<Option<Vec<u8>>> {
        self.exec_bulk(&[b"GET", key], "GET")
    }

    /// Sets a value for a key without expiration.
    pub fn set(&self, key: &[u8], value: &[u8]) -> ClientResult<()> {
        self.exec_ok(&[b"SET", key, value], "SET")
    }

    /// Sets a value and attaches an expiration in whole seconds.
    pub fn set_with_ttl(&self, key: &[u8], value: &[u8], ttl: Duration) -> ClientResult<()> {
        let seconds = ttl.as_secs().to_string();
        self.exec_ok(&[b"SET", key, value, b"EX", seconds.as_bytes()], "SET")
    }

    /// Returns true when the key exists.
    pub fn exists(&self, key: &[u8]) -> ClientResult<bool> {
        Ok(self.exec_integer(&[b"EXISTS", key], "EXISTS")? > 0)
    }

    /// Deletes a key. Returns true when a key was removed.
    pub fn delete(&self, key: &[u8]) -> ClientResult<bool> {
        Ok(self.delete_many(&[key])? > 0)
    }

    /// Deletes several keys with one `DEL`. Returns how many were removed.
    pub fn delete_many(&self, keys: &[&[u8]]) -> ClientResult<u64> {
        let mut args: Vec<&[u8]> = Vec::with_capacity(keys.len() + 1);
        args.push(b"DEL");
        args.extend_from_slice(keys);
        count(self.exec_integer(&args, "DEL")?)
    }

    /// Sets a time-to-live on a key. Returns true when the TTL was set.
    pub fn expire(&self, key: &[u8], ttl: Duration) -> ClientResult<bool> {
        let seconds = ttl.as_secs().to_string();
        Ok(self.exec_integer(&[b"EXPIRE", key, seconds.as_bytes()], "EXPIRE")? == 1)
    }

    /// Returns TTL status for a key.
    pub fn ttl(&self, key: &[u8]) -> ClientResult<ClientTtl> {
        match self.exec_integer(&[b"TTL", key], "TTL")? {
            -2 => Ok(ClientTtl::Missing),
            -1 => Ok(ClientTtl::NoExpiry),
            value if value >= 0 => Ok(ClientTtl::ExpiresIn(Duration::from_secs(value as u64))),
            _ => Err(ClientError::UnexpectedResponse { command: "TTL" }),
        }
    }

    /// Sets one hash field. Returns true when the field was newly created.
    pub fn hset(&self, key: &[u8], field: &[u8], value: &[u8]) -> ClientResult<bool> {
        Ok(self.exec_integer(&[b"HSET", key, field, value], "HSET")? == 1)
    }

    /// Sets several hash fields with one `HSET`. Returns how many were new.
    pub fn hset_multiple(&self, key: &[u8], entries: &[(&[u8], &[u8])]) -> ClientResult<u64> {
        let mut args: Vec<&[u8]> = Vec::with_capacity(entries.len() * 2 + 2);
        args.push(b"HSET");
        args.push(key);
        for &(field, value) in entries {
            args.push(field);
            args.push(value);
        }
        count(self.exec_integer(&args, "HSET")?)
    }

    /// Sets a hash field only when it does not exist yet.
    pub fn hset_nx(&self, key: &[u8], field: &[u8], value: &[u8]) -> ClientResult<bool> {
        Ok(self.exec_integer(&[b"HSETNX", key, field, value], "HSETNX")? == 1)
    }

    /// Removes hash fields. Returns how many existed.
    pub fn hdel(&self, key: &[u8], fields: &[&[u8]]) -> ClientResult<u64> {
        let mut args: Vec<&[u8]> = Vec::with_capacity(fields.len() + 2);
        args.push(b"HDEL");
        args.push(key);
        args.extend_from_slice(fields);
        count(self.exec_integer(&args, "HDEL")?)
    }

    /// Fetches one hash field.
    pub fn hget(&self, key: &[u8], field: &[u8]) -> ClientResult<Option<Vec<u8>>> {
        self.exec_bulk(&[b"HGET", key, field], "HGET")
    }

    /// Fetches every field and value of a hash, in server order.
    pub fn hgetall(&self, key: &[u8]) -> ClientResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let items = match self.exec(&[b"HGETALL", key])? {
            RespValue::Array(Some(items)) => items,
            RespValue::Array(None) => return Ok(Vec::new()),
            _ => return Err(ClientError::UnexpectedResponse { command: "HGETALL" }),
        };
        if items.len() % 2 != 0 {
            return Err(ClientError::Protocol("HGETALL reply has odd length"));
        }

        let mut pairs = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
            match (field, value) {
                (RespValue::Bulk(Some(field)), RespValue::Bulk(Some(value))) => pairs.push((field, value)),
                _ => return Err(ClientError::UnexpectedResponse { command: "HGETALL" }),
            }
        }
        Ok(pairs)
    }

    /// Returns true when the hash field exists.
    pub fn hexists(&self, key: &[u8], field: &[u8]) -> ClientResult<bool> {
        Ok(self.exec_integer(&[b"HEXISTS", key, field], "HEXISTS")? == 1)
    }
}

fn count(value: i64) -> ClientResult<u64> {
    u64::try_from(value).map_err(|_| ClientError::Protocol("negative count"))
}
