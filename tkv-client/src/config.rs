//! # Client Configuration
//!
//! Purpose: Describe where the store lives and how the pool behaves.
//!
//! Configuration can be built in code, read from `TKV_*` environment
//! variables, or deserialized from JSON. Timeouts are expressed in
//! milliseconds at the serialization boundary.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{ClientError, ClientResult};

/// Default server address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:6379";

/// Configuration for the synchronous client and its pool.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address, e.g. "127.0.0.1:6379".
    pub addr: String,
    /// Maximum idle connections kept in the pool.
    pub max_idle: usize,
    /// Maximum total connections (idle + in-use).
    pub max_total: usize,
    /// Optional TCP read timeout.
    #[serde(rename = "read_timeout_ms", deserialize_with = "millis")]
    pub read_timeout: Option<Duration>,
    /// Optional TCP write timeout.
    #[serde(rename = "write_timeout_ms", deserialize_with = "millis")]
    pub write_timeout: Option<Duration>,
    /// Optional TCP connect timeout.
    #[serde(rename = "connect_timeout_ms", deserialize_with = "millis")]
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            addr: DEFAULT_ADDR.to_string(),
            max_idle: 8,
            max_total: 16,
            read_timeout: None,
            write_timeout: None,
            connect_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Creates a default configuration pointing at `addr`.
    pub fn new(addr: impl Into<String>) -> Self {
        ClientConfig {
            addr: addr.into(),
            ..ClientConfig::default()
        }
    }

    /// Reads configuration from environment variables.
    ///
    /// Reads:
    /// - `TKV_ADDR` - Server address (defaults to "127.0.0.1:6379")
    /// - `TKV_MAX_IDLE`, `TKV_MAX_TOTAL` - Pool bounds
    /// - `TKV_READ_TIMEOUT_MS`, `TKV_WRITE_TIMEOUT_MS`, `TKV_CONNECT_TIMEOUT_MS`
    ///
    /// Unset variables keep their defaults; malformed numbers are an error.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Parses configuration from a JSON document. Missing fields keep defaults.
    pub fn from_json(raw: &str) -> ClientResult<Self> {
        serde_json::from_str(raw).map_err(|err| ClientError::Config(err.to_string()))
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClientConfig::default();
        if let Some(addr) = lookup("TKV_ADDR") {
            config.addr = addr;
        }
        if let Some(value) = parse_var(&lookup, "TKV_MAX_IDLE")? {
            config.max_idle = value as usize;
        }
        if let Some(value) = parse_var(&lookup, "TKV_MAX_TOTAL")? {
            config.max_total = value as usize;
        }
        if let Some(ms) = parse_var(&lookup, "TKV_READ_TIMEOUT_MS")? {
            config.read_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(ms) = parse_var(&lookup, "TKV_WRITE_TIMEOUT_MS")? {
            config.write_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(ms) = parse_var(&lookup, "TKV_CONNECT_TIMEOUT_MS")? {
            config.connect_timeout = Some(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

fn parse_var<F>(lookup: &F, name: &str) -> ClientResult<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClientError::Config(format!("{name} must be an unsigned integer, got {raw:?}"))),
        None => Ok(None),
    }
}

fn millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn env_overrides_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("TKV_ADDR", "10.0.0.1:7000"),
            ("TKV_MAX_TOTAL", "4"),
            ("TKV_READ_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.addr, "10.0.0.1:7000");
        assert_eq!(config.max_total, 4);
        assert_eq!(config.max_idle, 8);
        assert_eq!(config.read_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.connect_timeout, None);
    }

    #[test]
    fn env_rejects_malformed_numbers() {
        let err = ClientConfig::from_lookup(lookup_from(&[("TKV_MAX_IDLE", "lots")])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn json_keeps_missing_fields_at_default() {
        let config = ClientConfig::from_json(r#"{"addr":"127.0.0.1:6380","connect_timeout_ms":100}"#).unwrap();
        assert_eq!(config.addr, "127.0.0.1:6380");
        assert_eq!(config.max_total, 16);
        assert_eq!(config.connect_timeout, Some(Duration::from_millis(100)));
        assert_eq!(config.write_timeout, None);
    }

    #[test]
    fn json_reports_bad_documents() {
        assert!(matches!(
            ClientConfig::from_json("{\"max_idle\":\"x\"}"),
            Err(ClientError::Config(_))
        ));
    }
}
