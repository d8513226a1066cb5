//! # Facade Demo
//!
//! Purpose: Exercise the facade end to end against a running server.
//!
//! Connection settings come from `TKV_*` environment variables (see
//! `ClientConfig::from_env`); logging follows `RUST_LOG`. Pass `--memory` to
//! run against the in-process store instead of a server.

use std::collections::HashMap;
use std::env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tkv_facade::{ClientConfig, KVClient, KvFacade, MemoryStore, StoreKey, ValueStore};

#[derive(Debug, Serialize, Deserialize)]
struct Session {
    user: String,
    roles: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if env::args().skip(1).any(|arg| arg == "--memory") {
        info!("running against in-process store");
        let kv: KvFacade<String, _> = KvFacade::from_store(MemoryStore::new());
        return run(&kv);
    }

    let config = ClientConfig::from_env().context("reading TKV_* configuration")?;
    info!(addr = %config.addr, "connecting");
    let kv: KvFacade<String, _> = KvFacade::connect(config).context("connecting to store")?;
    check_server(kv.values().store())?;
    run(&kv)
}

/// Fails early when the server is unreachable, then logs its version.
fn check_server(client: &KVClient) -> Result<()> {
    let pong = client.ping(None).context("pinging store")?;
    let server_info = client.info().context("reading server info")?;
    let version = String::from_utf8_lossy(&server_info)
        .lines()
        .find_map(|line| line.strip_prefix("redis_version:").map(str::to_owned))
        .unwrap_or_else(|| "unknown".to_owned());
    info!(reply = %String::from_utf8_lossy(&pong), %version, "store reachable");
    Ok(())
}

fn run<K, S>(kv: &KvFacade<K, S>) -> Result<()>
where
    K: StoreKey + std::borrow::Borrow<str>,
    S: ValueStore,
{
    let session = Session {
        user: "ada".into(),
        roles: vec!["admin".into()],
    };
    kv.set_with_ttl("demo:session", &session, 60)?;
    let loaded: Option<Session> = kv.get("demo:session")?;
    let ttl = kv.ttl("demo:session")?;
    info!(?loaded, ?ttl, "string round trip");

    let fields = HashMap::from([("visits".to_string(), 1u32), ("likes".to_string(), 7)]);
    kv.hset_all_with_ttl("demo:stats", &fields, 60)?;
    let first = kv.hset_absent("demo:stats", "visits", &100u32)?;
    let stats: HashMap<String, u32> = kv.hget_all("demo:stats")?;
    info!(?stats, overwritten = first, "hash round trip");

    let removed = kv.hdel("demo:stats", &["likes"])?;
    let has_likes = kv.has_field("demo:stats", "likes")?;
    info!(removed, has_likes, "field removed");

    kv.remove("demo:session")?;
    kv.delete_key("demo:stats")?;
    let session_left = kv.exists("demo:session")?;
    let stats_left = kv.has_key("demo:stats")?;
    info!(session_left, stats_left, "cleanup done");
    info!(text = %kv.decode_text(b"bye"), "decoded");
    Ok(())
}
