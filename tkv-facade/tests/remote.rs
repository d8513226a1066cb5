mod common;

use std::collections::HashMap;

use common::{array, bulk, error, int, nil, ok, ScriptedServer};
use tkv_facade::{FacadeError, StoreError, TtlStatus};

#[test]
fn set_without_ttl_sends_plain_set() {
    let server = ScriptedServer::start(vec![ok(), ok()]);
    let kv = server.facade();
    kv.set("k", &"v").unwrap();
    kv.set_with_ttl("k", &"v", 0).unwrap();
    assert_eq!(server.received(), vec![r#"SET k "v""#, r#"SET k "v""#]);
}

#[test]
fn set_with_ttl_sends_ex_seconds() {
    let server = ScriptedServer::start(vec![ok(), int(30)]);
    let kv = server.facade();
    kv.set_with_ttl("k", &7u8, 30).unwrap();
    assert!(matches!(kv.ttl("k").unwrap(), TtlStatus::ExpiresIn(_)));
    assert_eq!(server.received(), vec!["SET k 7 EX 30", "TTL k"]);
}

#[test]
fn get_decodes_json_payload() {
    let server = ScriptedServer::start(vec![bulk(r#"{"a":[1,2]}"#), nil()]);
    let kv = server.facade();
    let hit: Option<HashMap<String, Vec<u8>>> = kv.get("k").unwrap();
    assert_eq!(hit, Some(HashMap::from([("a".to_string(), vec![1, 2])])));
    assert_eq!(kv.get::<_, u8>("gone").unwrap(), None);
    assert_eq!(server.received(), vec!["GET k", "GET gone"]);
}

#[test]
fn remove_probes_before_deleting() {
    let server = ScriptedServer::start(vec![int(1), int(1), int(0)]);
    let kv = server.facade();
    assert!(kv.remove("k").unwrap());
    assert!(!kv.remove("k").unwrap());
    assert_eq!(server.received(), vec!["EXISTS k", "DEL k", "EXISTS k"]);
}

#[test]
fn remove_all_uses_single_del() {
    let server = ScriptedServer::start(vec![int(2)]);
    let kv = server.facade();
    let removed = kv.remove_all(&["a".to_string(), "b".to_string()]).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(server.received(), vec!["DEL a b"]);
}

#[test]
fn hash_ttl_only_sent_when_positive() {
    let server = ScriptedServer::start(vec![int(1), int(0), int(1)]);
    let kv = server.facade();
    kv.hset_with_ttl("h", "f", &1, 0).unwrap();
    kv.hset_with_ttl("h", "f", &2, 10).unwrap();
    assert_eq!(server.received(), vec!["HSET h f 1", "HSET h f 2", "EXPIRE h 10"]);
}

#[test]
fn hset_all_then_expire() {
    let server = ScriptedServer::start(vec![int(1), int(1)]);
    let kv = server.facade();
    let entries = HashMap::from([("a".to_string(), true)]);
    kv.hset_all_with_ttl("h", &entries, 5).unwrap();
    assert_eq!(server.received(), vec!["HSET h a true", "EXPIRE h 5"]);
}

#[test]
fn hash_reads_and_deletes() {
    let server = ScriptedServer::start(vec![
        int(0),
        bulk("\"x\""),
        array(&["a", "1", "b", "2"]),
        int(1),
        int(0),
        int(1),
        int(1),
    ]);
    let kv = server.facade();

    assert!(!kv.hset_absent("h", "f", &"y").unwrap());
    assert_eq!(kv.hget::<_, String>("h", "f").unwrap().as_deref(), Some("x"));
    let all: HashMap<String, u8> = kv.hget_all("h").unwrap();
    assert_eq!(all, HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]));
    assert_eq!(kv.hdel("h", &["a", "zz"]).unwrap(), 1);
    assert!(!kv.has_field("h", "zz").unwrap());
    assert!(kv.has_key("h").unwrap());
    assert!(kv.delete_key("h").unwrap());

    assert_eq!(
        server.received(),
        vec![
            r#"HSETNX h f "y""#,
            "HGET h f",
            "HGETALL h",
            "HDEL h a zz",
            "HEXISTS h zz",
            "EXISTS h",
            "DEL h",
        ]
    );
}

#[test]
fn invalid_arguments_never_touch_the_network() {
    let server = ScriptedServer::start(Vec::new());
    let kv = server.facade();
    let missing: Option<u8> = None;

    assert!(kv.set("k", &missing).unwrap_err().is_invalid_argument());
    assert!(kv.set("k", &f64::NAN).unwrap_err().is_invalid_argument());
    assert!(kv.hdel("h", &[]).unwrap_err().is_invalid_argument());
    assert_eq!(kv.remove_all(&[]).unwrap(), 0);
    kv.hset_all("h", &HashMap::<String, u8>::new()).unwrap();
    assert_eq!(kv.decode_text(b"offline"), "offline");

    assert!(server.received().is_empty());
    assert_eq!(kv.values().store().idle_connections(), 0);
}

#[test]
fn empty_key_and_field_are_sent_as_is() {
    let server = ScriptedServer::start(vec![ok(), int(1)]);
    let kv = server.facade();
    kv.set("", &1).unwrap();
    kv.hset("h", "", &2).unwrap();
    assert_eq!(server.received(), vec!["SET  1", "HSET h  2"]);
}

#[test]
fn server_errors_pass_through() {
    let server = ScriptedServer::start(vec![error(
        "WRONGTYPE Operation against a key holding the wrong kind of value",
    )]);
    let kv = server.facade();
    let err = kv.hget::<_, u8>("s", "f").unwrap_err();
    assert!(matches!(err, FacadeError::Store(StoreError::Client(_))));
    assert!(err.to_string().contains("WRONGTYPE"));
}
