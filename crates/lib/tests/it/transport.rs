//! Sessions, configuration and the transport boundary.

use std::sync::Arc;

use riakmap::transport::{
    Command, InMemoryTransport, ReadOptions, Response, Transport, TransportError, WriteOptions,
};
use riakmap::{Error, MapDocument, Session, SessionConfig};

use crate::helpers::{location, test_bucket, test_session};

#[derive(MapDocument, Default, Debug, PartialEq)]
struct Setting {
    value: String,
}

struct Offline;

impl Transport for Offline {
    fn execute(&self, _command: Command) -> Result<Response, TransportError> {
        Err(TransportError::Connection {
            reason: "connection refused".to_string(),
        })
    }
}

struct AlwaysDelete;

impl Transport for AlwaysDelete {
    fn execute(&self, _command: Command) -> Result<Response, TransportError> {
        Ok(Response::Delete)
    }
}

#[test]
fn test_config_defaults_fill_unset_options() {
    let transport = Arc::new(InMemoryTransport::new());
    let config = SessionConfig::from_json(
        r#"{ "read": { "r": 2 }, "write": { "w": 3, "pw": 1 } }"#,
    )
    .unwrap();
    let session = Session::from_arc(transport.clone()).with_config(config);
    let bucket = test_bucket();

    let setting = Setting {
        value: "on".to_string(),
    };
    bucket
        .set_value(&setting)
        .key("mode")
        .with_w(1)
        .run(&session)
        .unwrap();
    bucket
        .get("mode", &mut Setting::default())
        .run(&session)
        .unwrap();

    let commands = transport.commands();
    let Command::UpdateMap(update) = &commands[0] else {
        panic!("expected an update, got {:?}", commands[0]);
    };
    assert_eq!(
        update.options,
        WriteOptions {
            pw: Some(1),
            dw: None,
            w: Some(1),
        }
    );
    let Command::FetchMap(fetch) = &commands[1] else {
        panic!("expected a fetch, got {:?}", commands[1]);
    };
    assert_eq!(fetch.options, ReadOptions { pr: None, r: Some(2) });
}

#[test]
fn test_invalid_config_is_a_config_error() {
    let err = SessionConfig::from_json(r#"{ "write": { "w": "all" } }"#).unwrap_err();
    assert!(err.is_config_error());
    assert_eq!(err.module(), "config");
}

#[test]
fn test_transport_errors_pass_through_unchanged() {
    let session = Session::new(Offline);
    let err = test_bucket()
        .set_value(&Setting::default())
        .key("mode")
        .run(&session)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Transport(TransportError::Connection { ref reason }) if reason == "connection refused"
    ));
    assert_eq!(err.module(), "transport");
}

#[test]
fn test_mismatched_response_is_reported() {
    let session = Session::new(AlwaysDelete);
    let err = test_bucket()
        .get("mode", &mut Setting::default())
        .run(&session)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Transport(ref transport) if transport.is_unexpected_response()
    ));
}

#[test]
fn test_in_memory_store_survives_json() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    let setting = Setting {
        value: "saved".to_string(),
    };
    bucket.set_value(&setting).key("mode").run(&session).unwrap();

    let json = transport.to_json().unwrap();
    let restored = InMemoryTransport::from_json(&json).unwrap();
    assert_eq!(restored.stored(&location("mode")), transport.stored(&location("mode")));

    let session = Session::new(restored);
    let mut fetched = Setting::default();
    let outcome = bucket.get("mode", &mut fetched).run(&session).unwrap();

    assert_eq!(fetched, setting);
    assert_eq!(outcome.context, 1u64.to_be_bytes().to_vec());
}

#[test]
fn test_sessions_share_the_transport() {
    let (session, transport) = test_session();
    let clone = session.clone();
    let bucket = test_bucket();

    bucket
        .set_value(&Setting::default())
        .key("a")
        .run(&clone)
        .unwrap();
    bucket.get("a", &mut Setting::default()).run(&session).unwrap();

    assert_eq!(transport.take_commands().len(), 2);

    bucket.delete("a").run(&session).unwrap();
    let commands = transport.commands();
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], Command::Delete(_)));
}
