//! The query builder: commands, middleware and their error paths.

use std::sync::{Arc, Mutex};

use riakmap::command::{ClientError, Middleware, Next, Outcome, Request, RequestKind};
use riakmap::transport::{Command, ReadOptions, WriteOptions};
use riakmap::{Bucket, Error, MapDocument, OperationNode};

use crate::helpers::{BUCKET, BUCKET_TYPE, location, stored, test_bucket, test_session};

#[derive(MapDocument, Default, Debug, PartialEq)]
struct Note {
    title: String,
    body: String,
}

fn note() -> Note {
    Note {
        title: "todo".to_string(),
        body: "write tests".to_string(),
    }
}

#[test]
fn test_set_without_key_generates_one() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    let first = bucket.set_value(&note()).run(&session).unwrap();
    let second = bucket.set_value(&note()).run(&session).unwrap();

    assert!(!first.key.is_empty());
    assert_ne!(first.key, second.key);
    assert_eq!(transport.len(), 2);

    let mut fetched = Note::default();
    let outcome = bucket.get(first.key.clone(), &mut fetched).run(&session).unwrap();
    assert_eq!(fetched, note());
    assert_eq!(outcome.key, first.key);
    assert!(!outcome.context.is_empty());
}

#[test]
fn test_set_with_key_reports_it() {
    let (session, _) = test_session();
    let outcome = test_bucket()
        .set_value(&note())
        .key("fixed")
        .run(&session)
        .unwrap();
    assert_eq!(outcome.key, "fixed");
}

#[test]
fn test_get_missing_document() {
    let (session, _) = test_session();
    let mut fetched = note();

    let err = test_bucket()
        .get("nothing", &mut fetched)
        .run(&session)
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.module(), "command");
    assert_eq!(err.to_string(), format!("Not found: {BUCKET_TYPE}/{BUCKET}/nothing"));
    assert_eq!(fetched, note());
}

#[test]
fn test_get_and_delete_need_a_key() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    let err = bucket
        .get("", &mut Note::default())
        .run(&session)
        .unwrap_err();
    assert!(matches!(err, Error::Client(ClientError::MissingKey { .. })));

    let err = bucket.delete("").run(&session).unwrap_err();
    assert!(matches!(err, Error::Client(ref client) if client.is_missing_key()));

    assert!(transport.commands().is_empty());
}

#[test]
fn test_delete_removes_the_document() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    bucket.set_value(&note()).key("gone").run(&session).unwrap();
    let outcome = bucket.delete("gone").run(&session).unwrap();

    assert_eq!(outcome.key, "gone");
    assert!(transport.stored(&location("gone")).is_none());
    assert!(
        bucket
            .get("gone", &mut Note::default())
            .run(&session)
            .unwrap_err()
            .is_not_found()
    );
}

#[test]
fn test_map_operation_sends_the_tree_unfiltered() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    let mut tree = OperationNode::new();
    tree.set_register("title", "raw")
        .increment_counter("hits", 2)
        .add_to_set("tags", "a")
        .set_flag("done", true);
    tree.map("meta").set_register("source", "import");

    let outcome = bucket.map_operation(tree).key("raw").run(&session).unwrap();
    assert_eq!(outcome.key, "raw");

    let map = stored(&transport, "raw");
    assert_eq!(map.registers["title"], b"raw");
    assert_eq!(map.counters["hits"], 2);
    assert_eq!(map.sets["tags"], vec![b"a".to_vec()]);
    assert!(map.flags["done"]);
    assert_eq!(map.maps["meta"].registers["source"], b"import");

    let mut fetched = Note::default();
    bucket.get("raw", &mut fetched).run(&session).unwrap();
    assert_eq!(fetched.title, "raw");
}

#[test]
fn test_map_operation_generates_a_key() {
    let (session, transport) = test_session();

    let mut tree = OperationNode::new();
    tree.increment_counter("hits", 1);
    let outcome = test_bucket().map_operation(tree).run(&session).unwrap();

    assert!(!outcome.key.is_empty());
    assert_eq!(stored(&transport, &outcome.key).counters["hits"], 1);
}

#[test]
fn test_map_operation_removal_with_context() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    let mut add = OperationNode::new();
    add.add_to_set("tags", "a").add_to_set("tags", "b");
    bucket.map_operation(add).key("tags").run(&session).unwrap();

    let mut remove = OperationNode::new();
    remove.remove_from_set("tags", "a");
    let err = bucket
        .map_operation(remove.clone())
        .key("tags")
        .run(&session)
        .unwrap_err();
    assert!(err.is_transport_error());

    let mut fetched = Note::default();
    let context = bucket.get("tags", &mut fetched).run(&session).unwrap().context;
    bucket
        .map_operation(remove)
        .key("tags")
        .context(context)
        .run(&session)
        .unwrap();

    assert_eq!(stored(&transport, "tags").sets["tags"], vec![b"b".to_vec()]);
}

#[test]
fn test_options_are_forwarded() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    bucket
        .set_value(&note())
        .key("opts")
        .with_w(2)
        .with_dw(1)
        .run(&session)
        .unwrap();
    bucket
        .get("opts", &mut Note::default())
        .with_r(3)
        .with_pr(1)
        .run(&session)
        .unwrap();

    let commands = transport.commands();
    let Command::UpdateMap(update) = &commands[0] else {
        panic!("expected an update, got {:?}", commands[0]);
    };
    assert_eq!(
        update.options,
        WriteOptions {
            pw: None,
            dw: Some(1),
            w: Some(2),
        }
    );
    let Command::FetchMap(fetch) = &commands[1] else {
        panic!("expected a fetch, got {:?}", commands[1]);
    };
    assert_eq!(
        fetch.options,
        ReadOptions {
            pr: Some(1),
            r: Some(3),
        }
    );
}

fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> Middleware {
    let log = log.clone();
    Arc::new(move |request: &Request, next: Next<'_>| {
        log.lock()
            .unwrap()
            .push(format!("{name} before {:?}", request.kind));
        let outcome = next.run();
        log.lock().unwrap().push(format!("{name} after"));
        outcome
    })
}

#[test]
fn test_middleware_runs_in_registration_order() {
    let (session, _) = test_session();
    let log = Arc::new(Mutex::new(Vec::new()));

    let bucket = Bucket::with_middleware(
        BUCKET,
        BUCKET_TYPE,
        vec![recorder(&log, "outer"), recorder(&log, "inner")],
    );
    bucket.set_value(&note()).key("logged").run(&session).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "outer before Set",
            "inner before Set",
            "inner after",
            "outer after",
        ]
    );
}

#[test]
fn test_middleware_sees_every_request_kind() {
    let (session, _) = test_session();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let seen_by_middleware = seen.clone();
    let observe: Middleware = Arc::new(move |request: &Request, next: Next<'_>| {
        seen_by_middleware
            .lock()
            .unwrap()
            .push((request.kind, request.key.clone()));
        next.run()
    });
    let bucket = Bucket::with_middleware(BUCKET, BUCKET_TYPE, vec![observe]);

    bucket.set_value(&note()).run(&session).unwrap();
    bucket.set_value(&note()).key("k").run(&session).unwrap();
    bucket.get("k", &mut Note::default()).run(&session).unwrap();
    bucket
        .map_operation(OperationNode::new())
        .key("k")
        .run(&session)
        .unwrap();
    bucket.delete("k").run(&session).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (RequestKind::Set, String::new()),
            (RequestKind::Set, "k".to_string()),
            (RequestKind::Get, "k".to_string()),
            (RequestKind::MapOperation, "k".to_string()),
            (RequestKind::Delete, "k".to_string()),
        ]
    );
}

#[test]
fn test_middleware_can_short_circuit() {
    let (session, transport) = test_session();

    let cached: Middleware = Arc::new(|request: &Request, _next: Next<'_>| {
        Ok(Outcome {
            key: format!("cached-{}", request.key),
            context: Vec::new(),
        })
    });
    let bucket = Bucket::with_middleware(BUCKET, BUCKET_TYPE, vec![cached]);

    let mut fetched = Note::default();
    let outcome = bucket.get("k", &mut fetched).run(&session).unwrap();

    assert_eq!(outcome.key, "cached-k");
    assert_eq!(fetched, Note::default());
    assert!(transport.commands().is_empty());
}

#[test]
fn test_middleware_sees_errors() {
    let (session, _) = test_session();
    let failures = Arc::new(Mutex::new(0));

    let counted = failures.clone();
    let count_failures: Middleware = Arc::new(move |_request: &Request, next: Next<'_>| {
        let outcome = next.run();
        if outcome.is_err() {
            *counted.lock().unwrap() += 1;
        }
        outcome
    });
    let bucket = Bucket::with_middleware(BUCKET, BUCKET_TYPE, vec![count_failures]);

    let err = bucket
        .get("missing", &mut Note::default())
        .run(&session)
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(*failures.lock().unwrap(), 1);
}
