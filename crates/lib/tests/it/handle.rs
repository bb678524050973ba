//! Counter, Set, Flag and Register handles bound through documents.

use std::collections::HashMap;

use riakmap::handle::{Handle, HandleError, HandleKind};
use riakmap::{Counter, Error, Flag, HandleSlot, MapDocument, Register, Set};

use crate::helpers::{stored, test_bucket, test_session};

#[derive(MapDocument, Default)]
struct Article {
    title: String,
    views: Option<Counter>,
    tags: Option<Set>,
    published: Option<Flag>,
    editor: Option<Register>,
}

fn article() -> Article {
    Article {
        title: "Hello".to_string(),
        ..Article::default()
    }
}

#[test]
fn test_set_binds_empty_slots_and_creates_crdts() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    let mut doc = article();
    bucket.set(&mut doc).key("article").run(&session).unwrap();

    assert!(doc.views.is_some());
    assert!(doc.tags.is_some());
    assert!(doc.published.is_some());
    assert!(doc.editor.is_some());

    let map = stored(&transport, "article");
    assert_eq!(map.counters["views"], 0);
    // The placeholder member is never exposed.
    assert!(map.sets.contains_key("tags"));

    let mut fetched = Article::default();
    bucket.get("article", &mut fetched).run(&session).unwrap();
    assert!(fetched.tags.handle().unwrap().value().is_empty());
}

#[test]
fn test_set_value_leaves_slots_empty() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    let doc = article();
    bucket.set_value(&doc).key("article").run(&session).unwrap();

    assert!(doc.views.is_none());
    assert_eq!(stored(&transport, "article").counters["views"], 0);
}

#[test]
fn test_counters_converge() {
    let (session, _) = test_session();
    let bucket = test_bucket();

    let mut doc = article();
    bucket.set(&mut doc).key("article").run(&session).unwrap();

    doc.views.handle_mut().unwrap().increase(1);
    doc.views.exec(&session).unwrap();
    assert_eq!(doc.views.handle().unwrap().value(), 1);

    let mut other = Article::default();
    bucket.get("article", &mut other).run(&session).unwrap();
    assert_eq!(other.views.handle().unwrap().value(), 1);

    other.views.handle_mut().unwrap().increase(3);
    other.views.exec(&session).unwrap();
    assert_eq!(other.views.handle().unwrap().value(), 4);

    doc.views.handle_mut().unwrap().increase(-2);
    doc.views.exec(&session).unwrap();
    assert_eq!(doc.views.handle().unwrap().value(), 2);
    assert_eq!(doc.views.handle().unwrap().pending(), 0);
}

#[test]
fn test_pending_counter_is_sent_with_the_document() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    let mut doc = article();
    bucket.set(&mut doc).key("article").run(&session).unwrap();

    doc.views.handle_mut().unwrap().increase(5);
    bucket.set_value(&doc).key("article").run(&session).unwrap();

    assert_eq!(stored(&transport, "article").counters["views"], 5);
}

#[test]
fn test_exec_after_set_resends_pending_changes() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    let mut doc = article();
    bucket.set(&mut doc).key("article").run(&session).unwrap();

    doc.views.handle_mut().unwrap().increase(5);
    bucket.set(&mut doc).key("article").run(&session).unwrap();
    assert_eq!(stored(&transport, "article").counters["views"], 5);
    assert_eq!(doc.views.handle().unwrap().pending(), 5);

    doc.views.exec(&session).unwrap();
    assert_eq!(stored(&transport, "article").counters["views"], 10);
    assert_eq!(doc.views.handle().unwrap().pending(), 0);
}

#[test]
fn test_fetched_set_adds_and_removes() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    bucket.set(&mut article()).key("article").run(&session).unwrap();

    let mut doc = Article::default();
    bucket.get("article", &mut doc).run(&session).unwrap();

    doc.tags
        .handle_mut()
        .unwrap()
        .add_string("rust")
        .add_string("riak");
    doc.tags.exec(&session).unwrap();
    assert_eq!(doc.tags.handle().unwrap().strings(), vec!["riak", "rust"]);

    doc.tags.handle_mut().unwrap().remove_string("riak");
    doc.tags.exec(&session).unwrap();
    assert_eq!(doc.tags.handle().unwrap().strings(), vec!["rust"]);

    let members = &stored(&transport, "article").sets["tags"];
    assert!(members.contains(&b"rust".to_vec()));
    assert!(!members.contains(&b"riak".to_vec()));
}

#[test]
fn test_set_removal_needs_a_fetched_context() {
    let (session, _) = test_session();
    let bucket = test_bucket();

    let mut doc = article();
    bucket.set(&mut doc).key("article").run(&session).unwrap();

    doc.tags.handle_mut().unwrap().remove_string("missing");
    let err = doc.tags.exec(&session).unwrap_err();
    assert!(err.is_transport_error(), "{err}");
}

#[test]
fn test_set_bound_by_store_can_add() {
    let (session, _) = test_session();
    let bucket = test_bucket();

    let mut doc = article();
    bucket.set(&mut doc).key("article").run(&session).unwrap();

    doc.tags.handle_mut().unwrap().add_string("new");
    doc.tags.exec(&session).unwrap();

    let mut fetched = Article::default();
    bucket.get("article", &mut fetched).run(&session).unwrap();
    assert!(fetched.tags.handle().unwrap().has_string("new"));
}

#[test]
fn test_flag_and_register_exec() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    let mut doc = article();
    bucket.set(&mut doc).key("article").run(&session).unwrap();

    doc.published.handle_mut().unwrap().set(true);
    doc.published.exec(&session).unwrap();
    doc.editor.handle_mut().unwrap().set_string("bob");
    doc.editor.exec(&session).unwrap();

    let map = stored(&transport, "article");
    assert!(map.flags["published"]);
    assert_eq!(map.registers["editor"], b"bob");
    assert_eq!(map.registers["title"], b"Hello");

    let mut fetched = Article::default();
    bucket.get("article", &mut fetched).run(&session).unwrap();
    assert!(fetched.published.handle().unwrap().value());
    assert_eq!(fetched.editor.handle().unwrap().to_string(), "bob");
}

#[test]
fn test_nil_slot() {
    let (session, _) = test_session();
    let mut slot: Option<Set> = None;

    let err = slot.exec(&session).unwrap_err();
    assert!(matches!(
        err,
        Error::Handle(HandleError::NilHandle {
            kind: HandleKind::Set
        })
    ));
    assert_eq!(err.to_string(), "Nil Set");

    let Error::Handle(handle_err) = &err else {
        panic!("expected a handle error, got {err:?}");
    };
    assert_eq!(handle_err.kind(), HandleKind::Set);
}

#[test]
fn test_unbound_handle() {
    let (session, _) = test_session();
    let mut slot = Some(Counter::new());
    slot.handle_mut().unwrap().increase(1);

    let err = slot.exec(&session).unwrap_err();
    assert!(matches!(
        err,
        Error::Handle(HandleError::UnboundHandle {
            kind: HandleKind::Counter
        })
    ));
}

#[test]
fn test_handle_bound_without_a_key_cannot_exec() {
    let (session, _) = test_session();
    let bucket = test_bucket();

    let mut doc = article();
    let outcome = bucket.set(&mut doc).run(&session).unwrap();
    assert!(!outcome.key.is_empty());

    let binding = doc.views.handle().unwrap().binding();
    assert!(binding.path.location.key.is_empty());
    assert_eq!(binding.name, "views");

    doc.views.handle_mut().unwrap().increase(1);
    let err = doc.views.exec(&session).unwrap_err();
    assert!(matches!(
        err,
        Error::Handle(HandleError::InvalidKey {
            kind: HandleKind::Counter,
            ..
        })
    ));
}

#[test]
fn test_handles_in_nested_documents() {
    #[derive(MapDocument, Default)]
    struct Stats {
        views: Option<Counter>,
    }

    #[derive(MapDocument, Default)]
    struct Page {
        stats: Stats,
    }

    let (session, transport) = test_session();
    let bucket = test_bucket();

    let mut page = Page::default();
    bucket.set(&mut page).key("page").run(&session).unwrap();

    let binding = page.stats.views.handle().unwrap().binding();
    assert_eq!(binding.path.segments, vec!["stats"]);
    assert_eq!(binding.path.location.key, "page");
    assert_eq!(binding.name, "views");

    page.stats.views.handle_mut().unwrap().increase(7);
    page.stats.views.exec(&session).unwrap();

    let map = stored(&transport, "page");
    assert_eq!(map.maps["stats"].counters["views"], 7);
    assert!(!map.counters.contains_key("views"));
    assert_eq!(page.stats.views.handle().unwrap().value(), 7);
}

#[test]
fn test_handles_in_map_values_bind_only_on_fetch() {
    #[derive(MapDocument, Default)]
    struct Scores {
        players: HashMap<String, Option<Counter>>,
    }

    let (session, transport) = test_session();
    let bucket = test_bucket();

    let mut scores = Scores {
        players: HashMap::from([("alice".to_string(), None)]),
    };
    bucket.set(&mut scores).key("scores").run(&session).unwrap();

    assert!(scores.players["alice"].is_none());
    assert_eq!(stored(&transport, "scores").maps["players"].counters["alice"], 0);

    let mut fetched = Scores::default();
    bucket.get("scores", &mut fetched).run(&session).unwrap();

    let slot = fetched.players.get_mut("alice").unwrap();
    slot.handle_mut().unwrap().increase(2);
    slot.exec(&session).unwrap();

    assert_eq!(stored(&transport, "scores").maps["players"].counters["alice"], 2);
}

#[test]
fn test_handles_serialize_as_plain_values() {
    #[derive(serde::Serialize)]
    struct Snapshot {
        views: Option<Counter>,
        tags: Option<Set>,
        published: Option<Flag>,
    }

    let (session, _) = test_session();
    let bucket = test_bucket();

    let mut doc = article();
    bucket.set(&mut doc).key("article").run(&session).unwrap();
    doc.views.handle_mut().unwrap().increase(3);
    doc.tags.handle_mut().unwrap().add_string("a");

    let snapshot = Snapshot {
        views: doc.views.clone(),
        tags: doc.tags.clone(),
        published: None,
    };
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(
        json,
        serde_json::json!({ "views": 3, "tags": [[97]], "published": null })
    );
}
