//! Field filters applied while storing documents.

use riakmap::{Counter, FieldFilter, MapDocument, OperationNode};

use crate::helpers::{stored, test_bucket, test_session};

#[derive(MapDocument, Default, Debug, PartialEq)]
struct Item {
    #[riak(rename = "A")]
    a: String,
    #[riak(rename = "B")]
    b: String,
}

#[derive(MapDocument, Default, Debug, PartialEq)]
struct Inner {
    #[riak(rename = "AA")]
    aa: String,
    #[riak(rename = "AB")]
    ab: String,
}

#[derive(MapDocument, Default, Debug, PartialEq)]
struct Outer {
    #[riak(rename = "A")]
    a: Inner,
    #[riak(rename = "B")]
    b: String,
}

fn outer() -> Outer {
    Outer {
        a: Inner {
            aa: "AA".to_string(),
            ab: "AB".to_string(),
        },
        b: "B".to_string(),
    }
}

#[test]
fn test_include_limits_stored_fields() {
    let (session, _) = test_session();
    let bucket = test_bucket();

    let item = Item {
        a: "A".to_string(),
        b: "B".to_string(),
    };
    let outcome = bucket
        .set_value(&item)
        .filter_include(["A"])
        .run(&session)
        .unwrap();

    let mut fetched = Item::default();
    bucket.get(outcome.key, &mut fetched).run(&session).unwrap();

    assert_eq!(fetched.a, "A");
    assert_eq!(fetched.b, "");
}

#[test]
fn test_include_covers_nested_maps() {
    let (session, _) = test_session();
    let bucket = test_bucket();

    let outcome = bucket
        .set_value(&outer())
        .filter_include(["A"])
        .run(&session)
        .unwrap();

    let mut fetched = Outer::default();
    bucket.get(outcome.key, &mut fetched).run(&session).unwrap();

    assert_eq!(fetched.a.aa, "AA");
    assert_eq!(fetched.a.ab, "AB");
    assert_eq!(fetched.b, "");
}

#[test]
fn test_longer_exclude_overrides_include() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    bucket
        .set_value(&outer())
        .key("outer")
        .filter_include(["A"])
        .filter_exclude(["A", "AB"])
        .run(&session)
        .unwrap();

    let map = stored(&transport, "outer");
    assert_eq!(map.maps["A"].registers["AA"], b"AA");
    assert!(!map.maps["A"].registers.contains_key("AB"));
    assert!(!map.registers.contains_key("B"));
}

#[test]
fn test_exclude_only_keeps_everything_else() {
    let (session, transport) = test_session();
    let bucket = test_bucket();

    bucket
        .set_value(&outer())
        .key("outer")
        .filter_exclude(["A"])
        .run(&session)
        .unwrap();

    let map = stored(&transport, "outer");
    assert_eq!(map.registers["B"], b"B");
    // Nested maps are always sent, even when all their fields are filtered out.
    assert!(map.maps["A"].is_empty());
}

#[test]
fn test_filtered_update_keeps_existing_fields() {
    let (session, _) = test_session();
    let bucket = test_bucket();

    bucket
        .set_value(&outer())
        .key("outer")
        .run(&session)
        .unwrap();

    let changed = Outer {
        a: Inner::default(),
        b: "changed".to_string(),
    };
    bucket
        .set_value(&changed)
        .key("outer")
        .filter_include(["B"])
        .run(&session)
        .unwrap();

    let mut fetched = Outer::default();
    bucket.get("outer", &mut fetched).run(&session).unwrap();

    assert_eq!(fetched.a, outer().a);
    assert_eq!(fetched.b, "changed");
}

#[test]
fn test_filter_applies_to_handle_placeholders() {
    #[derive(MapDocument, Default)]
    struct Stats {
        name: String,
        views: Option<Counter>,
    }

    let (session, transport) = test_session();
    let bucket = test_bucket();

    let mut stats = Stats {
        name: "page".to_string(),
        views: None,
    };
    bucket
        .set(&mut stats)
        .key("stats")
        .filter_exclude(["views"])
        .run(&session)
        .unwrap();

    let map = stored(&transport, "stats");
    assert!(!map.counters.contains_key("views"));
    // The slot is still bound by the mutable encode.
    assert!(stats.views.is_some());
}

#[test]
fn test_filter_on_a_hand_built_tree() {
    let mut tree = OperationNode::new();
    tree.set_register("A", "1");
    tree.map("C").set_register("D", "2").increment_counter("E", 3);

    let op = FieldFilter::new()
        .include(["C"])
        .exclude(["C", "E"])
        .apply(&tree);

    assert!(op.registers.is_empty());
    assert_eq!(op.maps["C"].registers["D"], b"2");
    assert!(op.maps["C"].counters.is_empty());
}
