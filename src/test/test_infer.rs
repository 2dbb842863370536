// AsInfer: AS-path inference from partial BGP observations
// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use maplit::hashmap;
use pretty_assertions::assert_eq;

use crate::infer::Inferrer;
use crate::queue::RQueue;
use crate::store::MemStore;
use crate::types::InferError;

/// A small snapshot around AS 10, which observed a path towards the destination 100:
///
/// ```text
///   20 --(provider of 10)-- 10 --(peer)-- 30 --(peer)-- 60
///                            |             |
///                       (customer 40) (customer 70, relation known one-sided)
///                            |
///                       (customer 50)
/// ```
fn fixture() -> MemStore {
    let store = MemStore::new();

    for a in ["10", "20"] {
        store.insert_set("collection:base_ases:set", a);
    }
    for a in ["10", "20", "30", "40", "50", "60", "70", "3.4"] {
        store.insert_set("collection:rib1_ases:set", a);
    }

    let links: &[(&str, &[&str])] = &[
        ("10", &["20", "30", "40"]),
        ("20", &["10"]),
        ("30", &["10", "60", "70"]),
        ("40", &["10", "50"]),
        ("50", &["40"]),
        ("60", &["30"]),
        ("70", &["30"]),
    ];
    for (a, neighbors) in links {
        for n in *neighbors {
            store.insert_set(&format!("collection:rib1_as_links:{a}:set"), n);
        }
    }

    let relations: &[(&str, &str, &str)] = &[
        ("10", "20", "c2p"),
        ("10", "30", "p2p"),
        ("10", "40", "p2c"),
        ("20", "10", "p2c"),
        ("30", "10", "p2p"),
        ("30", "60", "p2p"),
        ("30", "70", "p2c"),
        ("40", "10", "c2p"),
        ("40", "50", "p2c"),
        ("50", "40", "c2p"),
        ("60", "30", "p2p"),
        // 70 has no relation entry for 30: its side of the link is unknown
    ];
    for (a, b, tag) in relations {
        store.insert_hash(&format!("as:{a}:rel"), b, tag);
    }

    store.insert_hash("collection:rib1_ases:attr:10", "sure_path_to:100", "10 100");
    store
}

#[test]
fn infers_routes_for_reachable_origins() {
    let store = fixture();
    let mut inferrer = Inferrer::new(store.clone(), "rib1", false).unwrap();
    inferrer.process("100").unwrap();

    // 60 is missing: its only route would descend to 30 and then cross a second peering edge.
    // 70 is missing: its own relation towards 30 is unknown, so the check lacks data.
    assert_eq!(
        store.hash("result:rib1:inferred_to:100"),
        hashmap! {
            "10".to_string() => "10 100".to_string(),
            "20".to_string() => "20 10 100".to_string(),
            "30".to_string() => "30 10 100".to_string(),
            "40".to_string() => "40 10 100".to_string(),
            "50".to_string() => "50 40 10 100".to_string(),
        }
    );
}

#[test]
fn completion_is_published_and_results_expire() {
    let store = fixture();
    let mut inferrer = Inferrer::new(store.clone(), "rib1", false).unwrap();
    inferrer.process("100").unwrap();

    assert_eq!(
        store.published(),
        vec![(
            "inference:query_status".to_string(),
            "rib1|100".to_string()
        )]
    );
    assert_eq!(store.ttl("result:rib1:inferred_to:100"), Some(600));
}

#[test]
fn destination_without_seeds_publishes_status_only() {
    let store = fixture();
    let mut inferrer = Inferrer::new(store.clone(), "rib1", false).unwrap();
    inferrer.process("555").unwrap();

    assert_eq!(
        store.published(),
        vec![(
            "inference:query_status".to_string(),
            "rib1|555".to_string()
        )]
    );
    assert!(store.hash("result:rib1:inferred_to:555").is_empty());
    assert_eq!(store.ttl("result:rib1:inferred_to:555"), None);
}

#[test]
fn missing_rib_tag_is_reported() {
    match Inferrer::new(MemStore::new(), "nope", false) {
        Err(InferError::NoRibData(tag)) => assert_eq!(tag, "nope"),
        other => panic!("expected NoRibData, got {other:?}"),
    }
}

#[test]
fn observed_origins_keep_their_paths() {
    let store = fixture();
    store.insert_hash(
        "collection:rib1_ases:attr:20",
        "sure_path_to:100",
        "20 5 100",
    );
    let mut inferrer = Inferrer::new(store.clone(), "rib1", false).unwrap();
    inferrer.process("100").unwrap();

    // 20 is a base AS now: the equally long inferred route via 10 is never proposed to it
    let results = store.hash("result:rib1:inferred_to:100");
    assert_eq!(results.get("20").map(String::as_str), Some("20 5 100"));
    assert_eq!(results.get("50").map(String::as_str), Some("50 40 10 100"));
}

#[test]
fn processing_twice_is_idempotent() {
    let store = fixture();
    let mut inferrer = Inferrer::new(store.clone(), "rib1", false).unwrap();
    inferrer.process("100").unwrap();
    let first = store.hash("result:rib1:inferred_to:100");
    inferrer.process("100").unwrap();
    assert_eq!(store.hash("result:rib1:inferred_to:100"), first);
}

#[test]
fn announce_all_feeds_the_queue() {
    let store = fixture();
    let mut queue = RQueue::new(store.clone(), "dests", true).unwrap();
    let mut inferrer = Inferrer::new(store.clone(), "rib1", true).unwrap();
    inferrer.announce_all(&mut queue).unwrap();

    // the dotted AS never made it into the loaded set
    let mut fed = Vec::new();
    while let Some(dest) = queue.pop().unwrap() {
        fed.push(dest);
    }
    assert_eq!(fed, vec!["10", "20", "30", "40", "50", "60", "70"]);
}

#[test]
fn dump_graph_mode_does_not_publish() {
    let store = fixture();
    let mut inferrer = Inferrer::new(store.clone(), "rib1", true).unwrap();
    inferrer.process("100").unwrap();

    assert!(store.hash("result:rib1:inferred_to:100").is_empty());
    assert_eq!(store.published(), vec![]);
    assert_eq!(store.ttl("result:rib1:inferred_to:100"), None);
}
