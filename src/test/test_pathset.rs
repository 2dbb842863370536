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

use pretty_assertions::assert_eq;

use crate::path::Path;
use crate::pathset::PathSet;
use crate::types::Asn;

const ORIGIN: Asn = Asn(1234);
const ORIGIN2: Asn = Asn(5678);

fn path(s: &str) -> Path {
    s.parse().unwrap()
}

#[test]
fn add_inserts_new_path() {
    let mut ps = PathSet::new();
    assert!(ps.add(ORIGIN, path("1 2 3 4")));
    assert_eq!(ps.size(ORIGIN), 1);
    assert!(ps.add(ORIGIN, path("5 6 7 8")));
    assert_eq!(ps.size(ORIGIN), 2);
}

#[test]
fn add_equal_path_bumps_frequency() {
    let mut ps = PathSet::new();
    let p = path("1 2 3 4");
    assert!(ps.add(ORIGIN, p.clone()));
    assert!(!ps.add(ORIGIN, p.clone()));
    assert_eq!(ps.size(ORIGIN), 1);
    assert_eq!(ps.peek(ORIGIN).unwrap().frequency(), 2);

    // a copy that carries the stored frequency merges again
    let mut dup = p;
    dup.incr_frequency();
    assert!(!ps.add(ORIGIN, dup));
    assert_eq!(ps.size(ORIGIN), 1);
    assert_eq!(ps.peek(ORIGIN).unwrap().frequency(), 3);
}

#[test]
fn frequency_is_part_of_the_rank_key() {
    let mut ps = PathSet::new();
    ps.add(ORIGIN, path("1 2 3 4"));
    ps.add(ORIGIN, path("1 2 3 4"));
    // the stored path now has frequency 2; a fresh proposal with frequency 1 no longer
    // matches it and is kept as a separate, lower-ranked entry
    assert!(ps.add(ORIGIN, path("1 2 3 4")));
    assert_eq!(ps.size(ORIGIN), 2);
    assert_eq!(ps.peek(ORIGIN).unwrap().frequency(), 2);
}

#[test]
fn peek_returns_best_path() {
    let mut ps = PathSet::new();
    let mut p4 = path("1 2 3 4");
    p4.prepend(Asn(99), false);
    ps.add(ORIGIN2, p4.clone());
    assert_eq!(ps.peek(ORIGIN2).unwrap().to_string(), "99 1 2 3 4");

    // a shorter path displaces it
    ps.add(ORIGIN2, path("5 6 7 8"));
    assert_eq!(ps.peek(ORIGIN2).unwrap().to_string(), "5 6 7 8");

    // and an even shorter one wins again
    ps.add(ORIGIN2, path("1 2 3"));
    assert_eq!(ps.peek(ORIGIN2).unwrap().to_string(), "1 2 3");
    assert_eq!(ps.size(ORIGIN2), 3);
}

#[test]
fn peek_on_unknown_origin_returns_none() {
    let ps = PathSet::new();
    assert!(ps.peek(ORIGIN).is_none());
    assert!(ps.peek_copy(ORIGIN).is_none());
    assert_eq!(ps.size(ORIGIN), 0);
}

#[test]
fn peek_copy_is_independent() {
    let mut ps = PathSet::new();
    ps.add(ORIGIN, path("1 2 3 4"));
    let mut copy = ps.peek_copy(ORIGIN).unwrap();
    copy.prepend(Asn(9), false);
    assert_eq!(ps.peek(ORIGIN).unwrap().to_string(), "1 2 3 4");
    assert_eq!(copy.to_string(), "9 1 2 3 4");
}

#[test]
fn clear_removes_origin() {
    let mut ps = PathSet::new();
    ps.add(ORIGIN, path("1 2 3 4"));
    assert_eq!(ps.size(ORIGIN), 1);
    ps.clear(ORIGIN);
    assert_eq!(ps.size(ORIGIN), 0);
    assert!(ps.peek(ORIGIN).is_none());
}

#[test]
fn iteration_yields_sorted_candidates() {
    let mut ps = PathSet::new();
    ps.add(ORIGIN, path("5 6 7 8"));
    ps.add(ORIGIN, path("1 2 3"));
    ps.add(ORIGIN2, path("9 10"));

    let collected: Vec<(Asn, Vec<String>)> = ps
        .iter()
        .map(|(o, set)| (o, set.iter().map(|p| p.to_string()).collect()))
        .collect();
    assert_eq!(
        collected,
        vec![
            (ORIGIN, vec!["1 2 3".to_string(), "5 6 7 8".to_string()]),
            (ORIGIN2, vec!["9 10".to_string()]),
        ]
    );

    let best: Vec<(Asn, String)> = ps
        .best_paths()
        .map(|(o, p)| (o, p.to_string()))
        .collect();
    assert_eq!(
        best,
        vec![
            (ORIGIN, "1 2 3".to_string()),
            (ORIGIN2, "9 10".to_string())
        ]
    );
    assert_eq!(ps.num_origins(), 2);
}
