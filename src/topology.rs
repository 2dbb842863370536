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

//! The in-memory AS relationship store and its loaders.

use itertools::Itertools;
use petgraph::graphmap::DiGraphMap;
use std::collections::BTreeSet;
use std::ops::AddAssign;
use std::str::FromStr;

use crate::store::Store;
use crate::types::{Asn, AsRelation, InferError};

/// The AS relationship graph.
///
/// Relations are directed edge weights: the weight on `a -> b` is the tag describing `b` from
/// `a`'s perspective. The two directions of a link are stored independently; the valley-free walk
/// only ever reads the near-side tag.
#[derive(Debug, Clone)]
pub struct RelStore {
    /// The underlying graph. Nodes are added for every known AS, even ones without any usable
    /// relationship.
    graph: DiGraphMap<Asn, AsRelation>,
}

impl Default for RelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RelStore {
    /// Create an empty relationship store.
    pub fn new() -> Self {
        Self {
            graph: DiGraphMap::new(),
        }
    }

    /// Register `a` as a known AS, with or without links.
    pub fn add_as(&mut self, a: Asn) {
        self.graph.add_node(a);
    }

    /// Record that `b` has relation `rel` from `a`'s perspective. The first write for a pair
    /// wins; later writes (e.g. from a second collection) are ignored.
    pub fn insert(&mut self, a: Asn, b: Asn, rel: AsRelation) -> bool {
        if self.graph.edge_weight(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, rel);
        true
    }

    /// The relation of `b` seen from `a`, if recorded.
    pub fn relation(&self, a: Asn, b: Asn) -> Option<AsRelation> {
        self.graph.edge_weight(a, b).copied()
    }

    /// Returns `true` if `a` was registered (it may still have no links).
    pub fn knows(&self, a: Asn) -> bool {
        self.graph.contains_node(a)
    }

    /// All neighbors of `a` with their relation, in ascending AS order.
    pub fn neighbors(&self, a: Asn) -> Vec<(Asn, AsRelation)> {
        self.graph
            .edges(a)
            .map(|(_, b, rel)| (b, *rel))
            .sorted_by_key(|(b, _)| *b)
            .collect()
    }

    /// Number of registered ASes.
    pub fn num_ases(&self) -> usize {
        self.graph.node_count()
    }
}

/// Running tally of edges dropped because no usable relationship was recorded for them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipStats {
    /// Edges dropped.
    pub skipped: usize,
    /// Edges considered.
    pub total: usize,
}

impl AddAssign for SkipStats {
    fn add_assign(&mut self, rhs: Self) {
        self.skipped += rhs.skipped;
        self.total += rhs.total;
    }
}

/// Load the members of `collection:<name>:set` as a set of AS identifiers.
///
/// Members whose textual form contains a dot are dropped here: dotted ASes are excluded from the
/// in-memory topology by policy, even though the codec can represent them.
pub fn load_as_set<S: Store>(store: &mut S, name: &str) -> Result<BTreeSet<Asn>, InferError> {
    let mut out = BTreeSet::new();
    for member in store.set_members(&format!("collection:{name}:set"))? {
        if member.contains('.') {
            continue;
        }
        out.insert(Asn::from_str(&member)?);
    }
    Ok(out)
}

/// Load the links of `a` from `collection:<collection>:<a>:set` into `rel`, resolving each
/// neighbor's relation from the `as:<a>:rel` hash. Neighbors with a dotted textual form are
/// dropped, and neighbors without a usable relation are counted in the returned stats.
pub fn load_links<S: Store>(
    store: &mut S,
    rel: &mut RelStore,
    a: Asn,
    collection: &str,
) -> Result<SkipStats, InferError> {
    let mut stats = SkipStats::default();
    let members = store.set_members(&format!("collection:{collection}:{a}:set"))?;
    for member in members {
        if member.contains('.') {
            continue;
        }
        stats.total += 1;
        let tag = store.hash_get(&format!("as:{a}:rel"), &member)?;
        let relation = tag.as_deref().map(AsRelation::from_tag);
        match relation {
            Some(r) if !r.is_unknown() => {
                rel.insert(a, Asn::from_str(&member)?, r);
            }
            _ => stats.skipped += 1,
        }
    }
    Ok(stats)
}
