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

//! Per-origin collections of ranked candidate paths.

use std::collections::{BTreeMap, BTreeSet};

use crate::path::Path;
use crate::types::Asn;

/// A mapping from origin AS to its ordered collection of candidate [`Path`]s.
///
/// Within an origin, paths are kept sorted by the path preference order, best first. Adding a path
/// that is equal to a stored one does not grow the collection; it bumps the stored path's
/// frequency instead. Because the frequency participates in the order, the bump is performed as a
/// remove / re-insert, never as an in-place mutation of a stored element.
#[derive(Debug, Clone, Default)]
pub struct PathSet {
    /// Candidate paths per origin.
    paths: BTreeMap<Asn, BTreeSet<Path>>,
}

impl PathSet {
    /// Create an empty path set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate path at `origin`.
    ///
    /// If an equal path is already stored, its frequency is bumped, the proposal is dropped, and
    /// `false` is returned. Otherwise the path is inserted and `true` is returned.
    pub fn add(&mut self, origin: Asn, path: Path) -> bool {
        let set = self.paths.entry(origin).or_default();
        if let Some(mut existing) = set.take(&path) {
            existing.incr_frequency();
            // A bumped entry that now ties another one is dropped; the entry already in the set
            // wins, as with any insertion of an equal element.
            set.insert(existing);
            false
        } else {
            set.insert(path);
            true
        }
    }

    /// The best path at `origin`, if any.
    pub fn peek(&self, origin: Asn) -> Option<&Path> {
        self.paths.get(&origin).and_then(|set| set.iter().next())
    }

    /// An independent copy of the best path at `origin`, if any.
    pub fn peek_copy(&self, origin: Asn) -> Option<Path> {
        self.peek(origin).cloned()
    }

    /// Number of candidate paths stored at `origin`.
    pub fn size(&self, origin: Asn) -> usize {
        self.paths.get(&origin).map(|set| set.len()).unwrap_or(0)
    }

    /// Drop all candidate paths stored at `origin`.
    pub fn clear(&mut self, origin: Asn) {
        self.paths.remove(&origin);
    }

    /// Iterate over `(origin, candidates)` pairs. The candidates are ordered best first.
    pub fn iter(&self) -> impl Iterator<Item = (Asn, &BTreeSet<Path>)> {
        self.paths.iter().map(|(origin, set)| (*origin, set))
    }

    /// Iterate over each origin together with its best path.
    pub fn best_paths(&self) -> impl Iterator<Item = (Asn, &Path)> {
        self.iter()
            .filter_map(|(origin, set)| set.iter().next().map(|p| (origin, p)))
    }

    /// Number of origins with at least one candidate path.
    pub fn num_origins(&self) -> usize {
        self.paths.values().filter(|set| !set.is_empty()).count()
    }
}
