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

#![deny(missing_docs, missing_debug_implementations)]

//! # AsInfer
//!
//! AsInfer infers, for a requested destination AS, the most plausible BGP AS-path every other AS
//! would use to reach it. It consumes a graph of inter-AS business relationships (customer,
//! provider, peer, sibling) and a partial set of observed paths, and publishes one inferred path
//! per origin AS to an external key/value store.
//!
//! ## Main Concepts
//!
//! The driver ([`infer::Inferrer`]) pops destinations from a deduplicating distributed queue
//! ([`queue::RQueue`]), seeds a per-origin candidate collection ([`pathset::PathSet`]) from the
//! observed paths, and then relaxes: it repeatedly pops an AS from the worklist
//! ([`worklist::Worklist`]), prepends each of its neighbors to its current best [`path::Path`],
//! discards proposals that loop or violate the valley-free export rule (checked against the
//! relationship graph, [`topology::RelStore`]), and re-enqueues neighbors whose best path
//! improved. When the worklist drains, each origin's best path is published.
//!
//! The result is a best-effort, economic-policy-aware inference: paths respect valley-freeness
//! and are loop-free, but no optimality beyond the candidate ranking is attempted.
//!
//! All persistence and messaging goes through the [`store::Store`] trait; production uses the
//! Redis-backed [`store::RedisStore`], while tests (and the example below) run against the
//! in-memory [`store::MemStore`].
//!
//! ## Example usage
//!
//! ```
//! use asinfer::infer::Inferrer;
//! use asinfer::queue::RQueue;
//! use asinfer::store::MemStore;
//!
//! # fn main() -> Result<(), asinfer::types::InferError> {
//! let store = MemStore::new();
//!
//! // A tiny snapshot: AS 2 is AS 1's provider, and AS 1 observed a path towards AS 99.
//! store.insert_set("collection:test_ases:set", "1");
//! store.insert_set("collection:test_ases:set", "2");
//! store.insert_set("collection:test_as_links:1:set", "2");
//! store.insert_set("collection:test_as_links:2:set", "1");
//! store.insert_hash("as:1:rel", "2", "c2p");
//! store.insert_hash("as:2:rel", "1", "p2c");
//! store.insert_hash("collection:test_ases:attr:1", "sure_path_to:99", "1 5 99");
//!
//! let mut queue = RQueue::new(store.clone(), "destinations", true)?;
//! queue.push("99")?;
//!
//! let mut inferrer = Inferrer::new(store.clone(), "test", false)?;
//! let dest = queue.pop()?.unwrap();
//! inferrer.process(&dest)?;
//!
//! let results = store.hash("result:test:inferred_to:99");
//! assert_eq!(results.get("2").map(String::as_str), Some("2 1 5 99"));
//! # Ok(())
//! # }
//! ```

pub mod infer;
pub mod logger;
pub mod path;
pub mod pathset;
pub mod queue;
pub mod store;
pub mod topology;
pub mod types;
pub mod worklist;

#[cfg(test)]
mod test;
