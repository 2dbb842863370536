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

//! The per-destination inference driver.

use std::collections::BTreeSet;
use std::time::Instant;

use crate::logger::Logger;
use crate::path::Path;
use crate::pathset::PathSet;
use crate::queue::RQueue;
use crate::store::Store;
use crate::topology::{load_as_set, load_links, RelStore, SkipStats};
use crate::types::{Asn, InferError};
use crate::worklist::Worklist;

/// Seconds a `result:` hash stays alive after a destination completes.
const RESULT_TTL: u64 = 600;

/// The pub/sub channel carrying per-destination completion notices.
const STATUS_CHANNEL: &str = "inference:query_status";

/// Per-destination scratch state, created when a destination is picked up and dropped when it
/// completes.
#[derive(Debug, Default)]
struct Scratch {
    /// Candidate paths per origin.
    rib_in: PathSet,
    /// Origins seeded from observed paths; their paths are never extended through.
    base_ases: BTreeSet<Asn>,
    /// ASes pending relaxation.
    worklist: Worklist,
}

/// The inference driver.
///
/// Owns the relationship store for the lifetime of the process and runs the seed / relax /
/// publish pipeline for every destination popped from the queue.
#[derive(Debug)]
pub struct Inferrer<S: Store> {
    /// The store handle for topology reads, result writes, and notifications.
    store: S,
    /// The operational log stream.
    logger: Logger,
    /// Label of the topology snapshot this worker serves.
    ribtag: String,
    /// The AS relationship graph, loaded once per run.
    rel: RelStore,
    /// All ASes of the base and rib topologies.
    all_ases: BTreeSet<Asn>,
    /// Print best paths to stdout instead of publishing results.
    dump_graph: bool,
}

impl<S: Store> Inferrer<S> {
    /// Create a driver for the given rib tag and load the relationship graph.
    ///
    /// Fails with [`InferError::NoRibData`] if the store holds no AS set for the tag.
    pub fn new(
        mut store: S,
        ribtag: impl Into<String>,
        dump_graph: bool,
    ) -> Result<Self, InferError> {
        let ribtag = ribtag.into();
        let id = format!("{}_{}", std::process::id(), ribtag);
        let logger = Logger::new(&mut store, "route_inference", id)?;
        logger.notice(&mut store, "Starting up");

        if !store.exists(&format!("collection:{ribtag}_ases:set"))? {
            return Err(InferError::NoRibData(ribtag));
        }

        let mut all_ases = load_as_set(&mut store, "base_ases")?;
        all_ases.extend(load_as_set(&mut store, &format!("{ribtag}_ases"))?);
        logger.notice(&mut store, &format!("Loaded AS Set [{} ases]", all_ases.len()));

        logger.notice(&mut store, "Loading link structure data...");
        let mut rel = RelStore::new();
        let mut skipped = SkipStats::default();
        let rib_links = format!("{ribtag}_as_links");
        for &a in &all_ases {
            rel.add_as(a);
            skipped += load_links(&mut store, &mut rel, a, "base_as_links")?;
            skipped += load_links(&mut store, &mut rel, a, &rib_links)?;
        }
        logger.notice(
            &mut store,
            &format!(
                "Link structure loading done. {}/{} skipped because no AS relationship data was available.",
                skipped.skipped, skipped.total
            ),
        );

        Ok(Self {
            store,
            logger,
            ribtag,
            rel,
            all_ases,
            dump_graph,
        })
    }

    /// The loaded relationship graph.
    pub fn rel(&self) -> &RelStore {
        &self.rel
    }

    /// Feed every loaded AS into the destination queue, so a full relaxation pass runs over the
    /// entire graph (used together with the dump-graph mode for graph-wide audits).
    pub fn announce_all(&mut self, queue: &mut RQueue<S>) -> Result<(), InferError> {
        for a in &self.all_ases {
            queue.push(&a.to_string())?;
        }
        Ok(())
    }

    /// Serve destinations from the queue, forever. Returns only on store errors; termination is
    /// by external signal while blocked on the queue.
    pub fn run(&mut self, queue: &mut RQueue<S>) -> Result<(), InferError> {
        loop {
            log::debug!("Looking for new destination");
            match queue.pop()? {
                Some(dest) => self.process(&dest)?,
                None => {
                    self.logger
                        .notice(&mut self.store, "Waiting for elements to process...");
                }
            }
        }
    }

    /// Infer and publish the paths towards one destination.
    pub fn process(&mut self, dest: &str) -> Result<(), InferError> {
        let start = Instant::now();
        self.logger.notice(
            &mut self.store,
            &format!("Processing request for routes to {dest}"),
        );

        let mut scratch = self.seed(dest)?;
        if scratch.worklist.is_empty() {
            self.logger
                .warn(&mut self.store, &format!("No known routes to {dest}"));
            self.store
                .publish(STATUS_CHANNEL, &format!("{}|{dest}", self.ribtag))?;
            return Ok(());
        }

        self.relax(&mut scratch);
        self.publish_results(dest, &scratch.rib_in)?;

        self.logger.notice(
            &mut self.store,
            &format!(
                "Inferred routes to {dest}. Took {} seconds",
                start.elapsed().as_secs()
            ),
        );
        Ok(())
    }

    /// Seed the scratch state from the observed paths towards `dest`: every rib AS with a
    /// `sure_path_to:<dest>` attribute becomes an origin with one sure path, a base AS, and an
    /// initial relaxation candidate.
    fn seed(&mut self, dest: &str) -> Result<Scratch, InferError> {
        let mut scratch = Scratch::default();
        let rib_coll = format!("{}_ases", self.ribtag);
        let rib_ases = load_as_set(&mut self.store, &rib_coll)?;
        let attr = format!("sure_path_to:{dest}");

        let mut ctr = 0usize;
        for &a in &rib_ases {
            let key = format!("collection:{rib_coll}:attr:{a}");
            let text = match self.store.hash_get(&key, &attr)? {
                Some(text) => text,
                None => continue,
            };
            match text.parse::<Path>() {
                Ok(path) if !path.is_empty() => {
                    scratch.worklist.push(a);
                    scratch.rib_in.add(a, path);
                    scratch.base_ases.insert(a);
                    ctr += 1;
                }
                Ok(_) => {}
                Err(e) => self.logger.warn(
                    &mut self.store,
                    &format!("Ignoring unparsable sure path of {a}: {e}"),
                ),
            }
        }

        self.logger.notice(
            &mut self.store,
            &format!("{ctr}/{} ASes have sure paths to {dest}", rib_ases.len()),
        );
        Ok(scratch)
    }

    /// Run the worklist relaxation until no origin's best path improves anymore.
    ///
    /// Each round pops the smallest pending candidate and proposes `peer -> best(candidate)` to
    /// every neighbor, discarding proposals that loop or violate valley-freeness (including the
    /// missing-relationship case). A neighbor is re-enqueued only if its best path actually
    /// changed; a pure frequency bump of the incumbent best does not count as a change.
    fn relax(&mut self, scratch: &mut Scratch) {
        let Scratch {
            rib_in,
            base_ases,
            worklist,
        } = scratch;

        while let Some(candidate) = worklist.pop() {
            if !self.rel.knows(candidate) {
                self.logger.notice(
                    &mut self.store,
                    &format!("Couldn't find any links for {candidate}"),
                );
                continue;
            }

            for (peer, _relation) in self.rel.neighbors(candidate) {
                if base_ases.contains(&peer) {
                    continue;
                }
                let mut proposal = match rib_in.peek_copy(candidate) {
                    Some(p) => p,
                    None => continue,
                };
                if !proposal.prepend(peer, false) {
                    continue;
                }
                if !proposal.check_valley_free(&self.rel).ok {
                    continue;
                }

                let prior = rib_in.peek_copy(peer);
                let bumped_best = prior.as_ref().map(|p| *p == proposal).unwrap_or(false);
                rib_in.add(peer, proposal);
                let improved = match &prior {
                    None => true,
                    Some(prior) => !bumped_best && rib_in.peek(peer) != Some(prior),
                };
                if improved {
                    worklist.push(peer);
                }
            }
        }
    }

    /// Write each origin's best path to the `result:` hash, notify the status channel, and set
    /// the result TTL. In dump-graph mode the best paths go to stdout instead.
    fn publish_results(&mut self, dest: &str, rib_in: &PathSet) -> Result<(), InferError> {
        if self.dump_graph {
            for (_, best) in rib_in.best_paths() {
                println!("{best}");
            }
            return Ok(());
        }

        let key = format!("result:{}:inferred_to:{dest}", self.ribtag);
        let fields: Vec<(String, String)> = rib_in
            .best_paths()
            .map(|(origin, best)| (origin.to_string(), best.to_string()))
            .collect();
        self.store.hash_set_batched(&key, &fields)?;
        self.store
            .publish(STATUS_CHANNEL, &format!("{}|{dest}", self.ribtag))?;
        self.store.expire(&key, RESULT_TTL)?;
        Ok(())
    }
}
