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

use clap::Parser;
use log::{error, warn};

use asinfer::infer::Inferrer;
use asinfer::queue::RQueue;
use asinfer::store::RedisStore;
use asinfer::types::InferError;

/// Infer the AS-path every AS would use towards requested destination ASes, and publish the
/// results to the store.
#[derive(Debug, Parser)]
struct Cli {
    /// Hostname of the key/value store.
    #[clap(long = "redis-host", default_value = "127.0.0.1")]
    redis_host: String,
    /// Port of the key/value store.
    #[clap(long = "redis-port", default_value_t = 6379)]
    redis_port: u16,
    /// Name of the destination queue to serve.
    #[clap(long = "procqueue")]
    procqueue: String,
    /// Tag of the topology snapshot to infer against.
    #[clap(long = "ribtag")]
    ribtag: String,
    /// Feed every known AS into the destination queue, and print best paths to stdout instead of
    /// publishing them.
    #[clap(long = "dump-graph")]
    dump_graph: bool,
}

fn main() {
    pretty_env_logger::init_timed();

    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if let Err(e) = run(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Cli) -> Result<(), InferError> {
    let store = RedisStore::connect(&args.redis_host, args.redis_port)?;
    let queue_store = RedisStore::connect(&args.redis_host, args.redis_port)?;
    let mut queue = RQueue::new(queue_store, &args.procqueue, true)?;

    let mut inferrer = match Inferrer::new(store, args.ribtag, args.dump_graph) {
        Ok(inferrer) => inferrer,
        Err(InferError::NoRibData(tag)) => {
            warn!("Inferrer for {tag} shutting down because no RIB data was available for the given tag.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if args.dump_graph {
        inferrer.announce_all(&mut queue)?;
    }
    inferrer.run(&mut queue)
}
