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

//! The key/value store surface the inference core talks to.
//!
//! Everything the system persists or exchanges goes through the [`Store`] trait: topology
//! collections, sure-path attributes, inferred results, the destination queue, the log sink, and
//! the completion notifications. The production implementation is [`RedisStore`]; the tests run
//! against the in-memory [`MemStore`].

mod client;
mod memory;

pub use client::RedisStore;
pub use memory::MemStore;

use thiserror::Error;

/// Errors raised by a store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Establishing the connection failed.
    #[error("Cannot connect to the store: {0}")]
    Connection(#[source] redis::RedisError),
    /// A command round-trip failed.
    #[error("Store command failed: {0}")]
    Command(#[from] redis::RedisError),
}

/// Synchronous key/value store operations.
///
/// Methods take `&mut self` because a store handle wraps a single connection; the system is
/// single-threaded and components that need concurrent access (the destination queue, the driver)
/// each own their own handle.
pub trait Store {
    /// Returns `true` if `key` holds any value.
    fn exists(&mut self, key: &str) -> Result<bool, StoreError>;

    /// All members of the set at `key`.
    fn set_members(&mut self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Remove `member` from the set at `key`.
    fn set_remove(&mut self, key: &str, member: &str) -> Result<(), StoreError>;

    /// Read one field of the hash at `key`.
    fn hash_get(&mut self, key: &str, field: &str) -> Result<Option<String>, StoreError>;

    /// Write all `fields` into the hash at `key`. Implementations are expected to pipeline the
    /// writes in batches of 100, draining the replies between batches.
    fn hash_set_batched(
        &mut self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<(), StoreError>;

    /// Push `value` onto the head of the list at `key`.
    fn list_push(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Atomically add `value` to the set at `filter_key` and, only if it was not yet a member,
    /// push it onto the head of the list at `list_key`. Returns `true` if the value was enqueued.
    fn enqueue_dedup(
        &mut self,
        filter_key: &str,
        list_key: &str,
        value: &str,
    ) -> Result<bool, StoreError>;

    /// Pop from the tail of the list at `key`, blocking up to `timeout_secs`. `None` on timeout.
    fn blocking_pop(&mut self, key: &str, timeout_secs: u64)
        -> Result<Option<String>, StoreError>;

    /// Increment the counter at `key`, returning the new value.
    fn counter_incr(&mut self, key: &str) -> Result<i64, StoreError>;

    /// Decrement the counter at `key`, returning the new value.
    fn counter_decr(&mut self, key: &str) -> Result<i64, StoreError>;

    /// Reset the counter at `key` to zero.
    fn counter_reset(&mut self, key: &str) -> Result<(), StoreError>;

    /// Publish `message` on the pub/sub `channel`.
    fn publish(&mut self, channel: &str, message: &str) -> Result<(), StoreError>;

    /// Let `key` expire after `seconds`.
    fn expire(&mut self, key: &str, seconds: u64) -> Result<(), StoreError>;

    /// Delete all `keys`.
    fn delete(&mut self, keys: &[&str]) -> Result<(), StoreError>;
}
