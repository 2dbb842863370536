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

//! The distributed destination queue.

use log::warn;

use crate::store::{Store, StoreError};

/// Seconds a [`RQueue::pop`] blocks before reporting an empty queue.
const POP_TIMEOUT: u64 = 2;

/// A named deduplicating blocking queue, backed by the external store.
///
/// The queue keeps three keys: a FIFO list, an in-filter set that suppresses duplicate enqueues,
/// and a listener counter that lets producers see whether anyone is consuming. Enqueueing checks
/// and updates the in-filter atomically (server-side); popping removes the value from the filter
/// right after it leaves the list. Between those two steps a concurrent producer can re-enqueue
/// the value, so consumers must tolerate the occasional duplicate delivery.
///
/// The queue owns its store handle. A handle constructed as listener increments the listener
/// counter and decrements it again on drop.
#[derive(Debug)]
pub struct RQueue<S: Store> {
    /// The store handle this queue talks through.
    store: S,
    /// Whether this handle counts as a consumer.
    listener: bool,
    /// Key of the listener counter.
    key_listener: String,
    /// Key of the in-filter set.
    key_filter: String,
    /// Key of the FIFO list.
    key_list: String,
}

impl<S: Store> RQueue<S> {
    /// Open the queue named `name`. With `listener`, this handle announces itself as a consumer.
    pub fn new(mut store: S, name: &str, listener: bool) -> Result<Self, StoreError> {
        let key_listener = format!("procqueue:{name}:meta:have_listener");
        if listener {
            store.counter_incr(&key_listener)?;
        }
        Ok(Self {
            store,
            listener,
            key_listener,
            key_filter: format!("procqueue:{name}:infilter"),
            key_list: format!("procqueue:{name}:list"),
        })
    }

    /// Enqueue `value` unless it is already pending. Duplicates are dropped silently.
    pub fn push(&mut self, value: &str) -> Result<(), StoreError> {
        self.store
            .enqueue_dedup(&self.key_filter, &self.key_list, value)?;
        Ok(())
    }

    /// Dequeue the oldest pending value, blocking up to two seconds. `None` on timeout.
    pub fn pop(&mut self) -> Result<Option<String>, StoreError> {
        match self.store.blocking_pop(&self.key_list, POP_TIMEOUT)? {
            Some(value) => {
                self.store.set_remove(&self.key_filter, &value)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Drop all pending values and the in-filter.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store
            .delete(&[self.key_filter.as_str(), self.key_list.as_str()])
    }
}

impl<S: Store> Drop for RQueue<S> {
    fn drop(&mut self) {
        if !self.listener {
            return;
        }
        match self.store.counter_decr(&self.key_listener) {
            Ok(n) if n < 0 => {
                warn!("Queue deletion decremented the listener counter below zero; resetting.");
                if let Err(e) = self.store.counter_reset(&self.key_listener) {
                    warn!("Cannot reset the listener counter: {e}");
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Cannot decrement the listener counter: {e}"),
        }
    }
}
