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

//! An in-memory store implementation.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use super::{Store, StoreError};

/// The shared state behind all clones of a [`MemStore`].
#[derive(Debug, Default)]
struct MemInner {
    /// All sets.
    sets: HashMap<String, BTreeSet<String>>,
    /// All hashes.
    hashes: HashMap<String, HashMap<String, String>>,
    /// All lists, head at the front.
    lists: HashMap<String, VecDeque<String>>,
    /// All counters.
    counters: HashMap<String, i64>,
    /// Every `(channel, message)` ever published.
    published: Vec<(String, String)>,
    /// The last TTL set per key.
    expires: HashMap<String, u64>,
}

/// An in-memory [`Store`].
///
/// Cloning a `MemStore` yields a second handle onto the same data, which mirrors how several
/// Redis connections see one server; the tests hand one handle to the component under test and
/// keep another for inspection. Unlike the real store, [`Store::blocking_pop`] returns
/// immediately when the list is empty.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    /// Shared state.
    inner: Rc<RefCell<MemInner>>,
}

impl MemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member to a set (fixture setup).
    pub fn insert_set(&self, key: &str, member: &str) {
        self.inner
            .borrow_mut()
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
    }

    /// Write one hash field (fixture setup).
    pub fn insert_hash(&self, key: &str, field: &str, value: &str) {
        self.inner
            .borrow_mut()
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
    }

    /// Cardinality of the set at `key`.
    pub fn set_card(&self, key: &str) -> usize {
        self.inner.borrow().sets.get(key).map_or(0, |s| s.len())
    }

    /// Length of the list at `key`.
    pub fn list_len(&self, key: &str) -> usize {
        self.inner.borrow().lists.get(key).map_or(0, |l| l.len())
    }

    /// A copy of the list at `key`, head first.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.inner
            .borrow()
            .lists
            .get(key)
            .map(|l| l.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// A copy of the hash at `key`.
    pub fn hash(&self, key: &str) -> HashMap<String, String> {
        self.inner.borrow().hashes.get(key).cloned().unwrap_or_default()
    }

    /// The current value of the counter at `key`.
    pub fn counter(&self, key: &str) -> Option<i64> {
        self.inner.borrow().counters.get(key).copied()
    }

    /// Everything published so far, as `(channel, message)` pairs.
    pub fn published(&self) -> Vec<(String, String)> {
        self.inner.borrow().published.clone()
    }

    /// The last TTL set on `key`, if any.
    pub fn ttl(&self, key: &str) -> Option<u64> {
        self.inner.borrow().expires.get(key).copied()
    }
}

impl Store for MemStore {
    fn exists(&mut self, key: &str) -> Result<bool, StoreError> {
        let inner = self.inner.borrow();
        Ok(inner.sets.contains_key(key)
            || inner.hashes.contains_key(key)
            || inner.lists.contains_key(key)
            || inner.counters.contains_key(key))
    }

    fn set_members(&mut self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .inner
            .borrow()
            .sets
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn set_remove(&mut self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        let now_empty = match inner.sets.get_mut(key) {
            Some(set) => {
                set.remove(member);
                set.is_empty()
            }
            None => false,
        };
        if now_empty {
            inner.sets.remove(key);
        }
        Ok(())
    }

    fn hash_get(&mut self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .inner
            .borrow()
            .hashes
            .get(key)
            .and_then(|h| h.get(field).cloned()))
    }

    fn hash_set_batched(
        &mut self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        let hash = inner.hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            hash.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    fn list_push(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner
            .borrow_mut()
            .lists
            .entry(key.to_string())
            .or_default()
            .push_front(value.to_string());
        Ok(())
    }

    fn enqueue_dedup(
        &mut self,
        filter_key: &str,
        list_key: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.borrow_mut();
        let added = inner
            .sets
            .entry(filter_key.to_string())
            .or_default()
            .insert(value.to_string());
        if added {
            inner
                .lists
                .entry(list_key.to_string())
                .or_default()
                .push_front(value.to_string());
        }
        Ok(added)
    }

    fn blocking_pop(
        &mut self,
        key: &str,
        _timeout_secs: u64,
    ) -> Result<Option<String>, StoreError> {
        let mut inner = self.inner.borrow_mut();
        let value = inner.lists.get_mut(key).and_then(|l| l.pop_back());
        if inner.lists.get(key).map_or(false, |l| l.is_empty()) {
            inner.lists.remove(key);
        }
        Ok(value)
    }

    fn counter_incr(&mut self, key: &str) -> Result<i64, StoreError> {
        let mut inner = self.inner.borrow_mut();
        let value = inner.counters.entry(key.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    fn counter_decr(&mut self, key: &str) -> Result<i64, StoreError> {
        let mut inner = self.inner.borrow_mut();
        let value = inner.counters.entry(key.to_string()).or_insert(0);
        *value -= 1;
        Ok(*value)
    }

    fn counter_reset(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.borrow_mut().counters.insert(key.to_string(), 0);
        Ok(())
    }

    fn publish(&mut self, channel: &str, message: &str) -> Result<(), StoreError> {
        self.inner
            .borrow_mut()
            .published
            .push((channel.to_string(), message.to_string()));
        Ok(())
    }

    fn expire(&mut self, key: &str, seconds: u64) -> Result<(), StoreError> {
        self.inner
            .borrow_mut()
            .expires
            .insert(key.to_string(), seconds);
        Ok(())
    }

    fn delete(&mut self, keys: &[&str]) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        for key in keys {
            inner.sets.remove(*key);
            inner.hashes.remove(*key);
            inner.lists.remove(*key);
            inner.counters.remove(*key);
        }
        Ok(())
    }
}
