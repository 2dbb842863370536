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

//! The Redis-backed store implementation.

use redis::{cmd, Script};

use super::{Store, StoreError};

/// The server-side script backing [`Store::enqueue_dedup`]: membership test and list push must
/// happen in one step, per enqueue.
const ENQUEUE_SCRIPT: &str = "local sadd_result = nil; \
     sadd_result = redis.call('SADD',KEYS[1],ARGV[1]); \
     if sadd_result > 0 then \
       redis.call('LPUSH',KEYS[2],ARGV[1]); \
     end \
     return sadd_result; ";

/// Number of commands to pipeline before draining the replies.
const PIPELINE_BATCH: usize = 100;

/// A [`Store`] backed by a single synchronous Redis connection.
pub struct RedisStore {
    /// The connection all commands go through.
    con: redis::Connection,
    /// The dedup-enqueue script, cached so the server only loads it once.
    enqueue_script: Script,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect to the Redis server at `host:port`.
    pub fn connect(host: &str, port: u16) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(format!("redis://{host}:{port}/")).map_err(StoreError::Connection)?;
        let con = client.get_connection().map_err(StoreError::Connection)?;
        Ok(Self {
            con,
            enqueue_script: Script::new(ENQUEUE_SCRIPT),
        })
    }
}

impl Store for RedisStore {
    fn exists(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(cmd("EXISTS").arg(key).query::<i64>(&mut self.con)? == 1)
    }

    fn set_members(&mut self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(cmd("SMEMBERS").arg(key).query(&mut self.con)?)
    }

    fn set_remove(&mut self, key: &str, member: &str) -> Result<(), StoreError> {
        cmd("SREM").arg(key).arg(member).query::<()>(&mut self.con)?;
        Ok(())
    }

    fn hash_get(&mut self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        Ok(cmd("HGET").arg(key).arg(field).query(&mut self.con)?)
    }

    fn hash_set_batched(
        &mut self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<(), StoreError> {
        for chunk in fields.chunks(PIPELINE_BATCH) {
            let mut pipe = redis::pipe();
            for (field, value) in chunk {
                pipe.cmd("HSET").arg(key).arg(field).arg(value).ignore();
            }
            pipe.query::<()>(&mut self.con)?;
        }
        Ok(())
    }

    fn list_push(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        cmd("LPUSH").arg(key).arg(value).query::<()>(&mut self.con)?;
        Ok(())
    }

    fn enqueue_dedup(
        &mut self,
        filter_key: &str,
        list_key: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        let added: i64 = self
            .enqueue_script
            .key(filter_key)
            .key(list_key)
            .arg(value)
            .invoke(&mut self.con)?;
        Ok(added > 0)
    }

    fn blocking_pop(
        &mut self,
        key: &str,
        timeout_secs: u64,
    ) -> Result<Option<String>, StoreError> {
        let reply: Option<(String, String)> = cmd("BRPOP")
            .arg(key)
            .arg(timeout_secs)
            .query(&mut self.con)?;
        Ok(reply.map(|(_, value)| value))
    }

    fn counter_incr(&mut self, key: &str) -> Result<i64, StoreError> {
        Ok(cmd("INCR").arg(key).query(&mut self.con)?)
    }

    fn counter_decr(&mut self, key: &str) -> Result<i64, StoreError> {
        Ok(cmd("DECR").arg(key).query(&mut self.con)?)
    }

    fn counter_reset(&mut self, key: &str) -> Result<(), StoreError> {
        cmd("SET").arg(key).arg(0).query::<()>(&mut self.con)?;
        Ok(())
    }

    fn publish(&mut self, channel: &str, message: &str) -> Result<(), StoreError> {
        cmd("PUBLISH").arg(channel).arg(message).query::<()>(&mut self.con)?;
        Ok(())
    }

    fn expire(&mut self, key: &str, seconds: u64) -> Result<(), StoreError> {
        cmd("EXPIRE").arg(key).arg(seconds).query::<()>(&mut self.con)?;
        Ok(())
    }

    fn delete(&mut self, keys: &[&str]) -> Result<(), StoreError> {
        cmd("DEL").arg(keys).query::<()>(&mut self.con)?;
        Ok(())
    }
}
