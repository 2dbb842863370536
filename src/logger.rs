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

//! The store-backed operational log sink.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::store::{Store, StoreError};

/// Severity of an operational log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debugging detail.
    Debug,
    /// Informational.
    Info,
    /// Normal operational notice.
    Notice,
    /// Something looks wrong, processing continues.
    Warn,
    /// Something failed.
    Error,
}

impl LogLevel {
    /// The level tag as it appears on the wire.
    fn tag(&self) -> &'static str {
        match self {
            LogLevel::Debug => "LOG_DEBUG",
            LogLevel::Info => "LOG_INFO",
            LogLevel::Notice => "LOG_NOTICE",
            LogLevel::Warn => "LOG_WARN",
            LogLevel::Error => "LOG_ERROR",
        }
    }
}

/// Operational logger bound to a log stream and an instance id.
///
/// On construction the logger probes `logsink:<logkey>:operate`. If a sink is operating, messages
/// are pushed onto the `logger:<logkey>` list as `<unix-ts>:<id>:<LEVEL>::<text>`; otherwise they
/// fall back to the process logger.
#[derive(Debug, Clone)]
pub struct Logger {
    /// Name of the log stream.
    logkey: String,
    /// Identifies this worker instance in the stream.
    id: String,
    /// Whether a sink was operating when the logger was created.
    sink: bool,
}

impl Logger {
    /// Create a logger for the stream `logkey`, identifying as `id`.
    pub fn new<S: Store>(
        store: &mut S,
        logkey: &str,
        id: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let sink = store.exists(&format!("logsink:{logkey}:operate"))?;
        if !sink {
            log::info!("No logsink appears to be established for this log stream. Falling back to the process logger.");
        }
        Ok(Self {
            logkey: logkey.to_string(),
            id: id.into(),
            sink,
        })
    }

    /// Emit a message at the given level.
    pub fn log<S: Store>(&self, store: &mut S, level: LogLevel, msg: &str) {
        if !self.sink {
            match level {
                LogLevel::Debug => log::debug!("{msg}"),
                LogLevel::Info | LogLevel::Notice => log::info!("{msg}"),
                LogLevel::Warn => log::warn!("{msg}"),
                LogLevel::Error => log::error!("{msg}"),
            }
            return;
        }
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let line = format!("{ts}:{}:{}::{msg}", self.id, level.tag());
        if let Err(e) = self.push(store, &line) {
            log::warn!("Cannot reach the log sink ({e}); message was: {msg}");
        }
    }

    /// Emit an operational notice.
    pub fn notice<S: Store>(&self, store: &mut S, msg: &str) {
        self.log(store, LogLevel::Notice, msg)
    }

    /// Emit a warning.
    pub fn warn<S: Store>(&self, store: &mut S, msg: &str) {
        self.log(store, LogLevel::Warn, msg)
    }

    /// Push a formatted line onto the sink list.
    fn push<S: Store>(&self, store: &mut S, line: &str) -> Result<(), StoreError> {
        store.list_push(&format!("logger:{}", self.logkey), line)
    }
}
