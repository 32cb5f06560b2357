//! One-way notification sink for human-readable simulation events.
//!
//! Components push events on state transitions (rule changes, objective
//! completions, extinctions, births). Nothing reads them back to make
//! decisions; the log exists for players and for the save file.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How loudly an event should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Important,
    Success,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub tick: u64,
    pub severity: Severity,
    pub message: String,
}

/// Receiver of simulation events.
pub trait EventSink {
    fn emit(&mut self, tick: u64, severity: Severity, message: String);

    fn normal(&mut self, tick: u64, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(tick, Severity::Normal, message.into());
    }

    fn important(&mut self, tick: u64, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(tick, Severity::Important, message.into());
    }

    fn success(&mut self, tick: u64, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(tick, Severity::Success, message.into());
    }

    fn critical(&mut self, tick: u64, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(tick, Severity::Critical, message.into());
    }
}

pub const DEFAULT_LOG_CAPACITY: usize = 200;

/// Bounded event log. Every event is also mirrored to `tracing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    entries: VecDeque<LoggedEvent>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl EventLog {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    /// Rebuilds a log from persisted entries, keeping the newest ones.
    #[must_use]
    pub fn from_entries(entries: Vec<LoggedEvent>, capacity: usize) -> Self {
        let mut log = Self::with_capacity(capacity);
        for entry in entries {
            log.push(entry);
        }
        log
    }

    fn push(&mut self, entry: LoggedEvent) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LoggedEvent> {
        self.entries.iter()
    }

    /// Newest `n` events, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &LoggedEvent> {
        self.entries.iter().rev().take(n)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<LoggedEvent> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, tick: u64, severity: Severity, message: String) {
        match severity {
            Severity::Normal => tracing::debug!(tick, "{message}"),
            Severity::Important | Severity::Success => {
                tracing::info!(tick, severity = ?severity, "{message}")
            }
            Severity::Critical => tracing::error!(tick, "{message}"),
        }
        self.push(LoggedEvent {
            tick,
            severity,
            message,
        });
    }
}

/// Sink that drops everything, for callers that do not care about events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _tick: u64, _severity: Severity, _message: String) {}
}
