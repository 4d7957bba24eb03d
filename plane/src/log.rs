//! In-app log panel: a bounded list of user-facing messages.
//!
//! DESIGN
//! ======
//! The panel keeps the most recent [`LOG_PANEL_CAP`] entries, oldest evicted
//! first. Every entry is also emitted as a `tracing` event so the terminal
//! log and the panel never disagree. `Success` has no `tracing` level of its
//! own and goes out at `info`.

#[cfg(test)]
#[path = "log_test.rs"]
mod log_test;

use std::collections::VecDeque;
use std::fmt;

use tracing::{error, info, warn};

use crate::consts::LOG_PANEL_CAP;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "OK",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.label(), self.message)
    }
}

/// Bounded message buffer backing the log panel.
#[derive(Debug, Clone, Default)]
pub struct LogPanel {
    entries: VecDeque<LogEntry>,
}

impl LogPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, evicting the oldest one at capacity.
    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info => info!(panel = true, "{message}"),
            LogLevel::Success => info!(panel = true, success = true, "{message}"),
            LogLevel::Warning => warn!(panel = true, "{message}"),
            LogLevel::Error => error!(panel = true, "{message}"),
        }
        if self.entries.len() >= LOG_PANEL_CAP {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry { level, message });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    #[must_use]
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
