//! Accumulating publish log
//!
//! Every publish step writes into a [`PublishLog`] whose transcript is handed back to
//! the caller, for dry runs and real runs alike. A console log additionally mirrors
//! each line to `tracing`; a quiet log only accumulates.

use serde::{Deserialize, Serialize};

/// Level of a single log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

/// One accumulated log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Transcript of everything a publish or command run logged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishLog {
    entries: Vec<LogEntry>,
    #[serde(skip)]
    echo: bool,
}

impl PublishLog {
    /// Log that only accumulates
    pub fn quiet() -> Self {
        Self {
            entries: Vec::new(),
            echo: false,
        }
    }

    /// Log that accumulates and also emits every line as a tracing event
    pub fn console() -> Self {
        Self {
            entries: Vec::new(),
            echo: true,
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.echo {
            tracing::info!("{}", message);
        }
        self.entries.push(LogEntry {
            level: LogLevel::Info,
            message,
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.echo {
            tracing::error!("{}", message);
        }
        self.entries.push(LogEntry {
            level: LogLevel::Error,
            message,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// All messages in the order they were logged
    pub fn lines(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn infos(&self) -> Vec<&str> {
        self.messages_at(LogLevel::Info)
    }

    pub fn errors(&self) -> Vec<&str> {
        self.messages_at(LogLevel::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }

    /// Append another log's lines, e.g. when a batch collects per-package logs
    pub fn extend(&mut self, other: PublishLog) {
        self.entries.extend(other.entries);
    }

    /// Newline-joined transcript
    pub fn transcript(&self) -> String {
        self.lines().join("\n")
    }

    fn messages_at(&self, level: LogLevel) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.as_str())
            .collect()
    }
}
