//! Structured trace of a protocol run, returned alongside the result.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Alice,
    Channel,
    HackerAlert,
    Bob,
    PublicChannel,
    Error,
    System,
    HackerDetected,
    Success,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::Alice => "ALICE",
            LogTag::Channel => "CHANNEL",
            LogTag::HackerAlert => "HACKER ALERT",
            LogTag::Bob => "BOB",
            LogTag::PublicChannel => "PUBLIC CHANNEL",
            LogTag::Error => "ERROR",
            LogTag::System => "SYSTEM",
            LogTag::HackerDetected => "HACKER DETECTED",
            LogTag::Success => "SUCCESS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub tag: LogTag,
    pub message: String,
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tag.as_str(), self.message)
    }
}

/// Rendered as `"[TAG] message"`.
impl Serialize for LogEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Append-only, ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProtocolLog {
    events: Vec<LogEvent>,
}

impl ProtocolLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: LogTag, message: impl Into<String>) {
        self.events.push(LogEvent {
            tag,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains_tag(&self, tag: LogTag) -> bool {
        self.events.iter().any(|e| e.tag == tag)
    }

    /// Each event rendered as `[TAG] message`.
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }
}
