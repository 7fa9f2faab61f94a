use std::convert::TryFrom;
use std::time::SystemTime;

use rusoto_logs::InputLogEvent;
use tracing_core::{Level, Metadata};

/// A log record handed to a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub created: SystemTime,
    pub level: Option<Level>,
    pub target: Option<String>,
    pub message: String,
}

impl LogRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            created: SystemTime::now(),
            level: None,
            target: None,
            message: message.into(),
        }
    }

    pub fn with_created(mut self, created: SystemTime) -> Self {
        self.created = created;
        self
    }

    pub fn with_metadata(mut self, metadata: &Metadata<'_>) -> Self {
        self.level = Some(*metadata.level());
        self.target = Some(metadata.target().to_string());
        self
    }

    /// Creation time as unix milliseconds, negative before the epoch.
    pub fn timestamp_millis(&self) -> i64 {
        match self.created.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(duration) => i64::try_from(duration.as_millis()).unwrap_or(i64::MAX),
            Err(err) => -i64::try_from(err.duration().as_millis()).unwrap_or(i64::MAX),
        }
    }

    pub(crate) fn into_event<F>(self, format: &F) -> InputLogEvent
    where
        F: Fn(&LogRecord) -> String + ?Sized,
    {
        InputLogEvent {
            timestamp: self.timestamp_millis(),
            message: format(&self),
        }
    }
}

/// Boxed record formatter, the default type parameter of the builder.
pub type BoxFormat = Box<dyn Fn(&LogRecord) -> String + Send + Sync>;

/// Passes the message through untouched.
pub fn message_only(record: &LogRecord) -> String {
    record.message.clone()
}
