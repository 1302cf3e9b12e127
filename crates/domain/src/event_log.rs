use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One human-readable step description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogEntry {
    message: String,
    recorded_at: DateTime<Utc>,
}

impl EventLogEntry {
    /// Returns the step description.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns when the entry was appended.
    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Ordered, append-only record of attempted governance steps.
///
/// Entries are appended before a step runs, so the last entry names the step
/// that failed or is still in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<EventLogEntry>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry stamped with the current time.
    pub fn record(&mut self, message: impl Into<String>) {
        self.entries.push(EventLogEntry {
            message: message.into(),
            recorded_at: Utc::now(),
        });
    }

    /// Returns all entries in append order.
    #[must_use]
    pub fn entries(&self) -> &[EventLogEntry] {
        self.entries.as_slice()
    }

    /// Returns entry messages in append order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(EventLogEntry::message).collect()
    }

    /// Returns the most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&EventLogEntry> {
        self.entries.last()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::EventLog;

    #[test]
    fn entries_keep_append_order() {
        let mut log = EventLog::new();
        log.record("first");
        log.record("second");

        assert_eq!(log.messages(), vec!["first", "second"]);
        assert_eq!(log.last().map(|entry| entry.message()), Some("second"));
        assert!(log.entries()[0].recorded_at() <= log.entries()[1].recorded_at());
    }
}
