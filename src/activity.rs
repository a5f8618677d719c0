//! Operator-facing activity log.

use chrono::{DateTime, Local};
use tracing::info;

/// One timestamped log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    /// Local wall-clock time of the entry.
    pub at: DateTime<Local>,
    /// Message text.
    pub message: String,
}

impl ActivityEntry {
    /// Render as `HH:MM:SS: message`.
    #[must_use]
    pub fn line(&self) -> String {
        format!("{}: {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Append-only log of what happened during a session.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message stamped with the current local time.
    pub fn push(&mut self, message: impl Into<String>) {
        let entry = ActivityEntry {
            at: Local::now(),
            message: message.into(),
        };
        info!(target: "image_sorter::activity", "{}", entry.message);
        self.entries.push(entry);
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    /// Rendered lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ActivityEntry::line).collect()
    }

    /// Newline-joined log text.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines().join("\n")
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_render() {
        let mut log = ActivityLog::new();
        log.push("LIKED: a.png");
        log.push("DISLIKED: b.png");

        let lines = log.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(": LIKED: a.png"));
        // HH:MM:SS prefix
        assert_eq!(lines[0].as_bytes()[2], b':');
        assert_eq!(log.to_text().lines().count(), 2);
    }
}
