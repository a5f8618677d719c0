//! The exportable summary of a review session.
//!
//! [`SessionReport`] serializes to the results JSON consumed by downstream
//! tooling:
//!
//! ```json
//! {
//!   "likedImages": ["a.png"],
//!   "dislikedImages": ["b.png"],
//!   "timestamp": "2024-05-01T12:00:00.000Z",
//!   "totalImages": 2,
//!   "totalExpected": 2,
//!   "totalLiked": 1,
//!   "totalDisliked": 1
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::item::Outcome;
use crate::session::Decision;

/// Summary of a session's decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    /// Names of liked items, in decision order.
    pub liked_images: Vec<String>,

    /// Names of disliked items, in decision order.
    pub disliked_images: Vec<String>,

    /// When this report was generated.
    #[serde(with = "iso8601")]
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Number of items actually available in the session.
    pub total_images: usize,

    /// Number of items originally expected.
    pub total_expected: usize,

    /// Number of liked items.
    pub total_liked: usize,

    /// Number of disliked items.
    pub total_disliked: usize,
}

impl SessionReport {
    /// Build a report from decisions, stamped with the current time.
    #[must_use]
    pub fn from_decisions(
        decisions: &[Decision],
        total_images: usize,
        total_expected: usize,
    ) -> Self {
        let names_for = |outcome: Outcome| -> Vec<String> {
            decisions
                .iter()
                .filter(|d| d.outcome == outcome)
                .map(|d| d.name.clone())
                .collect()
        };
        let liked_images = names_for(Outcome::Liked);
        let disliked_images = names_for(Outcome::Disliked);

        Self {
            total_liked: liked_images.len(),
            total_disliked: disliked_images.len(),
            liked_images,
            disliked_images,
            timestamp: chrono::Utc::now(),
            total_images,
            total_expected,
        }
    }

    /// Number of decisions covered by this report.
    #[must_use]
    pub fn total_decided(&self) -> usize {
        self.total_liked + self.total_disliked
    }

    /// Whether fewer items were available than expected.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.total_images < self.total_expected
    }

    /// Date stamp (`YYYY-MM-DD`) used in artifact file names.
    #[must_use]
    pub fn date_stamp(&self) -> String {
        self.timestamp.format("%Y-%m-%d").to_string()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a report from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ISO-8601 with millisecond precision and a `Z` suffix.
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
