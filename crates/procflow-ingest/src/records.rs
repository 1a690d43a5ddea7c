//! Typed records produced by ingestion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed transition instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub case_id: i64,
    pub from: String,
    pub to: String,
    /// Source-provided happy-path flag (false when the column is not bound).
    #[serde(default)]
    pub happy_path: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl ActivityEvent {
    pub fn new(case_id: i64, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            case_id,
            from: from.into(),
            to: to.into(),
            happy_path: false,
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn flagged(mut self) -> Self {
        self.happy_path = true;
        self
    }
}

/// One timestamped activity occurrence in an event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub case_id: i64,
    pub activity_name: String,
    pub timestamp: DateTime<Utc>,
}

impl Activity {
    pub fn new(case_id: i64, activity_name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            case_id,
            activity_name: activity_name.into(),
            timestamp,
        }
    }
}
