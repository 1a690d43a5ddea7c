//! User-facing visual settings.
//!
//! Settings are grouped into objects the way the host's format pane shows
//! them. Only `relationships.percentageThreshold` affects the graph model;
//! `view.preserveZoom` selects the zoom policy of the visual.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const OBJECT_RELATIONSHIPS: &str = "relationships";
pub const OBJECT_VIEW: &str = "view";

pub const DEFAULT_PERCENTAGE_THRESHOLD: f64 = 0.0;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("percentage threshold must be within 0..=100, got {0}")]
    ThresholdOutOfRange(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipSettings {
    /// Edges whose rounded percentage-of-cases is below this are hidden.
    pub percentage_threshold: f64,
}

impl Default for RelationshipSettings {
    fn default() -> Self {
        Self {
            percentage_threshold: DEFAULT_PERCENTAGE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewSettings {
    pub preserve_zoom: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    pub relationships: RelationshipSettings,
    pub view: ViewSettings,
}

/// One enumerated property: what the format pane would display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingProperty {
    pub object: &'static str,
    pub property: &'static str,
    pub value: Value,
    pub default: Value,
}

impl VisualSettings {
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let t = self.relationships.percentage_threshold;
        if !t.is_finite() || !(0.0..=100.0).contains(&t) {
            return Err(SettingsError::ThresholdOutOfRange(t));
        }
        Ok(())
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, SettingsError> {
        self.relationships.percentage_threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    pub fn threshold(&self) -> f64 {
        self.relationships.percentage_threshold
    }

    /// Properties of one settings object with current and default values.
    ///
    /// Unknown object names enumerate nothing.
    pub fn enumerate(&self, object_name: &str) -> Vec<SettingProperty> {
        match object_name {
            OBJECT_RELATIONSHIPS => vec![SettingProperty {
                object: OBJECT_RELATIONSHIPS,
                property: "percentageThreshold",
                value: Value::from(self.relationships.percentage_threshold),
                default: Value::from(DEFAULT_PERCENTAGE_THRESHOLD),
            }],
            OBJECT_VIEW => vec![SettingProperty {
                object: OBJECT_VIEW,
                property: "preserveZoom",
                value: Value::from(self.view.preserve_zoom),
                default: Value::from(false),
            }],
            _ => Vec::new(),
        }
    }

    pub fn enumerate_all(&self) -> Vec<SettingProperty> {
        [OBJECT_RELATIONSHIPS, OBJECT_VIEW]
            .into_iter()
            .flat_map(|o| self.enumerate(o))
            .collect()
    }
}
