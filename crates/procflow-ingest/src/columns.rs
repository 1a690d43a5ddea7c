//! Column roles and the explicit role → index mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::IngestError;
use crate::table::ColumnMeta;

/// What a bound column means to the visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnRole {
    CaseId,
    From,
    To,
    Activity,
    HappyPath,
    Duration,
    Timestamp,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 7] = [
        ColumnRole::CaseId,
        ColumnRole::From,
        ColumnRole::To,
        ColumnRole::Activity,
        ColumnRole::HappyPath,
        ColumnRole::Duration,
        ColumnRole::Timestamp,
    ];

    /// Binding name used by data-binding configuration (`caseId`, `from`, ...).
    pub fn binding_name(self) -> &'static str {
        match self {
            ColumnRole::CaseId => "caseId",
            ColumnRole::From => "from",
            ColumnRole::To => "to",
            ColumnRole::Activity => "activity",
            ColumnRole::HappyPath => "isHappyPath",
            ColumnRole::Duration => "duration",
            ColumnRole::Timestamp => "timestamp",
        }
    }

    pub fn parse(s: &str) -> Result<Self, IngestError> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.binding_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| IngestError::UnknownRole(wanted.to_string()))
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binding_name())
    }
}

/// The two data shapes the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataShape {
    /// Pre-aggregated `(case, from, to)` transition rows.
    Transitions,
    /// Timestamped `(case, activity, timestamp)` events.
    EventLog,
}

/// Resolved role → column index mapping for one table layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    indices: BTreeMap<ColumnRole, usize>,
}

impl ColumnMapping {
    /// Build the mapping from the roles the data binding put on each column.
    pub fn resolve(columns: &[ColumnMeta]) -> Result<Self, IngestError> {
        let mut indices = BTreeMap::new();
        for (idx, column) in columns.iter().enumerate() {
            for role in &column.roles {
                if let Some(prev) = indices.insert(*role, idx) {
                    return Err(IngestError::DuplicateRole {
                        role: *role,
                        first: columns[prev].name.clone(),
                        second: column.name.clone(),
                    });
                }
            }
        }
        Ok(Self { indices })
    }

    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        self.indices.get(&role).copied()
    }

    pub fn has(&self, role: ColumnRole) -> bool {
        self.indices.contains_key(&role)
    }

    pub fn require(&self, role: ColumnRole) -> Result<usize, IngestError> {
        self.get(role).ok_or(IngestError::MissingRole(role))
    }

    /// Column holding activity names in event-log shape.
    ///
    /// Falls back to the `From` column when no dedicated activity column is bound.
    pub fn activity_column(&self) -> Option<usize> {
        self.get(ColumnRole::Activity)
            .or_else(|| self.get(ColumnRole::From))
    }

    /// Pick the ingestion strategy from the bound columns.
    ///
    /// A bound from/to pair without a dedicated activity column is a
    /// pre-joined transitions table even when a timestamp is also bound.
    /// Event-log shape needs a timestamp plus either an activity column or a
    /// lone `From` column.
    pub fn shape(&self) -> Result<DataShape, IngestError> {
        self.require(ColumnRole::CaseId)?;
        let has_pair = self.has(ColumnRole::From) && self.has(ColumnRole::To);
        if self.has(ColumnRole::Timestamp) && (self.has(ColumnRole::Activity) || !has_pair) {
            if self.activity_column().is_none() {
                return Err(IngestError::MissingRole(ColumnRole::Activity));
            }
            return Ok(DataShape::EventLog);
        }
        self.require(ColumnRole::From)?;
        self.require(ColumnRole::To)?;
        if self.has(ColumnRole::Timestamp) {
            tracing::debug!("timestamp column ignored for a from/to transitions table");
        }
        Ok(DataShape::Transitions)
    }
}
