//! Data binding: which named column plays which role.
//!
//! This is the configuration side of the column contract. A binding maps each
//! role to a column *name*; [`ColumnBinding::apply`] tags the matching headers
//! so ingestion can resolve an explicit role → index mapping.

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;

use procflow_ingest::{ColumnMeta, ColumnRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    names: BTreeMap<ColumnRole, String>,
}

impl Default for ColumnBinding {
    /// Each role bound to the column carrying its binding name.
    fn default() -> Self {
        let names = ColumnRole::ALL
            .into_iter()
            .map(|r| (r, r.binding_name().to_string()))
            .collect();
        Self { names }
    }
}

impl ColumnBinding {
    /// Default binding with `role=Column` overrides, e.g. `caseId=Order No`.
    pub fn with_overrides<S: AsRef<str>>(overrides: &[S]) -> Result<Self> {
        let mut binding = Self::default();
        for entry in overrides {
            let entry = entry.as_ref();
            let (role, column) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("invalid binding `{entry}` (expected role=Column)"))?;
            let column = column.trim();
            if column.is_empty() {
                return Err(anyhow!("invalid binding `{entry}`: empty column name"));
            }
            binding.bind(ColumnRole::parse(role)?, column);
        }
        Ok(binding)
    }

    pub fn bind(&mut self, role: ColumnRole, column: impl Into<String>) {
        self.names.insert(role, column.into());
    }

    pub fn column_for(&self, role: ColumnRole) -> Option<&str> {
        self.names.get(&role).map(String::as_str)
    }

    /// Tag headers with the roles bound to them (case-insensitive name match).
    pub fn apply(&self, headers: &[String]) -> Vec<ColumnMeta> {
        headers
            .iter()
            .map(|h| {
                let roles = self
                    .names
                    .iter()
                    .filter(|(_, name)| name.eq_ignore_ascii_case(h.trim()))
                    .map(|(role, _)| *role)
                    .collect();
                ColumnMeta::new(h.clone(), roles)
            })
            .collect()
    }
}
