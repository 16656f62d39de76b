//! The settings document the reward matrix is persisted in
//!
//! Settings are grouped by scope (one per bot language or deployment).
//! The whole document is saved as a unit.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matrix::Matrix;

/// Settings for one configuration scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSettings {
    /// Referral reward schedule
    #[serde(default)]
    pub reward_matrix: Matrix,
    /// Display name of the reward unit
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub currency: String,
}

/// Every scope's settings, saved and loaded as one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDocument {
    /// Settings keyed by scope name
    #[serde(default)]
    pub scopes: BTreeMap<String, ScopeSettings>,
    /// When the document was last saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SettingsDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings for `scope`, if present
    pub fn scope(&self, scope: &str) -> Option<&ScopeSettings> {
        self.scopes.get(scope)
    }

    /// Settings for `scope`, created with defaults when missing
    pub fn scope_mut(&mut self, scope: &str) -> &mut ScopeSettings {
        self.scopes.entry(scope.to_string()).or_default()
    }

    /// Make sure every scope in `scopes` exists. Returns true if any was added.
    pub fn ensure_scopes<S: AsRef<str>>(&mut self, scopes: &[S]) -> bool {
        let mut added = false;
        for scope in scopes {
            if !self.scopes.contains_key(scope.as_ref()) {
                self.scopes
                    .insert(scope.as_ref().to_string(), ScopeSettings::default());
                added = true;
            }
        }
        added
    }

    /// Check the reward matrix of every scope
    pub fn check(&self) -> Result<()> {
        for settings in self.scopes.values() {
            settings.reward_matrix.check()?;
        }
        Ok(())
    }
}
