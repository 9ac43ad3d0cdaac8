//! Checker configuration, loaded from TOML
//!
//! ```toml
//! liveness = "mounted"
//!
//! [capability]
//! scope = "ui"
//! name = "Context"
//!
//! [host]
//! scope = "ui"
//! name = "State"
//!
//! [[deferred]]
//! scope = "app"
//! owner = "Scheduler"
//! name = "later"
//! positional = [0]
//! ```
//!
//! Every field is optional. `[[deferred]]` entries are added to the built-in
//! table unless `replace_default_deferred` is set.

use crate::deferred::{DeferredTable, ProtectedFunction};
use crate::error::{ConfigError, Result};
use crate::tree::Decl;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A class identified by its declaring scope and name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeName {
    pub scope: String,
    pub name: String,
}

impl TypeName {
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        TypeName {
            scope: scope.into(),
            name: name.into(),
        }
    }

    pub fn matches(&self, decl: &Decl) -> bool {
        decl.name == self.name && decl.scope == self.scope
    }
}

/// What the checker protects and what guards it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// The volatile capability type
    pub capability: TypeName,
    /// The type whose getters hand out capabilities
    pub host: TypeName,
    /// Name of the boolean liveness getter on both types
    pub liveness: String,
    /// Extra deferring routines
    pub deferred: Vec<ProtectedFunction>,
    pub replace_default_deferred: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            capability: TypeName::new("ui", "Context"),
            host: TypeName::new("ui", "State"),
            liveness: "mounted".to_string(),
            deferred: Vec::new(),
            replace_default_deferred: false,
        }
    }
}

impl CheckerConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: CheckerConfig =
            toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (what, ty) in [("capability", &self.capability), ("host", &self.host)] {
            if ty.name.is_empty() || ty.scope.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{what} type needs a scope and a name"
                )));
            }
        }
        if self.liveness.is_empty() {
            return Err(ConfigError::Invalid(
                "liveness accessor name is empty".to_string(),
            ));
        }
        for entry in &self.deferred {
            if entry.scope.is_empty() {
                return Err(ConfigError::Invalid(
                    "deferred entry has an empty scope".to_string(),
                ));
            }
            if entry.positional.is_empty() && entry.named.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "deferred entry {}::{} protects no arguments",
                    entry.owner.as_deref().unwrap_or("<top-level>"),
                    entry.name.as_deref().unwrap_or("<unnamed>"),
                )));
            }
        }
        Ok(())
    }

    /// The effective deferred-callback table
    pub fn deferred_table(&self) -> DeferredTable {
        let mut table = if self.replace_default_deferred {
            DeferredTable::default()
        } else {
            DeferredTable::defaults()
        };
        table.extend(self.deferred.iter().cloned());
        table
    }
}
