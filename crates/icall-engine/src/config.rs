//! Dispatch configuration (icall.toml)
//!
//! ```toml
//! on-unresolved = "panic"
//! check-return-kinds = true
//! trace-calls = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::fatal::FatalAction;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Runtime knobs for the dispatch table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DispatchConfig {
    /// Escalation for fatal dispatch errors: a token missing at a live call
    /// site, or a table that fails to build in
    /// [`RegistrySlot::initialize_or_escalate`](crate::RegistrySlot::initialize_or_escalate)
    #[serde(default)]
    pub on_unresolved: FatalAction,

    /// Check that Mixed natives return their declared kind
    #[serde(default = "default_check_return_kinds")]
    pub check_return_kinds: bool,

    /// Log every dispatch at trace level
    #[serde(default)]
    pub trace_calls: bool,
}

fn default_check_return_kinds() -> bool {
    cfg!(debug_assertions)
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            on_unresolved: FatalAction::default(),
            check_return_kinds: default_check_return_kinds(),
            trace_calls: false,
        }
    }
}

impl DispatchConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
