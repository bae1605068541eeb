//! Configuration for the undo/redo coordinator.

use crate::error::{HistoryError, Result};
use serde::{Deserialize, Serialize};

/// Coordinator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoRedoConfig {
    /// Maximum number of history entries kept; the oldest is evicted first.
    pub max_stored_changes: usize,
}

impl Default for UndoRedoConfig {
    fn default() -> Self {
        Self {
            max_stored_changes: 64,
        }
    }
}

impl UndoRedoConfig {
    /// Start building a config.
    pub fn builder() -> UndoRedoConfigBuilder {
        UndoRedoConfigBuilder::new()
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config values.
    pub fn validate(&self) -> Result<()> {
        if self.max_stored_changes == 0 {
            return Err(HistoryError::InvalidConfig(
                "max_stored_changes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`UndoRedoConfig`].
#[derive(Clone, Debug, Default)]
pub struct UndoRedoConfigBuilder {
    config: UndoRedoConfig,
}

impl UndoRedoConfigBuilder {
    /// Create a builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the history capacity.
    pub fn max_stored_changes(mut self, max: usize) -> Self {
        self.config.max_stored_changes = max;
        self
    }

    /// Validate and return the config.
    pub fn build(self) -> Result<UndoRedoConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
