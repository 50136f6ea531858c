//! Configuration for accumerge
//!
//! Centralized merge configuration with sensible defaults.

use crate::error::{AccumergeError, Result};
use crate::merge::MatchingKeyPolicy;

/// Configuration for a [`SortedMerger`](crate::merge::SortedMerger)
#[derive(Debug, Clone)]
pub struct MergerConfig {
    // -------------------------------------------------------------------------
    // Merge Behaviour
    // -------------------------------------------------------------------------
    /// Policy used by the `SortedMerger::*_default` merge methods
    pub default_policy: MatchingKeyPolicy,

    /// Initial number of cursor slots in a merge working set.
    /// The working set doubles when more sources are active.
    pub initial_cursor_capacity: usize,

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------
    /// Check that every source yields strictly increasing keys
    pub validate_sorted: bool,

    /// Check that every source yields exactly as many entries as its hint
    pub validate_size_hints: bool,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            default_policy: MatchingKeyPolicy::DontCare,
            initial_cursor_capacity: 8,
            validate_sorted: false,
            validate_size_hints: false,
        }
    }
}

impl MergerConfig {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Whether any per-entry validation is enabled
    pub fn validates(&self) -> bool {
        self.validate_sorted || self.validate_size_hints
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.initial_cursor_capacity == 0 {
            return Err(AccumergeError::Config(
                "initial_cursor_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for MergerConfig
#[derive(Default)]
pub struct ConfigBuilder {
    config: MergerConfig,
}

impl ConfigBuilder {
    /// Set the policy used when none is given explicitly
    pub fn default_policy(mut self, policy: MatchingKeyPolicy) -> Self {
        self.config.default_policy = policy;
        self
    }

    /// Set the initial cursor capacity of merge working sets
    pub fn initial_cursor_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_cursor_capacity = capacity;
        self
    }

    /// Enable or disable strict sortedness checks on sources
    pub fn validate_sorted(mut self, enabled: bool) -> Self {
        self.config.validate_sorted = enabled;
        self
    }

    /// Enable or disable size hint checks on sources
    pub fn validate_size_hints(mut self, enabled: bool) -> Self {
        self.config.validate_size_hints = enabled;
        self
    }

    pub fn build(self) -> MergerConfig {
        self.config
    }
}
