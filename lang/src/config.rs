use std::fmt;

use serde::Deserialize;

use mothball_core::{
    InertiaMode, PlayerState, DEFAULT_GROUND_SLIP, DEFAULT_INERTIA_THRESHOLD, DEFAULT_PRECISION,
};

use crate::error::EngineError;

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Engine settings; every field is optional in JSON.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Deepest allowed nesting of repeats, user functions and wrappers.
    pub max_depth: usize,
    pub precision: usize,
    pub ground_slip: f32,
    pub inertia_threshold: f64,
    pub inertia_single_axis: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            precision: DEFAULT_PRECISION,
            ground_slip: DEFAULT_GROUND_SLIP,
            inertia_threshold: DEFAULT_INERTIA_THRESHOLD,
            inertia_single_axis: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid engine config: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|err| ConfigError {
            message: err.to_string(),
        })
    }

    pub fn inertia_mode(&self) -> InertiaMode {
        if self.inertia_single_axis {
            InertiaMode::PerAxis
        } else {
            InertiaMode::Combined
        }
    }

    /// Writes the state-level settings into a fresh state.
    pub(crate) fn apply(&self, state: &mut PlayerState) -> Result<(), EngineError> {
        let precision = i64::try_from(self.precision).unwrap_or(i64::MAX);
        state.set_precision(precision)?;
        state.set_ground_slip(self.ground_slip)?;
        state.set_inertia(self.inertia_threshold, self.inertia_mode())?;
        Ok(())
    }
}
