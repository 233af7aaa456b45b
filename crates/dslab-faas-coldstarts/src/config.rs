//! Analysis parameters.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::coldstart::check_keepalive;
use crate::error::AnalysisError;
use crate::periodicity::check_tolerance;

fn default_keepalive() -> f64 {
    60.
}

fn default_tolerance() -> f64 {
    100.
}

fn default_one() -> usize {
    1
}

/// YAML-serializable config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawConfig {
    /// Seconds an instance remains alive after its invocation ends.
    #[serde(default = "default_keepalive")]
    pub keepalive: f64,
    /// Tolerance for grouping inter-arrival intervals, in milliseconds.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Number of simulation threads, 1 runs everything on the calling thread.
    #[serde(default = "default_one")]
    pub workers: usize,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            keepalive: default_keepalive(),
            tolerance: default_tolerance(),
            workers: default_one(),
        }
    }
}

impl RawConfig {
    pub fn into_config(self) -> Result<AnalysisConfig, AnalysisError> {
        AnalysisConfig::new(self.keepalive * 1000., self.tolerance, self.workers)
    }
}

/// Validated analysis parameters, all times in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalysisConfig {
    pub keepalive_ms: f64,
    pub tolerance_ms: f64,
    pub workers: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            keepalive_ms: default_keepalive() * 1000.,
            tolerance_ms: default_tolerance(),
            workers: default_one(),
        }
    }
}

impl AnalysisConfig {
    pub fn new(keepalive_ms: f64, tolerance_ms: f64, workers: usize) -> Result<Self, AnalysisError> {
        let config = Self {
            keepalive_ms,
            tolerance_ms,
            workers,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        check_keepalive(self.keepalive_ms)?;
        check_tolerance(self.tolerance_ms)?;
        if self.workers == 0 {
            return Err(AnalysisError::invalid_parameter(
                "workers",
                0.,
                "at least one worker is required",
            ));
        }
        Ok(())
    }

    pub fn from_yaml(path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_reader(File::open(path)?)?;
        Ok(raw.into_config()?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to open config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}
