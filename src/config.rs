use crate::error::AnalysisError;
use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to built-in defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.cleaning.max_velocity.is_finite() && self.cleaning.max_velocity > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "cleaning.max_velocity must be > 0, got {}",
                self.cleaning.max_velocity
            )));
        }
        if self.cycles.min_cycle_duration == 0 {
            return Err(AnalysisError::InvalidConfig(
                "cycles.min_cycle_duration must be >= 1".to_string(),
            ));
        }
        let non_negative = [
            ("cycles.prominence", self.cycles.prominence),
            ("contact.threshold_k", self.contact.threshold_k),
            ("contact.dominant_hand_delta", self.contact.dominant_hand_delta),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{} must be >= 0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
