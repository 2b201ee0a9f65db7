use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for progression and battle rules. Every field has a default, so a
/// RON file only needs to list what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_level: u8,
    /// Experience granted per level of a defeated enemy.
    pub exp_per_enemy_level: u32,
    pub trainer_exp_multiplier: f64,
    pub allow_escape_from_trainer: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_level: 100,
            exp_per_enemy_level: 15,
            trainer_exp_multiplier: 1.5,
            allow_escape_from_trainer: false,
        }
    }
}

impl EngineConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_level == 0 {
            return Err(ConfigError::Invalid("max_level must be at least 1".to_string()));
        }
        if !(self.trainer_exp_multiplier.is_finite() && self.trainer_exp_multiplier >= 0.0) {
            return Err(ConfigError::Invalid(
                "trainer_exp_multiplier must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}
