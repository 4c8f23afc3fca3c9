use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hyperparameters of the self-play agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Probability of replacing the learned values with noise for one decision.
    pub exploration_rate: f32,
    pub learning_rate: f32,
    pub discount: f32,
    /// Disables exploration and learning.
    pub is_play: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub episodes: usize,
    pub log_every: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub training: TrainingConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            exploration_rate: 0.3,
            learning_rate: 0.3,
            discount: 0.99,
            is_play: false,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            episodes: 2_000,
            log_every: 1_000,
        }
    }
}

impl AgentConfig {
    /// Same hyperparameters with exploration and learning switched off.
    pub fn for_play(&self) -> Self {
        AgentConfig {
            is_play: true,
            ..self.clone()
        }
    }
}

impl Config {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rates = [
            ("agent.exploration_rate", self.agent.exploration_rate),
            ("agent.learning_rate", self.agent.learning_rate),
            ("agent.discount", self.agent.discount),
        ];
        for (name, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!("{name} must be in [0, 1]")));
            }
        }
        if self.training.episodes == 0 {
            return Err(ConfigError::Validation(
                "training.episodes must be > 0".into(),
            ));
        }
        if self.training.log_every == 0 {
            return Err(ConfigError::Validation(
                "training.log_every must be > 0".into(),
            ));
        }
        Ok(())
    }
}
