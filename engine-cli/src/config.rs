//! YAML-driven configuration, adapted from the teacher driver's `shared::Config`
//! pattern: deserialize with `serde_yaml`, then reject anything semantically
//! invalid at construction rather than lazily when the engine first trips
//! over it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use engine::{CountingSystem, RuleSet};

use crate::error::CliError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub rules: RuleSet,
    #[serde(default = "default_counting_system")]
    pub counting_system: CountingSystem,
    /// Fixes the shoe's RNG for reproducible sessions; omit for real play.
    pub seed: Option<u64>,
    #[serde(default = "default_starting_bankroll_cents")]
    pub starting_bankroll_cents: i64,
    #[serde(default = "default_bet_unit_cents")]
    pub bet_unit_cents: i64,
}

fn default_counting_system() -> CountingSystem {
    CountingSystem::HiLo
}

fn default_starting_bankroll_cents() -> i64 {
    100_000
}

fn default_bet_unit_cents() -> i64 {
    1_000
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            rules: RuleSet::default(),
            counting_system: default_counting_system(),
            seed: None,
            starting_bankroll_cents: default_starting_bankroll_cents(),
            bet_unit_cents: default_bet_unit_cents(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        let config: AppConfig =
            serde_yaml::from_str(&text).map_err(|source| CliError::ConfigParse {
                path: path.display().to_string(),
                source,
            })?;
        config.rules.validate()?;
        if config.bet_unit_cents <= 0 {
            return Err(CliError::Engine(engine::EngineError::configuration(
                "bet_unit_cents must be positive",
            )));
        }
        Ok(config)
    }

    /// `~/.config/bj-trainer/config.yaml`, matching the teacher driver's use
    /// of the `home` crate to locate a per-user config directory.
    pub fn default_path() -> Option<PathBuf> {
        home::home_dir().map(|home| home.join(".config/bj-trainer/config.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AppConfig::default().rules.validate().is_ok());
    }

    #[test]
    fn load_rejects_missing_file() {
        let result = AppConfig::load(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(CliError::ConfigRead { .. })));
    }
}
