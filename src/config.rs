use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::{BriscolaError, Result};
use crate::games::briscola::cards::{Seat, TRICKS_PER_GAME};
use crate::policy::PolicyKind;
use crate::training::EvaluationSettings;
use crate::utils::parse_seed;

/// Settings for one simulation run. Every field has a default, so a config
/// file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SimulationConfig {
    pub n_games: usize,
    pub n_hands: usize,
    #[serde(deserialize_with = "deserialize_seed")]
    pub base_seed: u64,
    pub current_player: Seat,
    pub other_player: Seat,
    pub current_policy: PolicyKind,
    pub other_policy: PolicyKind,
    pub model_path: Option<PathBuf>,
    pub hidden_size: usize,
    pub output: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_games: 2048,
            n_hands: TRICKS_PER_GAME,
            base_seed: 0,
            current_player: Seat::Player0,
            other_player: Seat::Player1,
            current_policy: PolicyKind::Scripted,
            other_policy: PolicyKind::Scripted,
            model_path: None,
            hidden_size: 256,
            output: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeedValue {
    Number(u64),
    Text(String),
}

fn deserialize_seed<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match SeedValue::deserialize(deserializer)? {
        SeedValue::Number(seed) => Ok(seed),
        SeedValue::Text(text) => parse_seed(&text).map_err(serde::de::Error::custom),
    }
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_games == 0 {
            return Err(BriscolaError::InvalidConfig(
                "n_games must be at least 1".to_string(),
            ));
        }
        if self.n_hands != TRICKS_PER_GAME {
            return Err(BriscolaError::InvalidConfig(format!(
                "n_hands must be {} (one per trick), got {}",
                TRICKS_PER_GAME, self.n_hands
            )));
        }
        if self.current_player == self.other_player {
            return Err(BriscolaError::InvalidConfig(format!(
                "both policies are seated at {}",
                self.current_player
            )));
        }
        if self.hidden_size == 0 {
            return Err(BriscolaError::InvalidConfig(
                "hidden_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn evaluation_settings(&self) -> EvaluationSettings {
        EvaluationSettings {
            n_games: self.n_games,
            n_hands: self.n_hands,
            base_seed: self.base_seed,
            current_player: self.current_player,
            other_player: self.other_player,
        }
    }
}
