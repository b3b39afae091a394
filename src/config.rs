//! Configuration management for Koban

use crate::blockchain::{ConsensusParams, DEFAULT_DIFFICULTY, DEFAULT_REWARD};
use crate::error::{ChainError, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub consensus: ConsensusConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Peer addresses as `host:port`, targets of fire-and-forget broadcast.
    #[serde(default)]
    pub peers: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            bind_host: default_bind_host(),
            port: default_port(),
            peers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsensusConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
    #[serde(default = "default_reward")]
    pub reward: i64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        ConsensusConfig {
            difficulty: default_difficulty(),
            reward: default_reward(),
        }
    }
}

impl ConsensusConfig {
    pub fn params(&self) -> ConsensusParams {
        ConsensusParams {
            difficulty: self.difficulty,
            reward: self.reward,
        }
    }
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_difficulty() -> usize {
    DEFAULT_DIFFICULTY
}

fn default_reward() -> i64 {
    DEFAULT_REWARD
}

/// Loads configuration from a TOML file, falling back to defaults when the
/// file is absent. An unreadable or out-of-range configuration is an error;
/// better to refuse startup than to run a node with consensus constants that
/// disagree with the rest of the network.
pub fn load_config(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path).unwrap_or_default();
    let config: Config = if config_str.is_empty() {
        Config::default()
    } else {
        toml::from_str(&config_str)
            .map_err(|e| ChainError::Config(format!("Failed to parse {}: {}", path, e)))?
    };

    if config.consensus.difficulty == 0 || config.consensus.difficulty > 64 {
        return Err(ChainError::Config(format!(
            "consensus.difficulty must be between 1 and 64, got {}",
            config.consensus.difficulty
        )));
    }
    if config.consensus.reward <= 0 {
        return Err(ChainError::Config(format!(
            "consensus.reward must be positive, got {}",
            config.consensus.reward
        )));
    }
    if config.storage.data_dir.is_empty() {
        return Err(ChainError::Config(
            "storage.data_dir must not be empty".to_string(),
        ));
    }

    Ok(config)
}
