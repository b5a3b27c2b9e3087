use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "BROADSIDE_CONFIG";

pub trait ConfigProvider: Send + Sync {
    fn game_config(&self) -> Arc<GameConfig>;
    fn server_config(&self) -> Arc<ServerConfig>;
}

/// Which slot holds the first turn once both players are ready.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstTurn {
    #[default]
    Player1,
    Player2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub max_ships_per_player: usize,
    pub ships_required_for_ready: usize,
    pub first_turn: FirstTurn,
    /// Seed for the `RAND` draws of item scripts, entropy when unset.
    pub script_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            max_ships_per_player: 10,
            ships_required_for_ready: 0,
            first_turn: FirstTurn::Player1,
            script_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub item_catalog_path: Option<PathBuf>,
    pub demo_room_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            item_catalog_path: None,
            demo_room_id: String::from("demo"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

static DEFAULT_GAME_CONFIG: Lazy<Arc<GameConfig>> = Lazy::new(|| Arc::new(GameConfig::default()));
static DEFAULT_SERVER_CONFIG: Lazy<Arc<ServerConfig>> =
    Lazy::new(|| Arc::new(ServerConfig::default()));

mod default {
    use std::sync::Arc;

    use crate::config_provider::{
        ConfigProvider, GameConfig, ServerConfig, DEFAULT_GAME_CONFIG, DEFAULT_SERVER_CONFIG,
    };

    pub struct DefaultConfigProvider;

    impl ConfigProvider for DefaultConfigProvider {
        fn game_config(&self) -> Arc<GameConfig> {
            DEFAULT_GAME_CONFIG.clone()
        }

        fn server_config(&self) -> Arc<ServerConfig> {
            DEFAULT_SERVER_CONFIG.clone()
        }
    }
}

/// Both sections of a YAML config file; missing keys fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub game: GameConfig,
    pub server: ServerConfig,
}

pub struct FileConfigProvider {
    game: Arc<GameConfig>,
    server: Arc<ServerConfig>,
}

impl FileConfigProvider {
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let cfg: FileConfig = serde_yaml::from_str(raw)?;
        Ok(FileConfigProvider {
            game: Arc::new(cfg.game),
            server: Arc::new(cfg.server),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("loading config from {}", path.display());
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }
}

impl ConfigProvider for FileConfigProvider {
    fn game_config(&self) -> Arc<GameConfig> {
        self.game.clone()
    }

    fn server_config(&self) -> Arc<ServerConfig> {
        self.server.clone()
    }
}

pub fn default_config_provider() -> Arc<dyn ConfigProvider> {
    Arc::new(default::DefaultConfigProvider {})
}

/// Reads the file named by `BROADSIDE_CONFIG`, or uses the defaults when it is unset.
pub fn config_provider_from_env() -> Result<Arc<dyn ConfigProvider>, ConfigError> {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => Ok(Arc::new(FileConfigProvider::load(Path::new(&path))?)),
        None => Ok(default_config_provider()),
    }
}
