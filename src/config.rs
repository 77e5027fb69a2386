use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::round::CountDirection;
use crate::workout::WorkoutConfig;

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Last-used settings, restored on the next launch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub round_count: u32,
    pub round_time_secs: u32,
    pub rest_time_secs: u32,
    pub count_direction: CountDirection,
    pub tick_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::from(&WorkoutConfig::default())
    }
}

impl From<&WorkoutConfig> for Config {
    fn from(wc: &WorkoutConfig) -> Self {
        Self {
            round_count: wc.round_count,
            round_time_secs: wc.time_per_round,
            rest_time_secs: wc.rest_time_between_rounds,
            count_direction: wc.count_direction,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl Config {
    pub fn workout(&self) -> WorkoutConfig {
        WorkoutConfig {
            round_count: self.round_count,
            time_per_round: self.round_time_secs,
            rest_time_between_rounds: self.rest_time_secs,
            count_direction: self.count_direction,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "roundclock") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("roundclock_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => warn!(path = %self.path.display(), error = %e, "ignoring unreadable config"),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
