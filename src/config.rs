use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::Result;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub sound: bool,
    pub notifications: bool,
    pub tick_millis: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sound: true,
            notifications: true,
            tick_millis: 200,
        }
    }
}

/// Reads `config.json` from `dir`, writing the defaults there on first run.
pub fn load_config(dir: &Path) -> Result<Config> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join("config.json");

    if !path.exists() {
        let config = Config::default();
        let data = serde_json::to_string_pretty(&config)?;
        fs::write(&path, data)?;
        return Ok(config);
    }

    load_config_file(&path)
}

pub fn load_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)?;
    let mut config: Config = serde_json::from_str(&data)?;
    if config.tick_millis == 0 {
        config.tick_millis = Config::default().tick_millis;
    }
    Ok(config)
}
