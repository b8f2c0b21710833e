// src/config.rs

use std::fs;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::game::search::SearchConfig;

/// Errors from the profile store and configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed profile: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub fn save_profile(dir: &Path, name: &str, config: &SearchConfig) -> Result<(), ConfigError> {
    let path = dir.join(format!("{name}.json"));
    let json = serde_json::to_string_pretty(config)?;
    fs::File::create(path)?.write_all(json.as_bytes())?;
    Ok(())
}

/// Loads and validates a profile. A stored profile with zeroed divisors is
/// rejected here rather than left to divide by zero mid-search.
pub fn load_profile(dir: &Path, name: &str) -> Result<SearchConfig, ConfigError> {
    let path = dir.join(format!("{name}.json"));
    let json = fs::read_to_string(path)?;
    let config: SearchConfig = serde_json::from_str(&json)?;
    config.validate()?;
    Ok(config)
}

pub fn get_profiles(dir: &Path) -> Result<Vec<String>, ConfigError> {
    let mut profiles = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            if let Some(stem) = path.file_stem() {
                if let Some(name) = stem.to_str() {
                    profiles.push(name.to_string());
                }
            }
        }
    }
    Ok(profiles)
}
