//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use wallpaper_rater::{CaptionOverrides, CaptionTable, Rater, RaterError, RatingPolicy};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "WALLPAPER_RATER_CONFIG";

/// Config file looked up relative to the working directory.
const CWD_CONFIG: &str = ".wallpaper-rater/config.json";

/// Errors from reading or applying a config file.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown preset '{name}' (expected one of: {available})")]
    UnknownPreset { name: String, available: String },

    #[error(transparent)]
    Rater(#[from] RaterError),
}

/// Contents of a config file.
///
/// `policy` replaces the preset entirely when present; fields it leaves out
/// take their canonical defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaterConfig {
    pub preset: Option<String>,
    pub policy: Option<RatingPolicy>,
    pub captions: CaptionOverrides,
    /// Fail at startup when a reachable score has no caption.
    pub require_captions: bool,
}

impl RaterConfig {
    /// The policy this config selects.
    pub fn effective_policy(&self) -> Result<RatingPolicy, ConfigError> {
        if let Some(policy) = &self.policy {
            return Ok(policy.clone());
        }
        match &self.preset {
            Some(name) => RatingPolicy::preset(name).ok_or_else(|| ConfigError::UnknownPreset {
                name: name.clone(),
                available: RatingPolicy::preset_names().join(", "),
            }),
            None => Ok(RatingPolicy::canonical()),
        }
    }

    /// Built-in captions with this config's overrides applied.
    pub fn caption_table(&self) -> CaptionTable {
        let mut table = CaptionTable::default();
        table.merge(&self.captions);
        table
    }

    /// Build a validated rater.
    pub fn build_rater(&self) -> Result<Rater, ConfigError> {
        let policy = self.effective_policy()?;
        let captions = self.caption_table();
        let rater = if self.require_captions {
            Rater::new_strict(policy, captions)?
        } else {
            Rater::new(policy, captions)?
        };
        Ok(rater)
    }
}

/// Resolve the config file path.
///
/// An explicit path wins, then `WALLPAPER_RATER_CONFIG`, then
/// `.wallpaper-rater/config.json` in the working directory, then the same
/// file under the home directory. Returns `None` when nothing exists.
pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    let cwd_config = PathBuf::from(CWD_CONFIG);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    let home_config = default_config_path();
    home_config.exists().then_some(home_config)
}

fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    PathBuf::from(home).join(CWD_CONFIG)
}

/// Read a config file.
pub fn load_config(path: &Path) -> Result<RaterConfig, ConfigError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })
}

/// Resolve, load, and apply a preset override from the command line.
pub fn load_effective_config(
    explicit: Option<&str>,
    preset: Option<&str>,
) -> Result<RaterConfig, ConfigError> {
    let mut config = match resolve_config_path(explicit) {
        Some(path) => {
            tracing::info!("Using config: {}", path.display());
            load_config(&path)?
        }
        None => {
            tracing::debug!("No config file found, using built-in policy");
            RaterConfig::default()
        }
    };

    if let Some(name) = preset {
        config.preset = Some(name.to_string());
        config.policy = None;
    }
    Ok(config)
}
