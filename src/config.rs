use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{MattaError, MattaResult};

const CONFIG_FILE: &str = "config.toml";
/// Overrides `[backend].base_url` when set.
pub const BASE_URL_ENV: &str = "MATTAVIEW_BASE_URL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Root of the add-on's web server, e.g. `http://raspberrypi.local:5001`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Width in px the preview container is rendered at.
    #[serde(default = "default_container_width")]
    pub container_width: f64,
    /// Where `snapshot` writes the JPEG when no `--out` is given.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            container_width: default_container_width(),
            snapshot_path: None,
        }
    }
}

fn default_container_width() -> f64 {
    640.0
}

fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            candidates.push(parent.join(CONFIG_FILE));
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(CONFIG_FILE));
    }
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("mattaview").join(CONFIG_FILE));
    }
    candidates
}

fn resolve_config_path() -> MattaResult<PathBuf> {
    for candidate in config_candidates() {
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found");
            return Ok(candidate);
        }
    }

    Err(MattaError::Config(
        "config.toml not found next to executable, in working directory or user config dir".into(),
    ))
}

pub fn parse_config(content: &str) -> MattaResult<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    if !(config.preview.container_width.is_finite() && config.preview.container_width > 0.0) {
        return Err(MattaError::Config(format!(
            "preview.container_width must be positive, got {}",
            config.preview.container_width
        )));
    }
    Ok(config)
}

pub fn load_config() -> MattaResult<AppConfig> {
    let path = resolve_config_path()?;
    let content = std::fs::read_to_string(&path)?;
    let config = parse_config(&content)?;
    tracing::info!(path = %path.display(), base_url = %config.backend.base_url, "config loaded");
    Ok(config)
}

/// Load the config file, falling back to defaults, then apply environment overrides.
pub fn load_config_or_default() -> AppConfig {
    let mut config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, "using default config");
            AppConfig::default()
        }
    };
    apply_env_overrides(&mut config, std::env::var(BASE_URL_ENV).ok());
    config
}

/// Apply the value of `MATTAVIEW_BASE_URL`. Blank values are ignored.
pub fn apply_env_overrides(config: &mut AppConfig, base_url: Option<String>) {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        tracing::debug!(base_url = %url, "base url overridden from environment");
        config.backend.base_url = url;
    }
}

/// Apply `--base-url`. Runs after `apply_env_overrides`, so the flag wins.
pub fn apply_cli_overrides(config: &mut AppConfig, base_url: Option<&str>) {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        tracing::debug!(base_url = %url, "base url overridden from command line");
        config.backend.base_url = url.to_string();
    }
}

/// Write `config` to `path`, or to `config.toml` in the working directory.
///
/// An existing file is only replaced when `overwrite` is set.
pub fn save_config(config: &AppConfig, path: Option<PathBuf>, overwrite: bool) -> MattaResult<PathBuf> {
    let path = match path {
        Some(p) => p,
        None => std::env::current_dir()?.join(CONFIG_FILE),
    };
    if !overwrite && path.exists() {
        return Err(MattaError::Config(format!(
            "{} already exists, pass --force to overwrite",
            path.display()
        )));
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(path)
}
