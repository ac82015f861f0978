pub mod init;
mod schema;

pub use init::run_init_wizard;
pub use schema::{
    Config, ScorerConfig, DEFAULT_API_KEY_ENV, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Get the config directory path (~/.config/decision-journal/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("decision-journal")
}

/// Get the default config file path (~/.config/decision-journal/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path and
///   falls back to built-in defaults when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!("Failed to parse config: invalid YAML in {}", config_path.display())
    })?;

    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
}

/// Validate the whole config at startup. Returns every problem found.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = match crate::scoring::validate_scoring(&config.scoring) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    if let Err(e) = humantime::parse_duration(&config.scorer.timeout) {
        errors.push(format!(
            "scorer.timeout: invalid duration '{}' - {}",
            config.scorer.timeout, e
        ));
    }
    if config.scorer.endpoint.trim().is_empty() {
        errors.push("scorer.endpoint: must not be empty".to_string());
    }
    if config.scorer.model.trim().is_empty() {
        errors.push("scorer.model: must not be empty".to_string());
    }
    if let Some(path) = &config.journal_path {
        if path.trim().is_empty() {
            errors.push("journal_path: must not be empty when set".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl Config {
    /// Journal location: the configured path with `~` expanded, or the default.
    pub fn journal_path(&self) -> PathBuf {
        match &self.journal_path {
            Some(path) => expand_home(path),
            None => crate::journal::get_journal_path(),
        }
    }

    /// Scorer timeout. Falls back to the default if the value does not parse;
    /// `validate_config` reports that case at startup.
    pub fn scorer_timeout(&self) -> Duration {
        humantime::parse_duration(&self.scorer.timeout).unwrap_or(Duration::from_secs(15))
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
