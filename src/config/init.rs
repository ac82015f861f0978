use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config, ScorerConfig};
use crate::prompt::Prompter;

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    default_path: Option<PathBuf>,
) -> Result<()> {
    prompter.say("")?;
    prompter.say("Decision Journal Configuration")?;
    prompter.say("==============================")?;
    prompter.say("")?;

    // 1. Journal location
    prompter.say("Every decision and reflection is appended to one plain text file.")?;
    let default_journal = crate::journal::get_journal_path().display().to_string();
    let journal = prompter.ask_with_default("Journal file", &default_journal)?;
    let journal_path = if journal == default_journal {
        None
    } else {
        Some(journal)
    };

    // 2. External scorer
    prompter.say("")?;
    prompter.say("An OpenAI-compatible model can suggest ratings for you.")?;
    prompter.say("Without an API key the journal always falls back to asking you.")?;
    let enabled = prompter.confirm("Use the AI scorer by default?", false)?;
    let scorer = if enabled {
        let defaults = ScorerConfig::default();
        let endpoint = prompter.ask_with_default("API base URL", &defaults.endpoint)?;
        let model = prompter.ask_with_default("Model", &defaults.model)?;
        let timeout = loop {
            let input = prompter.ask_with_default("Request timeout", &defaults.timeout)?;
            match humantime::parse_duration(&input) {
                Ok(_) => break input,
                Err(e) => prompter.say(format!("  Invalid: {}. Try again.", e))?,
            }
        };
        let api_key_env =
            prompter.ask_with_default("Environment variable with the API key", &defaults.api_key_env)?;
        ScorerConfig {
            enabled,
            endpoint,
            model,
            timeout,
            api_key_env,
        }
    } else {
        ScorerConfig::default()
    };

    // 3. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    prompter.say("")?;
    let path_str = prompter.ask_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompter.confirm(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            prompter.say("Aborted.")?;
            return Ok(());
        }
    }

    // 4. Write config
    let config = Config {
        journal_path,
        scoring: Default::default(),
        scorer,
    };
    write_config(&config_path, &config)?;

    prompter.say("")?;
    prompter.say(format!("Config written to {}", config_path.display()))?;
    prompter.say("Edit the scoring section to change attribute weights.")?;
    Ok(())
}

/// Serialize `config` as YAML and replace `path` atomically.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use crate::prompt::tests::scripted;

    #[test]
    fn test_wizard_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut prompter = scripted(&format!("/tmp/j.txt\nn\n{}\n", path.display()));

        run_init_wizard(&mut prompter, None).unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.journal_path.as_deref(), Some("/tmp/j.txt"));
        assert!(!config.scorer.enabled);
        assert_eq!(config.scoring, Default::default());
    }

    #[test]
    fn test_wizard_with_scorer_reprompts_bad_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut prompter = scripted("\ny\n\nllama3\nforever\n30s\n\n\n");

        run_init_wizard(&mut prompter, Some(path.clone())).unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.journal_path, None);
        assert!(config.scorer.enabled);
        assert_eq!(config.scorer.model, "llama3");
        assert_eq!(config.scorer.timeout, "30s");
    }

    #[test]
    fn test_wizard_keeps_existing_config_when_declined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "journal_path: keep.txt\n").unwrap();
        let mut prompter = scripted("\nn\n\nn\n");

        run_init_wizard(&mut prompter, Some(path.clone())).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "journal_path: keep.txt\n");
    }
}
