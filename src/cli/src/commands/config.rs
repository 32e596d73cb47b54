//! Configuration management commands.
//!
//! Stores CLI configuration in `~/.punchclock/config.toml`. Known keys:
//!
//! - `api-url`: server base URL
//! - `output`: default output format (table, json, yaml)

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::output::{self, OutputFormat};

const KEYS: &[&str] = &["api-url", "output"];

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key (api-url or output)
        key: String,
        /// Value to set
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show all configuration
    Show,
}

/// Persistent CLI configuration stored on disk.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl CliConfig {
    fn get(&self, key: &str) -> Result<Option<&String>> {
        match key {
            "api-url" => Ok(self.api_url.as_ref()),
            "output" => Ok(self.output.as_ref()),
            other => unknown_key(other),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "api-url" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    anyhow::bail!("api-url must start with http:// or https://");
                }
                self.api_url = Some(value);
            }
            "output" => {
                OutputFormat::from_str(&value, true).map_err(|e| anyhow::anyhow!(e))?;
                self.output = Some(value);
            }
            other => return unknown_key(other),
        }
        Ok(())
    }

    fn entries(&self) -> Vec<(&'static str, &String)> {
        KEYS.iter()
            .filter_map(|key| self.get(key).ok().flatten().map(|v| (*key, v)))
            .collect()
    }
}

fn unknown_key<T>(key: &str) -> Result<T> {
    anyhow::bail!("Unknown key '{}'; expected one of: {}", key, KEYS.join(", "))
}

/// Return the path to the configuration file (`~/.punchclock/config.toml`).
fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".punchclock").join("config.toml"))
}

/// Load the CLI configuration from disk, returning defaults if the file does
/// not exist.
fn load_config() -> Result<CliConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Save the CLI configuration to disk, creating the directory if needed.
fn save_config(cfg: &CliConfig) -> Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(cfg).context("Failed to serialize config")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Load the `api-url` value from the config file, if set.
pub fn load_api_url() -> Option<String> {
    load_config().ok().and_then(|cfg| cfg.api_url)
}

/// Load the default output format from the config file, if set.
pub fn load_output_format() -> Option<OutputFormat> {
    load_config()
        .ok()
        .and_then(|cfg| cfg.output)
        .and_then(|value| OutputFormat::from_str(&value, true).ok())
}

pub async fn execute(cmd: ConfigCommands, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Set { key, value } => {
            let mut cfg = load_config()?;
            cfg.set(&key, value.clone())?;
            save_config(&cfg)?;

            match format {
                OutputFormat::Table => output::print_success(&format!("{} = {}", key, value)),
                _ => output::print_item(&serde_json::json!({ "key": key, "value": value }), format)?,
            }
        }

        ConfigCommands::Get { key } => {
            let cfg = load_config()?;
            let value = cfg
                .get(&key)?
                .ok_or_else(|| anyhow::anyhow!("Key '{}' not set", key))?;

            match format {
                OutputFormat::Table => println!("{}", value),
                _ => output::print_item(&serde_json::json!({ "key": key, "value": value }), format)?,
            }
        }

        ConfigCommands::Show => {
            let cfg = load_config()?;
            let entries = cfg.entries();

            if entries.is_empty() {
                output::print_info("No configuration values set.");
                return Ok(());
            }

            match format {
                OutputFormat::Table => {
                    output::print_header("Configuration");
                    for (k, v) in entries {
                        output::print_detail(k, v);
                    }
                }
                _ => output::print_item(&cfg, format)?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_known_keys() {
        let mut cfg = CliConfig::default();
        cfg.set("api-url", "http://localhost:9000".to_string()).unwrap();
        cfg.set("output", "json".to_string()).unwrap();

        assert_eq!(cfg.get("api-url").unwrap().map(String::as_str), Some("http://localhost:9000"));
        assert_eq!(cfg.entries().len(), 2);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut cfg = CliConfig::default();
        assert!(cfg.set("api-url", "localhost".to_string()).is_err());
        assert!(cfg.set("output", "xml".to_string()).is_err());
        assert!(cfg.set("colour", "red".to_string()).is_err());
        assert!(cfg.get("colour").is_err());
    }

    #[test]
    fn test_toml_uses_kebab_case_keys() {
        let cfg = CliConfig {
            api_url: Some("http://127.0.0.1:8734".to_string()),
            output: None,
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("api-url"));

        let back: CliConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.api_url, cfg.api_url);
    }
}
