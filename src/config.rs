//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.sintaxis.toml` files.

use crate::cli::{validate_temperature, validate_url, OutputFormat, Provider};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".sintaxis.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Rendering of the final result.
    #[serde(default)]
    pub format: OutputFormat,

    /// Output file path, "-" for stdout.
    #[serde(default = "default_output")]
    pub output: String,

    /// Show the spinner and streaming preview.
    #[serde(default = "default_true")]
    pub progress: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            output: default_output(),
            progress: true,
        }
    }
}

fn default_output() -> String {
    "-".to_string()
}

fn default_true() -> bool {
    true
}

/// Generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Which service to call.
    #[serde(default)]
    pub provider: Provider,

    /// Model name; the provider's default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Temperature for generation; the service default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Request timeout in seconds, covering the whole stream.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Gemini API base URL.
    #[serde(default = "default_gemini_url")]
    pub gemini_url: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            name: None,
            temperature: None,
            timeout_seconds: default_timeout(),
            gemini_url: default_gemini_url(),
            ollama_url: default_ollama_url(),
        }
    }
}

fn default_timeout() -> u64 {
    120
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

impl ModelConfig {
    /// The configured model, or the provider's default.
    pub fn effective_model(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => match self.provider {
                Provider::Gemini => "gemini-2.5-flash".to_string(),
                Provider::Ollama => "llama3.2:latest".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.sintaxis.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were explicitly given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(provider) = args.provider {
            self.model.provider = provider;
        }
        if let Some(ref model) = args.model {
            self.model.name = Some(model.clone());
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = Some(temperature);
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(ref url) = args.gemini_url {
            self.model.gemini_url = url.clone();
        }
        if let Some(ref url) = args.ollama_url {
            self.model.ollama_url = url.clone();
        }

        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        // Flags always override
        if args.no_progress || args.quiet {
            self.general.progress = false;
        }
    }

    /// Check values that may have come from the file.
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.model.gemini_url).map_err(anyhow::Error::msg)?;
        validate_url(&self.model.ollama_url).map_err(anyhow::Error::msg)?;

        if let Some(temperature) = self.model.temperature {
            validate_temperature(temperature).map_err(anyhow::Error::msg)?;
        }
        if self.model.timeout_seconds == 0 {
            bail!("timeout_seconds must be at least 1");
        }
        if self.general.output.trim().is_empty() {
            bail!("output must be a file path or \"-\"");
        }

        Ok(())
    }

    /// Output path, or `None` for stdout.
    pub fn output_path(&self) -> Option<PathBuf> {
        match self.general.output.as_str() {
            "-" => None,
            path => Some(PathBuf::from(path)),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
