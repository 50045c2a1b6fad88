//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Sintaxis - syntactic analysis of Spanish sentences with an LLM
///
/// Sends a sentence to a hosted model and renders a five-point grammatical
/// analysis plus an ASCII structure diagram. Without a sentence argument,
/// reads one sentence per line from stdin.
///
/// Examples:
///   sintaxis "El perro corre."
///   sintaxis --format text "Los niños que juegan ríen."
///   sintaxis --provider ollama --model llama3.2:latest "Llueve."
///   sintaxis --format page -o analisis.html < oraciones.txt
///   sintaxis --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Sentence to analyze (words are joined with spaces)
    ///
    /// When omitted, sentences are read from stdin, one per line.
    #[arg(value_name = "SENTENCE")]
    pub sentence: Vec<String>,

    /// Generation service to use
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<Provider>,

    /// Model name
    ///
    /// Defaults to gemini-2.5-flash for Gemini and llama3.2:latest for Ollama.
    #[arg(short, long, env = "SINTAXIS_MODEL")]
    pub model: Option<String>,

    /// API key for Gemini
    ///
    /// If not given, API_KEY (then GEMINI_API_KEY) is read from the
    /// environment when the request is made.
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Gemini API base URL
    #[arg(long, value_name = "URL", env = "GEMINI_URL")]
    pub gemini_url: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, value_name = "URL", env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Output format (html, page, json, text)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file for the rendered result ("-" for stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Sampling temperature (0.0 - 2.0); the service default when unset
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .sintaxis.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Hide the spinner and streaming preview
    #[arg(long)]
    pub no_progress: bool,

    /// Generate a default .sintaxis.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Generation service backing the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Gemini (default)
    #[default]
    Gemini,
    /// Ollama chat API
    Ollama,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::Ollama => write!(f, "ollama"),
        }
    }
}

/// Output format for the rendered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// HTML fragment (default)
    #[default]
    Html,
    /// Standalone HTML document
    Page,
    /// JSON document
    Json,
    /// Plain text
    Text,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The sentence given on the command line, if any.
    pub fn sentence_text(&self) -> Option<String> {
        if self.sentence.is_empty() {
            None
        } else {
            Some(self.sentence.join(" "))
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        for url in [&self.gemini_url, &self.ollama_url].into_iter().flatten() {
            validate_url(url)?;
        }

        if let Some(temperature) = self.temperature {
            validate_temperature(temperature)?;
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

pub(crate) fn validate_url(url: &str) -> Result<(), String> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(format!("URL must start with 'http://' or 'https://': {}", url))
    }
}

pub(crate) fn validate_temperature(temperature: f32) -> Result<(), String> {
    if (0.0..=2.0).contains(&temperature) {
        Ok(())
    } else {
        Err("Temperature must be between 0.0 and 2.0".to_string())
    }
}
