//! Terminal surface: spinner while busy, results to a file or stdout.

use crate::cli::OutputFormat;
use crate::models::{AnalysisOutput, ResultMetadata};
use crate::orchestrator::Surface;
use crate::report;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

const BUSY_LABEL: &str = "Analizando...";
const PREVIEW_CHARS: usize = 60;

/// Where rendered content goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    /// Rewritten on every result or message.
    File(PathBuf),
}

impl From<Option<PathBuf>> for OutputTarget {
    fn from(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => OutputTarget::File(path),
            None => OutputTarget::Stdout,
        }
    }
}

/// Options for [`TerminalSurface`].
#[derive(Debug, Clone)]
pub struct SurfaceOptions {
    pub format: OutputFormat,
    pub target: OutputTarget,
    /// Show the spinner and streaming preview.
    pub progress: bool,
    /// Provider and model, for document metadata.
    pub model_used: String,
}

/// Surface backed by the terminal and an output sink.
pub struct TerminalSurface {
    options: SurfaceOptions,
    spinner: Option<ProgressBar>,
}

impl TerminalSurface {
    pub fn new(options: SurfaceOptions) -> Self {
        Self {
            options,
            spinner: None,
        }
    }

    fn metadata(&self) -> ResultMetadata {
        ResultMetadata {
            generated_at: Utc::now(),
            model_used: self.options.model_used.clone(),
        }
    }

    /// Run `f` with the spinner hidden so its output is not garbled.
    fn suspended<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.spinner {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }

    fn write(&self, content: &str) -> io::Result<()> {
        self.suspended(|| match &self.options.target {
            OutputTarget::Stdout => {
                let mut out = io::stdout().lock();
                writeln!(out, "{}", content)?;
                out.flush()
            }
            OutputTarget::File(path) => std::fs::write(path, content),
        })
    }
}

impl Surface for TerminalSurface {
    fn set_busy(&mut self, busy: bool) {
        if busy {
            if !self.options.progress || self.spinner.is_some() {
                return;
            }
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(BUSY_LABEL);
            spinner.enable_steady_tick(Duration::from_millis(120));
            self.spinner = Some(spinner);
        } else if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn show_progress(&mut self, partial: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(progress_line(partial));
        }
    }

    fn show_message(&mut self, message: &str) {
        let rendered = report::render_message(self.options.format, message, &self.metadata());
        if let Err(e) = self.write(&rendered) {
            warn!("Failed to write message: {}", e);
        }
        if let OutputTarget::File(_) = self.options.target {
            self.suspended(|| eprintln!("⚠️  {}", message));
        }
    }

    fn show_result(&mut self, output: &AnalysisOutput) -> io::Result<()> {
        let rendered = report::render_result(self.options.format, output, &self.metadata())?;
        self.write(&rendered)?;

        if let OutputTarget::File(ref path) = self.options.target {
            debug!("Wrote {} bytes to {}", rendered.len(), path.display());
            self.suspended(|| eprintln!("✅ Resultado guardado en: {}", path.display()));
        }
        Ok(())
    }
}

/// Spinner message: character count plus the tail of the latest line.
pub fn progress_line(partial: &str) -> String {
    let count = partial.chars().count();
    let last_line = partial
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    let chars: Vec<char> = last_line.chars().collect();
    let tail: String = if chars.len() > PREVIEW_CHARS {
        let start = chars.len() - PREVIEW_CHARS;
        format!("…{}", chars[start..].iter().collect::<String>())
    } else {
        last_line.to_string()
    };

    format!("{} {} caracteres | {}", BUSY_LABEL, count, tail)
}
