//! Analysis orchestration.
//!
//! One call to [`Analyzer::analyze`] validates the sentence, streams the
//! model response into an accumulator while showing progress, and renders
//! the final result once the stream ends. All display goes through a
//! [`Surface`] passed in by the caller.

use crate::analysis;
use crate::llm::{GenerationService, LlmError};
use crate::models::AnalysisOutput;
use crate::prompt::{EMPTY_INPUT_MESSAGE, SERVICE_ERROR_MESSAGE, SYSTEM_INSTRUCTION};
use futures::StreamExt;
use std::ops::{Deref, DerefMut};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info};

/// Where the orchestrator shows its state and results.
pub trait Surface {
    /// Toggle the in-flight indicator.
    fn set_busy(&mut self, busy: bool);

    /// Show the partial accumulated response.
    fn show_progress(&mut self, partial: &str);

    /// Replace the displayed content with a fixed message.
    fn show_message(&mut self, message: &str);

    /// Replace the displayed content with the final result.
    fn show_result(&mut self, output: &AnalysisOutput) -> std::io::Result<()>;
}

/// Holds a surface in the busy state until dropped.
pub struct BusyGuard<'a, U: Surface + ?Sized> {
    surface: &'a mut U,
}

impl<'a, U: Surface + ?Sized> BusyGuard<'a, U> {
    pub fn acquire(surface: &'a mut U) -> Self {
        surface.set_busy(true);
        Self { surface }
    }
}

impl<U: Surface + ?Sized> Deref for BusyGuard<'_, U> {
    type Target = U;

    fn deref(&self) -> &U {
        self.surface
    }
}

impl<U: Surface + ?Sized> DerefMut for BusyGuard<'_, U> {
    fn deref_mut(&mut self) -> &mut U {
        self.surface
    }
}

impl<U: Surface + ?Sized> Drop for BusyGuard<'_, U> {
    fn drop(&mut self) {
        self.surface.set_busy(false);
    }
}

/// Why an analysis produced no result.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("empty sentence")]
    EmptyInput,

    #[error("analysis service failed: {0}")]
    Service(#[from] LlmError),

    #[error("failed to write result: {0}")]
    Output(#[from] std::io::Error),
}

/// Runs sentences through a generation service.
pub struct Analyzer<S> {
    service: S,
}

impl<S: GenerationService> Analyzer<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Analyze one sentence, reporting progress and outcome on `surface`.
    pub async fn analyze<U: Surface + ?Sized>(
        &self,
        surface: &mut U,
        sentence: &str,
    ) -> Result<AnalysisOutput, AnalyzeError> {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            surface.show_message(EMPTY_INPUT_MESSAGE);
            return Err(AnalyzeError::EmptyInput);
        }

        let mut surface = BusyGuard::acquire(surface);
        info!("Analyzing sentence ({} chars)", sentence.chars().count());

        let text = match self.collect(&mut *surface, sentence).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error during analysis call: {}", e);
                surface.show_message(SERVICE_ERROR_MESSAGE);
                return Err(AnalyzeError::Service(e));
            }
        };

        let output = analysis::render(sentence, &text);
        debug!(
            "Rendered {} chars of analysis, diagram present: {}",
            output.analysis.len(),
            output.has_diagram()
        );
        surface.show_result(&output)?;

        Ok(output)
    }

    /// Stream the response into one string, in emission order.
    async fn collect<U: Surface + ?Sized>(
        &self,
        surface: &mut U,
        sentence: &str,
    ) -> Result<String, LlmError> {
        let mut fragments = self.service.stream(SYSTEM_INSTRUCTION, sentence).await?;
        let mut text = String::new();

        while let Some(fragment) = fragments.next().await {
            text.push_str(&fragment?);
            surface.show_progress(&text);
        }

        Ok(text)
    }
}

/// Counts from an interactive session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub completed: usize,
    pub failed: usize,
    pub empty: usize,
}

/// Analyze every line read from `reader`, one at a time.
///
/// Invalid UTF-8 is replaced rather than rejected. Only a failure to read
/// input or to write a result aborts the session.
pub async fn run_session<S, U, R>(
    analyzer: &Analyzer<S>,
    surface: &mut U,
    mut reader: R,
) -> anyhow::Result<SessionStats>
where
    S: GenerationService,
    U: Surface + ?Sized,
    R: AsyncBufRead + Unpin,
{
    let mut stats = SessionStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);

        match analyzer.analyze(&mut *surface, &line).await {
            Ok(_) => stats.completed += 1,
            Err(AnalyzeError::EmptyInput) => stats.empty += 1,
            Err(AnalyzeError::Service(_)) => stats.failed += 1,
            Err(e @ AnalyzeError::Output(_)) => return Err(e.into()),
        }
    }

    Ok(stats)
}
