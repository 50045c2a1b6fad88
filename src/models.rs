//! Data models for the sentence analyzer.
//!
//! This module contains the result of one analysis and the document
//! wrapper written to the output sink.

use crate::prompt::MARKER;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final result of one analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// The trimmed sentence that was analyzed.
    pub sentence: String,
    /// Complete accumulated response text.
    pub raw: String,
    /// Analysis section (before the marker), trimmed.
    pub analysis: String,
    /// Diagram section (after the marker), trimmed. Empty when absent.
    pub diagram: String,
    /// Rendered markup for both sections.
    pub html: String,
}

impl AnalysisOutput {
    /// Whether the response carried a non-blank diagram section.
    pub fn has_diagram(&self) -> bool {
        !self.diagram.is_empty()
    }

    /// Terminal rendering: emphasis markers dropped, diagram under a title.
    pub fn to_plain_text(&self) -> String {
        let mut text = self.analysis.replace("**", "");

        if self.has_diagram() {
            text.push_str("\n\n");
            text.push_str(MARKER);
            text.push('\n');
            text.push_str(&"-".repeat(MARKER.chars().count()));
            text.push('\n');
            text.push_str(&self.diagram);
        }

        text
    }
}

/// Metadata attached to page and JSON documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// When the document was rendered.
    pub generated_at: DateTime<Utc>,
    /// Provider and model that produced the response.
    pub model_used: String,
}

/// A rendered result as written in JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDocument {
    pub metadata: ResultMetadata,
    #[serde(flatten)]
    pub output: AnalysisOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(analysis: &str, diagram: &str) -> AnalysisOutput {
        AnalysisOutput {
            sentence: "El perro corre.".to_string(),
            raw: String::new(),
            analysis: analysis.to_string(),
            diagram: diagram.to_string(),
            html: String::new(),
        }
    }

    #[test]
    fn test_plain_text_with_diagram() {
        let text = output("**1. Clasificación:** simple", "|_( )").to_plain_text();
        let rule = "-".repeat(29);
        assert_eq!(
            text,
            format!("1. Clasificación: simple\n\nDiagrama Estructural en ASCII\n{rule}\n|_( )")
        );
    }

    #[test]
    fn test_plain_text_without_diagram() {
        let out = output("Solo análisis", "");
        assert!(!out.has_diagram());
        assert_eq!(out.to_plain_text(), "Solo análisis");
    }

    #[test]
    fn test_document_flattens_output() {
        let doc = ResultDocument {
            metadata: ResultMetadata {
                generated_at: Utc::now(),
                model_used: "gemini (gemini-2.5-flash)".to_string(),
            },
            output: output("a", "b"),
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["analysis"], "a");
        assert_eq!(json["diagram"], "b");
        assert_eq!(json["metadata"]["model_used"], "gemini (gemini-2.5-flash)");
    }
}
