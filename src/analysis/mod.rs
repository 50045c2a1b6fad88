//! Post-processing of the accumulated model response.
//!
//! The response is split once on the marker phrase, then the analysis half
//! gets lightweight markup while the diagram half is kept verbatim.

pub mod formatter;
pub mod splitter;

pub use formatter::{escape_html, format_analysis, render_diagram};
pub use splitter::split;

use crate::models::AnalysisOutput;
use crate::prompt::MARKER;

/// Build the final rendered result from the complete response text.
pub fn render(sentence: &str, text: &str) -> AnalysisOutput {
    let (analysis, diagram) = split(text, MARKER);

    let mut html = String::new();
    html.push_str("<div class=\"analysis-text\">");
    html.push_str(&format_analysis(analysis));
    html.push_str("</div>");

    if let Some(block) = render_diagram(diagram) {
        html.push('\n');
        html.push_str(&block);
    }

    AnalysisOutput {
        sentence: sentence.to_string(),
        raw: text.to_string(),
        analysis: analysis.trim().to_string(),
        diagram: diagram.trim().to_string(),
        html,
    }
}
