//! Result document generation.
//!
//! Turns an [`AnalysisOutput`] (or a fixed user message) into the text
//! written to the output sink, for each [`OutputFormat`].

use crate::analysis::escape_html;
use crate::cli::OutputFormat;
use crate::models::{AnalysisOutput, ResultDocument, ResultMetadata};
use serde_json::json;

/// Render a final result in `format`.
pub fn render_result(
    format: OutputFormat,
    output: &AnalysisOutput,
    metadata: &ResultMetadata,
) -> serde_json::Result<String> {
    Ok(match format {
        OutputFormat::Html => output.html.clone(),
        OutputFormat::Page => generate_page(
            &format!("Análisis: {}", output.sentence),
            &generate_sentence_header(&output.sentence),
            &output.html,
            metadata,
        ),
        OutputFormat::Json => generate_json_report(output, metadata)?,
        OutputFormat::Text => output.to_plain_text(),
    })
}

/// Render a fixed message in `format`, replacing any previous content.
pub fn render_message(format: OutputFormat, message: &str, metadata: &ResultMetadata) -> String {
    let paragraph = format!("<p>{}</p>", escape_html(message));
    match format {
        OutputFormat::Html => paragraph,
        OutputFormat::Page => generate_page("Análisis sintáctico", "", &paragraph, metadata),
        OutputFormat::Json => json!({ "message": message }).to_string(),
        OutputFormat::Text => message.to_string(),
    }
}

/// Serialize the result with its metadata.
pub fn generate_json_report(
    output: &AnalysisOutput,
    metadata: &ResultMetadata,
) -> serde_json::Result<String> {
    let document = ResultDocument {
        metadata: metadata.clone(),
        output: output.clone(),
    };
    serde_json::to_string_pretty(&document)
}

fn generate_sentence_header(sentence: &str) -> String {
    format!("<p class=\"sentence\">{}</p>\n", escape_html(sentence))
}

/// Wrap a fragment in a standalone HTML document.
fn generate_page(title: &str, header: &str, body: &str, metadata: &ResultMetadata) -> String {
    let mut page = String::new();

    page.push_str("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n");
    page.push_str("<meta charset=\"utf-8\">\n");
    page.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    page.push_str("<style>pre { font-family: monospace; white-space: pre; overflow-x: auto; }</style>\n");
    page.push_str("</head>\n<body>\n");
    page.push_str("<h1>Análisis sintáctico</h1>\n");
    page.push_str(header);
    page.push_str("<div id=\"result-container\">\n");
    page.push_str(body);
    page.push_str("\n</div>\n");
    page.push_str(&generate_footer(metadata));
    page.push_str("</body>\n</html>\n");

    page
}

fn generate_footer(metadata: &ResultMetadata) -> String {
    format!(
        "<footer>Generado con <code>{}</code> el {}</footer>\n",
        escape_html(&metadata.model_used),
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::render;
    use chrono::{TimeZone, Utc};

    fn metadata() -> ResultMetadata {
        ResultMetadata {
            generated_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            model_used: "gemini (gemini-2.5-flash)".to_string(),
        }
    }

    fn output() -> AnalysisOutput {
        render(
            "El perro <corre>.",
            "**1. Clasificación:** simple\nDiagrama Estructural en ASCII\n  O\n |_( )",
        )
    }

    #[test]
    fn test_html_fragment_is_markup_only() {
        let html = render_result(OutputFormat::Html, &output(), &metadata()).unwrap();
        assert_eq!(html, output().html);
        assert!(!html.contains("<html"));
    }

    #[test]
    fn test_page_document() {
        let page = render_result(OutputFormat::Page, &output(), &metadata()).unwrap();

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<meta charset=\"utf-8\">"));
        assert!(page.contains("<p class=\"sentence\">El perro &lt;corre&gt;.</p>"));
        assert!(page.contains("<pre>O\n |_( )</pre>"));
        assert!(page.contains("2026-03-14 09:30:00 UTC"));
        assert!(page.contains("<code>gemini (gemini-2.5-flash)</code>"));
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_json_report() {
        let json = render_result(OutputFormat::Json, &output(), &metadata()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["sentence"], "El perro <corre>.");
        assert_eq!(value["diagram"], "O\n |_( )");
        assert_eq!(value["metadata"]["model_used"], "gemini (gemini-2.5-flash)");
        assert!(value["html"].as_str().unwrap().contains("ascii-diagram"));
    }

    #[test]
    fn test_text_report() {
        let text = render_result(OutputFormat::Text, &output(), &metadata()).unwrap();
        assert!(text.starts_with("1. Clasificación: simple\n\nDiagrama Estructural en ASCII\n"));
        assert!(text.ends_with("O\n |_( )"));
    }

    #[test]
    fn test_render_message() {
        let message = "Por favor, introduce una oración para analizar.";
        assert_eq!(
            render_message(OutputFormat::Html, message, &metadata()),
            format!("<p>{}</p>", message)
        );
        assert_eq!(render_message(OutputFormat::Text, message, &metadata()), message);

        let json = render_message(OutputFormat::Json, message, &metadata());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["message"], message);

        let page = render_message(OutputFormat::Page, message, &metadata());
        assert!(page.contains(&format!("<div id=\"result-container\">\n<p>{}</p>\n</div>", message)));
    }
}
