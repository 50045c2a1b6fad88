//! Lightweight markup for the analysis section.
//!
//! Three regex rules run in a fixed order: `**emphasis**`, numbered list
//! headers (`1. Título:`), then line breaks. This is not a Markdown parser;
//! nested emphasis or headers spanning lines produce whatever the rules
//! produce.

use crate::prompt::MARKER;
use regex::Regex;
use std::sync::OnceLock;

const EMPHASIS_REPLACEMENT: &str = r#"<strong class="text-accent font-semibold">${1}</strong>"#;
const HEADER_REPLACEMENT: &str = r#"<strong class="text-slate-300">${1}</strong>"#;
const LINE_BREAK: &str = "<br />";

fn emphasis_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("emphasis pattern is valid"))
}

fn list_header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^(\s*[0-9]+\.\s+[^:]+:)").expect("list header pattern is valid")
    })
}

/// Escape the characters that would otherwise be read as markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Convert the trimmed analysis text into presentational markup.
pub fn format_analysis(analysis: &str) -> String {
    let escaped = escape_html(analysis.trim());
    let emphasized = emphasis_pattern().replace_all(&escaped, EMPHASIS_REPLACEMENT);
    let headed = list_header_pattern().replace_all(&emphasized, HEADER_REPLACEMENT);
    headed.replace('\n', LINE_BREAK)
}

/// Wrap the diagram in a labeled, whitespace-preserving block.
///
/// Returns `None` when the diagram is blank after trimming.
pub fn render_diagram(diagram: &str) -> Option<String> {
    let diagram = diagram.trim();
    if diagram.is_empty() {
        return None;
    }

    Some(format!(
        "<div class=\"ascii-diagram\">\n<h3>{}</h3>\n<pre>{}</pre>\n</div>",
        MARKER,
        escape_html(diagram)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emphasis() {
        assert_eq!(
            format_analysis("**x**"),
            r#"<strong class="text-accent font-semibold">x</strong>"#
        );
    }

    #[test]
    fn test_emphasis_leaves_surroundings() {
        assert_eq!(
            format_analysis("a **b** c **d**"),
            r#"a <strong class="text-accent font-semibold">b</strong> c <strong class="text-accent font-semibold">d</strong>"#
        );
    }

    #[test]
    fn test_list_header() {
        assert_eq!(
            format_analysis("1. Clasificación:"),
            r#"<strong class="text-slate-300">1. Clasificación:</strong>"#
        );
    }

    #[test]
    fn test_list_header_keeps_rest_of_line() {
        let formatted = format_analysis("Intro\n2. Sujeto: El perro\n3. Predicado: corre");
        assert_eq!(
            formatted,
            concat!(
                "Intro<br />",
                r#"<strong class="text-slate-300">2. Sujeto:</strong> El perro<br />"#,
                r#"<strong class="text-slate-300">3. Predicado:</strong> corre"#
            )
        );
    }

    #[test]
    fn test_list_header_needs_ascii_digits() {
        assert_eq!(format_analysis("٢. Sujeto: El perro"), "٢. Sujeto: El perro");
        assert_eq!(format_analysis("２. Sujeto: El perro"), "２. Sujeto: El perro");
    }

    #[test]
    fn test_emphasis_runs_before_headers() {
        let formatted = format_analysis("1. **Clasificación:** simple");
        assert_eq!(
            formatted,
            concat!(
                r#"<strong class="text-slate-300">1. <strong class="text-accent font-semibold">Clasificación:</strong></strong>"#,
                " simple"
            )
        );
    }

    #[test]
    fn test_unpaired_emphasis_is_untouched() {
        assert_eq!(format_analysis("**abierto"), "**abierto");
    }

    #[test]
    fn test_emphasis_does_not_span_lines() {
        assert_eq!(format_analysis("**a\nb**"), "**a<br />b**");
    }

    #[test]
    fn test_line_breaks_and_trim() {
        assert_eq!(format_analysis("\n  uno\ndos  \n"), "uno<br />dos");
    }

    #[test]
    fn test_markup_is_escaped() {
        assert_eq!(
            format_analysis("<script> & **b**"),
            r#"&lt;script&gt; &amp; <strong class="text-accent font-semibold">b</strong>"#
        );
    }

    #[test]
    fn test_render_diagram_verbatim() {
        let block = render_diagram("\n  O\n |_( )\n / \\ \n").unwrap();
        assert!(block.contains("<h3>Diagrama Estructural en ASCII</h3>"));
        assert!(block.contains("<pre>O\n |_( )\n / \\</pre>"));
    }

    #[test]
    fn test_render_diagram_blank() {
        assert!(render_diagram("  \n\t").is_none());
    }
}
