//! Default renderers that defer typesetting to the browser.
//!
//! Both renderers validate their input and wrap it in a carrier element that a
//! client-side typesetter (a MathJax/KaTeX auto-render pass, a TikZ-to-SVG
//! script) picks up. They never emit the raw source outside an escaped context.

use crate::html::{escape_attr, escape_html};
use crate::{DiagramRenderer, MathRenderer, RenderError, RenderResult, SizingHints};

/// Math renderer emitting delimiter-wrapped, HTML-escaped TeX.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientMathRenderer;

impl MathRenderer for ClientMathRenderer {
    fn render_math(&self, expression: &str, display: bool) -> RenderResult {
        let expr = expression.trim();
        if expr.is_empty() {
            return Err(RenderError::Rejected("empty expression".to_string()));
        }
        if let Some(offset) = unbalanced_brace_offset(expr) {
            return Err(RenderError::Rejected(format!(
                "unbalanced braces near offset {}",
                offset
            )));
        }

        let escaped = escape_html(expr);
        let html = if expr.starts_with("\\begin") {
            // Structured environments are recognised by the typesetter as-is.
            format!("<div class=\"math math-display\">{}</div>", escaped)
        } else if display {
            format!("<div class=\"math math-display\">\\[{}\\]</div>", escaped)
        } else {
            format!("<span class=\"math math-inline\">\\({}\\)</span>", escaped)
        };
        Ok(html)
    }
}

/// Diagram renderer emitting a `text/tikz` script carrier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientDiagramRenderer;

impl DiagramRenderer for ClientDiagramRenderer {
    fn render_diagram(&self, source: &str, hints: &SizingHints) -> RenderResult {
        if !source.contains("\\begin{tikzpicture}") {
            return Err(RenderError::Rejected(
                "diagram source has no tikzpicture environment".to_string(),
            ));
        }
        if !source.is_ascii() {
            return Err(RenderError::Rejected(
                "diagram source contains non-ASCII characters".to_string(),
            ));
        }

        let mut script = String::new();
        if !hints.libraries.is_empty() {
            script.push_str(&format!("\\usetikzlibrary{{{}}}\n", hints.libraries.join(",")));
        }
        script.push_str(source.trim());

        Ok(format!(
            "<div class=\"tikz-diagram\" data-layout=\"{}\" data-scale=\"{:.2}\" style=\"max-width:{}%\"><script type=\"text/tikz\">{}</script></div>",
            escape_attr(hints.layout.as_str()),
            hints.scale,
            hints.max_width_percent,
            // A literal closing tag inside the source would end the script element.
            script.replace("</", "<\\/")
        ))
    }
}

fn unbalanced_brace_offset(expr: &str) -> Option<usize> {
    let bytes = expr.as_bytes();
    let mut depth = 0i32;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth < 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    if depth != 0 {
        Some(expr.len())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayoutIntent;

    fn hints() -> SizingHints {
        SizingHints {
            layout: LayoutIntent::Medium,
            node_distance_cm: 2.0,
            x_unit_cm: 1.2,
            y_unit_cm: 1.2,
            scale: 1.0,
            max_width_percent: 75,
            libraries: vec!["positioning".to_string()],
        }
    }

    #[test]
    fn test_inline_math_is_wrapped_and_escaped() {
        let out = ClientMathRenderer.render_math("a<b", false).unwrap();
        assert_eq!(out, "<span class=\"math math-inline\">\\(a&lt;b\\)</span>");
    }

    #[test]
    fn test_environment_math_keeps_wrapper() {
        let out = ClientMathRenderer
            .render_math("\\begin{align*}x &= 1\\end{align*}", true)
            .unwrap();
        assert!(out.starts_with("<div class=\"math math-display\">\\begin{align*}"));
        assert!(out.contains("x &amp;= 1"));
    }

    #[test]
    fn test_unbalanced_math_rejected() {
        assert!(ClientMathRenderer.render_math("\\frac{a}{b", true).is_err());
        assert!(ClientMathRenderer.render_math("   ", false).is_err());
    }

    #[test]
    fn test_diagram_carrier() {
        let src = "\\begin{tikzpicture}\\node {A};\\end{tikzpicture}";
        let out = ClientDiagramRenderer.render_diagram(src, &hints()).unwrap();
        assert!(out.contains("data-layout=\"medium\""));
        assert!(out.contains("\\usetikzlibrary{positioning}"));
        assert!(out.contains("max-width:75%"));
    }

    #[test]
    fn test_diagram_closing_tag_neutralised() {
        let src = "\\begin{tikzpicture}\\node {</script>};\\end{tikzpicture}";
        let out = ClientDiagramRenderer.render_diagram(src, &hints()).unwrap();
        assert!(!out.contains("{</script>"));
    }
}
