//! HTML escaping and the default inline formatter.

use crate::InlineFormatter;

/// Escape text for an HTML text node.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(text, &mut out);
    out
}

/// Escape text for an HTML text node into an existing buffer.
pub fn escape_html_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Escape text for a double-quoted HTML attribute value.
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Whether `url` may go into an `href`.
///
/// Relative references and the `http`, `https` and `mailto` schemes pass.
/// Control characters are refused outright since browsers drop them while
/// reading the scheme.
pub fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    if url.chars().any(char::is_control) {
        return false;
    }
    let scheme_end = url.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(idx) if url[idx..].starts_with(':') => {
            let scheme = url[..idx].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        _ => true,
    }
}

/// Inline formatter producing HTML.
///
/// Known text-styling commands become tags, escaped specials become their
/// literal character, and every other command is kept verbatim so that later
/// passes (citations, placeholder resolution) still see it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlInlineFormatter;

impl InlineFormatter for HtmlInlineFormatter {
    fn format_inline(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 16);
        format_into(text, &mut out, 0);
        out
    }
}

const MAX_NESTING: usize = 32;

fn wrap_tag(name: &str) -> Option<(&'static str, &'static str)> {
    let tags = match name {
        "textbf" | "mathbf" | "bfseries" => ("<strong>", "</strong>"),
        "textit" | "emph" | "textsl" | "itshape" => ("<em>", "</em>"),
        "texttt" | "verb" => ("<code>", "</code>"),
        "underline" | "uline" => ("<u>", "</u>"),
        "textsc" => ("<span class=\"smallcaps\">", "</span>"),
        "textsuperscript" => ("<sup>", "</sup>"),
        "textsubscript" => ("<sub>", "</sub>"),
        "textrm" | "textnormal" | "mbox" | "text" => ("", ""),
        _ => return None,
    };
    Some(tags)
}

fn format_into(text: &str, out: &mut String, nesting: usize) {
    let bytes = text.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                if i + 1 >= bytes.len() {
                    out.push('\\');
                    i += 1;
                    continue;
                }
                let next = bytes[i + 1];
                if next.is_ascii_alphabetic() {
                    let mut j = i + 1;
                    while j < bytes.len() && bytes[j].is_ascii_alphabetic() {
                        j += 1;
                    }
                    let name = &text[i + 1..j];
                    i = format_command(text, name, i, j, out, nesting);
                    continue;
                }
                match next {
                    b'&' => out.push_str("&amp;"),
                    b'%' | b'$' | b'#' | b'_' | b'{' | b'}' => out.push(next as char),
                    b'\\' => out.push_str("<br>"),
                    b' ' => out.push(' '),
                    b',' => out.push('\u{2009}'),
                    _ => {
                        // Keep unknown escapes intact, including multi-byte chars.
                        let ch_len = text[i + 1..].chars().next().map_or(1, |c| c.len_utf8());
                        out.push('\\');
                        escape_html_into(&text[i + 1..i + 1 + ch_len], out);
                        i += 1 + ch_len;
                        continue;
                    }
                }
                i += 2;
            }
            b'~' => {
                out.push_str("&nbsp;");
                i += 1;
            }
            b'-' if text[i..].starts_with("---") => {
                out.push('\u{2014}');
                i += 3;
            }
            b'-' if text[i..].starts_with("--") => {
                out.push('\u{2013}');
                i += 2;
            }
            b'`' if text[i..].starts_with("``") => {
                out.push('\u{201C}');
                i += 2;
            }
            b'\'' if text[i..].starts_with("''") => {
                out.push('\u{201D}');
                i += 2;
            }
            _ => {
                let ch = text[i..].chars().next().unwrap_or('\u{FFFD}');
                match ch {
                    '&' => out.push_str("&amp;"),
                    '<' => out.push_str("&lt;"),
                    '>' => out.push_str("&gt;"),
                    _ => out.push(ch),
                }
                i += ch.len_utf8().max(1);
            }
        }
    }
}

/// Format one `\name` command starting at `start` (the backslash); `name_end`
/// is the byte after the command name. Returns the offset to continue from.
fn format_command(
    text: &str,
    name: &str,
    start: usize,
    name_end: usize,
    out: &mut String,
    nesting: usize,
) -> usize {
    let after_ws = skip_spaces(text, name_end);

    if name == "url" {
        if let Some((url, end)) = braced_at(text, after_ws) {
            let url = url.trim();
            if is_safe_url(url) {
                out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape_attr(url),
                    escape_html(url)
                ));
            } else {
                escape_html_into(url, out);
            }
            return end;
        }
    }

    if name == "href" {
        if let Some((url, mid)) = braced_at(text, after_ws) {
            let label_start = skip_spaces(text, mid);
            if let Some((label, end)) = braced_at(text, label_start) {
                if is_safe_url(url) {
                    out.push_str(&format!("<a href=\"{}\">", escape_attr(url.trim())));
                    format_nested(label, out, nesting);
                    out.push_str("</a>");
                } else {
                    format_nested(label, out, nesting);
                }
                return end;
            }
        }
    }

    if let Some((open, close)) = wrap_tag(name) {
        if let Some((inner, end)) = braced_at(text, after_ws) {
            out.push_str(open);
            format_nested(inner, out, nesting);
            out.push_str(close);
            return end;
        }
    }

    // Unknown or argument-less command: keep it verbatim for later passes.
    out.push_str(&text[start..name_end]);
    name_end
}

fn format_nested(inner: &str, out: &mut String, nesting: usize) {
    if nesting >= MAX_NESTING {
        escape_html_into(inner, out);
    } else {
        format_into(inner, out, nesting + 1);
    }
}

fn skip_spaces(text: &str, mut i: usize) -> usize {
    let bytes = text.as_bytes();
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

/// Read a balanced `{...}` group at `start`, honoring backslash escapes.
fn braced_at(text: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    if start >= bytes.len() || bytes[start] != b'{' {
        return None;
    }
    let mut depth = 0i32;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[start + 1..i], i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(text: &str) -> String {
        HtmlInlineFormatter.format_inline(text)
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(fmt(r"\textbf{Bold} and \emph{it}"), "<strong>Bold</strong> and <em>it</em>");
    }

    #[test]
    fn test_nested_commands() {
        assert_eq!(fmt(r"\textbf{a \textit{b}}"), "<strong>a <em>b</em></strong>");
    }

    #[test]
    fn test_escaped_specials() {
        assert_eq!(fmt(r"A\&B 50\% \$3 \#1 a\_b"), "A&amp;B 50% $3 #1 a_b");
    }

    #[test]
    fn test_html_is_escaped() {
        assert_eq!(fmt("<script>x</script>"), "&lt;script&gt;x&lt;/script&gt;");
    }

    #[test]
    fn test_unknown_command_kept() {
        assert_eq!(fmt(r"see \cite{ref_1}"), r"see \cite{ref_1}");
    }

    #[test]
    fn test_dashes_and_quotes() {
        assert_eq!(fmt("1--2 a---b ``q''"), "1\u{2013}2 a\u{2014}b \u{201C}q\u{201D}");
    }

    #[test]
    fn test_href_attribute_escaped() {
        let out = fmt(r#"\href{http://x.org/?a="b"}{link}"#);
        assert_eq!(out, "<a href=\"http://x.org/?a=&quot;b&quot;\">link</a>");
    }

    #[test]
    fn test_unsafe_link_schemes_become_text() {
        assert_eq!(fmt(r"\href{javascript:alert(1)}{click}"), "click");
        assert_eq!(fmt(r"\href{ JavaScript:x}{\textbf{go}}"), "<strong>go</strong>");
        assert_eq!(fmt(r"\url{data:text/html,<b>}"), "data:text/html,&lt;b&gt;");
        assert_eq!(fmt("\\href{java\tscript:x}{a}"), "a");
    }

    #[test]
    fn test_safe_urls() {
        for url in ["https://x.org/a:b", "http://x", "MAILTO:a@b.c", "docs/page.html", "#sec-2", "/a?b=c:d", "//cdn.x/y"] {
            assert!(is_safe_url(url), "{}", url);
        }
        for url in ["javascript:alert(1)", "vbscript:x", "data:text/html,x", "file:///etc/passwd", "java\nscript:x"] {
            assert!(!is_safe_url(url), "{}", url);
        }
        assert_eq!(fmt(r"\url{https://x.org}"), "<a href=\"https://x.org\">https://x.org</a>");
    }

    #[test]
    fn test_placeholder_tokens_pass_through() {
        assert_eq!(fmt("x @@TG_MATH_3@@ y"), "x @@TG_MATH_3@@ y");
    }
}
