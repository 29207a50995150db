//! HTML fragments shared by the page initializers

use scraper::{ElementRef, Html, Node};

use crate::data::schema::parse_date;

/// Escape text for use in element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `Mar 5, 2024`, or the input unchanged when it is not a recognizable date
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

/// The value, or `fallback` when blank
pub fn or_placeholder<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

pub const LOADING: &str = r#"<div class="text-center py-5"><div class="spinner-border text-primary" role="status"><span class="visually-hidden">Loading...</span></div></div>"#;

/// Alert banner. `message` is escaped; `detail` is shown below it when present.
pub fn alert(level: &str, message: &str, detail: Option<&str>) -> String {
    let detail = detail
        .map(|d| format!(r#"<small class="text-muted d-block mt-2">{}</small>"#, escape_html(d)))
        .unwrap_or_default();
    format!(
        r#"<div class="alert alert-{} rounded-4 text-center py-4"><p class="mb-0">{}</p>{}</div>"#,
        level,
        escape_html(message),
        detail
    )
}

/// Centered muted message for a region with nothing to show
pub fn empty_state(icon: &str, title: &str, hint: Option<&str>) -> String {
    let hint = hint
        .map(|h| format!(r#"<small class="text-muted">{}</small>"#, escape_html(h)))
        .unwrap_or_default();
    format!(
        r#"<div class="text-center py-5 text-muted"><i class="bi bi-{} display-6 d-block mb-2 opacity-50"></i><p class="mb-0">{}</p>{}</div>"#,
        icon,
        escape_html(title),
        hint
    )
}

/// Plain-text rendering of an HTML fragment for the terminal.
///
/// Block-level elements start and end a line, table cells are set off with
/// `| ` and blank lines are collapsed. Comments and scripts are dropped.
pub fn to_text(html: &str) -> String {
    let doc = Html::parse_fragment(html);
    let mut text = String::with_capacity(html.len());
    push_text(doc.root_element(), &mut text);

    text.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    const BREAKS: &[&str] = &[
        "div", "p", "tr", "li", "h1", "h2", "h3", "h4", "h5", "h6", "section", "table", "thead",
        "tbody", "ul", "ol", "br",
    ];

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if matches!(name, "script" | "style" | "template") {
                    continue;
                }
                let cell = matches!(name, "td" | "th");
                let block = BREAKS.contains(&name);

                if block {
                    out.push('\n');
                } else if cell {
                    out.push_str("| ");
                }
                if let Some(child) = ElementRef::wrap(child) {
                    push_text(child, out);
                }
                if block {
                    out.push('\n');
                } else if cell {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05"), "Mar 5, 2024");
        assert_eq!(format_date("12/25/2023"), "Dec 25, 2023");
        assert_eq!(format_date("TBA"), "TBA");
    }

    #[test]
    fn test_or_placeholder() {
        assert_eq!(or_placeholder("  ", "Not Specified"), "Not Specified");
        assert_eq!(or_placeholder("x", "Not Specified"), "x");
    }

    #[test]
    fn test_alert_escapes_message() {
        let html = alert("danger", "<bad>", Some("Error: 500"));
        assert!(html.contains("alert-danger"));
        assert!(html.contains("&lt;bad&gt;"));
        assert!(html.contains("Error: 500"));
    }

    #[test]
    fn test_to_text() {
        let html = "<section><h1>Title</h1>\n  <p>Tom &amp; Jerry</p><table><tr><td>a</td><td>b</td></tr></table></section>";

        assert_eq!(to_text(html), "Title\nTom & Jerry\n| a | b");
    }

    #[test]
    fn test_to_text_skips_comments_and_decodes_entities() {
        let html = "<p>Tom&#39;s <!-- hidden --><b>&lt;plan&gt;</b></p><script>var x = 1;</script><ul><li>one</li><li>two</li></ul>";

        assert_eq!(to_text(html), "Tom's <plan>\none\ntwo");
    }
}
