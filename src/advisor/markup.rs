//! Lightweight markup to HTML fragment conversion
//!
//! Handles the small subset of markup the language model is asked to use:
//! `**bold**`, `*italic*`, `#`/`##` headings, `-`/`•` bullets and numbered lists.
//! Each line is classified once and consecutive list items are grouped, so list
//! boundaries never depend on substitution order.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("valid italic regex"));
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,2})\s+(.*)$").expect("valid heading regex"));
static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-•]\s+(.*)$").expect("valid bullet regex"));
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\.\s+(.*)$").expect("valid numbered regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
}

impl ListKind {
    fn open_tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "<ul>",
            ListKind::Numbered => "<ol>",
        }
    }

    fn close_tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "</ul>",
            ListKind::Numbered => "</ol>",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Heading { level: usize, text: String },
    Item { kind: ListKind, text: String },
    Text(String),
}

fn inline(text: &str) -> String {
    let bold = BOLD.replace_all(text, "<strong>$1</strong>");
    ITALIC.replace_all(&bold, "<em>$1</em>").into_owned()
}

fn classify(raw: &str) -> Line {
    if let Some(caps) = HEADING.captures(raw) {
        return Line::Heading {
            level: caps[1].len(),
            text: inline(&caps[2]),
        };
    }
    if let Some(caps) = BULLET.captures(raw) {
        return Line::Item {
            kind: ListKind::Bullet,
            text: inline(&caps[1]),
        };
    }
    if let Some(caps) = NUMBERED.captures(raw) {
        return Line::Item {
            kind: ListKind::Numbered,
            text: inline(&caps[1]),
        };
    }
    Line::Text(inline(raw))
}

/// Separate line `index` from what came before. An open list swallows the
/// newline after its last item.
fn close_or_break(html: &mut String, open_list: &mut Option<ListKind>, index: usize) {
    match open_list.take() {
        Some(previous) => html.push_str(previous.close_tag()),
        None if index > 0 => html.push_str("<br>"),
        None => {}
    }
}

/// Convert model output into an HTML fragment
pub fn format_response(text: &str) -> String {
    let mut html = String::with_capacity(text.len() + 16);
    let mut open_list: Option<ListKind> = None;

    for (i, raw) in text.split('\n').enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        match classify(raw) {
            Line::Item { kind, text } => {
                if open_list != Some(kind) {
                    close_or_break(&mut html, &mut open_list, i);
                    html.push_str(kind.open_tag());
                    open_list = Some(kind);
                }
                html.push_str("<li>");
                html.push_str(&text);
                html.push_str("</li>");
            }
            Line::Heading { level, text } => {
                close_or_break(&mut html, &mut open_list, i);
                let tag = if level == 1 { "h3" } else { "h4" };
                html.push_str(&format!("<{tag}>{text}</{tag}>"));
            }
            Line::Text(text) => {
                close_or_break(&mut html, &mut open_list, i);
                html.push_str(&text);
            }
        }
    }

    if let Some(kind) = open_list {
        html.push_str(kind.close_tag());
    }

    html
}
