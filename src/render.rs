//! Turns a message payload into an ordered sequence of display segments.
//!
//! Rendering is pure: the same content always yields the same segments,
//! and malformed markup falls back to literal text instead of failing.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::transcript::MessageContent;
use crate::links::shorten_default;
use crate::models::CourseDetail;

// URL scanning runs before markup scanning, so emphasis markers never
// split a URL and a URL is never re-parsed for markup.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("url pattern is valid"));

static MARKUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*|_(.+?)_").expect("markup pattern is valid"));

// === Types ===

/// One display segment of a rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, emitted as-is.
    Text(String),
    /// Strong emphasis (`**...**`).
    Strong(String),
    /// Light emphasis (`_..._`).
    Emphasis(String),
    /// A hyperlink; `display` is the shortened form, `target` the full URL.
    Link { display: String, target: String },
    /// Paragraph separator inside a structured record.
    Break,
}

// === Rendering ===

/// Render message content into an ordered segment sequence.
#[must_use]
pub fn render(content: &MessageContent) -> Vec<Segment> {
    match content {
        MessageContent::Text(text) => render_text(text),
        MessageContent::Course(detail) => render_course(detail),
    }
}

/// Course records are flattened verbatim; no markup scanning applies
/// inside them.
fn render_course(detail: &CourseDetail) -> Vec<Segment> {
    let mut segments = vec![
        Segment::Text(detail.message.clone()),
        Segment::Break,
        Segment::Strong(detail.course_name.clone()),
        Segment::Break,
        Segment::Link {
            display: shorten_default(&detail.display_text),
            target: detail.course_url.clone(),
        },
    ];
    if let Some(continue_message) = &detail.continue_message {
        segments.push(Segment::Break);
        segments.push(Segment::Text(continue_message.clone()));
    }
    segments
}

fn render_text(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    for url in URL_RE.find_iter(text) {
        push_markup(&mut segments, &text[cursor..url.start()]);
        segments.push(Segment::Link {
            display: shorten_default(url.as_str()),
            target: url.as_str().to_string(),
        });
        cursor = url.end();
    }
    push_markup(&mut segments, &text[cursor..]);
    segments
}

/// Scan a non-URL span for paired `**` and `_` markers. Unmatched
/// delimiters stay literal; markers do not nest.
fn push_markup(segments: &mut Vec<Segment>, span: &str) {
    let mut cursor = 0;
    for marker in MARKUP_RE.captures_iter(span) {
        let whole = marker.get(0).expect("capture 0 always present");
        push_text(segments, &span[cursor..whole.start()]);
        if let Some(strong) = marker.get(1) {
            segments.push(Segment::Strong(strong.as_str().to_string()));
        } else if let Some(light) = marker.get(2) {
            segments.push(Segment::Emphasis(light.as_str().to_string()));
        }
        cursor = whole.end();
    }
    push_text(segments, &span[cursor..]);
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
}
