//! Rendering of outbound messages
//!
//! Create and update share the same output: a bold title followed by the
//! link, in Telegram HTML, plus one row of two inline buttons.

use crate::{CandidateItem, ItemId};

/// Marker appended to counters above [`HOT_THRESHOLD`]
pub const HOT: &str = "🔥";

/// Counters strictly above this get the [`HOT`] marker
pub const HOT_THRESHOLD: i64 = 100;

/// Discussion page base on the source site
pub const DISCUSSION_BASE: &str = "https://news.ycombinator.com/item?id=";

/// Inline button linking somewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Label
    pub text: String,
    /// Target link
    pub url: String,
}

/// Message body and buttons sent to the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// HTML-formatted body
    pub text: String,
    /// A single row of inline buttons
    pub buttons: Vec<Button>,
}

/// Render a candidate into its outbound message
pub fn render(item: &CandidateItem) -> OutboundMessage {
    let text = format!(
        "<b>{}</b>  {}",
        escape_html(&item.title),
        escape_html(&item.url)
    );

    let buttons = vec![
        Button {
            text: counter_label("Score", item.score),
            url: item.url.clone(),
        },
        Button {
            text: counter_label("Comments", item.descendants),
            url: discussion_url(item.id),
        },
    ];

    OutboundMessage { text, buttons }
}

/// Link to the discussion page of an item
pub fn discussion_url(id: ItemId) -> String {
    format!("{}{}", DISCUSSION_BASE, id)
}

fn counter_label(name: &str, value: i64) -> String {
    if value > HOT_THRESHOLD {
        format!("{}: {}+ {}", name, value, HOT)
    } else {
        format!("{}: {}+", name, value)
    }
}

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
