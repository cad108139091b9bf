//! Note renderer: minimal inline markup to HTML.
//!
//! Three substitutions run in order over the text: `**bold**`, `*italic*`,
//! then `` `code` ``. With [`Trust::Untrusted`] (the default) every HTML
//! structural character is escaped first. [`Trust::RawHtml`] skips escaping
//! and passes any other markup through verbatim; it is not a sanitizer.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::Note;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trust {
    /// Escape everything before substitution.
    #[default]
    Untrusted,
    /// Leave input markup untouched. Opt-in only.
    RawHtml,
}

/// A note prepared by the current list renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedNote {
    pub id: i64,
    pub owner: String,
    pub html: String,
}

/// Renders note text to HTML. Pure: the same input always yields the same markup.
pub fn render(text: &str, trust: Trust) -> String {
    let source = match trust {
        Trust::Untrusted => escape_html(text),
        Trust::RawHtml => text.to_string(),
    };
    let bold = bold_pattern().replace_all(&source, "<strong>$1</strong>");
    let italic = italic_pattern().replace_all(&bold, "<em>$1</em>");
    code_pattern()
        .replace_all(&italic, "<code>$1</code>")
        .into_owned()
}

/// Current list renderer: one card per note, in the order given.
pub fn render_note_cards(notes: &[Note], trust: Trust) -> Vec<RenderedNote> {
    notes
        .iter()
        .map(|note| RenderedNote {
            id: note.id,
            owner: attribute_text(note.owner_label(), trust),
            html: render(&note.content, trust),
        })
        .collect()
}

/// Legacy list renderer: a single HTML fragment for the whole list.
pub fn render_legacy_list(notes: &[Note], trust: Trust) -> String {
    notes
        .iter()
        .map(|note| {
            format!(
                "<div class=\"legacy-note\" data-id=\"{}\"><small>{}</small><div>{}</div></div>",
                note.id,
                attribute_text(note.owner_label(), trust),
                render(&note.content, trust)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn attribute_text(text: &str, trust: Trust) -> String {
    match trust {
        Trust::Untrusted => escape_html(text),
        Trust::RawHtml => text.to_string(),
    }
}

fn bold_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("Invalid regex"))
}

fn italic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*(.+?)\*").expect("Invalid regex"))
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"`(.+?)`").expect("Invalid regex"))
}
