// src/labels.rs
//
// Line-oriented grammar for the facts the narrator attaches to its replies:
//
//   line    := (decor | bullet)* (number ('.' | ')'))? decor* label sep? payload
//   label   := word (ws | '_')+ word      matched case-insensitively
//   sep     := decor* (':' | '-' | '–' | '—' | '=') decor*
//   decor   := whitespace | '*' | '_' | '#' | '>' | '`'
//
// Everything that is not a label line is narrative.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Label {
    #[strum(to_string = "NEW CLUE")]
    NewClue,
    #[strum(to_string = "NEW SUSPECT")]
    NewSuspect,
    #[strum(to_string = "NEW LOCATION")]
    NewLocation,
    #[strum(to_string = "NEW ITEM")]
    NewItem,
    #[strum(to_string = "TIME UPDATE")]
    TimeUpdate,
    #[strum(to_string = "CASE TITLE")]
    CaseTitle,
}

impl Label {
    pub const ALL: [Label; 6] = [
        Label::NewClue,
        Label::NewSuspect,
        Label::NewLocation,
        Label::NewItem,
        Label::TimeUpdate,
        Label::CaseTitle,
    ];

    fn words(self) -> [&'static str; 2] {
        match self {
            Label::NewClue => ["NEW", "CLUE"],
            Label::NewSuspect => ["NEW", "SUSPECT"],
            Label::NewLocation => ["NEW", "LOCATION"],
            Label::NewItem => ["NEW", "ITEM"],
            Label::TimeUpdate => ["TIME", "UPDATE"],
            Label::CaseTitle => ["CASE", "TITLE"],
        }
    }
}

/// The facts extracted from one narrator reply. Consumed immediately by
/// [`crate::case::CaseState::apply_delta`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDelta {
    pub clues: Vec<String>,
    pub suspects: Vec<String>,
    pub locations: Vec<String>,
    pub items: Vec<String>,
    pub time_update: Option<String>,
    pub case_title: Option<String>,
}

impl ParsedDelta {
    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
            && self.suspects.is_empty()
            && self.locations.is_empty()
            && self.items.is_empty()
            && self.time_update.is_none()
            && self.case_title.is_none()
    }

    fn push(&mut self, label: Label, payload: String) {
        match label {
            Label::NewClue => self.clues.push(payload),
            Label::NewSuspect => self.suspects.push(payload),
            Label::NewLocation => self.locations.push(payload),
            Label::NewItem => self.items.push(payload),
            Label::TimeUpdate => self.time_update = Some(payload),
            Label::CaseTitle => self.case_title = Some(payload),
        }
    }
}

/// Scans a reply for label lines. Never fails: a reply without labels gives an
/// empty delta. Later singular labels (time, title) overwrite earlier ones.
pub fn parse(text: &str) -> ParsedDelta {
    let mut delta = ParsedDelta::default();
    for line in text.lines() {
        let Some((label, payload)) = match_label(line) else {
            continue;
        };
        let payload = match label {
            Label::CaseTitle => clean_title(payload),
            _ => payload,
        };
        if is_placeholder(payload) {
            continue;
        }
        delta.push(label, payload.to_string());
    }
    delta
}

/// Recognizes a single label line and returns the label with its trimmed payload.
pub fn match_label(line: &str) -> Option<(Label, &str)> {
    let rest = trim_list_marker(line);
    Label::ALL.into_iter().find_map(|label| {
        let after = strip_label(rest, label)?;
        Some((label, payload_of(after)))
    })
}

/// Removes recognized label lines, keeping the narrative body.
pub fn strip_labels(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| match_label(line).is_none())
        .collect();
    kept.join("\n").trim_end().to_string()
}

// Bullets, then an optional "1." or "2)" list number.
fn trim_list_marker(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| is_decor(c) || matches!(c, '-' | '•'));
    let numbered = rest
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .strip_prefix(|c: char| matches!(c, '.' | ')'));
    match numbered {
        Some(after) if after.len() + 1 < rest.len() => after.trim_start_matches(is_decor),
        _ => rest,
    }
}

fn strip_label(line: &str, label: Label) -> Option<&str> {
    let [first, second] = label.words();
    let rest = strip_word(line, first)?;
    let gap = rest.len() - rest.trim_start_matches(|c: char| c.is_whitespace() || c == '_').len();
    if gap == 0 {
        return None;
    }
    let rest = strip_word(&rest[gap..], second)?;
    // "NEW CLUES" or "CASE TITLED" are not labels.
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() => None,
        _ => Some(rest),
    }
}

fn strip_word<'a>(s: &'a str, word: &str) -> Option<&'a str> {
    let head = s.get(..word.len())?;
    head.eq_ignore_ascii_case(word).then(|| &s[word.len()..])
}

fn payload_of(after_label: &str) -> &str {
    let rest = after_label.trim_start_matches(is_decor);
    let rest = rest
        .strip_prefix(is_separator)
        .unwrap_or(rest)
        .trim_start_matches(is_decor);
    rest.trim()
}

fn is_decor(c: char) -> bool {
    c.is_whitespace() || matches!(c, '*' | '_' | '#' | '>' | '`')
}

fn is_separator(c: char) -> bool {
    matches!(c, ':' | '-' | '–' | '—' | '=')
}

fn clean_title(payload: &str) -> &str {
    payload
        .trim_matches(|c: char| c == '"' || c == '“' || c == '”' || c == '*')
        .trim()
}

// Template slots echoed back ("[description]", "<only when ...>") and
// the model's ways of saying there is nothing new.
const EMPTY_PAYLOADS: &[&str] = &["none", "n/a", "na", "nil", "nothing", "no", "-"];

fn is_placeholder(payload: &str) -> bool {
    let bracketed = |open: char, close: char| payload.starts_with(open) && payload.ends_with(close);
    let bare = payload.trim_end_matches('.');
    bare.is_empty()
        || bracketed('[', ']')
        || bracketed('<', '>')
        || EMPTY_PAYLOADS.iter().any(|empty| bare.eq_ignore_ascii_case(empty))
}
