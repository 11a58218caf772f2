// src/case.rs
use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use uuid::Uuid;

use crate::labels::ParsedDelta;

pub type SessionId = Uuid;

pub const DEFAULT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Genre {
    Mystery,
    Murder,
    Supernatural,
    Fantasy,
    #[strum(to_string = "Sci-Fi")]
    SciFi,
    Espionage,
    Historical,
}

impl Genre {
    pub fn random() -> Self {
        let genres: Vec<Genre> = Genre::iter().collect();
        genres
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(Genre::Mystery)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Speaker {
    Player,
    Narrator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// What to do with a fact that is already on file, compared by exact string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    #[default]
    Exact,
    Allow,
}

/// The facts a delta actually added to the case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedDelta {
    pub clues: Vec<String>,
    pub suspects: Vec<String>,
    pub locations: Vec<String>,
    pub items: Vec<String>,
    pub time: Option<String>,
    pub title: Option<String>,
}

impl AppliedDelta {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// One line per new fact, for the game log.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(title) = &self.title {
            lines.push(format!("Case title: {title}"));
        }
        let lists = [
            ("New clue", &self.clues),
            ("New suspect", &self.suspects),
            ("New location", &self.locations),
            ("New item", &self.items),
        ];
        for (name, values) in lists {
            lines.extend(values.iter().map(|value| format!("{name}: {value}")));
        }
        if let Some(time) = &self.time {
            lines.push(format!("Time: {time}"));
        }
        lines
    }
}

/// The structured record of one case. Only grows during play: the title is set
/// once, the genre never changes, fact lists are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseState {
    session_id: SessionId,
    genre: Genre,
    title: Option<String>,
    clues: Vec<String>,
    suspects: Vec<String>,
    locations: Vec<String>,
    items: Vec<String>,
    current_time: Option<String>,
    recent: VecDeque<Turn>,
    transcript: Vec<Turn>,
    window: usize,
    #[serde(default)]
    duplicates: DuplicatePolicy,
    #[serde(default)]
    case_solved: bool,
    started_at: DateTime<Utc>,
    saved_at: Option<DateTime<Utc>>,
}

impl CaseState {
    pub fn new(genre: Genre, window: usize) -> Self {
        Self::with_policy(genre, window, DuplicatePolicy::default())
    }

    pub fn with_policy(genre: Genre, window: usize, duplicates: DuplicatePolicy) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            genre,
            title: None,
            clues: Vec::new(),
            suspects: Vec::new(),
            locations: Vec::new(),
            items: Vec::new(),
            current_time: None,
            recent: VecDeque::new(),
            transcript: Vec::new(),
            window: window.max(1),
            duplicates,
            case_solved: false,
            started_at: Utc::now(),
            saved_at: None,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn genre(&self) -> Genre {
        self.genre
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The title, or a stand-in while the narrator has not named the case.
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("A {} Case", self.genre),
        }
    }

    pub fn clues(&self) -> &[String] {
        &self.clues
    }

    pub fn suspects(&self) -> &[String] {
        &self.suspects
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn current_time(&self) -> Option<&str> {
        self.current_time.as_deref()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn is_solved(&self) -> bool {
        self.case_solved
    }

    pub fn mark_solved(&mut self) {
        self.case_solved = true;
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.saved_at
    }

    pub fn touch_saved(&mut self) {
        self.saved_at = Some(Utc::now());
    }

    /// Merges one reply's facts into the case and reports what was new.
    pub fn apply_delta(&mut self, delta: &ParsedDelta) -> AppliedDelta {
        let duplicates = self.duplicates;
        let mut applied = AppliedDelta {
            clues: append(&mut self.clues, &delta.clues, duplicates),
            suspects: append(&mut self.suspects, &delta.suspects, duplicates),
            locations: append(&mut self.locations, &delta.locations, duplicates),
            items: append(&mut self.items, &delta.items, duplicates),
            ..AppliedDelta::default()
        };

        if let Some(time) = &delta.time_update {
            self.current_time = Some(time.clone());
            applied.time = Some(time.clone());
        }

        match (&self.title, &delta.case_title) {
            (None, Some(title)) => {
                log::info!("Case {} titled: {title}", self.session_id);
                self.title = Some(title.clone());
                applied.title = Some(title.clone());
            }
            (Some(current), Some(ignored)) if current != ignored => {
                log::debug!("Ignoring retitle to {ignored:?}, case is already {current:?}");
            }
            _ => {}
        }

        applied
    }

    /// Appends to the full transcript and to the prompt window, evicting the
    /// oldest windowed turns past the cap.
    pub fn record_turn(&mut self, speaker: Speaker, text: impl Into<String>) {
        let turn = Turn::new(speaker, text);
        self.transcript.push(turn.clone());
        self.recent.push_back(turn);
        while self.recent.len() > self.window {
            self.recent.pop_front();
        }
    }

    /// Turns visible to the prompt, oldest first.
    pub fn recent_turns(&self) -> impl DoubleEndedIterator<Item = &Turn> + ExactSizeIterator {
        self.recent.iter()
    }

    /// Every turn of the case, never evicted.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn last_narration(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|turn| turn.speaker == Speaker::Narrator)
            .map(|turn| turn.text.as_str())
    }

    pub fn opening_narration(&self) -> Option<&str> {
        self.transcript
            .iter()
            .find(|turn| turn.speaker == Speaker::Narrator)
            .map(|turn| turn.text.as_str())
    }

    /// Compact digest of every fact on file, independent of history length.
    pub fn summary(&self) -> String {
        let mut summary = format!("Case: {}\nGenre: {}\n", self.display_title(), self.genre);
        if let Some(time) = &self.current_time {
            summary.push_str(&format!("Time: {time}\n"));
        }
        let sections = [
            ("Clues I've found", &self.clues),
            ("Suspects I've identified", &self.suspects),
            ("Locations I'm aware of", &self.locations),
            ("Items I've noted", &self.items),
        ];
        for (heading, values) in sections {
            if values.is_empty() {
                continue;
            }
            summary.push_str(heading);
            summary.push_str(":\n");
            for value in values {
                summary.push_str("- ");
                summary.push_str(value);
                summary.push('\n');
            }
        }
        summary
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn append(list: &mut Vec<String>, new: &[String], duplicates: DuplicatePolicy) -> Vec<String> {
    let mut added = Vec::new();
    for value in new {
        if duplicates == DuplicatePolicy::Exact && list.contains(value) {
            continue;
        }
        list.push(value.clone());
        added.push(value.clone());
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels;

    fn delta() -> ParsedDelta {
        labels::parse(
            "NEW CLUE: Rosin dust\nNEW SUSPECT: Lord Ashby\nTIME UPDATE: 9:00 AM\nCASE TITLE: The Vanishing Violinist",
        )
    }

    #[test]
    fn title_is_set_once() {
        let mut case = CaseState::new(Genre::Mystery, DEFAULT_WINDOW);
        let applied = case.apply_delta(&delta());
        assert_eq!(applied.title.as_deref(), Some("The Vanishing Violinist"));

        let retitle = labels::parse("CASE TITLE: Something Else");
        let applied = case.apply_delta(&retitle);
        assert!(applied.title.is_none());
        assert_eq!(case.title(), Some("The Vanishing Violinist"));
    }

    #[test]
    fn lists_append_again_when_duplicates_allowed() {
        let mut case = CaseState::with_policy(Genre::Mystery, DEFAULT_WINDOW, DuplicatePolicy::Allow);
        case.apply_delta(&delta());
        case.apply_delta(&delta());
        assert_eq!(case.clues(), ["Rosin dust", "Rosin dust"]);
        assert_eq!(case.suspects().len(), 2);
        assert_eq!(case.title(), Some("The Vanishing Violinist"));
    }

    #[test]
    fn exact_duplicates_are_suppressed_by_default() {
        let mut case = CaseState::new(Genre::Mystery, DEFAULT_WINDOW);
        case.apply_delta(&delta());
        let applied = case.apply_delta(&delta());
        assert_eq!(case.clues(), ["Rosin dust"]);
        assert!(applied.clues.is_empty());
        // Only the time is reported again.
        assert_eq!(applied.time.as_deref(), Some("9:00 AM"));
    }

    #[test]
    fn time_overwrites() {
        let mut case = CaseState::new(Genre::Murder, DEFAULT_WINDOW);
        case.apply_delta(&labels::parse("TIME UPDATE: Noon"));
        case.apply_delta(&labels::parse("TIME UPDATE: Dusk"));
        assert_eq!(case.current_time(), Some("Dusk"));
    }

    #[test]
    fn window_keeps_most_recent_turns() {
        let cap = 4;
        let mut case = CaseState::new(Genre::Mystery, cap);
        for i in 0..cap + 5 {
            case.record_turn(Speaker::Player, format!("turn {i}"));
        }
        let recent: Vec<&str> = case.recent_turns().map(|t| t.text.as_str()).collect();
        assert_eq!(recent, ["turn 5", "turn 6", "turn 7", "turn 8"]);
        assert_eq!(case.transcript().len(), cap + 5);
    }

    #[test]
    fn summary_lists_facts() {
        let mut case = CaseState::new(Genre::Mystery, DEFAULT_WINDOW);
        case.apply_delta(&delta());
        let summary = case.summary();
        assert!(summary.contains("Case: The Vanishing Violinist"));
        assert!(summary.contains("Time: 9:00 AM"));
        assert!(summary.contains("- Rosin dust"));
        assert!(summary.contains("- Lord Ashby"));
        assert!(!summary.contains("Items"));
    }

    #[test]
    fn json_round_trip_preserves_everything() {
        let empty = CaseState::new(Genre::Espionage, 3);
        assert_eq!(CaseState::from_json(&empty.to_json().unwrap()).unwrap(), empty);

        let mut case = CaseState::new(Genre::SciFi, 2);
        case.apply_delta(&delta());
        for i in 0..5 {
            case.record_turn(Speaker::Narrator, format!("reply {i}"));
        }
        case.mark_solved();
        case.touch_saved();
        let restored = CaseState::from_json(&case.to_json().unwrap()).unwrap();
        assert_eq!(restored, case);
        assert_eq!(restored.recent_turns().len(), 2);
        assert_eq!(restored.transcript().len(), 5);
    }
}
