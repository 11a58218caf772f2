// src/prompt.rs
use std::path::Path;

use crate::case::{CaseState, Genre, Speaker, Turn};
use crate::settings::Settings;

pub const GENRE_TOKEN: &str = "{GENRE}";
const OPENING_SCENE_CHARS: usize = 300;

const DEFAULT_PERSONA: &str = r#"# Sherlock Holmes Interactive Mystery
## Role: Narrative Engine

You narrate an interactive Sherlock Holmes mystery set in Victorian London, in the manner of Sir Arthur Conan Doyle.

## The player IS Sherlock Holmes
Every player input is my own action, command or dialogue. Write everything in the FIRST PERSON from my point of view: "I", "me", "my". Never refer to Holmes in the third person.

## Case Setting: {GENRE}
Build a solvable {GENRE} case that unfolds through the player's actions.

## Responsibilities
1. Stay true to Holmes, his era and his deductive style.
2. Describe fog, gaslight and cobblestones; avoid anachronisms.
3. Introduce clues, suspects and developments at a measured pace.
4. Write other characters' dialogue out in quotes.
5. Keep each story beat to 5-8 sentences.
6. Remember and reference earlier discoveries.

## Labels
After the narrative, add one line per new fact, each starting at the beginning of a line:
NEW CLUE: <only when I discover something new>
NEW SUSPECT: <only when a new person falls under suspicion>
NEW LOCATION: <only when a new place becomes relevant>
NEW ITEM: <only when I find a relevant object>
TIME UPDATE: <always: the current time or how much has passed>
"#;

const TITLE_REQUEST: &str = "CASE TITLE: <this case has no name yet: add this line once, with the name I give the case>";

/// The fixed instruction text with a single `{GENRE}` substitution point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaTemplate(String);

impl Default for PersonaTemplate {
    fn default() -> Self {
        Self(DEFAULT_PERSONA.to_string())
    }
}

impl PersonaTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Reads `persona.txt` from the data directory, writing the built-in
    /// template there first so it can be edited.
    pub fn load_or_create(data_dir: &Path) -> Self {
        let path = data_dir.join("persona.txt");
        match std::fs::read_to_string(&path) {
            Ok(template) if template.contains(GENRE_TOKEN) => Self(template),
            Ok(_) => {
                log::warn!(
                    "{} has no {GENRE_TOKEN} placeholder, using the built-in persona",
                    path.display()
                );
                Self::default()
            }
            Err(_) => {
                if let Err(e) = std::fs::write(&path, DEFAULT_PERSONA) {
                    log::warn!("Could not write {}: {e}", path.display());
                }
                Self::default()
            }
        }
    }

    pub fn render(&self, genre: Genre) -> String {
        self.0.replace(GENRE_TOKEN, &genre.to_string())
    }
}

/// Text payload for the narrator, split by conversation role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Size in characters of everything sent to the model.
    pub fn len(&self) -> usize {
        self.system.chars().count() + self.user.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    pub max_chars: usize,
    pub max_turn_chars: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            max_chars: 12_000,
            max_turn_chars: 500,
        }
    }
}

impl From<&Settings> for PromptLimits {
    fn from(settings: &Settings) -> Self {
        Self {
            max_chars: settings.max_prompt_chars,
            max_turn_chars: settings.max_turn_chars,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptComposer {
    persona: PersonaTemplate,
    limits: PromptLimits,
}

impl PromptComposer {
    pub fn new(persona: PersonaTemplate, limits: PromptLimits) -> Self {
        Self { persona, limits }
    }

    pub fn limits(&self) -> PromptLimits {
        self.limits
    }

    /// Builds the request for the next turn. `None` input opens the case.
    ///
    /// Sections, in order: persona, case summary, recent turns, player input.
    /// When the payload would exceed the size limit the oldest turns go first,
    /// then the summary is clipped.
    pub fn compose(&self, case: &CaseState, input: Option<&str>) -> Prompt {
        let mut system = self.persona.render(case.genre());
        if case.title().is_none() {
            system.push_str(TITLE_REQUEST);
            system.push('\n');
        }

        let user = match input {
            None => opening_request(case.genre()),
            Some(input) => self.continuation(case, input, char_len(&system)),
        };

        fit(Prompt { system, user }, self.limits.max_chars)
    }

    fn continuation(&self, case: &CaseState, input: &str, system_len: usize) -> String {
        let action = format!(
            "## Current Input (My Action/Dialogue)\n{input}\n\n\
             Your response AS Holmes (5-8 sentences of narrative using 'I', then the labels):"
        );

        let mut case_file = format!("## Case File\n{}", case.summary());
        if let Some(opening) = case.opening_narration() {
            let scene = opening.split("\n\n").next().unwrap_or(opening);
            case_file.push_str("\n## Initial Scene\n");
            case_file.push_str(&clip(scene, OPENING_SCENE_CHARS));
            case_file.push('\n');
        }

        let fixed = system_len + char_len(&action) + SEPARATOR.len();
        let budget = self.limits.max_chars.saturating_sub(fixed);
        let case_file = clip(&case_file, budget);
        let remaining = budget.saturating_sub(char_len(&case_file) + SEPARATOR.len());

        let history = self.recent_events(case.recent_turns(), remaining);

        let mut user = case_file;
        if !history.is_empty() {
            user.push_str(SEPARATOR);
            user.push_str(&history);
        }
        user.push_str(SEPARATOR);
        user.push_str(&action);
        user
    }

    /// Newest turns are kept first; the result is in chronological order.
    fn recent_events<'a>(
        &self,
        turns: impl DoubleEndedIterator<Item = &'a Turn>,
        budget: usize,
    ) -> String {
        const HEADER: &str = "## Recent Events";
        let mut used = HEADER.len();
        let mut kept = Vec::new();
        for turn in turns.rev() {
            let entry = self.render_turn(turn);
            let cost = char_len(&entry) + SEPARATOR.len();
            if used + cost > budget {
                break;
            }
            used += cost;
            kept.push(entry);
        }
        if kept.is_empty() {
            return String::new();
        }
        kept.reverse();
        format!("{HEADER}{SEPARATOR}{}", kept.join(SEPARATOR))
    }

    fn render_turn(&self, turn: &Turn) -> String {
        match turn.speaker {
            Speaker::Player => format!("My Action/Thought: {}", turn.text),
            Speaker::Narrator => format!(
                "Narrative/Outcome:\n{}",
                clip(&turn.text, self.limits.max_turn_chars)
            ),
        }
    }
}

const SEPARATOR: &str = "\n\n";

fn opening_request(genre: Genre) -> String {
    format!(
        "## New Case: {genre}\n\
         Open a new {genre} case. Narrate what I experience at 221B Baker Street as the \
         mystery begins: a visitor, a message, something amiss in my rooms. Describe the scene \
         through my senses and my deductions, introduce the core of the mystery as I first \
         understand it, and hint at questions to pursue.\n\n\
         Write 6-8 sentences of first-person narrative, then the labels that apply. \
         TIME UPDATE is required. CASE TITLE is required in this first reply only."
    )
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Clips to at most `max` characters, marking the cut with "...".
fn clip(text: &str, max: usize) -> String {
    if char_len(text) <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut clipped: String = text.chars().take(max - 3).collect();
    clipped.push_str("...");
    clipped
}

/// Last resort when persona and input alone are over the limit.
fn fit(prompt: Prompt, max: usize) -> Prompt {
    if prompt.len() <= max {
        return prompt;
    }
    log::warn!(
        "Prompt of {} chars exceeds the {max} char limit, clipping",
        prompt.len()
    );
    let system = clip(&prompt.system, max);
    let user = clip(&prompt.user, max - char_len(&system));
    Prompt { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::DEFAULT_WINDOW;
    use crate::labels;

    fn composer(max_chars: usize) -> PromptComposer {
        PromptComposer::new(
            PersonaTemplate::default(),
            PromptLimits {
                max_chars,
                max_turn_chars: 500,
            },
        )
    }

    #[test]
    fn persona_substitutes_genre() {
        let persona = PersonaTemplate::new("Setting: {GENRE}. Again: {GENRE}.");
        assert_eq!(
            persona.render(Genre::Supernatural),
            "Setting: Supernatural. Again: Supernatural."
        );
    }

    #[test]
    fn opening_prompt_names_genre_and_asks_for_title() {
        let case = CaseState::new(Genre::Mystery, DEFAULT_WINDOW);
        let prompt = composer(12_000).compose(&case, None);
        assert!(prompt.system.contains("Mystery"));
        assert!(prompt.user.contains("Mystery"));
        assert!(prompt.system.contains("CASE TITLE:"));
        assert!(prompt.user.contains("CASE TITLE"));
    }

    #[test]
    fn echoed_instructions_carry_no_facts() {
        let case = CaseState::new(Genre::Mystery, DEFAULT_WINDOW);
        let prompt = composer(12_000).compose(&case, None);
        assert!(labels::parse(&prompt.system).is_empty());
        assert!(labels::parse(&prompt.user).is_empty());
    }

    #[test]
    fn titled_case_stops_asking_for_title() {
        let mut case = CaseState::new(Genre::Mystery, DEFAULT_WINDOW);
        case.apply_delta(&labels::parse("CASE TITLE: The Red Circle"));
        let prompt = composer(12_000).compose(&case, Some("I examine the door"));
        assert!(!prompt.system.contains(TITLE_REQUEST));
    }

    #[test]
    fn sections_come_in_order() {
        let mut case = CaseState::new(Genre::Murder, DEFAULT_WINDOW);
        case.apply_delta(&labels::parse("NEW CLUE: A bent key"));
        case.record_turn(Speaker::Player, "I inspect the lock");
        case.record_turn(Speaker::Narrator, "The lock has been forced.");
        let prompt = composer(12_000).compose(&case, Some("I question the butler"));

        let summary = prompt.user.find("- A bent key").unwrap();
        let history = prompt.user.find("My Action/Thought: I inspect the lock").unwrap();
        let input = prompt.user.find("I question the butler").unwrap();
        assert!(summary < history && history < input);
    }

    #[test]
    fn oldest_turns_are_dropped_before_the_summary() {
        let mut case = CaseState::new(Genre::Mystery, 50);
        case.apply_delta(&labels::parse("NEW CLUE: Ash on the carpet\nCASE TITLE: The Grey Ash"));
        for i in 0..40 {
            case.record_turn(Speaker::Player, format!("action number {i:02} {}", "x".repeat(80)));
        }
        let max = 4_000;
        let prompt = composer(max).compose(&case, Some("I light my pipe"));

        assert!(prompt.len() <= max);
        assert!(prompt.user.contains("- Ash on the carpet"));
        assert!(prompt.user.contains("action number 39"));
        assert!(!prompt.user.contains("action number 00"));
        assert!(prompt.user.contains("I light my pipe"));
    }

    #[test]
    fn never_exceeds_the_limit() {
        let mut case = CaseState::new(Genre::Mystery, DEFAULT_WINDOW);
        let clues: String = (0..200).map(|i| format!("NEW CLUE: clue {i}\n")).collect();
        case.apply_delta(&labels::parse(&clues));
        let max = 2_000;
        let prompt = composer(max).compose(&case, Some("I think"));
        assert!(prompt.len() <= max);
        assert!(prompt.user.contains("I think"));

        let prompt = composer(100).compose(&case, Some("I think"));
        assert!(prompt.len() <= 100);
    }

    #[test]
    fn long_narration_is_clipped_in_history_only() {
        let mut case = CaseState::new(Genre::Mystery, DEFAULT_WINDOW);
        let long = "y".repeat(2_000);
        case.record_turn(Speaker::Narrator, long.clone());
        let prompt = composer(12_000).compose(&case, Some("go on"));
        assert!(!prompt.user.contains(&long));
        assert_eq!(case.transcript()[0].text, long);
    }
}
