// src/game.rs
use std::path::PathBuf;

use crate::ai::Narrator;
use crate::case::{AppliedDelta, CaseState, DuplicatePolicy, Genre, SessionId, Speaker};
use crate::command::{Command, PlayerInput, help_text};
use crate::error::{AIError, GameError, SaveError};
use crate::labels;
use crate::prompt::{Prompt, PromptComposer};
use crate::save::{CaseStore, SaveSummary};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    MainMenu,
    ActiveCase,
    AwaitingModelReply,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOptions {
    pub window: usize,
    pub duplicates: DuplicatePolicy,
    pub autosave: bool,
    pub title_attempts: u32,
    pub strip_labels: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for GameOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            window: settings.history_window,
            duplicates: settings.duplicate_policy,
            autosave: settings.autosave,
            title_attempts: settings.title_attempts.max(1),
            strip_labels: settings.strip_labels,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TurnKind {
    /// `held` is a line the player typed before the case had opened.
    Opening { attempt: u32, held: Option<String> },
    Player(String),
}

/// A request that has been composed but not answered. Owning it is the only
/// way to finish or abandon the turn.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingTurn {
    kind: TurnKind,
    prompt: Prompt,
}

impl PendingTurn {
    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub fn is_opening(&self) -> bool {
        matches!(self.kind, TurnKind::Opening { .. })
    }

    /// The player's words, for resubmitting after a failure.
    pub fn player_input(&self) -> Option<&str> {
        match &self.kind {
            TurnKind::Player(input) => Some(input),
            TurnKind::Opening { .. } => None,
        }
    }

    /// A line waiting for the opening to land before it goes out.
    pub fn held_input(&self) -> Option<&str> {
        match &self.kind {
            TurnKind::Opening { held, .. } => held.as_deref(),
            TurnKind::Player(_) => None,
        }
    }
}

/// What the player sees after a reply has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub narration: String,
    pub applied: AppliedDelta,
    pub title_deferred: bool,
    pub solved: bool,
    pub warnings: Vec<String>,
    /// The player's line held back by the opening; send it next.
    pub held_input: Option<String>,
}

#[derive(Debug)]
pub enum TurnOutcome {
    Completed(TurnReport),
    /// The opening reply named no case; the same request goes out again.
    Retry(PendingTurn),
}

#[derive(Debug)]
pub enum InputAction {
    Nothing,
    Send(PendingTurn),
    Help(String),
    Saved(PathBuf),
    ConfirmQuit,
    ConfirmDelete,
}

/// Drives one session: menu, case, waiting for the narrator, and back.
#[derive(Debug)]
pub struct GameController<S: CaseStore> {
    state: ControllerState,
    case: Option<CaseState>,
    composer: PromptComposer,
    store: S,
    options: GameOptions,
}

impl<S: CaseStore> GameController<S> {
    pub fn new(composer: PromptComposer, store: S, options: GameOptions) -> Self {
        Self {
            state: ControllerState::MainMenu,
            case: None,
            composer,
            store,
            options,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn case(&self) -> Option<&CaseState> {
        self.case.as_ref()
    }

    pub fn options(&self) -> GameOptions {
        self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn list_saves(&self) -> Vec<SaveSummary> {
        self.store.list()
    }

    /// Removes a save from the main menu's list.
    pub fn delete_save(&self, session_id: SessionId) -> Result<(), GameError> {
        self.expect_state(ControllerState::MainMenu)?;
        Ok(self.store.delete(session_id)?)
    }

    pub fn new_case(&mut self, genre: Genre) -> Result<PendingTurn, GameError> {
        self.expect_state(ControllerState::MainMenu)?;
        let case = CaseState::with_policy(genre, self.options.window, self.options.duplicates);
        log::info!("New {genre} case {}", case.session_id());
        self.case = Some(case);
        self.state = ControllerState::ActiveCase;
        self.begin_opening()
    }

    pub fn load_case(&mut self, session_id: SessionId) -> Result<&CaseState, GameError> {
        self.expect_state(ControllerState::MainMenu)?;
        let case = self.store.load(session_id)?;
        log::info!("Resuming case {} ({})", session_id, case.display_title());
        self.state = ControllerState::ActiveCase;
        Ok(self.case.insert(case))
    }

    /// True until the narrator has opened the case.
    pub fn needs_opening(&self) -> bool {
        self.case
            .as_ref()
            .is_some_and(|case| case.last_narration().is_none())
    }

    pub fn begin_opening(&mut self) -> Result<PendingTurn, GameError> {
        self.start_turn(TurnKind::Opening {
            attempt: 1,
            held: None,
        })
    }

    pub fn begin_turn(&mut self, input: impl Into<String>) -> Result<PendingTurn, GameError> {
        self.start_turn(TurnKind::Player(input.into()))
    }

    fn start_turn(&mut self, kind: TurnKind) -> Result<PendingTurn, GameError> {
        self.expect_state(ControllerState::ActiveCase)?;
        let case = self.case.as_ref().ok_or(GameError::NoActiveCase)?;
        let prompt = match &kind {
            TurnKind::Opening { .. } => self.composer.compose(case, None),
            TurnKind::Player(input) => self.composer.compose(case, Some(input)),
        };
        self.state = ControllerState::AwaitingModelReply;
        Ok(PendingTurn { kind, prompt })
    }

    /// Returns to the case without touching it, as if the turn never started.
    pub fn abandon_turn(&mut self, pending: PendingTurn) {
        if self.state == ControllerState::AwaitingModelReply {
            log::info!("Turn abandoned: {:?}", pending.kind);
            self.state = ControllerState::ActiveCase;
        }
    }

    /// Applies the narrator's answer. A failed call leaves the case exactly as
    /// it was before the turn began.
    pub fn complete_turn(
        &mut self,
        pending: PendingTurn,
        reply: Result<String, AIError>,
    ) -> Result<TurnOutcome, GameError> {
        self.expect_state(ControllerState::AwaitingModelReply)?;

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("Narrator unavailable, turn abandoned: {e}");
                self.state = ControllerState::ActiveCase;
                return Err(GameError::ModelUnavailable(e));
            }
        };

        let delta = labels::parse(&reply);
        let mut title_deferred = false;

        let mut held_input = None;
        let player_text = match pending.kind {
            TurnKind::Opening { attempt, held } => {
                let untitled = self.case.as_ref().is_some_and(|case| case.title().is_none());
                if untitled && delta.case_title.is_none() {
                    if attempt < self.options.title_attempts {
                        log::warn!("Opening reply had no CASE TITLE, retry {}", attempt + 1);
                        return Ok(TurnOutcome::Retry(PendingTurn {
                            kind: TurnKind::Opening {
                                attempt: attempt + 1,
                                held,
                            },
                            prompt: pending.prompt,
                        }));
                    }
                    log::warn!("{}", GameError::MalformedReply { attempts: attempt });
                    title_deferred = true;
                }
                held_input = held;
                let genre = self.case.as_ref().map(CaseState::genre).unwrap_or(Genre::Mystery);
                format!("Start a new {genre} case for me.")
            }
            TurnKind::Player(input) => input,
        };

        let case = self.case.as_mut().ok_or(GameError::NoActiveCase)?;
        let was_solved = case.is_solved();
        case.record_turn(Speaker::Player, player_text.as_str());
        case.record_turn(Speaker::Narrator, reply.as_str());
        let applied = case.apply_delta(&delta);
        if !applied.is_empty() {
            log::info!("Case facts updated: {}", applied.lines().join("; "));
        }
        if solution_confirmed(&player_text, &reply) {
            log::info!("Case {} solved", case.session_id());
            case.mark_solved();
        }
        let solved = case.is_solved() && !was_solved;
        self.state = ControllerState::ActiveCase;

        let mut warnings = Vec::new();
        if self.options.autosave {
            if let Err(e) = self.save() {
                warnings.push(format!("Autosave failed: {e}"));
            }
        }

        Ok(TurnOutcome::Completed(TurnReport {
            narration: self.render_narration(&reply),
            applied,
            title_deferred,
            solved,
            warnings,
            held_input,
        }))
    }

    /// One full exchange: compose, ask the narrator, apply. Retries the
    /// opening while it lacks a title.
    pub async fn drive<N: Narrator>(
        &mut self,
        narrator: &N,
        mut pending: PendingTurn,
    ) -> Result<TurnReport, GameError> {
        loop {
            let reply = narrator.narrate(pending.prompt()).await;
            match self.complete_turn(pending, reply)? {
                TurnOutcome::Completed(report) => return Ok(report),
                TurnOutcome::Retry(next) => pending = next,
            }
        }
    }

    pub async fn play_opening<N: Narrator>(
        &mut self,
        narrator: &N,
        genre: Genre,
    ) -> Result<TurnReport, GameError> {
        let pending = self.new_case(genre)?;
        self.drive(narrator, pending).await
    }

    pub async fn play_turn<N: Narrator>(
        &mut self,
        narrator: &N,
        input: &str,
    ) -> Result<TurnReport, GameError> {
        let pending = self.begin_turn(input)?;
        self.drive(narrator, pending).await
    }

    /// Routes a line typed during a case. Commands never reach the narrator.
    /// Until the case has opened, the opening goes first and a typed line is
    /// held for [`TurnReport::held_input`].
    pub fn handle_input(&mut self, raw: &str) -> Result<InputAction, GameError> {
        self.expect_state(ControllerState::ActiveCase)?;
        match PlayerInput::parse(raw) {
            PlayerInput::Command(Command::Save) => Ok(InputAction::Saved(self.save()?)),
            PlayerInput::Command(Command::Help) => Ok(InputAction::Help(help_text())),
            PlayerInput::Command(Command::Quit) => Ok(InputAction::ConfirmQuit),
            PlayerInput::Command(Command::Delete) => Ok(InputAction::ConfirmDelete),
            input if self.needs_opening() => {
                let held = match input {
                    PlayerInput::Narrative(text) => Some(text),
                    _ => None,
                };
                let pending = self.start_turn(TurnKind::Opening { attempt: 1, held })?;
                Ok(InputAction::Send(pending))
            }
            PlayerInput::Empty => Ok(InputAction::Nothing),
            PlayerInput::Narrative(text) => Ok(InputAction::Send(self.begin_turn(text)?)),
        }
    }

    /// Persists the active case. Failure leaves the session running in memory.
    pub fn save(&mut self) -> Result<PathBuf, GameError> {
        if !matches!(
            self.state,
            ControllerState::ActiveCase | ControllerState::AwaitingModelReply
        ) {
            return Err(GameError::NoActiveCase);
        }
        let case = self.case.as_mut().ok_or(GameError::NoActiveCase)?;
        let mut snapshot = case.clone();
        snapshot.touch_saved();
        match self.store.save(&snapshot) {
            Ok(path) => {
                *case = snapshot;
                Ok(path)
            }
            Err(e) => {
                log::error!("Saving case {} failed: {e}", case.session_id());
                Err(GameError::Persistence(e))
            }
        }
    }

    /// Leaves the case for the main menu, saving first if asked. A failed save
    /// keeps the case open.
    pub fn quit(&mut self, save_first: bool) -> Result<(), GameError> {
        self.expect_state(ControllerState::ActiveCase)?;
        if save_first {
            self.save()?;
        }
        self.close_case();
        Ok(())
    }

    /// Discards the case and its save file.
    pub fn delete_case(&mut self) -> Result<(), GameError> {
        self.expect_state(ControllerState::ActiveCase)?;
        let session_id = self
            .case
            .as_ref()
            .map(CaseState::session_id)
            .ok_or(GameError::NoActiveCase)?;
        match self.store.delete(session_id) {
            Ok(()) | Err(SaveError::NotFound(_)) => {}
            Err(e) => return Err(GameError::Persistence(e)),
        }
        self.close_case();
        Ok(())
    }

    /// Program exit, only from the main menu.
    pub fn exit(&mut self) -> Result<(), GameError> {
        self.expect_state(ControllerState::MainMenu)?;
        self.state = ControllerState::Ended;
        Ok(())
    }

    /// The latest narration, for redisplay after loading.
    pub fn resume_narration(&self) -> Option<String> {
        let case = self.case.as_ref()?;
        case.last_narration().map(|text| self.render_narration(text))
    }

    /// Narrator text as the player sees it, labels stripped when configured.
    pub fn render_narration(&self, reply: &str) -> String {
        if self.options.strip_labels {
            labels::strip_labels(reply)
        } else {
            reply.to_string()
        }
    }

    fn close_case(&mut self) {
        if let Some(case) = self.case.take() {
            log::info!("Closed case {}", case.session_id());
        }
        self.state = ControllerState::MainMenu;
    }

    fn expect_state(&self, expected: ControllerState) -> Result<(), GameError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GameError::InvalidState {
                expected,
                found: self.state,
            })
        }
    }
}

const SOLVING_PHRASES: &[&str] = &[
    "i believe the culprit is",
    "the culprit is",
    "the killer must be",
    "the murderer is",
    "my conclusion is",
    "i accuse",
    "the solution is",
    "i've solved it",
    "i have solved it",
];

const CONFIRMING_PHRASES: &[&str] = &[
    "indeed, that is correct",
    "precisely my deduction",
    "you have unravelled it",
    "the case is closed",
    "brilliant deduction",
    "you've pieced it together",
    "the mystery is solved",
    "congratulations are in order",
];

const DENYING_PHRASES: &[&str] = &["incorrect", "not quite", "alas, no", "mistaken", "i think not"];

/// The player named a solution and the narrator confirmed it without denying it.
fn solution_confirmed(input: &str, reply: &str) -> bool {
    let input = input.to_lowercase();
    let reply = reply.to_lowercase();
    let contains_any = |text: &str, phrases: &[&str]| phrases.iter().any(|p| text.contains(p));
    contains_any(&input, SOLVING_PHRASES)
        && contains_any(&reply, CONFIRMING_PHRASES)
        && !contains_any(&reply, DENYING_PHRASES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{PersonaTemplate, PromptLimits};
    use crate::save::SaveManager;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, AIError>>>,
        prompts: Mutex<Vec<Prompt>>,
    }

    impl Scripted {
        fn new(replies: impl IntoIterator<Item = Result<&'static str, AIError>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|reply| reply.map(str::to_string))
                        .collect(),
                ),
                prompts: Mutex::default(),
            }
        }

        fn prompts(&self) -> Vec<Prompt> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl Narrator for Scripted {
        fn narrate(&self, prompt: &Prompt) -> impl Future<Output = Result<String, AIError>> + Send {
            self.prompts.lock().unwrap().push(prompt.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(AIError::EmptyReply));
            async move { reply }
        }
    }

    struct BrokenDisk;

    impl CaseStore for BrokenDisk {
        fn save(&self, _case: &CaseState) -> Result<PathBuf, SaveError> {
            Err(SaveError::Io(std::io::Error::other("disk full")))
        }
        fn load(&self, session_id: SessionId) -> Result<CaseState, SaveError> {
            Err(SaveError::NotFound(session_id))
        }
        fn delete(&self, _session_id: SessionId) -> Result<(), SaveError> {
            Err(SaveError::Io(std::io::Error::other("read-only")))
        }
        fn list(&self) -> Vec<SaveSummary> {
            Vec::new()
        }
    }

    const OPENING: &str = "A veiled lady waits in my sitting room.\n\
                           CASE TITLE: The Veiled Lodger\n\
                           NEW SUSPECT: The lady's husband\n\
                           TIME UPDATE: 10:00 AM";

    fn controller<S: CaseStore>(store: S, options: GameOptions) -> GameController<S> {
        GameController::new(
            PromptComposer::new(PersonaTemplate::default(), PromptLimits::default()),
            store,
            options,
        )
    }

    fn saves(dir: &tempfile::TempDir) -> SaveManager {
        SaveManager::new(dir.path())
    }

    #[tokio::test]
    async fn opening_applies_labels_and_autosaves() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(saves(&dir), GameOptions::default());
        let narrator = Scripted::new([Ok(OPENING)]);

        let report = game.play_opening(&narrator, Genre::Murder).await.unwrap();

        assert_eq!(game.state(), ControllerState::ActiveCase);
        assert_eq!(report.applied.title.as_deref(), Some("The Veiled Lodger"));
        assert!(!report.title_deferred);
        assert!(report.warnings.is_empty());
        let case = game.case().unwrap();
        assert_eq!(case.suspects(), ["The lady's husband"]);
        assert_eq!(case.current_time(), Some("10:00 AM"));
        assert_eq!(case.transcript().len(), 2);
        assert_eq!(game.list_saves().len(), 1);
    }

    #[tokio::test]
    async fn untitled_opening_is_retried_then_deferred() {
        let dir = tempfile::tempdir().unwrap();
        let options = GameOptions {
            title_attempts: 2,
            ..GameOptions::default()
        };
        let mut game = controller(saves(&dir), options);
        let narrator = Scripted::new([
            Ok("Fog. TIME UPDATE: dawn"),
            Ok("More fog.\nTIME UPDATE: 6:00 AM"),
        ]);

        let report = game.play_opening(&narrator, Genre::Mystery).await.unwrap();

        assert!(report.title_deferred);
        assert_eq!(narrator.prompts().len(), 2);
        let case = game.case().unwrap();
        assert_eq!(case.title(), None);
        assert_eq!(case.current_time(), Some("6:00 AM"));
        // The rejected attempt leaves no trace.
        assert_eq!(case.transcript().len(), 2);

        // Still untitled, so the next turn keeps asking for a name.
        let pending = game.begin_turn("I light my pipe").unwrap();
        assert!(pending.prompt().system.contains("CASE TITLE"));
        game.abandon_turn(pending);
    }

    #[tokio::test]
    async fn failed_turn_changes_nothing_and_can_be_resubmitted() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(saves(&dir), GameOptions::default());
        let narrator = Scripted::new([
            Ok(OPENING),
            Err(AIError::Timeout),
            Ok("The ash is Trichinopoly.\nNEW CLUE: Trichinopoly ash on the sill"),
        ]);
        game.play_opening(&narrator, Genre::Mystery).await.unwrap();
        let before = game.case().cloned().unwrap();

        let error = game.play_turn(&narrator, "I examine the window").await.unwrap_err();
        assert!(matches!(error, GameError::ModelUnavailable(AIError::Timeout)));
        assert_eq!(game.state(), ControllerState::ActiveCase);
        assert_eq!(game.case(), Some(&before));

        game.play_turn(&narrator, "I examine the window").await.unwrap();
        let case = game.case().unwrap();
        assert_eq!(case.clues(), ["Trichinopoly ash on the sill"]);
        assert_eq!(case.transcript().len(), before.transcript().len() + 2);
    }

    #[tokio::test]
    async fn commands_never_reach_the_narrator() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(saves(&dir), GameOptions::default());
        let narrator = Scripted::new([Ok(OPENING)]);
        game.play_opening(&narrator, Genre::Mystery).await.unwrap();

        assert!(matches!(game.handle_input("/help"), Ok(InputAction::Help(_))));
        assert!(matches!(game.handle_input("/save"), Ok(InputAction::Saved(path)) if path.exists()));
        assert!(matches!(game.handle_input("/quit"), Ok(InputAction::ConfirmQuit)));
        assert!(matches!(game.handle_input("/delete"), Ok(InputAction::ConfirmDelete)));
        assert!(matches!(game.handle_input("  "), Ok(InputAction::Nothing)));
        assert_eq!(narrator.prompts().len(), 1);
        assert_eq!(game.state(), ControllerState::ActiveCase);

        match game.handle_input("I ring for Mrs Hudson") {
            Ok(InputAction::Send(pending)) => {
                assert_eq!(pending.player_input(), Some("I ring for Mrs Hudson"));
                assert_eq!(game.state(), ControllerState::AwaitingModelReply);
                game.abandon_turn(pending);
            }
            other => panic!("expected a narrator request, got {other:?}"),
        }
        assert_eq!(game.state(), ControllerState::ActiveCase);
    }

    #[tokio::test]
    async fn failed_opening_is_retried_on_next_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(saves(&dir), GameOptions::default());
        let narrator = Scripted::new([Err(AIError::RateLimited("slow down".into()))]);

        assert!(game.play_opening(&narrator, Genre::Fantasy).await.is_err());
        assert!(game.needs_opening());

        match game.handle_input("") {
            Ok(InputAction::Send(pending)) => {
                assert!(pending.is_opening());
                assert_eq!(pending.held_input(), None);
                game.abandon_turn(pending);
            }
            other => panic!("expected the opening again, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn line_typed_before_the_opening_is_sent_after_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(saves(&dir), GameOptions::default());
        let narrator = Scripted::new([
            Err(AIError::Timeout),
            Ok(OPENING),
            Ok("The lodger lifts her veil.\nNEW CLUE: A scar along her jaw"),
        ]);
        assert!(game.play_opening(&narrator, Genre::Mystery).await.is_err());

        let pending = match game.handle_input("I ask the lady to lift her veil") {
            Ok(InputAction::Send(pending)) => pending,
            other => panic!("expected the opening again, got {other:?}"),
        };
        assert!(pending.is_opening());
        assert_eq!(pending.held_input(), Some("I ask the lady to lift her veil"));

        let report = game.drive(&narrator, pending).await.unwrap();
        let held = report.held_input.expect("the typed line comes back");
        assert_eq!(held, "I ask the lady to lift her veil");

        game.play_turn(&narrator, &held).await.unwrap();
        let last = narrator.prompts().pop().unwrap();
        assert!(last.user.contains("I ask the lady to lift her veil"));
        assert_eq!(game.case().unwrap().clues(), ["A scar along her jaw"]);
    }

    #[tokio::test]
    async fn save_failures_are_warnings() {
        let mut game = controller(BrokenDisk, GameOptions::default());
        let narrator = Scripted::new([Ok(OPENING)]);

        let report = game.play_opening(&narrator, Genre::Espionage).await.unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(game.case().unwrap().saved_at(), None);

        assert!(matches!(game.handle_input("/save"), Err(GameError::Persistence(_))));
        assert!(matches!(game.quit(true), Err(GameError::Persistence(_))));
        assert_eq!(game.state(), ControllerState::ActiveCase);

        assert!(matches!(game.delete_case(), Err(GameError::Persistence(_))));
        assert!(game.case().is_some());

        game.quit(false).unwrap();
        assert_eq!(game.state(), ControllerState::MainMenu);
        assert!(game.case().is_none());
    }

    #[tokio::test]
    async fn confirmed_accusation_solves_the_case() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(saves(&dir), GameOptions::default());
        let narrator = Scripted::new([
            Ok(OPENING),
            Ok("Brilliant deduction. The case is closed, and the husband confesses."),
        ]);
        game.play_opening(&narrator, Genre::Murder).await.unwrap();

        let report = game
            .play_turn(&narrator, "I accuse the husband of the murder")
            .await
            .unwrap();
        assert!(report.solved);
        assert!(game.case().unwrap().is_solved());
    }

    #[tokio::test]
    async fn labels_can_be_stripped_from_narration() {
        let dir = tempfile::tempdir().unwrap();
        let options = GameOptions {
            strip_labels: true,
            ..GameOptions::default()
        };
        let mut game = controller(saves(&dir), options);
        let narrator = Scripted::new([Ok(OPENING)]);

        let report = game.play_opening(&narrator, Genre::Mystery).await.unwrap();
        assert!(report.narration.contains("veiled lady"));
        assert!(!report.narration.contains("CASE TITLE"));
        // The transcript keeps the raw reply.
        assert!(game.case().unwrap().last_narration().unwrap().contains("CASE TITLE"));
    }

    #[test]
    fn state_machine_rejects_out_of_order_calls() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = controller(saves(&dir), GameOptions::default());

        assert!(matches!(
            game.begin_turn("hello"),
            Err(GameError::InvalidState { expected: ControllerState::ActiveCase, found: ControllerState::MainMenu })
        ));
        let pending = game.new_case(Genre::Historical).unwrap();
        assert!(matches!(game.new_case(Genre::Mystery), Err(GameError::InvalidState { .. })));
        assert!(matches!(game.exit(), Err(GameError::InvalidState { .. })));
        game.abandon_turn(pending);
        game.quit(false).unwrap();
        game.exit().unwrap();
        assert_eq!(game.state(), ControllerState::Ended);
    }

    #[test]
    fn solution_needs_attempt_and_confirmation() {
        assert!(solution_confirmed(
            "I accuse the butler!",
            "Brilliant deduction. The case is closed."
        ));
        assert!(!solution_confirmed(
            "I accuse the butler!",
            "Not quite, the case is closed to you."
        ));
        assert!(!solution_confirmed("I look around", "The case is closed."));
    }
}
