// ../tests/tests.rs
use sherlock_ratatui::game::{InputAction, TurnOutcome};
use sherlock_ratatui::prompt::PromptLimits;
use sherlock_ratatui::*;
use std::fs;

fn opening_reply() -> String {
    fs::read_to_string("tests/opening_reply.txt").expect("Failed to read the opening reply fixture")
}

fn controller(dir: &tempfile::TempDir) -> GameController<SaveManager> {
    GameController::new(
        PromptComposer::new(PersonaTemplate::default(), PromptLimits::default()),
        SaveManager::new(dir.path().join("saves")),
        GameOptions::default(),
    )
}

// Starts a case and answers the opening with the fixture.
fn open_case(game: &mut GameController<SaveManager>, genre: Genre) -> Prompt {
    let pending = game.new_case(genre).unwrap();
    let prompt = pending.prompt().clone();
    match game.complete_turn(pending, Ok(opening_reply())).unwrap() {
        TurnOutcome::Completed(_) => prompt,
        TurnOutcome::Retry(_) => panic!("fixture reply should carry a title"),
    }
}

#[test]
fn parser_reads_a_decorated_reply() {
    let delta = parse(&opening_reply());
    assert_eq!(delta.case_title.as_deref(), Some("The Vanishing Violinist"));
    assert_eq!(delta.clues, ["Rosin dust on the client's gloves"]);
    assert_eq!(delta.suspects, ["Signor Bellini, the rival first violin"]);
    assert_eq!(delta.locations, ["The Langham Hotel"]);
    assert_eq!(delta.items, ["An empty violin case lined with green baize"]);
    assert_eq!(delta.time_update.as_deref(), Some("9:00 AM"));
}

#[test]
fn parser_ignores_plain_prose() {
    let delta = parse("I considered the matter closed, though the clue of the dog nagged at me.");
    assert!(delta.is_empty());
}

#[test]
fn mystery_opening_sets_title_and_time() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = controller(&dir);

    let prompt = open_case(&mut game, Genre::Mystery);
    assert!(prompt.system.contains("Mystery"));
    assert!(prompt.user.contains("Mystery"));
    assert!(prompt.system.contains("CASE TITLE"));

    let case = game.case().unwrap();
    assert_eq!(case.title(), Some("The Vanishing Violinist"));
    assert_eq!(case.current_time(), Some("9:00 AM"));
    assert_eq!(game.state(), ControllerState::ActiveCase);

    // Named cases stop asking for a title.
    let next = game.begin_turn("I examine the violin case").unwrap();
    assert!(!next.prompt().system.contains("CASE TITLE"));
    assert!(next.prompt().user.contains("The Vanishing Violinist"));
    assert!(next.prompt().user.contains("I examine the violin case"));
}

#[test]
fn delete_removes_the_save_and_returns_to_menu() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = controller(&dir);
    open_case(&mut game, Genre::Murder);
    let session_id = game.case().unwrap().session_id();
    assert_eq!(game.list_saves().len(), 1);

    assert!(matches!(game.handle_input("/delete"), Ok(InputAction::ConfirmDelete)));
    game.delete_case().unwrap();

    assert_eq!(game.state(), ControllerState::MainMenu);
    assert!(game.list_saves().is_empty());
    assert!(matches!(
        game.load_case(session_id),
        Err(GameError::SessionNotFound(id)) if id == session_id
    ));
    assert_eq!(game.state(), ControllerState::MainMenu);
}

#[test]
fn model_failure_then_resubmission() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = controller(&dir);
    open_case(&mut game, Genre::Mystery);
    let before = game.case().cloned().unwrap();

    let pending = game.begin_turn("I question Signor Bellini").unwrap();
    let error = game
        .complete_turn(pending, Err(AIError::Transport("connection reset".into())))
        .unwrap_err();
    assert!(matches!(error, GameError::ModelUnavailable(_)));
    assert_eq!(game.case(), Some(&before));

    let pending = game.begin_turn("I question Signor Bellini").unwrap();
    let reply = "Bellini sneers but his hands shake.\nNEW CLUE: Bellini's trembling hands".to_string();
    game.complete_turn(pending, Ok(reply)).unwrap();

    let case = game.case().unwrap();
    assert_eq!(
        case.clues(),
        ["Rosin dust on the client's gloves", "Bellini's trembling hands"]
    );
    assert_eq!(case.transcript().len(), before.transcript().len() + 2);
}

#[test]
fn saved_case_resumes_where_it_left_off() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = controller(&dir);
    open_case(&mut game, Genre::Historical);
    let saved = game.case().cloned().unwrap();
    game.quit(true).unwrap();

    let summaries = game.list_saves();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].title, "The Vanishing Violinist");

    let loaded = game.load_case(saved.session_id()).unwrap().clone();
    assert_eq!(loaded.clues(), saved.clues());
    assert_eq!(loaded.transcript(), saved.transcript());
    assert_eq!(game.resume_narration(), saved.last_narration().map(str::to_string));
}

#[test]
fn long_sessions_keep_prompts_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        max_prompt_chars: 4000,
        ..Settings::default()
    };
    let mut game = GameController::new(
        PromptComposer::new(PersonaTemplate::default(), PromptLimits::from(&settings)),
        SaveManager::new(dir.path()),
        GameOptions::from(&settings),
    );
    open_case(&mut game, Genre::Supernatural);

    for i in 0..30 {
        let pending = game.begin_turn(format!("I search room {i}")).unwrap();
        assert!(pending.prompt().len() <= 4000);
        let reply = format!("{}\nNEW CLUE: Scratch marks in room {i}", "The candle gutters. ".repeat(40));
        game.complete_turn(pending, Ok(reply)).unwrap();
    }

    let case = game.case().unwrap();
    assert_eq!(case.clues().len(), 31);
    assert_eq!(case.recent_turns().len(), settings.history_window);
    let last = game.begin_turn("I summon Watson").unwrap();
    assert!(last.prompt().len() <= 4000);
    assert!(last.prompt().user.contains("I summon Watson"));
}
