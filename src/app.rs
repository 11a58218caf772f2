// /app.rs
use crate::context::Context;
use crate::tui::{Tui, TuiEvent};
use crate::ui::{
    CaseScreen, Component, ConfirmDialog, ConfirmKind, LoadMenu, MainMenu, render_too_small,
    spinner::Spinner,
};
use crate::{
    ai::{Narrator, OpenAINarrator},
    case::{Genre, SessionId},
    error::AIError,
    game::{ControllerState, GameController, GameOptions, InputAction, PendingTurn, TurnOutcome, TurnReport},
    message::{Message, MessageType},
    prompt::{PersonaTemplate, PromptComposer, PromptLimits},
    save::SaveManager,
    settings::Settings,
};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::{path::Path, sync::Arc};
use tokio::{sync::mpsc, task::JoinHandle};

pub enum Action {
    Quit,
    SwitchComponent(Box<dyn Component>),
    NewCase(Genre),
    LoadCase(SessionId),
    DeleteSave { session_id: SessionId, index: usize },
    SubmitInput(String),
    CancelTurn,
    Confirm(ConfirmKind),
    QuitCase { save: bool },
    DeleteCase,
}

/// Results coming back from spawned narrator calls.
#[derive(Debug)]
pub enum Background {
    Reply {
        turn: u64,
        reply: Result<String, AIError>,
    },
    KeyCheck(Result<(), AIError>),
}

// A narrator call in flight and the turn it answers.
struct InFlight {
    id: u64,
    turn: PendingTurn,
    task: JoinHandle<()>,
}

pub struct App {
    running: bool,
    component: Box<dyn Component>,

    settings: Settings,
    controller: GameController<SaveManager>,
    narrator: Option<Arc<OpenAINarrator>>,

    messages: Vec<Message>,
    spinner: Spinner,

    in_flight: Option<InFlight>,
    next_turn: u64,
    background_tx: mpsc::UnboundedSender<Background>,
    background_rx: mpsc::UnboundedReceiver<Background>,
}

impl App {
    pub fn new(settings: Settings, persona: PersonaTemplate, data_dir: &Path) -> Self {
        let (background_tx, background_rx) = mpsc::unbounded_channel();
        let composer = PromptComposer::new(persona, PromptLimits::from(&settings));
        let store = SaveManager::new(data_dir.join("saves"));
        let controller = GameController::new(composer, store, GameOptions::from(&settings));

        let mut messages = Vec::new();
        let narrator = match OpenAINarrator::new(&settings) {
            Ok(narrator) => {
                log::info!("Narrator ready: {} at {}", narrator.model(), settings.base_url);
                Some(Arc::new(narrator))
            }
            Err(e) => {
                log::warn!("Narrator unavailable: {e}");
                messages.push(Message::system(format!(
                    "{e}. Set NEBIUS_API_KEY or OPENAI_API_KEY, or add it to settings.json."
                )));
                None
            }
        };

        Self {
            running: true,
            component: Box::new(MainMenu::default()),
            settings,
            controller,
            narrator,
            messages,
            spinner: Spinner::default(),
            in_flight: None,
            next_turn: 0,
            background_tx,
            background_rx,
        }
    }

    // Asynchronous function to continuously run and update the application.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(8.0, 30.0);
        tui.enter()?;
        self.check_api_key();

        while self.running {
            tokio::select! {
                Some(event) = tui.next() => self.handle_tui_event(&mut tui, event)?,
                Some(background) = self.background_rx.recv() => self.handle_background(background),
            }
        }

        tui.exit()?;
        Ok(())
    }

    fn check_api_key(&self) {
        let Some(narrator) = self.narrator.clone() else {
            return;
        };
        let tx = self.background_tx.clone();
        tokio::spawn(async move {
            let result = narrator.validate_api_key().await;
            let _ = tx.send(Background::KeyCheck(result));
        });
    }

    fn handle_tui_event(&mut self, tui: &mut Tui, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Key(key) => self.on_key(key),
            TuiEvent::Tick => {
                if self.controller.state() == ControllerState::AwaitingModelReply {
                    self.spinner.advance();
                }
            }
            TuiEvent::Render | TuiEvent::Resize(_, _) | TuiEvent::Init => self.draw(tui)?,
            TuiEvent::Error => {}
        }
        Ok(())
    }

    fn draw(&mut self, tui: &mut Tui) -> Result<()> {
        let context = Context {
            controller: &self.controller,
            settings: &self.settings,
            messages: &self.messages,
            spinner: &self.spinner,
            narrator_ready: self.narrator.is_some(),
        };
        let component = &mut self.component;
        tui.draw(|frame| {
            let area = frame.area();
            if !render_too_small(area, frame.buffer_mut()) {
                component.render(area, frame.buffer_mut(), &context);
            }
        })?;
        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.shutdown();
            return;
        }
        let action = {
            let context = Context {
                controller: &self.controller,
                settings: &self.settings,
                messages: &self.messages,
                spinner: &self.spinner,
                narrator_ready: self.narrator.is_some(),
            };
            self.component.on_key(key, &context)
        };
        if let Some(action) = action {
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => match self.controller.exit() {
                Ok(()) => self.running = false,
                Err(e) => {
                    log::error!("Refusing to exit: {e}");
                    self.shutdown();
                }
            },
            Action::SwitchComponent(component) => self.component = component,
            Action::NewCase(genre) => self.new_case(genre),
            Action::LoadCase(session_id) => self.load_case(session_id),
            Action::DeleteSave { session_id, index } => {
                match self.controller.delete_save(session_id) {
                    Ok(()) => self.system("Save deleted."),
                    Err(e) => self.system(format!("Could not delete the save: {e}")),
                }
                self.component = Box::new(LoadMenu::refreshed(self.controller.list_saves(), index));
            }
            Action::SubmitInput(text) => self.submit(&text),
            Action::CancelTurn => self.cancel_turn(),
            Action::Confirm(kind) => self.confirm(kind),
            Action::QuitCase { save } => match self.controller.quit(save) {
                Ok(()) => {
                    self.messages.clear();
                    self.system(if save {
                        "Case saved. Back at Baker Street."
                    } else {
                        "Case closed without saving."
                    });
                    self.component = Box::new(MainMenu::default());
                }
                Err(e) => {
                    self.system(format!("{e}. The case is still open."));
                    self.component = Box::new(CaseScreen::default());
                }
            },
            Action::DeleteCase => match self.controller.delete_case() {
                Ok(()) => {
                    self.messages.clear();
                    self.system("Case deleted.");
                    self.component = Box::new(MainMenu::default());
                }
                Err(e) => {
                    self.system(format!("{e}. The case is still open."));
                    self.component = Box::new(CaseScreen::default());
                }
            },
        }
    }

    fn handle_background(&mut self, background: Background) {
        match background {
            Background::Reply { turn, reply } => match self.in_flight.take() {
                Some(in_flight) if in_flight.id == turn => self.finish_turn(in_flight.turn, reply),
                other => {
                    log::debug!("Dropping reply to cancelled turn {turn}");
                    self.in_flight = other;
                }
            },
            Background::KeyCheck(Ok(())) => log::info!("API key validated"),
            Background::KeyCheck(Err(e)) => {
                log::warn!("API key check failed: {e}");
                self.system(format!("Could not reach the narrator ({}): {e}", e.kind()));
            }
        }
    }

    fn new_case(&mut self, genre: Genre) {
        if self.narrator.is_none() {
            self.system("No API key configured. Set NEBIUS_API_KEY or OPENAI_API_KEY.");
            self.component = Box::new(MainMenu::default());
            return;
        }
        match self.controller.new_case(genre) {
            Ok(pending) => {
                self.messages.clear();
                self.system(format!("A new {genre} case begins..."));
                self.component = Box::new(CaseScreen::default());
                self.dispatch(pending);
            }
            Err(e) => self.system(format!("Could not start a case: {e}")),
        }
    }

    fn load_case(&mut self, session_id: SessionId) {
        match self.controller.load_case(session_id) {
            Ok(case) => {
                let title = case.display_title();
                let scrollback: Vec<Message> = case.recent_turns().map(Message::from).collect();
                self.messages.clear();
                self.system(format!("Resuming '{title}'."));
                for mut message in scrollback {
                    if message.message_type == MessageType::Narrator {
                        message.content = self.controller.render_narration(&message.content);
                    }
                    self.messages.push(message);
                }
                self.component = Box::new(CaseScreen::default());
            }
            Err(e) => {
                self.system(format!("{e}"));
                self.component = Box::new(LoadMenu::new(self.controller.list_saves()));
            }
        }
    }

    fn submit(&mut self, text: &str) {
        match self.controller.handle_input(text) {
            Ok(InputAction::Nothing) => {}
            Ok(InputAction::Send(pending)) => {
                if let Some(input) = pending.player_input() {
                    self.messages
                        .push(Message::new(MessageType::Player, input));
                }
                if let Some(held) = pending.held_input() {
                    self.messages.push(Message::new(MessageType::Player, held));
                    self.system("The case has not opened yet. Opening it first; your line follows.");
                }
                self.dispatch(pending);
            }
            Ok(InputAction::Help(help)) => self.system(help),
            Ok(InputAction::Saved(path)) => self.system(format!("Case saved to {}", path.display())),
            Ok(InputAction::ConfirmQuit) => self.confirm(ConfirmKind::Quit),
            Ok(InputAction::ConfirmDelete) => self.confirm(ConfirmKind::Delete),
            Err(e) => self.system(format!("{e}")),
        }
    }

    fn dispatch(&mut self, pending: PendingTurn) {
        let Some(narrator) = self.narrator.clone() else {
            self.finish_turn(pending, Err(AIError::MissingApiKey));
            return;
        };
        let id = self.next_turn;
        self.next_turn += 1;
        let prompt = pending.prompt().clone();
        let tx = self.background_tx.clone();
        let task = tokio::spawn(async move {
            let reply = narrator.narrate(&prompt).await;
            let _ = tx.send(Background::Reply { turn: id, reply });
        });
        self.in_flight = Some(InFlight {
            id,
            turn: pending,
            task,
        });
    }

    fn finish_turn(&mut self, pending: PendingTurn, reply: Result<String, AIError>) {
        let opening = pending.is_opening();
        match self.controller.complete_turn(pending, reply) {
            Ok(TurnOutcome::Completed(report)) => self.show_report(report),
            Ok(TurnOutcome::Retry(next)) => {
                self.system("The narrator forgot to name the case. Asking again...");
                self.dispatch(next);
            }
            Err(e) => {
                let hint = if opening {
                    "Press Enter to try opening the case again."
                } else {
                    "Your action was not recorded. Try again."
                };
                self.system(format!("{e}. {hint}"));
            }
        }
    }

    fn show_report(&mut self, report: TurnReport) {
        self.messages
            .push(Message::new(MessageType::Narrator, report.narration));
        if !report.applied.is_empty() {
            self.system(report.applied.lines().join("\n"));
        }
        if report.title_deferred {
            self.system("The case has no title yet.");
        }
        for warning in report.warnings {
            self.system(warning);
        }
        if report.solved {
            self.system("Excellent work! The case is solved!");
            self.confirm(ConfirmKind::Solved);
            return;
        }
        if let Some(held) = report.held_input {
            match self.controller.begin_turn(held) {
                Ok(pending) => self.dispatch(pending),
                Err(e) => self.system(format!("Your line was not sent: {e}")),
            }
        }
    }

    fn cancel_turn(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
            self.controller.abandon_turn(in_flight.turn);
            self.system("Request cancelled. Nothing was recorded.");
        }
    }

    fn confirm(&mut self, kind: ConfirmKind) {
        let current = std::mem::replace(&mut self.component, Box::new(MainMenu::default()));
        self.component = Box::new(ConfirmDialog::new(kind, current));
    }

    // Ctrl+C: drop any request in flight, keep what autosave allows, leave.
    fn shutdown(&mut self) {
        self.cancel_turn();
        if self.controller.state() == ControllerState::ActiveCase {
            let save = self.settings.autosave;
            if let Err(e) = self.controller.quit(save) {
                log::error!("Could not save on exit: {e}");
            }
        }
        self.running = false;
    }

    fn system(&mut self, content: impl Into<String>) {
        let content = content.into();
        log::debug!("System message: {content}");
        self.messages.push(Message::system(content));
    }
}
