pub mod ai;
pub mod app;
pub mod case;
pub mod command;
pub mod context;
pub mod error;
pub mod game;
pub mod labels;
pub mod logging;
pub mod message;
pub mod prompt;
pub mod save;
pub mod settings;
pub mod tui;
pub mod ui;

// Re-export commonly used items for easier access
pub use ai::{Narrator, OpenAINarrator};
pub use case::{CaseState, Genre, SessionId};
pub use error::{AIError, AppError, GameError, SaveError};
pub use game::{ControllerState, GameController, GameOptions};
pub use labels::{ParsedDelta, parse};
pub use prompt::{PersonaTemplate, Prompt, PromptComposer};
pub use save::{CaseStore, SaveManager};
pub use settings::Settings;
