use thiserror::Error;

use crate::case::SessionId;
use crate::game::ControllerState;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

// Enum for handling various application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("AI error: {0}")]
    AI(#[from] AIError), // Errors from the narrator model.

    #[error("Game error: {0}")]
    Game(#[from] GameError), // Errors specific to game logic or state.

    #[error("Save error: {0}")]
    Save(#[from] SaveError), // Errors from the save files.

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Home directory not found")]
    NoHomeDir,
}

// Errors related to the narrator model. Every one of them means the model is
// unavailable for this turn; none of them are fatal.
#[derive(Debug, Error)]
pub enum AIError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout occurred")]
    Timeout,

    #[error("The model returned an empty reply")]
    EmptyReply,

    #[error("No API key configured")]
    MissingApiKey,
}

impl AIError {
    /// Short label for the player-facing failure line.
    pub fn kind(&self) -> &'static str {
        match self {
            AIError::OpenAI(_) | AIError::Transport(_) => "transport",
            AIError::Authentication(_) | AIError::MissingApiKey => "authentication",
            AIError::RateLimited(_) => "rate limit",
            AIError::Timeout => "timeout",
            AIError::EmptyReply => "empty reply",
        }
    }
}

impl From<tokio::time::error::Elapsed> for AIError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AIError::Timeout
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("No saved case for session {0}")]
    NotFound(SessionId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported save version {0}")]
    UnsupportedVersion(u32),
}

// Enum for game-specific errors.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] AIError),

    #[error("No case title after {attempts} attempts")]
    MalformedReply { attempts: u32 },

    #[error("Persistence failure: {0}")]
    Persistence(SaveError),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Expected state {expected:?}, found {found:?}")]
    InvalidState {
        expected: ControllerState,
        found: ControllerState,
    },

    #[error("No active case")]
    NoActiveCase,
}

impl From<SaveError> for GameError {
    fn from(error: SaveError) -> Self {
        match error {
            SaveError::NotFound(id) => GameError::SessionNotFound(id),
            other => GameError::Persistence(other),
        }
    }
}
