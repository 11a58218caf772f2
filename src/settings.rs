use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::case::DuplicatePolicy;
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://api.studio.nebius.com/v1/";
pub const DEFAULT_MODEL: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";

// Application settings, stored as pretty JSON next to the saves.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub request_timeout_secs: u64,
    pub history_window: usize, // Turns kept in the prompt window.
    pub max_prompt_chars: usize,
    pub max_turn_chars: usize, // Clip for a single narrator turn inside the prompt.
    pub strip_labels: bool,    // Hide label lines from the rendered narrative.
    pub duplicate_policy: DuplicatePolicy,
    pub autosave: bool,
    pub title_attempts: u32,
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 800,
            temperature: 0.75,
            top_p: 0.9,
            request_timeout_secs: 120,
            history_window: 10,
            max_prompt_chars: 12_000,
            max_turn_chars: 500,
            strip_labels: false,
            duplicate_policy: DuplicatePolicy::Exact,
            autosave: true,
            title_attempts: 2,
            debug_mode: false,
        }
    }
}

/// `<home>/sherlock/data`
pub fn data_dir() -> Result<PathBuf, AppError> {
    let home_dir = dir::home_dir().ok_or(AppError::NoHomeDir)?;
    Ok(home_dir.join("sherlock").join("data"))
}

impl Settings {
    /// Loads `<data_dir>/settings.json`, falling back to defaults when the file
    /// is missing, then applies environment overrides.
    pub fn load(data_dir: &Path) -> io::Result<Self> {
        let path = data_dir.join("settings.json");
        let settings = match Self::load_settings_from_file(&path) {
            Ok(settings) => settings,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                let settings = Self::default();
                settings.save_to_file(&path)?;
                settings
            }
            Err(e) => return Err(e),
        };
        Ok(settings.with_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn load_settings_from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    /// `NEBIUS_API_KEY` wins over `OPENAI_API_KEY`; both win over the file.
    pub fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = var("NEBIUS_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = var("SHERLOCK_MODEL") {
            self.model = model;
        }
        if let Some(base_url) = var("SHERLOCK_BASE_URL") {
            self.base_url = base_url;
        }
        self
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}
