use crate::case::{CaseState, Genre, SessionId};
use crate::error::SaveError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, read_dir, remove_file};
use std::path::{Path, PathBuf};

pub const SAVE_VERSION: u32 = 1;
const MAX_STEM_LEN: usize = 100;

/// Save/load/delete of whole cases, keyed by session id.
pub trait CaseStore {
    fn save(&self, case: &CaseState) -> Result<PathBuf, SaveError>;
    fn load(&self, session_id: SessionId) -> Result<CaseState, SaveError>;
    fn delete(&self, session_id: SessionId) -> Result<(), SaveError>;
    fn list(&self) -> Vec<SaveSummary>;
}

/// On-disk record: the case plus enough metadata to list and migrate it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SaveFile {
    pub version: u32,
    pub session_id: SessionId,
    pub saved_at: DateTime<Utc>,
    pub case: CaseState,
}

impl SaveFile {
    pub fn new(case: CaseState) -> Self {
        Self {
            version: SAVE_VERSION,
            session_id: case.session_id(),
            saved_at: case.saved_at().unwrap_or_else(Utc::now),
            case,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let save: SaveFile = serde_json::from_str(json)?;
        if save.version > SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion(save.version));
        }
        Ok(save)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SaveSummary {
    pub session_id: SessionId,
    pub title: String,
    pub genre: Genre,
    pub saved_at: DateTime<Utc>,
    pub path: PathBuf,
}

/// JSON files named `<session-id>_<title>.json` in one directory.
#[derive(Clone, Debug)]
pub struct SaveManager {
    dir: PathBuf,
}

impl SaveManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn find(&self, session_id: SessionId) -> Option<PathBuf> {
        let id = session_id.to_string();
        read_dir(&self.dir).ok()?.find_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_str()?;
            let rest = name.strip_prefix(id.as_str())?;
            let is_save = (rest.starts_with('_') || rest.starts_with('.'))
                && rest.ends_with(".json");
            (path.is_file() && is_save).then_some(path)
        })
    }

    fn read(path: &Path) -> Result<SaveFile, SaveError> {
        let json = fs::read_to_string(path)?;
        SaveFile::from_json(&json)
    }
}

impl CaseStore for SaveManager {
    fn save(&self, case: &CaseState) -> Result<PathBuf, SaveError> {
        create_dir_all(&self.dir)?;
        let previous = self.find(case.session_id());
        let path = self.dir.join(file_name(case));
        let temp_path = path.with_extension("json.tmp");

        let serialized = SaveFile::new(case.clone()).to_json()?;
        fs::write(&temp_path, serialized)?;
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = remove_file(&temp_path);
            return Err(e.into());
        }

        if let Some(previous) = previous.filter(|previous| previous != &path) {
            if let Err(e) = remove_file(&previous) {
                log::warn!("Could not remove stale save {}: {e}", previous.display());
            }
        }
        log::info!("Case saved to {}", path.display());
        Ok(path)
    }

    fn load(&self, session_id: SessionId) -> Result<CaseState, SaveError> {
        let path = self.find(session_id).ok_or(SaveError::NotFound(session_id))?;
        let save = Self::read(&path)?;
        if save.session_id != session_id || save.case.session_id() != session_id {
            log::warn!(
                "Session id mismatch in {}: expected {session_id}, found {}",
                path.display(),
                save.session_id
            );
        }
        log::info!("Loaded case from {}", path.display());
        Ok(save.case)
    }

    fn delete(&self, session_id: SessionId) -> Result<(), SaveError> {
        let path = self.find(session_id).ok_or(SaveError::NotFound(session_id))?;
        remove_file(&path)?;
        log::info!("Deleted save {}", path.display());
        Ok(())
    }

    fn list(&self) -> Vec<SaveSummary> {
        let Ok(entries) = read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut saves: Vec<SaveSummary> = entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if !path.is_file() || path.extension()? != "json" {
                    return None;
                }
                match Self::read(&path) {
                    Ok(save) => Some(SaveSummary {
                        session_id: save.session_id,
                        title: save.case.display_title(),
                        genre: save.case.genre(),
                        saved_at: save.saved_at,
                        path,
                    }),
                    Err(e) => {
                        log::warn!("Skipping unreadable save {}: {e}", path.display());
                        None
                    }
                }
            })
            .collect();

        saves.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        saves
    }
}

fn file_name(case: &CaseState) -> String {
    let title: String = case
        .title()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    let title = title.split_whitespace().collect::<Vec<_>>().join("_");
    let title = if title.is_empty() {
        "Untitled_Case".to_string()
    } else {
        title
    };
    let stem: String = format!("{}_{}", case.session_id(), title)
        .chars()
        .take(MAX_STEM_LEN)
        .collect();
    format!("{stem}.json")
}
