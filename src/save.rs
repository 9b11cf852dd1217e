// src/save.rs
// Saved games and high scores.
//
// The play state only sees the `ProgressStore` trait. Tests use
// `MemoryStore`; the binary writes one JSON document through `JsonFileStore`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::SaveError;
use crate::game::tile::TileCoord;

// Best coin count per level number.
pub type HighScores = BTreeMap<u32, u32>;

// Levels 1 to 3 at zero.
pub fn default_high_scores() -> HighScores {
    (1..=3).map(|level| (level, 0)).collect()
}

// Snapshot of an unfinished level. Field names follow the save format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProgress {
    pub level: u32,
    pub player_x: f32,
    pub player_y: f32,
    pub coins_collected: u32,
    pub collected_coin_positions: Vec<TileCoord>,
    // Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
}

impl GameProgress {
    pub fn new(
        level: u32,
        player_x: f32,
        player_y: f32,
        coins_collected: u32,
        collected_coin_positions: Vec<TileCoord>,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();
        Self {
            level,
            player_x,
            player_y,
            coins_collected,
            collected_coin_positions,
            timestamp,
        }
    }
}

pub trait ProgressStore {
    fn save_progress(&mut self, progress: &GameProgress) -> Result<(), SaveError>;

    fn load_progress(&self) -> Result<Option<GameProgress>, SaveError>;

    fn clear_progress(&mut self) -> Result<(), SaveError>;

    fn save_high_scores(&mut self, scores: &HighScores) -> Result<(), SaveError>;

    fn load_high_scores(&self) -> Result<HighScores, SaveError>;
}

// In-memory store. Counts writes so tests can see autosaves happen.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    progress: Option<GameProgress>,
    high_scores: Option<HighScores>,
    progress_saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_progress(progress: GameProgress) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    pub fn progress_saves(&self) -> usize {
        self.progress_saves
    }
}

impl ProgressStore for MemoryStore {
    fn save_progress(&mut self, progress: &GameProgress) -> Result<(), SaveError> {
        self.progress = Some(progress.clone());
        self.progress_saves += 1;
        Ok(())
    }

    fn load_progress(&self) -> Result<Option<GameProgress>, SaveError> {
        Ok(self.progress.clone())
    }

    fn clear_progress(&mut self) -> Result<(), SaveError> {
        self.progress = None;
        Ok(())
    }

    fn save_high_scores(&mut self, scores: &HighScores) -> Result<(), SaveError> {
        self.high_scores = Some(scores.clone());
        Ok(())
    }

    fn load_high_scores(&self) -> Result<HighScores, SaveError> {
        Ok(self.high_scores.clone().unwrap_or_else(default_high_scores))
    }
}

// On-disk layout of the save file
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveFile {
    #[serde(default = "default_high_scores")]
    high_scores: HighScores,
    #[serde(default)]
    game_progress: Option<GameProgress>,
}

impl Default for SaveFile {
    fn default() -> Self {
        Self {
            high_scores: default_high_scores(),
            game_progress: None,
        }
    }
}

// Keeps high scores and the current progress together in one JSON file.
// Every write rewrites the whole document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<SaveFile, SaveError> {
        if !self.path.exists() {
            return Ok(SaveFile::default());
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write(&self, file: &SaveFile) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
            }
        }
        let raw = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, raw).map_err(|source| self.io_error(source))
    }

    fn update(&self, edit: impl FnOnce(&mut SaveFile)) -> Result<(), SaveError> {
        let mut file = self.read()?;
        edit(&mut file);
        self.write(&file)
    }

    fn io_error(&self, source: std::io::Error) -> SaveError {
        SaveError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ProgressStore for JsonFileStore {
    fn save_progress(&mut self, progress: &GameProgress) -> Result<(), SaveError> {
        self.update(|file| file.game_progress = Some(progress.clone()))
    }

    fn load_progress(&self) -> Result<Option<GameProgress>, SaveError> {
        Ok(self.read()?.game_progress)
    }

    fn clear_progress(&mut self) -> Result<(), SaveError> {
        self.update(|file| file.game_progress = None)
    }

    fn save_high_scores(&mut self, scores: &HighScores) -> Result<(), SaveError> {
        self.update(|file| file.high_scores = scores.clone())
    }

    fn load_high_scores(&self) -> Result<HighScores, SaveError> {
        Ok(self.read()?.high_scores)
    }
}
