// src/game/session.rs
use std::collections::BTreeMap;

use tracing::info;

use crate::config::GameConfig;
use crate::error::LevelError;
use crate::levels::loader::LevelData;
use crate::save::{HighScores, default_high_scores};

use super::tile::TileCatalog;

// Everything that outlives a single level: which level is being played, the
// level definitions, best scores and the fixed tile catalog
#[derive(Debug, Clone)]
pub struct Session {
    pub current_level: u32,
    levels: BTreeMap<u32, LevelData>,
    high_scores: HighScores,
    catalog: TileCatalog,
    config: GameConfig,
}

impl Session {
    pub fn new(levels: BTreeMap<u32, LevelData>, config: GameConfig) -> Self {
        Self {
            current_level: 1,
            levels,
            high_scores: default_high_scores(),
            catalog: TileCatalog::default(),
            config,
        }
    }

    pub fn with_high_scores(mut self, high_scores: HighScores) -> Self {
        self.high_scores = high_scores;
        self
    }

    pub fn level_definition(&self, level: u32) -> Result<&LevelData, LevelError> {
        self.levels
            .get(&level)
            .ok_or(LevelError::UndefinedLevel(level))
    }

    // The level after the current one, wrapping back to the first
    pub fn next_level(&self) -> u32 {
        self.levels
            .range(self.current_level + 1..)
            .next()
            .or_else(|| self.levels.iter().next())
            .map_or(self.current_level, |(&level, _)| level)
    }

    // Keeps the best score. Returns true when `score` beat it.
    pub fn update_high_score(&mut self, level: u32, score: u32) -> bool {
        let best = self.high_scores.entry(level).or_insert(0);
        if score > *best {
            info!(level, score, previous = *best, "new high score");
            *best = score;
            true
        } else {
            false
        }
    }

    pub fn high_score(&self, level: u32) -> u32 {
        self.high_scores.get(&level).copied().unwrap_or_default()
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(level_ids: &[u32]) -> Session {
        let levels = level_ids
            .iter()
            .map(|&id| (id, LevelData::from_ascii("#", 16).unwrap()))
            .collect();
        Session::new(levels, GameConfig::default())
    }

    #[test]
    fn high_score_keeps_the_maximum() {
        let mut session = session(&[1]);
        assert_eq!(session.high_score(1), 0);
        assert!(session.update_high_score(1, 4));
        assert!(!session.update_high_score(1, 2));
        assert_eq!(session.high_score(1), 4);
        assert!(session.update_high_score(7, 1));
        assert_eq!(session.high_score(7), 1);
    }

    #[test]
    fn next_level_wraps() {
        let mut session = session(&[1, 2, 3]);
        assert_eq!(session.next_level(), 2);
        session.current_level = 3;
        assert_eq!(session.next_level(), 1);
    }

    #[test]
    fn undefined_level_is_an_error() {
        let session = session(&[1]);
        assert!(session.level_definition(1).is_ok());
        assert!(matches!(
            session.level_definition(4),
            Err(LevelError::UndefinedLevel(4))
        ));
    }
}
