// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

// Problems with level data. These surface when a map is built, never mid-frame.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse level file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("level has no foreground layer (expected layer index {index})")]
    MissingForeground { index: usize },

    #[error("layer {layer} has {actual} tiles, expected {width}x{height}")]
    LayerSize {
        layer: usize,
        actual: usize,
        width: usize,
        height: usize,
    },

    #[error("unknown tile id {id} at ({col}, {row}) in layer {layer}")]
    UnknownTile {
        id: i64,
        layer: usize,
        col: usize,
        row: usize,
    },

    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(u32),

    #[error("map must have a non-zero width and height")]
    EmptyMap,

    #[error("level {0} is not defined")]
    UndefinedLevel(u32),

    #[error("unknown glyph {glyph:?} at ({col}, {row})")]
    UnknownGlyph { glyph: char, col: usize, row: usize },
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("save data could not be encoded or decoded: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

pub type GameResult<T> = Result<T, GameError>;
