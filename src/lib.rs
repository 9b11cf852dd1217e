// src/lib.rs
// Tile platformer core: an auto-running player state machine on top of an
// axis-separated tile collision resolver, plus the play-state glue around it.

pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod levels;
pub mod save;

pub use config::GameConfig;
pub use error::{GameError, GameResult};
pub use game::session::Session;
pub use game::states::playing::{PlayOutcome, PlayState};
