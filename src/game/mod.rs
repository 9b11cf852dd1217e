// src/game/mod.rs
pub mod collision;
pub mod entities;
pub mod entity;
pub mod hitbox;
pub mod level;
pub mod session;
pub mod states;
pub mod tile;

// World-space pixels, y grows downward
pub type Vector2 = nalgebra::Vector2<f32>;
