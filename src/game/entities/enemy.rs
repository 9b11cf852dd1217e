// src/game/entities/enemy.rs
use tracing::debug;

use crate::engine::animation::Animation;
use crate::game::entity::Entity;
use crate::levels::loader::{EnemyKind, EnemySpawn};

const SKULL_SIZE: f32 = 16.0;
const SKULL_SPEED: f32 = 30.0; // Vertical float speed in pixels per second
const SKULL_RANGE: f32 = 18.0; // How far a moving skull drifts from its spawn

// Hazard that kills the player on contact. Moving ones bob up and down.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub entity: Entity,
    origin_y: f32,
    moving: bool,
    animation: Animation,
}

impl Enemy {
    pub fn from_spawn(spawn: &EnemySpawn) -> Self {
        debug!(kind = ?spawn.kind, x = spawn.x, y = spawn.y, moving = spawn.moving, "enemy spawned");
        let mut entity = Entity::new(spawn.x, spawn.y, SKULL_SIZE, SKULL_SIZE);
        if spawn.moving {
            entity.velocity.y = SKULL_SPEED;
        }
        Self {
            kind: spawn.kind,
            entity,
            origin_y: spawn.y,
            moving: spawn.moving,
            animation: Animation::new(vec![18, 19], 0.2),
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.animation.update(dt);
        if !self.moving {
            return;
        }

        let entity = &mut self.entity;
        entity.position.y += entity.velocity.y * dt;
        // Bounce off the ends of the range
        if entity.position.y > self.origin_y + SKULL_RANGE {
            entity.position.y = self.origin_y + SKULL_RANGE;
            entity.velocity.y = -SKULL_SPEED;
        } else if entity.position.y < self.origin_y - SKULL_RANGE {
            entity.position.y = self.origin_y - SKULL_RANGE;
            entity.velocity.y = SKULL_SPEED;
        }
    }

    pub fn sprite_frame(&self) -> usize {
        self.animation.frame()
    }
}
