// src/game/entity.rs
use super::Vector2;
use super::hitbox::Hitbox;

// Shared body for anything that moves through the level. Position is the only
// source of truth; the hitbox is derived from it on demand.
#[derive(Debug, Clone)]
pub struct Entity {
    pub position: Vector2,
    pub velocity: Vector2,
    pub dimensions: Vector2,
    pub hitbox_offset: Vector2,
    pub hitbox_dimensions: Vector2,
    pub is_on_ground: bool,
}

impl Entity {
    // Entity whose hitbox covers its full sprite
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vector2::new(x, y),
            velocity: Vector2::zeros(),
            dimensions: Vector2::new(width, height),
            hitbox_offset: Vector2::zeros(),
            hitbox_dimensions: Vector2::new(width, height),
            is_on_ground: false,
        }
    }

    // Shrinks the hitbox inside the sprite
    pub fn with_hitbox(mut self, offset: (f32, f32), size: (f32, f32)) -> Self {
        debug_assert!(size.0 > 0.0 && size.1 > 0.0, "hitbox must have area");
        self.hitbox_offset = Vector2::new(offset.0, offset.1);
        self.hitbox_dimensions = Vector2::new(size.0, size.1);
        self
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox {
            position: self.position + self.hitbox_offset,
            dimensions: self.hitbox_dimensions,
        }
    }

    pub fn collides_with(&self, other: &Entity) -> bool {
        self.hitbox().overlaps(&other.hitbox())
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vector2::new(x, y);
    }

    pub fn stop(&mut self) {
        self.velocity = Vector2::zeros();
    }
}
