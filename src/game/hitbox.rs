// src/game/hitbox.rs
use super::Vector2;

// Axis-aligned collision rectangle in world pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub position: Vector2,
    pub dimensions: Vector2,
}

impl Hitbox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vector2::new(x, y),
            dimensions: Vector2::new(width, height),
        }
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.dimensions.x
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.dimensions.y
    }

    // Strict overlap: rectangles that only share an edge do not collide
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        !(self.right() <= other.left()
            || other.right() <= self.left()
            || self.bottom() <= other.top()
            || other.bottom() <= self.top())
    }

    // Inclusive on this box's leading edges; used for hazards so a hitbox
    // resting exactly on a spike's edge still counts as touching it
    pub fn touches(&self, other: &Hitbox) -> bool {
        !(self.right() < other.left()
            || self.left() >= other.right()
            || self.bottom() < other.top()
            || self.top() >= other.bottom())
    }
}
