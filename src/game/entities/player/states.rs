// src/game/entities/player/states.rs
use tracing::info;

use crate::config::{Locomotion, PlayerConfig};
use crate::engine::input::Action;
use crate::game::tile::TileCoord;

use super::machine::{PlayerFrame, PlayerState, PlayerStateName};
use super::{PlayerAnimation, PlayerBody, PlayerOutcome};

pub(super) fn create(name: PlayerStateName) -> Box<dyn PlayerState> {
    match name {
        PlayerStateName::Running => Box::new(Running),
        PlayerStateName::Jumping => Box::new(Jumping::default()),
        PlayerStateName::Falling => Box::new(Falling),
        PlayerStateName::Skidding => Box::new(Skidding::default()),
        PlayerStateName::Idling => Box::new(Idling),
        PlayerStateName::Dying => Box::new(Finale::new(
            PlayerAnimation::Death,
            PlayerOutcome::Died,
        )),
        PlayerStateName::Victory => Box::new(Finale::new(
            PlayerAnimation::Victory,
            PlayerOutcome::Won,
        )),
    }
}

// What the hitbox ran into while moving this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    Clear,
    Deadly,
    Door,
}

impl Contact {
    fn transition(self) -> Option<PlayerStateName> {
        match self {
            Contact::Clear => None,
            Contact::Deadly => Some(PlayerStateName::Dying),
            Contact::Door => Some(PlayerStateName::Victory),
        }
    }
}

fn approach_zero(value: f32, amount: f32) -> f32 {
    if value > 0.0 {
        (value - amount).max(0.0)
    } else if value < 0.0 {
        (value + amount).min(0.0)
    } else {
        0.0
    }
}

impl PlayerFrame<'_> {
    // Gravity, axis-by-axis integration, tile effects and the world clamp.
    // Deadly contact wins over a door touched on the same axis.
    fn step(&mut self, dt: f32) -> Contact {
        let contact = self.integrate(dt);
        self.resolver
            .clamp_to_world(self.map, &mut self.body.entity);
        contact
    }

    fn integrate(&mut self, dt: f32) -> Contact {
        let entity = &mut self.body.entity;
        if !entity.is_on_ground {
            entity.velocity.y =
                (entity.velocity.y + self.config.gravity * dt).min(self.config.max_fall_speed);
        }

        entity.position.x += entity.velocity.x * dt;
        self.resolver.resolve_horizontal(self.map, entity);
        if self.resolver.check_deadly(self.map, entity) {
            return Contact::Deadly;
        }
        if self.resolver.check_door(self.map, entity) {
            return Contact::Door;
        }

        entity.position.y += entity.velocity.y * dt;
        let struck = self.resolver.resolve_vertical(self.map, entity);
        if self.resolver.check_deadly(self.map, entity) {
            return Contact::Deadly;
        }
        if self.resolver.check_door(self.map, entity) {
            return Contact::Door;
        }

        self.collect(struck);
        Contact::Clear
    }

    // Coins, boosters and pressure blocks only count for a player still alive
    fn collect(&mut self, struck: Option<TileCoord>) {
        let coins = self.resolver.check_coins(self.map, &self.body.entity);
        self.body.coins += coins.len() as u32;
        self.body.collected.extend(coins);

        if self.resolver.check_booster(self.map, &self.body.entity) {
            self.body.entity.velocity.y = self.config.booster_power;
            self.body.entity.is_on_ground = false;
        }

        if let Some(block) = struck {
            self.body.coins += 1;
            info!(col = block.col, row = block.row, "coin from pressure block");
        }
    }

    fn is_manual(&self) -> bool {
        self.config.locomotion == Locomotion::Manual
    }

    // -1, 0 or 1 from the held movement keys; holding both cancels out
    fn direction(&self) -> f32 {
        match (
            self.input.is_held(Action::Left),
            self.input.is_held(Action::Right),
        ) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    // Horizontal speed for this frame, according to the locomotion mode
    fn drive(&mut self) {
        if !self.is_manual() {
            self.body.entity.velocity.x = self.config.run_speed;
            return;
        }

        let direction = self.direction();
        let config = self.config;
        let body = &mut *self.body;
        let vx = &mut body.entity.velocity.x;
        if direction > 0.0 {
            *vx = (*vx + config.acceleration).min(config.max_speed);
            body.facing_right = true;
        } else if direction < 0.0 {
            *vx = (*vx - config.acceleration).max(-config.max_speed);
            body.facing_right = false;
        } else {
            *vx = approach_zero(*vx, config.deceleration);
        }

        // Close enough to stopped
        if vx.abs() < 0.1 {
            *vx = 0.0;
        }
    }

    // Steering against a fast run turns into a skid
    fn is_reversing(&self) -> bool {
        let direction = self.direction();
        let vx = self.body.entity.velocity.x;
        self.is_manual()
            && direction != 0.0
            && vx * direction < 0.0
            && vx.abs() > self.config.skid_threshold
    }

    fn jump_pressed(&self) -> bool {
        self.input.is_pressed(Action::Jump)
    }
}

struct Running;

impl PlayerState for Running {
    fn enter(&mut self, body: &mut PlayerBody, config: &PlayerConfig) {
        body.entity.velocity.y = 0.0;
        body.entity.is_on_ground = true;
        body.facing_right = match config.locomotion {
            Locomotion::AutoRun => true,
            Locomotion::Manual => body.entity.velocity.x >= 0.0,
        };
        body.play(PlayerAnimation::Run);
    }

    fn update(&mut self, cx: &mut PlayerFrame<'_>, dt: f32) -> Option<PlayerStateName> {
        cx.body.animate(dt);
        if let Some(next) = cx.step(dt).transition() {
            return Some(next);
        }
        if cx.is_reversing() {
            return Some(PlayerStateName::Skidding);
        }
        cx.drive();

        if cx.jump_pressed() {
            return Some(PlayerStateName::Jumping);
        }
        if !cx.body.entity.is_on_ground {
            return Some(PlayerStateName::Falling);
        }
        if cx.is_manual() && cx.direction() == 0.0 && cx.body.entity.velocity.x == 0.0 {
            return Some(PlayerStateName::Idling);
        }
        None
    }
}

#[derive(Default)]
struct Jumping {
    cut: bool,
}

impl PlayerState for Jumping {
    fn enter(&mut self, body: &mut PlayerBody, config: &PlayerConfig) {
        body.entity.velocity.y = config.jump_power;
        body.entity.is_on_ground = false;
        self.cut = false;
        body.play(PlayerAnimation::Jump);
    }

    fn update(&mut self, cx: &mut PlayerFrame<'_>, dt: f32) -> Option<PlayerStateName> {
        // Letting go early shortens the jump, once per jump
        let velocity = &mut cx.body.entity.velocity;
        if !self.cut && velocity.y < 0.0 && !cx.input.is_held(Action::Jump) {
            velocity.y *= 0.5;
            self.cut = true;
        }

        cx.body.animate(dt);
        if let Some(next) = cx.step(dt).transition() {
            return Some(next);
        }
        cx.drive();

        if cx.body.entity.is_on_ground {
            return Some(PlayerStateName::Running);
        }
        if cx.body.entity.velocity.y >= 0.0 {
            return Some(PlayerStateName::Falling);
        }
        None
    }
}

struct Falling;

impl PlayerState for Falling {
    fn enter(&mut self, body: &mut PlayerBody, _config: &PlayerConfig) {
        body.entity.is_on_ground = false;
        body.play(PlayerAnimation::Fall);
    }

    fn update(&mut self, cx: &mut PlayerFrame<'_>, dt: f32) -> Option<PlayerStateName> {
        cx.body.animate(dt);
        if let Some(next) = cx.step(dt).transition() {
            return Some(next);
        }
        cx.drive();

        cx.body
            .entity
            .is_on_ground
            .then_some(PlayerStateName::Running)
    }
}

#[derive(Default)]
struct Skidding {
    // Sign of the input that started the skid
    reversal: f32,
}

impl PlayerState for Skidding {
    fn enter(&mut self, body: &mut PlayerBody, _config: &PlayerConfig) {
        self.reversal = -body.entity.velocity.x.signum();
        body.facing_right = self.reversal > 0.0;
        body.play(PlayerAnimation::Idle);
    }

    fn update(&mut self, cx: &mut PlayerFrame<'_>, dt: f32) -> Option<PlayerStateName> {
        cx.body.animate(dt);
        if let Some(next) = cx.step(dt).transition() {
            return Some(next);
        }

        let vx = &mut cx.body.entity.velocity.x;
        *vx = approach_zero(*vx, cx.config.skid_deceleration);
        let slowed = vx.abs() <= cx.config.skid_threshold;

        if cx.jump_pressed() {
            return Some(PlayerStateName::Jumping);
        }
        if !cx.body.entity.is_on_ground {
            return Some(PlayerStateName::Falling);
        }
        if slowed || cx.direction() != self.reversal {
            return Some(PlayerStateName::Running);
        }
        None
    }
}

struct Idling;

impl PlayerState for Idling {
    fn enter(&mut self, body: &mut PlayerBody, _config: &PlayerConfig) {
        body.entity.velocity.x = 0.0;
        body.play(PlayerAnimation::Idle);
    }

    fn update(&mut self, cx: &mut PlayerFrame<'_>, dt: f32) -> Option<PlayerStateName> {
        cx.body.animate(dt);
        if let Some(next) = cx.step(dt).transition() {
            return Some(next);
        }

        if cx.jump_pressed() {
            return Some(PlayerStateName::Jumping);
        }
        if !cx.body.entity.is_on_ground {
            return Some(PlayerStateName::Falling);
        }
        if cx.direction() != 0.0 {
            return Some(PlayerStateName::Running);
        }
        None
    }
}

// Dying and Victory: freeze, play the animation once, then report the
// outcome exactly once per entry
struct Finale {
    animation: PlayerAnimation,
    outcome: PlayerOutcome,
    completed: bool,
}

impl Finale {
    fn new(animation: PlayerAnimation, outcome: PlayerOutcome) -> Self {
        Self {
            animation,
            outcome,
            completed: false,
        }
    }
}

impl PlayerState for Finale {
    fn enter(&mut self, body: &mut PlayerBody, _config: &PlayerConfig) {
        body.entity.stop();
        self.completed = false;
        body.play(self.animation);
    }

    fn update(&mut self, cx: &mut PlayerFrame<'_>, dt: f32) -> Option<PlayerStateName> {
        cx.body.animate(dt);
        if cx.body.animation().is_done() && !self.completed {
            self.completed = true;
            cx.body.finish(self.outcome);
        }
        None
    }
}
