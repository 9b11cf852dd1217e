// src/game/entities/player/machine.rs
use std::collections::HashMap;

use tracing::debug;

use crate::config::PlayerConfig;
use crate::engine::input::Input;
use crate::game::collision::CollisionResolver;
use crate::game::level::Map;

use super::PlayerBody;
use super::states;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerStateName {
    Running,
    Jumping,
    Falling,
    Skidding,
    Idling,
    Dying,
    Victory,
}

impl PlayerStateName {
    pub const ALL: [PlayerStateName; 7] = [
        PlayerStateName::Running,
        PlayerStateName::Jumping,
        PlayerStateName::Falling,
        PlayerStateName::Skidding,
        PlayerStateName::Idling,
        PlayerStateName::Dying,
        PlayerStateName::Victory,
    ];

    // States that end the level; nothing moves once one of these is active
    pub fn is_terminal(self) -> bool {
        matches!(self, PlayerStateName::Dying | PlayerStateName::Victory)
    }
}

// Everything a state may read or touch during one update
pub struct PlayerFrame<'a> {
    pub body: &'a mut PlayerBody,
    pub map: &'a mut Map,
    pub input: &'a Input,
    pub resolver: &'a CollisionResolver,
    pub config: &'a PlayerConfig,
}

pub trait PlayerState {
    fn enter(&mut self, body: &mut PlayerBody, config: &PlayerConfig);

    // Runs one frame and names the state to switch to, if any
    fn update(&mut self, cx: &mut PlayerFrame<'_>, dt: f32) -> Option<PlayerStateName>;

    fn exit(&mut self, _body: &mut PlayerBody) {}
}

// Owns one instance of every state for the player's whole lifetime; exactly
// one of them is active
pub struct PlayerStateMachine {
    states: HashMap<PlayerStateName, Box<dyn PlayerState>>,
    current: PlayerStateName,
}

impl PlayerStateMachine {
    // The initial state is not entered until `restart` is called
    pub fn new(initial: PlayerStateName) -> Self {
        let states = PlayerStateName::ALL
            .into_iter()
            .map(|name| (name, states::create(name)))
            .collect();
        Self {
            states,
            current: initial,
        }
    }

    #[cfg(test)]
    pub fn add(&mut self, name: PlayerStateName, state: Box<dyn PlayerState>) {
        self.states.insert(name, state);
    }

    pub fn current(&self) -> PlayerStateName {
        self.current
    }

    // Switching to the active state does nothing. Returns whether a transition happened.
    pub fn change(
        &mut self,
        name: PlayerStateName,
        body: &mut PlayerBody,
        config: &PlayerConfig,
    ) -> bool {
        if name == self.current {
            return false;
        }
        self.switch(name, body, config);
        true
    }

    // Exits and re-enters even when `name` is already active
    pub fn restart(&mut self, name: PlayerStateName, body: &mut PlayerBody, config: &PlayerConfig) {
        self.switch(name, body, config);
    }

    pub fn update(&mut self, cx: &mut PlayerFrame<'_>, dt: f32) {
        let next = match self.states.get_mut(&self.current) {
            Some(state) => state.update(cx, dt),
            None => None,
        };
        if let Some(next) = next {
            self.change(next, cx.body, cx.config);
        }
    }

    fn switch(&mut self, name: PlayerStateName, body: &mut PlayerBody, config: &PlayerConfig) {
        if let Some(state) = self.states.get_mut(&self.current) {
            state.exit(body);
        }
        debug!(from = ?self.current, to = ?name, "player state change");
        self.current = name;
        if let Some(state) = self.states.get_mut(&name) {
            state.enter(body, config);
        }
    }
}
