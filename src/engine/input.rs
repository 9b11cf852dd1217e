use std::collections::HashSet;

use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

// Polled keyboard state. `held` follows press/release events, `pressed` only
// holds keys that went down since the last `end_frame`.
#[derive(Debug, Default)]
pub struct Input {
    held: HashSet<VirtualKeyCode>,
    pressed: HashSet<VirtualKeyCode>,
}

// Logical actions the game reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Left,
    Right,
    Jump,
    Quit,
}

impl Action {
    pub fn keys(self) -> &'static [VirtualKeyCode] {
        match self {
            Action::Left => &[VirtualKeyCode::A, VirtualKeyCode::Left],
            Action::Right => &[VirtualKeyCode::D, VirtualKeyCode::Right],
            Action::Jump => &[VirtualKeyCode::W, VirtualKeyCode::Up, VirtualKeyCode::Space],
            Action::Quit => &[VirtualKeyCode::Escape],
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    // Feed a window event; returns true if it was a keyboard event
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state,
                        virtual_keycode: Some(keycode),
                        ..
                    },
                ..
            } => {
                self.handle_key(*keycode, *state);
                true
            }
            _ => false,
        }
    }

    pub fn handle_key(&mut self, key: VirtualKeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // Key repeat sends Pressed again while held; only the first one is an edge
                if self.held.insert(key) {
                    self.pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.held.remove(&key);
            }
        }
    }

    pub fn is_key_held(&self, key: VirtualKeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn is_key_pressed(&self, key: VirtualKeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn is_held(&self, action: Action) -> bool {
        action.keys().iter().any(|key| self.is_key_held(*key))
    }

    pub fn is_pressed(&self, action: Action) -> bool {
        action.keys().iter().any(|key| self.is_key_pressed(*key))
    }

    // Call once per frame after the game has read its input
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }

    pub fn clear(&mut self) {
        self.held.clear();
        self.pressed.clear();
    }
}
