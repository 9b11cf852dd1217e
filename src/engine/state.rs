use winit::event::WindowEvent;
use winit::window::Window;

// GameState trait defines what all game screens must implement
pub trait GameState {
    // What the screen reports when it is finished
    type Outcome;

    // Process window events like key presses. Returns true when the game should exit
    fn handle_event(&mut self, event: &WindowEvent) -> bool;

    // Update game logic
    fn update(&mut self, dt: f32) -> Option<Self::Outcome>;

    // Short status line for the window title
    fn status(&self) -> String;
}

// StateManager holds the window and the current game state. Drawing is left to
// an external renderer, so the window only carries a status title.
pub struct StateManager<S: GameState> {
    pub window: Window,
    current_state: S,
}

impl<S: GameState> StateManager<S> {
    pub fn new(window: Window, initial_state: S) -> Self {
        let manager = Self {
            window,
            current_state: initial_state,
        };
        manager.refresh_title();
        manager
    }

    // Handle window events and pass them to the current state
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => true,
            _ => self.current_state.handle_event(event),
        }
    }

    // Update the current state
    pub fn update(&mut self, dt: f32) -> Option<S::Outcome> {
        let outcome = self.current_state.update(dt);
        self.refresh_title();
        outcome
    }

    pub fn state(&self) -> &S {
        &self.current_state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.current_state
    }

    fn refresh_title(&self) {
        self.window.set_title(&self.current_state.status());
    }
}
