use std::time::Instant;

// A simple struct to help with timing
pub struct Timer {
    last_instant: Instant,
    max_delta: f32,
}

impl Timer {
    pub fn new(max_delta: f32) -> Self {
        Self {
            last_instant: Instant::now(),
            max_delta,
        }
    }

    // Calculate the delta time since the last call. Long stalls (window drags,
    // breakpoints) are clamped so a single step can't carry the player through a tile.
    pub fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now - self.last_instant;
        self.last_instant = now;
        dt.as_secs_f32().min(self.max_delta)
    }
}
