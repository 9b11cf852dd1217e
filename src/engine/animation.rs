// Frame-index animations. Frames are opaque sprite indices; the renderer decides
// what they point at.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<usize>,
    interval: f32,
    cycles: Option<u32>,
    timer: f32,
    current: usize,
    times_played: u32,
}

impl Animation {
    pub fn new(frames: Vec<usize>, interval: f32) -> Self {
        Self {
            frames,
            interval,
            cycles: None,
            timer: 0.0,
            current: 0,
            times_played: 0,
        }
    }

    // Plays `cycles` times and then holds on the first frame
    pub fn once(frames: Vec<usize>, interval: f32) -> Self {
        Self::new(frames, interval).with_cycles(1)
    }

    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.cycles = Some(cycles);
        self
    }

    // Advances at most one frame per call
    pub fn update(&mut self, dt: f32) {
        if self.frames.len() <= 1 {
            return;
        }

        let playing = match self.cycles {
            None => true,
            Some(limit) => self.times_played < limit,
        };
        if !playing {
            return;
        }

        self.timer += dt;
        if self.timer > self.interval {
            self.timer %= self.interval;
            self.current = (self.current + 1) % self.frames.len();
            if self.current == 0 {
                self.times_played += 1;
            }
        }
    }

    pub fn frame(&self) -> usize {
        self.frames.get(self.current).copied().unwrap_or_default()
    }

    pub fn is_done(&self) -> bool {
        matches!(self.cycles, Some(limit) if self.times_played >= limit)
    }

    pub fn refresh(&mut self) {
        self.timer = 0.0;
        self.current = 0;
        self.times_played = 0;
    }
}
