use instant::Instant;

/// Wall-clock source for hosts that drive frames in real time.
///
/// All times handed to the orchestrator are seconds since the clock started.
pub struct SessionClock {
    origin: Instant,
    last: Instant,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::start()
    }
}

impl SessionClock {
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            origin: now,
            last: now,
        }
    }

    /// Seconds since the previous tick and seconds since start.
    pub fn tick(&mut self) -> (f32, f64) {
        let now = Instant::now();
        let dt = now - self.last;
        self.last = now;
        (dt.as_secs_f32(), (now - self.origin).as_secs_f64())
    }

    pub fn now_sec(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}
