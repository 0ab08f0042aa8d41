//! Inertial fling for the lyric viewport
//!
//! After the finger leaves the screen with some velocity, the viewport keeps
//! gliding with exponential friction until it either slows below the stop
//! velocity or hits one of the bounds (first / last line offset).

/// Inertial scroll process bounded to `[min, max]`
#[derive(Debug, Clone)]
pub struct FlingScroller {
    /// Current position in pixels
    position: f32,
    /// Current velocity in pixels per second
    velocity: f32,
    min: f32,
    max: f32,
    /// Per-frame (60 Hz) velocity retention
    friction: f32,
    /// Below this speed the fling is over
    stop_velocity: f32,
    finished: bool,
}

impl FlingScroller {
    pub fn new(friction: f32, stop_velocity: f32) -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            min: 0.0,
            max: 0.0,
            friction,
            stop_velocity,
            finished: true,
        }
    }

    /// Start a fling from `start` with `velocity` (px/s), bounded to `[min, max]`
    pub fn fling(&mut self, start: f32, velocity: f32, min: f32, max: f32) {
        self.min = min.min(max);
        self.max = max.max(min);
        self.position = start.clamp(self.min, self.max);
        self.velocity = velocity;
        self.finished = velocity.abs() < self.stop_velocity;
    }

    /// Advance the fling; returns the new position while still running
    ///
    /// `dt` is in seconds.
    pub fn update(&mut self, dt: f32) -> Option<f32> {
        if self.finished {
            return None;
        }

        // v = v * friction^(dt * 60)
        self.velocity *= self.friction.powf(dt * 60.0);
        self.position += self.velocity * dt;

        if self.position <= self.min || self.position >= self.max {
            self.position = self.position.clamp(self.min, self.max);
            self.velocity = 0.0;
            self.finished = true;
        } else if self.velocity.abs() < self.stop_velocity {
            self.velocity = 0.0;
            self.finished = true;
        }

        Some(self.position)
    }

    /// Stop immediately where it is
    pub fn force_finished(&mut self) {
        self.velocity = 0.0;
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    pub fn set_stop_velocity(&mut self, stop_velocity: f32) {
        self.stop_velocity = stop_velocity;
    }
}

impl Default for FlingScroller {
    fn default() -> Self {
        Self::new(0.95, 50.0)
    }
}
