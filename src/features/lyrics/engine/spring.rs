//! Spring physics for smooth offset animations
//!
//! Uses time-based analytical solutions rather than frame-by-frame integration.
//! Springs are described the way a UI toolkit describes them, by stiffness and
//! damping ratio with unit mass.
//!
//! ## Presets
//!
//! | Usage | stiffness | damping ratio |
//! |-------|-----------|---------------|
//! | Highlight progress | 200 | 0.75 (low bouncy) |
//! | Viewport follow | 50 | 1.0 (no bouncy) |
//!
//! ## Key Algorithm
//!
//! Critically damped when `damping_ratio == 1`:
//! ```text
//! angular_frequency = -sqrt(stiffness / mass)
//! leftover = -angular_frequency * delta - velocity
//! position(t) = to - (delta + t * leftover) * e^(t * angular_frequency)
//! ```
//!
//! Underdamped otherwise:
//! ```text
//! damping_frequency = sqrt(4 * mass * stiffness - damping^2)
//! leftover = (damping * delta - 2 * mass * velocity) / damping_frequency
//! dfm = 0.5 * damping_frequency / mass
//! dm = -0.5 * damping / mass
//! position(t) = to - (cos(t * dfm) * delta + sin(t * dfm) * leftover) * e^(t * dm)
//! ```
//!
//! Overdamped when `damping_ratio > 1`, with two real decay rates:
//! ```text
//! natural = sqrt(stiffness / mass)
//! r1, r2 = -natural * (damping_ratio -/+ sqrt(damping_ratio^2 - 1))
//! c1 = (velocity + r2 * delta) / (r1 - r2)
//! c2 = -delta - c1
//! position(t) = to + c1 * e^(r1 * t) + c2 * e^(r2 * t)
//! ```
//!
//! Velocity is the analytic first derivative of the same expressions.

use serde::{Deserialize, Serialize};

pub type Num = f64;

/// Distance below which the spring is considered at rest
const REST_POSITION: Num = 0.01;
/// Speed (units/s) below which the spring is considered at rest
const REST_VELOCITY: Num = 0.05;
/// Damping ratios this close to 1 use the critical solution
const CRITICAL_EPSILON: Num = 1e-6;

/// Spring parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    pub stiffness: Num,
    pub damping_ratio: Num,
}

impl SpringParams {
    /// Highlight progress spring (slight bounce)
    pub const PROGRESS: Self = Self {
        stiffness: 200.0,
        damping_ratio: 0.75,
    };

    /// Viewport follow spring (no bounce)
    pub const VIEWPORT: Self = Self {
        stiffness: 50.0,
        damping_ratio: 1.0,
    };

    const MASS: Num = 1.0;

    pub fn new(stiffness: Num, damping_ratio: Num) -> Self {
        Self {
            stiffness,
            damping_ratio,
        }
    }

    /// Damping coefficient derived from the ratio
    pub fn damping(&self) -> Num {
        self.damping_ratio * 2.0 * (self.stiffness * Self::MASS).sqrt()
    }

    /// Check if critically damped: damping == 2.0 * sqrt(stiffness * mass)
    pub fn is_critically_damped(&self) -> bool {
        (self.damping_ratio - 1.0).abs() < CRITICAL_EPSILON
    }

    /// Check if more than critically damped (no oscillation, slower settle)
    pub fn is_overdamped(&self) -> bool {
        self.damping_ratio > 1.0 && !self.is_critically_damped()
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::VIEWPORT
    }
}

/// Closed-form solution of one spring segment
#[derive(Debug, Clone, Copy)]
enum Solver {
    Rest {
        at: Num,
    },
    Critical {
        to: Num,
        delta: Num,
        angular_frequency: Num,
        leftover: Num,
    },
    Underdamped {
        to: Num,
        delta: Num,
        leftover: Num,
        dfm: Num,
        dm: Num,
    },
    Overdamped {
        to: Num,
        r1: Num,
        r2: Num,
        c1: Num,
        c2: Num,
    },
}

impl Solver {
    fn solve(from: Num, velocity: Num, to: Num, params: &SpringParams) -> Self {
        let mass = SpringParams::MASS;
        let stiffness = params.stiffness;
        let damping = params.damping();
        let delta = to - from;

        if params.is_overdamped() {
            let natural = (stiffness / mass).sqrt();
            let spread = (params.damping_ratio.powi(2) - 1.0).sqrt();
            let r1 = -natural * (params.damping_ratio - spread);
            let r2 = -natural * (params.damping_ratio + spread);
            let c1 = (velocity + r2 * delta) / (r1 - r2);
            Solver::Overdamped {
                to,
                r1,
                r2,
                c1,
                c2: -delta - c1,
            }
        } else if params.is_critically_damped() {
            let angular_frequency = -(stiffness / mass).sqrt();
            let leftover = -angular_frequency * delta - velocity;
            Solver::Critical {
                to,
                delta,
                angular_frequency,
                leftover,
            }
        } else {
            let damping_frequency = (4.0 * mass * stiffness - damping.powi(2)).sqrt();
            let leftover = (damping * delta - 2.0 * mass * velocity) / damping_frequency;
            Solver::Underdamped {
                to,
                delta,
                leftover,
                dfm: 0.5 * damping_frequency / mass,
                dm: -0.5 * damping / mass,
            }
        }
    }

    fn position(&self, t: Num) -> Num {
        match *self {
            Solver::Rest { at } => at,
            Solver::Critical {
                to,
                delta,
                angular_frequency,
                leftover,
            } => to - (delta + t * leftover) * (t * angular_frequency).exp(),
            Solver::Underdamped {
                to,
                delta,
                leftover,
                dfm,
                dm,
            } => to - ((t * dfm).cos() * delta + (t * dfm).sin() * leftover) * (t * dm).exp(),
            Solver::Overdamped { to, r1, r2, c1, c2 } => {
                to + c1 * (r1 * t).exp() + c2 * (r2 * t).exp()
            }
        }
    }

    fn velocity(&self, t: Num) -> Num {
        match *self {
            Solver::Rest { .. } => 0.0,
            Solver::Critical {
                delta,
                angular_frequency,
                leftover,
                ..
            } => {
                -(t * angular_frequency).exp()
                    * (leftover + angular_frequency * (delta + t * leftover))
            }
            Solver::Underdamped {
                delta,
                leftover,
                dfm,
                dm,
                ..
            } => {
                let (sin, cos) = (t * dfm).sin_cos();
                -(t * dm).exp()
                    * (dfm * (cos * leftover - sin * delta) + dm * (cos * delta + sin * leftover))
            }
            Solver::Overdamped { r1, r2, c1, c2, .. } => {
                c1 * r1 * (r1 * t).exp() + c2 * r2 * (r2 * t).exp()
            }
        }
    }
}

/// Spring animation with analytical solution
///
/// Retargeting or retuning restarts the solver from the current position and
/// velocity, so motion stays continuous.
#[derive(Debug, Clone)]
pub struct Spring {
    current_position: Num,
    target_position: Num,
    current_time: Num,
    params: SpringParams,
    solver: Solver,
}

impl Spring {
    /// Create spring at rest at the initial position
    pub fn new(current_position: Num) -> Self {
        Self::from_params(current_position, SpringParams::default())
    }

    /// Create spring with custom params
    pub fn from_params(current_position: Num, params: SpringParams) -> Self {
        Self {
            current_position,
            target_position: current_position,
            current_time: 0.0,
            params,
            solver: Solver::Rest {
                at: current_position,
            },
        }
    }

    fn reset_solver(&mut self, velocity: Num) {
        self.current_time = 0.0;
        self.solver = Solver::solve(
            self.current_position,
            velocity,
            self.target_position,
            &self.params,
        );
    }

    /// Check if spring has arrived at target
    pub fn arrived(&self) -> bool {
        (self.target_position - self.current_position).abs() < REST_POSITION
            && self.velocity().abs() < REST_VELOCITY
    }

    /// Set position immediately without animation
    pub fn set_position(&mut self, position: Num) {
        self.target_position = position;
        self.current_position = position;
        self.current_time = 0.0;
        self.solver = Solver::Rest { at: position };
    }

    /// Advance the spring - call every frame
    ///
    /// `delta` is the time since the last update in seconds.
    pub fn update(&mut self, delta: Num) {
        if matches!(self.solver, Solver::Rest { .. }) {
            return;
        }
        self.current_time += delta;
        self.current_position = self.solver.position(self.current_time);

        if self.arrived() {
            self.set_position(self.target_position);
        }
    }

    /// Update spring parameters, keeping the in-flight velocity
    pub fn update_params(&mut self, params: SpringParams) {
        if self.params == params {
            return;
        }
        self.params = params;
        if !matches!(self.solver, Solver::Rest { .. }) {
            let velocity = self.velocity();
            self.reset_solver(velocity);
        }
    }

    /// Set target position
    pub fn set_target(&mut self, target_position: Num) {
        if target_position == self.target_position && !self.arrived() {
            return;
        }
        let velocity = self.velocity();
        self.target_position = target_position;
        if self.arrived() {
            self.set_position(target_position);
        } else {
            self.reset_solver(velocity);
        }
    }

    /// Override the current velocity (resets solver)
    pub fn set_velocity(&mut self, velocity: Num) {
        self.reset_solver(velocity);
    }

    pub fn position(&self) -> Num {
        self.current_position
    }

    pub fn target(&self) -> Num {
        self.target_position
    }

    /// Get current velocity
    pub fn velocity(&self) -> Num {
        self.solver.velocity(self.current_time)
    }

    pub fn params(&self) -> &SpringParams {
        &self.params
    }

    /// Whether the spring is still moving
    pub fn is_animating(&self) -> bool {
        !matches!(self.solver, Solver::Rest { .. })
    }
}

impl Default for Spring {
    fn default() -> Self {
        Self::new(0.0)
    }
}
