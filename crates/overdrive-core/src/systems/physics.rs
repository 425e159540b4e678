//! Fixed-step integration of simulated bodies.
//!
//! # Fixed Timestep
//!
//! Motion, steering and collisions run at a fixed 1/60 s step regardless of
//! the frame time. [`FixedStepper`] turns variable (scaled) frame times into
//! a whole number of steps and carries the remainder to the next frame.

use tracing::warn;

use crate::arena::Arena;
use crate::entity::EntityInner;
use crate::entity::components::{PhysicsState, TransformState};

/// Fixed timestep for physics integration (1/60 second).
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Most fixed steps run for a single frame. Longer frames are clamped to
/// [`FixedStepper::max_frame`] before any system sees them.
pub const MAX_STEPS_PER_FRAME: u32 = 8;

/// Accumulates frame time into fixed steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStepper {
    step: f32,
    accumulator: f32,
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self::new(FIXED_DT)
    }
}

impl FixedStepper {
    /// Creates a stepper with the given step length.
    #[must_use]
    pub fn new(step: f32) -> Self {
        Self {
            step: step.max(1e-4),
            accumulator: 0.0,
        }
    }

    /// Adds `dt` seconds and returns how many whole steps are due.
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.step {
            if steps == MAX_STEPS_PER_FRAME {
                warn!(
                    dropped = self.accumulator,
                    "step budget exhausted, dropping simulation time"
                );
                self.accumulator = 0.0;
                break;
            }
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }

    /// Longest frame time this stepper turns into steps without dropping
    /// any of it.
    #[must_use]
    pub fn max_frame(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let steps = MAX_STEPS_PER_FRAME as f32;
        self.step * steps
    }

    /// Clamps a frame time to [`Self::max_frame`].
    #[must_use]
    pub fn clamp_frame(&self, dt: f32) -> f32 {
        let max = self.max_frame();
        if dt > max {
            warn!(dt, max, "frame too long, dropping simulation time");
            max
        } else {
            dt.max(0.0)
        }
    }

    /// Step length in seconds.
    #[must_use]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Time carried over to the next frame.
    #[must_use]
    pub fn remainder(&self) -> f32 {
        self.accumulator
    }
}

/// Damps and integrates one body.
pub fn integrate_body(transform: &mut TransformState, physics: &mut PhysicsState, dt: f32) {
    if !physics.simulated {
        return;
    }
    if physics.linear_damping > 0.0 {
        physics.velocity *= 1.0 / (1.0 + physics.linear_damping * dt);
    }
    transform.position += physics.velocity * dt;
}

/// Integrates every simulated enemy and bullet for one fixed step.
///
/// The player moves kinematically and pickups are static, so neither is
/// touched here.
pub fn integrate(arena: &mut Arena, dt: f32) {
    for entity in arena.entities_sorted_mut() {
        match entity.inner_mut() {
            EntityInner::Enemy(c) => integrate_body(&mut c.transform, &mut c.physics, dt),
            EntityInner::Bullet(c) => integrate_body(&mut c.transform, &mut c.physics, dt),
            EntityInner::Player(_) | EntityInner::Pickup(_) => {}
        }
    }
}
