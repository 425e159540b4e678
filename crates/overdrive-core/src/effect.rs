//! Timed effects advanced by the simulation's own tick loop.
//!
//! Every time-bounded behaviour in the game (knockback, hit-flash, the freeze
//! ability, the delayed time freeze after death) is a small state record that
//! implements [`TimedEffect`] and lives in an [`EffectSlot`] owned by whatever
//! it acts on.
//!
//! # Lifecycle
//!
//! - [`EffectSlot::start`] cancels any effect already in the slot (running its
//!   `on_cancel` restoration synchronously) and then starts the new one.
//! - [`EffectSlot::advance`] ticks the active effect and, once its timer runs
//!   out, runs `on_complete` and empties the slot.
//! - [`EffectSlot::cancel`] runs `on_cancel` and empties the slot.
//! - [`EffectSlot::abort`] empties the slot without running any restoration.
//!   Used when the whole scene is being torn down.
//!
//! # Example
//!
//! ```
//! use overdrive_core::effect::{EffectSlot, TimedEffect, Timer};
//!
//! struct Blink {
//!     timer: Timer,
//! }
//!
//! impl TimedEffect for Blink {
//!     type Target = bool;
//!
//!     fn timer_mut(&mut self) -> &mut Timer {
//!         &mut self.timer
//!     }
//!     fn on_start(&mut self, lit: &mut bool) {
//!         *lit = true;
//!     }
//!     fn on_complete(self, lit: &mut bool) {
//!         *lit = false;
//!     }
//!     fn on_cancel(self, lit: &mut bool) {
//!         *lit = false;
//!     }
//! }
//!
//! let mut lit = false;
//! let mut slot = EffectSlot::new();
//! slot.start(Blink { timer: Timer::new(0.5) }, &mut lit);
//! assert!(lit);
//!
//! slot.advance(0.25, &mut lit);
//! assert!(lit);
//! assert!(slot.advance(0.25, &mut lit));
//! assert!(!lit);
//! assert!(!slot.is_active());
//! ```

// =============================================================================
// Timer
// =============================================================================

/// Countdown timer measured in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    duration: f32,
    elapsed: f32,
}

impl Timer {
    /// Creates a timer that finishes after `duration` seconds.
    ///
    /// Negative or non-finite durations are treated as zero.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        Self {
            duration,
            elapsed: 0.0,
        }
    }

    /// Advances the timer and returns `true` once it has finished.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt.max(0.0);
        self.is_finished()
    }

    /// Returns `true` once the elapsed time has reached the duration.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Total duration of the timer.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds elapsed since the timer started.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Seconds left before the timer finishes (never negative).
    #[must_use]
    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

// =============================================================================
// TimedEffect
// =============================================================================

/// A time-bounded effect applied to a target.
///
/// The target type is whatever state the effect mutates: a physics body for
/// knockback, an appearance for hit-flash, the whole arena for the freeze
/// ability.
pub trait TimedEffect {
    /// State the effect acts on.
    type Target: ?Sized;

    /// The effect's countdown.
    fn timer_mut(&mut self) -> &mut Timer;

    /// Applies the effect. Called once, when the effect enters its slot.
    fn on_start(&mut self, _target: &mut Self::Target) {}

    /// Called every advance before the timer is checked.
    fn on_tick(&mut self, _target: &mut Self::Target, _dt: f32) {}

    /// Called when the timer runs out.
    fn on_complete(self, target: &mut Self::Target);

    /// Called when the effect is replaced or cancelled before finishing.
    fn on_cancel(self, target: &mut Self::Target);
}

// =============================================================================
// EffectSlot
// =============================================================================

/// Holds at most one running instance of an effect.
#[derive(Debug, Clone)]
pub struct EffectSlot<E> {
    active: Option<E>,
}

impl<E> Default for EffectSlot<E> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<E: TimedEffect> EffectSlot<E> {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `effect`, cancelling (and restoring) any effect already running.
    pub fn start(&mut self, mut effect: E, target: &mut E::Target) {
        self.cancel(target);
        effect.on_start(target);
        self.active = Some(effect);
    }

    /// Advances the running effect by `dt` seconds.
    ///
    /// Returns `true` if the effect completed during this call.
    pub fn advance(&mut self, dt: f32, target: &mut E::Target) -> bool {
        let Some(effect) = self.active.as_mut() else {
            return false;
        };

        effect.on_tick(target, dt);
        if !effect.timer_mut().tick(dt) {
            return false;
        }

        match self.active.take() {
            Some(effect) => {
                effect.on_complete(target);
                true
            }
            None => false,
        }
    }

    /// Cancels the running effect, running its restoration.
    ///
    /// Returns `true` if an effect was running.
    pub fn cancel(&mut self, target: &mut E::Target) -> bool {
        match self.active.take() {
            Some(effect) => {
                effect.on_cancel(target);
                true
            }
            None => false,
        }
    }

    /// Drops the running effect without restoring anything.
    pub fn abort(&mut self) -> Option<E> {
        self.active.take()
    }

    /// Returns `true` while an effect is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Returns the running effect, if any.
    #[must_use]
    pub fn get(&self) -> Option<&E> {
        self.active.as_ref()
    }
}
