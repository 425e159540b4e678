//! Simulation clock with a global time multiplier.
//!
//! Two time domains are tracked:
//! - **Scaled time** (`sim_time`): advances by `real_dt * time_scale`. Drives
//!   movement, weapons, spawners and per-entity effects.
//! - **Real time** (`real_time`): advances by `real_dt` regardless of the
//!   multiplier. Drives effects that must keep running while the game is
//!   frozen, such as the delayed freeze after the player dies.

/// Clock shared by every system in one playthrough.
#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    time_scale: f32,
    sim_time: f64,
    real_time: f64,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    /// Creates a clock at time zero with a multiplier of 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            time_scale: 1.0,
            sim_time: 0.0,
            real_time: 0.0,
        }
    }

    /// Advances both time domains and returns the scaled delta.
    pub fn advance(&mut self, real_dt: f32) -> f32 {
        let real_dt = real_dt.max(0.0);
        let scaled = real_dt * self.time_scale;
        self.real_time += f64::from(real_dt);
        self.sim_time += f64::from(scaled);
        scaled
    }

    /// Current time multiplier.
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Sets the time multiplier. Negative values clamp to zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Returns `true` when the multiplier is zero.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.time_scale <= 0.0
    }

    /// Scaled simulation time in seconds.
    #[must_use]
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Unscaled time in seconds.
    #[must_use]
    pub fn real_time(&self) -> f64 {
        self.real_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_time_follows_multiplier() {
        let mut clock = SimClock::new();
        clock.set_time_scale(0.5);
        let scaled = clock.advance(1.0);
        assert!((scaled - 0.5).abs() < 1e-6);
        assert!((clock.sim_time() - 0.5).abs() < 1e-9);
        assert!((clock.real_time() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn frozen_clock_still_counts_real_time() {
        let mut clock = SimClock::new();
        clock.set_time_scale(0.0);
        assert!(clock.is_frozen());
        assert_eq!(clock.advance(2.0), 0.0);
        assert_eq!(clock.sim_time(), 0.0);
        assert!((clock.real_time() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn negative_scale_clamps() {
        let mut clock = SimClock::new();
        clock.set_time_scale(-4.0);
        assert_eq!(clock.time_scale(), 0.0);
    }
}
