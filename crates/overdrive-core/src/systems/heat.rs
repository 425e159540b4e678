//! Weapon heat with an overheat lockout.
//!
//! Heat rises by a fixed amount per shot and falls at a fixed rate while the
//! trigger is released (or while locked out). Reaching `max_heat` locks the
//! weapon; it unlocks only once heat has fallen to `resume_fraction *
//! max_heat`, which keeps the lockout from flickering on and off at the
//! threshold.
//!
//! ```
//! use overdrive_core::config::HeatConfig;
//! use overdrive_core::systems::heat::HeatState;
//!
//! let mut heat = HeatState::new(&HeatConfig {
//!     max_heat: 100.0,
//!     heat_per_shot: 50.0,
//!     cool_per_second: 10.0,
//!     resume_fraction: 0.5,
//! });
//!
//! heat.add_shot();
//! heat.add_shot();
//! assert!(heat.is_overheated());
//!
//! heat.cool(4.0); // 60 heat left, still above 50
//! assert!(heat.is_overheated());
//! heat.cool(1.0); // 50
//! assert!(!heat.is_overheated());
//! ```

use tracing::debug;

use crate::config::HeatConfig;
use crate::events::GameEvent;

/// Heat accumulator for one weapon.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatState {
    current: f32,
    max: f32,
    per_shot: f32,
    cool_rate: f32,
    resume_fraction: f32,
    overheated: bool,
}

impl HeatState {
    /// Creates a cold weapon.
    #[must_use]
    pub fn new(config: &HeatConfig) -> Self {
        Self {
            current: 0.0,
            max: config.max_heat.max(1.0),
            per_shot: config.heat_per_shot.max(0.0),
            cool_rate: config.cool_per_second.max(0.0),
            resume_fraction: config.resume_fraction.clamp(0.0, 1.0),
            overheated: false,
        }
    }

    /// Adds one shot's heat. Enters the lockout when heat reaches the
    /// maximum; heat never exceeds it.
    pub fn add_shot(&mut self) {
        self.current += self.per_shot;
        if self.current >= self.max {
            self.current = self.max;
            if !self.overheated {
                debug!(heat = self.current, "weapon overheated");
            }
            self.overheated = true;
        }
    }

    /// Cools for `dt` seconds and leaves the lockout once heat is at or
    /// below the resume threshold.
    ///
    /// Returns `true` if heat or the lockout flag changed.
    pub fn cool(&mut self, dt: f32) -> bool {
        let before = (self.current, self.overheated);
        self.current = (self.current - self.cool_rate * dt.max(0.0)).max(0.0);
        self.check_recovery();
        (self.current, self.overheated) != before
    }

    /// Leaves the lockout if heat is already low enough, without cooling.
    ///
    /// Returns `true` if the lockout ended.
    pub fn check_recovery(&mut self) -> bool {
        if self.overheated && self.current <= self.resume_threshold() {
            self.overheated = false;
            debug!(heat = self.current, "weapon recovered from overheat");
            return true;
        }
        false
    }

    /// Heat at or below which a locked weapon recovers.
    #[must_use]
    pub fn resume_threshold(&self) -> f32 {
        self.resume_fraction * self.max
    }

    /// Current heat.
    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Heat at which the weapon locks.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Whether the weapon is locked out.
    #[must_use]
    pub fn is_overheated(&self) -> bool {
        self.overheated
    }

    /// Notification describing the current state.
    #[must_use]
    pub fn changed_event(&self) -> GameEvent {
        GameEvent::HeatChanged {
            current: self.current,
            max: self.max,
            overheated: self.overheated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stock() -> HeatState {
        HeatState::new(&HeatConfig::default())
    }

    #[test]
    fn shots_accumulate_until_lockout() {
        let mut heat = stock();
        for shot in 1..=8 {
            heat.add_shot();
            #[allow(clippy::cast_precision_loss)]
            let expected = 12.0 * shot as f32;
            assert!((heat.current() - expected).abs() < 1e-4);
            assert!(!heat.is_overheated());
        }
        // 96 + 12 saturates at 100.
        heat.add_shot();
        assert_eq!(heat.current(), 100.0);
        assert!(heat.is_overheated());
    }

    #[test]
    fn lockout_holds_until_resume_threshold() {
        let mut heat = stock();
        for _ in 0..9 {
            heat.add_shot();
        }
        // 100 -> 37.5: still above 35.
        heat.cool(2.5);
        assert!(heat.is_overheated());
        // 37.5 -> 32.5: below 35, recovers.
        heat.cool(0.2);
        assert!(!heat.is_overheated());
    }

    #[test]
    fn cooling_floors_at_zero() {
        let mut heat = stock();
        heat.add_shot();
        assert!(heat.cool(10.0));
        assert_eq!(heat.current(), 0.0);
        assert!(!heat.cool(1.0));
    }

    #[test]
    fn zero_resume_fraction_requires_full_cool() {
        let mut heat = HeatState::new(&HeatConfig {
            resume_fraction: 0.0,
            ..HeatConfig::default()
        });
        for _ in 0..9 {
            heat.add_shot();
        }
        heat.cool(3.9);
        assert!(heat.is_overheated());
        heat.cool(0.2);
        assert!(!heat.is_overheated());
        assert_eq!(heat.current(), 0.0);
    }

    proptest! {
        #[test]
        fn heat_stays_in_bounds(ops in prop::collection::vec(prop_oneof![
            Just(None::<f32>),
            (0.0f32..2.0).prop_map(Some),
        ], 0..200)) {
            let mut heat = stock();
            for op in ops {
                match op {
                    None => heat.add_shot(),
                    Some(dt) => { heat.cool(dt); }
                }
                prop_assert!(heat.current() >= 0.0);
                prop_assert!(heat.current() <= heat.max());
            }
        }

        #[test]
        fn overheat_only_clears_at_or_below_threshold(cools in prop::collection::vec(0.0f32..0.5, 1..100)) {
            let mut heat = stock();
            while !heat.is_overheated() {
                heat.add_shot();
            }
            for dt in cools {
                heat.cool(dt);
                if !heat.is_overheated() {
                    prop_assert!(heat.current() <= heat.resume_threshold());
                    break;
                }
                prop_assert!(heat.current() > heat.resume_threshold());
            }
        }
    }
}
