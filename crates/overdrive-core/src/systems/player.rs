//! Input-driven player movement.
//!
//! The player ship is kinematic: it integrates its own velocity every frame
//! instead of going through [`physics`](crate::systems::physics).

use glam::Vec2;

use crate::config::PlayerConfig;
use crate::entity::components::TransformState;
use crate::systems::move_towards;

/// Intent vectors shorter than this (squared) count as "no input".
const MIN_INTENT_SQ: f32 = 0.0001;

/// Velocity and speed upgrade of the player ship.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerMotion {
    velocity: Vec2,
    speed_bonus: f32,
}

impl PlayerMotion {
    /// Moves the ship for one frame.
    ///
    /// # Arguments
    ///
    /// * `config` - Player tuning
    /// * `intent` - Raw movement intent; normalized here
    /// * `aim_target` - Point the ship turns to face, if any
    /// * `dt` - Scaled frame time
    /// * `transform` - The ship's transform
    pub fn step(
        &mut self,
        config: &PlayerConfig,
        intent: Vec2,
        aim_target: Option<Vec2>,
        dt: f32,
        transform: &mut TransformState,
    ) {
        let intent = intent.normalize_or_zero();
        if intent.length_squared() > MIN_INTENT_SQ {
            self.velocity += intent * config.acceleration * dt;
        } else {
            self.velocity = move_towards(self.velocity, Vec2::ZERO, config.deceleration * dt);
        }

        self.velocity = self.velocity.clamp_length_max(self.max_speed(config));
        transform.position += self.velocity * dt;

        if let Some(target) = aim_target {
            transform.face_towards(target);
        }
    }

    /// Top speed including the upgrade bonus, never negative.
    #[must_use]
    pub fn max_speed(&self, config: &PlayerConfig) -> f32 {
        (config.max_speed + self.speed_bonus).max(0.0)
    }

    /// Adds to the speed bonus. Negative amounts are ignored.
    pub fn add_speed_bonus(&mut self, amount: f32) {
        self.speed_bonus += amount.max(0.0);
    }

    /// Clears the speed bonus.
    pub fn reset_upgrade_bonuses(&mut self) {
        self.speed_bonus = 0.0;
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Stops the ship.
    pub fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(motion: &mut PlayerMotion, intent: Vec2, seconds: u32) -> TransformState {
        let config = PlayerConfig::default();
        let mut transform = TransformState::default();
        for _ in 0..seconds * 60 {
            motion.step(&config, intent, None, 1.0 / 60.0, &mut transform);
        }
        transform
    }

    #[test]
    fn accelerates_up_to_max_speed() {
        let mut motion = PlayerMotion::default();
        let transform = run(&mut motion, Vec2::X, 2);
        assert!((motion.velocity().length() - 8.0).abs() < 1e-4);
        assert!(transform.position.x > 0.0);
    }

    #[test]
    fn diagonal_intent_is_normalized() {
        let config = PlayerConfig::default();
        let mut motion = PlayerMotion::default();
        let mut transform = TransformState::default();
        motion.step(&config, Vec2::new(1.0, 1.0), None, 0.1, &mut transform);
        assert!((motion.velocity().length() - 1.8).abs() < 1e-4);
    }

    #[test]
    fn decelerates_without_input() {
        let mut motion = PlayerMotion::default();
        run(&mut motion, Vec2::X, 2);
        run(&mut motion, Vec2::ZERO, 1);
        assert_eq!(motion.velocity(), Vec2::ZERO);
    }

    #[test]
    fn speed_bonus_raises_cap() {
        let mut motion = PlayerMotion::default();
        motion.add_speed_bonus(0.5);
        motion.add_speed_bonus(-3.0);
        run(&mut motion, Vec2::Y, 2);
        assert!((motion.velocity().length() - 8.5).abs() < 1e-4);

        motion.reset_upgrade_bonuses();
        assert!((motion.max_speed(&PlayerConfig::default()) - 8.0).abs() < 1e-6);
    }

    #[test]
    fn faces_aim_target() {
        let config = PlayerConfig::default();
        let mut motion = PlayerMotion::default();
        let mut transform = TransformState::default();
        motion.step(&config, Vec2::ZERO, Some(Vec2::new(-2.0, 0.0)), 0.1, &mut transform);
        assert!((transform.forward() - Vec2::NEG_X).length() < 1e-5);
    }
}
