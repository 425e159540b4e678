//! Per-tick gameplay systems.
//!
//! Each submodule owns one concern and the state record it drives:
//!
//! - [`player`]: input-driven ship movement ([`PlayerMotion`](player::PlayerMotion))
//! - [`enemy_ai`]: chase/orbit steering ([`EnemyAi`](enemy_ai::EnemyAi))
//! - [`heat`]: weapon heat and overheat lockout ([`HeatState`](heat::HeatState))
//! - [`weapon`]: player and enemy weapons
//! - [`physics`]: fixed-step integration of simulated bodies
//! - [`collision`]: circle-overlap contacts
//! - [`spawner`]: enemy and pickup spawners
//!
//! The [`Simulation`](crate::simulation::Simulation) calls into these in a
//! fixed order; none of them schedule themselves.

pub mod collision;
pub mod enemy_ai;
pub mod heat;
pub mod physics;
pub mod player;
pub mod spawner;
pub mod weapon;

use glam::Vec2;
use rand::Rng;

/// Moves `current` toward `target` by at most `max_delta`.
#[must_use]
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + delta / distance * max_delta.max(0.0)
    }
}

/// Uniformly random unit vector.
pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    Vec2::from_angle(angle)
}

/// Normalizes `v`, or returns `None` when its squared length is at or below
/// `min_length_sq`.
#[must_use]
pub fn direction_or_none(v: Vec2, min_length_sq: f32) -> Option<Vec2> {
    let length_sq = v.length_squared();
    if length_sq <= min_length_sq {
        None
    } else {
        Some(v / length_sq.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn move_towards_is_rate_limited() {
        let v = move_towards(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0);
        assert!((v - Vec2::new(2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn move_towards_snaps_when_close() {
        let target = Vec2::new(1.0, 1.0);
        assert_eq!(move_towards(Vec2::new(0.9, 1.0), target, 0.5), target);
    }

    #[test]
    fn random_unit_has_unit_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..32 {
            assert!((random_unit(&mut rng).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn degenerate_direction_is_none() {
        assert!(direction_or_none(Vec2::new(1e-4, 0.0), 1e-6).is_none());
        let dir = direction_or_none(Vec2::new(0.0, 3.0), 1e-6).unwrap();
        assert!((dir - Vec2::Y).length() < 1e-6);
    }
}
