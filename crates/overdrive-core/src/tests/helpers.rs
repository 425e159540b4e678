//! Test helper functions for setting up simulations and entities.
//!
//! The default tuning spawns enemies and pickups on its own. Most tests want
//! full control over what exists, so they start from [`quiet_config`].

use glam::Vec2;

use crate::config::SimConfig;
use crate::entity::components::{EnemyComponents, PlayerComponents};
use crate::entity::{Entity, EntityId};
use crate::events::GameEvent;
use crate::input::InputState;
use crate::simulation::Simulation;
use crate::systems::enemy_ai::AiMode;

/// One frame at 60 Hz.
pub const FRAME: f32 = 1.0 / 60.0;

// =============================================================================
// Configs
// =============================================================================

/// Stock tuning with both spawners pushed out of reach.
///
/// The enemy spawner's first spawn is delayed far beyond any test and
/// pickups land well away from the player.
pub fn quiet_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.enemy_spawner.initial_delay_min = 1.0e6;
    config.enemy_spawner.initial_delay_max = 1.0e6;
    config.pickup_spawner.interval = 1.0e6;
    config.pickup_spawner.min_distance = 500.0;
    config.pickup_spawner.max_distance = 600.0;
    config
}

/// [`quiet_config`] with enemies that neither steer nor get pushed around.
///
/// Useful when a test aims at an enemy and needs it to stay put.
pub fn stationary_enemy_config() -> SimConfig {
    let mut config = quiet_config();
    config.enemy.ai.max_speed = 0.0;
    config.enemy.ai.acceleration = 0.0;
    config.enemy.knockback.force = 0.0;
    config
}

// =============================================================================
// Setup
// =============================================================================

/// Simulation over [`quiet_config`].
pub fn quiet_sim() -> Simulation {
    Simulation::new(quiet_config(), 1)
}

/// Spawns and immediately kills `kills` enemies far from the player.
///
/// # Arguments
///
/// * `sim` - The simulation to score in
/// * `kills` - Number of kills to record
pub fn grant_kills(sim: &mut Simulation, kills: u32) {
    for i in 0..kills {
        #[allow(clippy::cast_precision_loss)]
        let at = Vec2::new(200.0 + i as f32 * 3.0, 200.0);
        let enemy = sim.spawn_enemy(at);
        kill(sim, enemy);
    }
}

/// Deals enough damage to kill `id` from full health.
pub fn kill(sim: &mut Simulation, id: EntityId) {
    sim.apply_damage(id, 1_000, Vec2::ZERO);
}

// =============================================================================
// Running
// =============================================================================

/// Runs `frames` frames of 1/60 s with the same input.
pub fn run_frames(sim: &mut Simulation, frames: u32, input: &InputState) {
    for _ in 0..frames {
        sim.frame(FRAME, input);
    }
}

/// Runs whole 60 Hz frames covering at least `seconds`.
///
/// # Returns
///
/// The number of frames run.
pub fn run_seconds(sim: &mut Simulation, seconds: f32, input: &InputState) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let frames = (seconds * 60.0).ceil() as u32;
    run_frames(sim, frames, input);
    frames
}

/// Runs frames until `done` holds or `max_seconds` have passed.
///
/// # Returns
///
/// `true` if `done` became true.
pub fn run_until(
    sim: &mut Simulation,
    max_seconds: f32,
    input: &InputState,
    mut done: impl FnMut(&Simulation) -> bool,
) -> bool {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let frames = (max_seconds * 60.0).ceil() as u32;
    for _ in 0..frames {
        sim.frame(FRAME, input);
        if done(sim) {
            return true;
        }
    }
    false
}

// =============================================================================
// Inspection
// =============================================================================

/// The player's components. Panics if the player is gone.
pub fn player(sim: &Simulation) -> &PlayerComponents {
    sim.player_components().expect("player should exist")
}

/// An enemy's components. Panics if `id` is not a live enemy.
pub fn enemy(sim: &Simulation, id: EntityId) -> &EnemyComponents {
    sim.arena()
        .get(id)
        .and_then(Entity::as_enemy)
        .expect("enemy should exist")
}

/// Mutable access to an enemy's components.
pub fn enemy_mut(sim: &mut Simulation, id: EntityId) -> &mut EnemyComponents {
    sim.arena_mut()
        .get_mut(id)
        .and_then(Entity::as_enemy_mut)
        .expect("enemy should exist")
}

/// Current steering mode of an enemy.
pub fn ai_mode_of(sim: &Simulation, id: EntityId) -> AiMode {
    enemy(sim, id).ai.mode()
}

/// Counts drained events matching `pred`.
pub fn count_events(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}
