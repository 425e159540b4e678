//! Integration tests for the full frame pipeline.
//!
//! These tests verify that the systems cooperate through [`Simulation`]:
//! - Player fire -> collision -> enemy damage -> kill and score
//! - Enemy fire, absorption by other enemies, shields and pickups
//! - Ability requests carried by input
//! - Spawner bookkeeping and entity lifetimes

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::abilities::AbilityKind;
use crate::entity::{Entity, EntityTag};
use crate::events::GameEvent;
use crate::flow::StoppableId;
use crate::input::InputState;
use crate::simulation::Simulation;

use super::helpers::{
    count_events, enemy, grant_kills, kill, player, quiet_config, quiet_sim, run_frames,
    run_seconds, run_until, stationary_enemy_config, FRAME,
};

// =============================================================================
// Player Weapon
// =============================================================================

mod player_fire_tests {
    use super::*;

    #[test]
    fn bullets_kill_an_enemy_in_the_line_of_fire() {
        let mut sim = Simulation::new(stationary_enemy_config(), 11);
        let target = Vec2::new(3.0, 0.0);
        let id = sim.spawn_enemy(target);

        let killed = run_until(&mut sim, 2.0, &InputState::firing_at(target), |s| {
            !s.arena().contains(id)
        });

        assert!(killed, "three hits should kill a stock enemy");
        assert_eq!(sim.score().kills(), 1);
        assert_eq!(sim.score().score(), 1);
    }

    #[test]
    fn each_hit_removes_one_health() {
        let mut sim = Simulation::new(stationary_enemy_config(), 11);
        let target = Vec2::new(3.0, 0.0);
        let id = sim.spawn_enemy(target);

        let hit = run_until(&mut sim, 1.0, &InputState::firing_at(target), |s| {
            enemy(s, id).health.current < 3
        });

        assert!(hit);
        assert_eq!(enemy(&sim, id).health.current, 2);
    }

    #[test]
    fn bullets_expire_after_their_lifetime() {
        let mut sim = quiet_sim();
        sim.frame(FRAME, &InputState::firing_at(Vec2::new(0.0, 50.0)));
        assert_eq!(sim.arena().count_with_tag(EntityTag::Bullet), 1);

        run_seconds(&mut sim, 2.2, &InputState::idle());
        assert_eq!(sim.arena().count_with_tag(EntityTag::Bullet), 0);
    }

    #[test]
    fn long_frame_ages_bullets_as_far_as_it_moves_them() {
        let mut sim = quiet_sim();
        sim.frame(FRAME, &InputState::firing_at(Vec2::new(0.0, 50.0)));
        let id = sim.arena().ids_with_tag(EntityTag::Bullet)[0];
        let bullet = |sim: &Simulation| {
            let b = sim.arena().get(id).and_then(Entity::as_bullet).unwrap();
            (b.transform.position, b.remaining_life, b.physics.velocity.length())
        };
        let (start, life, speed) = bullet(&sim);

        sim.frame(1.0, &InputState::idle());
        let (end, left, _) = bullet(&sim);
        let aged = life - left;
        assert!(aged < 0.2, "a stalled frame is clamped, aged {aged}");
        assert!((end.distance(start) - speed * aged).abs() < 1e-3);

        sim.frame(1.0, &InputState::idle());
        assert!(sim.arena().contains(id));
    }

    #[test]
    fn hit_flash_restores_the_tint() {
        let mut sim = quiet_sim();
        let id = sim.spawn_enemy(Vec2::new(20.0, 0.0));
        let tint = enemy(&sim, id).appearance.color;

        sim.apply_damage(id, 1, Vec2::new(19.0, 0.0));
        assert_eq!(enemy(&sim, id).appearance.color, sim.config().enemy.flash.color);

        run_seconds(&mut sim, 0.2, &InputState::idle());
        assert_eq!(enemy(&sim, id).appearance.color, tint);
    }
}

// =============================================================================
// Enemy Weapon and Shields
// =============================================================================

mod enemy_fire_tests {
    use super::*;

    #[test]
    fn enemy_bullets_are_absorbed_by_other_enemies() {
        let mut config = stationary_enemy_config();
        config.enemy.weapon.fire_interval = 100.0;
        let mut sim = Simulation::new(config, 5);
        let blocker = sim.spawn_enemy(Vec2::new(4.0, 0.0));
        let _shooter = sim.spawn_enemy(Vec2::new(8.0, 0.0));

        run_seconds(&mut sim, 1.0, &InputState::idle());

        // Only the blocker's own shot reaches the player.
        assert_eq!(player(&sim).shield.current, 4);
        assert_eq!(player(&sim).health.current, 10);
        assert_eq!(enemy(&sim, blocker).health.current, 3);
        assert_eq!(sim.arena().count_with_tag(EntityTag::Bullet), 0);
    }

    #[test]
    fn shield_regenerates_after_the_damage_delay() {
        let mut sim = quiet_sim();
        let id = sim.player().unwrap();
        sim.apply_damage(id, 2, Vec2::X);
        assert_eq!(player(&sim).shield.current, 3);

        run_seconds(&mut sim, 1.0, &InputState::idle());
        assert_eq!(player(&sim).shield.current, 3);

        run_seconds(&mut sim, 3.0, &InputState::idle());
        assert_eq!(player(&sim).shield.current, 5);
        assert_eq!(player(&sim).health.current, 10);
    }

    #[test]
    fn pickup_tops_up_a_damaged_shield() {
        let mut sim = quiet_sim();
        let id = sim.player().unwrap();
        sim.apply_damage(id, 2, Vec2::X);
        let pickup = sim.spawn_pickup(Vec2::ZERO);

        sim.frame(FRAME, &InputState::idle());

        assert_eq!(player(&sim).shield.current, 4);
        assert!(!sim.arena().contains(pickup));
    }

    #[test]
    fn pickup_stays_while_the_shield_is_full() {
        let mut sim = quiet_sim();
        let pickup = sim.spawn_pickup(Vec2::ZERO);

        run_frames(&mut sim, 5, &InputState::idle());

        assert_eq!(player(&sim).shield.current, 5);
        assert!(sim.arena().contains(pickup));
    }
}

// =============================================================================
// Abilities via Input
// =============================================================================

mod ability_input_tests {
    use super::*;

    #[test]
    fn hotkey_spends_a_point_on_an_upgrade() {
        let mut sim = quiet_sim();
        grant_kills(&mut sim, 5);
        assert_eq!(sim.score().ability_points(), 1);

        sim.frame(
            FRAME,
            &InputState::idle().with_ability(AbilityKind::UpgradeDamage),
        );

        assert_eq!(sim.score().ability_points(), 0);
        assert_eq!(sim.abilities().levels().damage, 2);
        assert_eq!(player(&sim).weapon.damage(), 2);
    }

    #[test]
    fn hotkey_without_points_changes_nothing() {
        let mut sim = quiet_sim();
        let before = player(&sim).motion.max_speed(&sim.config().player);

        sim.frame(
            FRAME,
            &InputState::idle().with_ability(AbilityKind::UpgradeShipSpeed),
        );

        assert_eq!(sim.abilities().levels().ship_speed, 1);
        assert_eq!(player(&sim).motion.max_speed(&sim.config().player), before);
    }

    #[test]
    fn dead_player_cannot_use_abilities() {
        let mut sim = quiet_sim();
        grant_kills(&mut sim, 5);
        let id = sim.player().unwrap();
        kill(&mut sim, id);

        sim.frame(
            FRAME,
            &InputState::idle().with_ability(AbilityKind::FreezeEnemies),
        );

        assert_eq!(sim.score().ability_points(), 1);
        assert!(!sim.abilities().is_freeze_active());
    }
}

// =============================================================================
// Spawning and Bookkeeping
// =============================================================================

mod spawn_tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::systems::spawner::EnemySpawner;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn first_spawn_delay_is_the_first_draw_of_the_seed() {
        let sim = Simulation::new(SimConfig::default(), 21);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let expected = EnemySpawner::new(&sim.config().enemy_spawner, &mut rng);
        assert_eq!(sim.enemy_spawner(), &expected);
    }

    #[test]
    fn killed_spawner_enemy_frees_its_slot() {
        let mut config = quiet_config();
        config.enemy_spawner.initial_delay_min = 0.0;
        config.enemy_spawner.initial_delay_max = 0.0;
        config.enemy_spawner.initial_interval = 100.0;
        config.enemy_spawner.min_interval = 100.0;
        let mut sim = Simulation::new(config, 8);

        sim.frame(FRAME, &InputState::idle());
        let spawned = sim.arena().ids_with_tag(EntityTag::Enemy);
        assert_eq!(spawned.len(), 1);
        assert_eq!(sim.enemy_spawner().active(), 1);

        kill(&mut sim, spawned[0]);
        assert_eq!(sim.enemy_spawner().active(), 0);
        assert_eq!(sim.arena().count_with_tag(EntityTag::Enemy), 0);
    }

    #[test]
    fn spawned_enemies_keep_clear_of_the_player() {
        let mut config = quiet_config();
        config.enemy_spawner.initial_delay_min = 0.0;
        config.enemy_spawner.initial_delay_max = 0.0;
        let mut sim = Simulation::new(config, 21);

        sim.frame(FRAME, &InputState::idle());
        let id = sim.arena().ids_with_tag(EntityTag::Enemy)[0];
        let distance = enemy(&sim, id).transform.position.length();
        assert!(distance >= sim.config().enemy_spawner.min_distance - 1.0);
    }

    #[test]
    fn enemy_weapons_leave_the_registry_on_despawn() {
        let mut sim = quiet_sim();
        let id = sim.spawn_enemy(Vec2::new(30.0, 0.0));
        assert!(sim.flow().registered().contains(&StoppableId::EnemyWeapon(id)));

        assert!(sim.despawn(id));
        assert!(!sim.flow().registered().contains(&StoppableId::EnemyWeapon(id)));
        assert_eq!(sim.is_stopped(StoppableId::EnemyWeapon(id)), None);
        assert!(!sim.despawn(id));
    }
}

// =============================================================================
// Notifications
// =============================================================================

mod notification_tests {
    use super::*;

    #[test]
    fn new_simulation_announces_initial_state() {
        let mut sim = quiet_sim();
        let events = sim.take_events();
        assert!(events.contains(&GameEvent::ShieldChanged { current: 5, max: 5 }));
        assert!(events.contains(&GameEvent::ScoreChanged { score: 0 }));
        assert!(events.contains(&GameEvent::AbilityPointsChanged { points: 0 }));
    }

    #[test]
    fn listeners_see_kills_until_unsubscribed() {
        let mut sim = quiet_sim();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = sim
            .events_mut()
            .subscribe(move |event| sink.borrow_mut().push(event.clone()));

        let id = sim.spawn_enemy(Vec2::new(30.0, 0.0));
        kill(&mut sim, id);
        assert_eq!(
            count_events(&seen.borrow(), |e| *e == GameEvent::EnemyKilled { entity: id }),
            1
        );
        assert!(seen.borrow().contains(&GameEvent::ScoreChanged { score: 1 }));

        drop(subscription);
        assert_eq!(sim.events_mut().listener_count(), 0);
        let other = sim.spawn_enemy(Vec2::new(-30.0, 0.0));
        kill(&mut sim, other);
        assert!(!seen
            .borrow()
            .contains(&GameEvent::EnemyKilled { entity: other }));
    }
}
