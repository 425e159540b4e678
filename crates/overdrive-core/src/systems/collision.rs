//! Circle-overlap contact detection.
//!
//! Detection only reads the arena. The resulting [`Contact`]s are resolved
//! one at a time by the [`Simulation`](crate::simulation::Simulation), so each
//! damage application (and any death it causes) completes before the next
//! contact is looked at.
//!
//! # Rules
//!
//! - A bullet produces at most one contact per step: the first eligible
//!   overlap in entity id order.
//! - Player bullets hit enemies; enemy bullets hit the player.
//! - Enemy bullets touching a different enemy are absorbed harmlessly.
//! - Bullets never hit the entity that fired them, and ignore pickups.
//! - Bodies removed from simulation (frozen enemies) do not collide.
//! - A player overlapping a pickup produces one contact per pickup.

use glam::Vec2;

use crate::arena::Arena;
use crate::entity::components::BulletOwner;
use crate::entity::{EntityId, EntityTag};

/// One overlap to resolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    /// A player bullet reached an enemy.
    BulletHitEnemy {
        /// The bullet.
        bullet: EntityId,
        /// The enemy.
        enemy: EntityId,
        /// Damage carried by the bullet.
        damage: i32,
        /// Bullet position at impact, used as the knockback source.
        source: Vec2,
    },
    /// An enemy bullet reached the player.
    BulletHitPlayer {
        /// The bullet.
        bullet: EntityId,
        /// The player.
        player: EntityId,
        /// Damage carried by the bullet.
        damage: i32,
    },
    /// An enemy bullet touched another enemy and is spent.
    BulletAbsorbed {
        /// The bullet.
        bullet: EntityId,
    },
    /// The player touched a pickup.
    PlayerTouchedPickup {
        /// The player.
        player: EntityId,
        /// The pickup.
        pickup: EntityId,
    },
}

/// A collidable body: id, position, radius.
type Body = (EntityId, Vec2, f32);

fn overlaps(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}

/// Finds every contact in the arena, in a deterministic order.
#[must_use]
pub fn detect(arena: &Arena) -> Vec<Contact> {
    let players: Vec<Body> = arena
        .ids_with_tag(EntityTag::Player)
        .into_iter()
        .filter_map(|id| {
            let p = arena.get(id)?.as_player()?;
            p.physics
                .simulated
                .then_some((id, p.transform.position, p.physics.radius))
        })
        .collect();

    let enemies: Vec<Body> = arena
        .ids_with_tag(EntityTag::Enemy)
        .into_iter()
        .filter_map(|id| {
            let e = arena.get(id)?.as_enemy()?;
            e.physics
                .simulated
                .then_some((id, e.transform.position, e.physics.radius))
        })
        .collect();

    let mut contacts = Vec::new();

    for bullet_id in arena.ids_with_tag(EntityTag::Bullet) {
        let Some(bullet) = arena.get(bullet_id).and_then(|e| e.as_bullet()) else {
            continue;
        };
        if !bullet.physics.simulated {
            continue;
        }
        let pos = bullet.transform.position;
        let radius = bullet.physics.radius;
        let not_shooter = |id: &EntityId| bullet.shooter != Some(*id);

        let contact = match bullet.owner {
            BulletOwner::Player => enemies
                .iter()
                .find(|(id, at, r)| not_shooter(id) && overlaps(pos, radius, *at, *r))
                .map(|(enemy, _, _)| Contact::BulletHitEnemy {
                    bullet: bullet_id,
                    enemy: *enemy,
                    damage: bullet.damage,
                    source: pos,
                }),
            BulletOwner::Enemy => players
                .iter()
                .find(|(id, at, r)| not_shooter(id) && overlaps(pos, radius, *at, *r))
                .map(|(player, _, _)| Contact::BulletHitPlayer {
                    bullet: bullet_id,
                    player: *player,
                    damage: bullet.damage,
                })
                .or_else(|| {
                    enemies
                        .iter()
                        .any(|(id, at, r)| not_shooter(id) && overlaps(pos, radius, *at, *r))
                        .then_some(Contact::BulletAbsorbed { bullet: bullet_id })
                }),
        };
        contacts.extend(contact);
    }

    for &(player, player_pos, player_radius) in &players {
        for pickup_id in arena.ids_with_tag(EntityTag::Pickup) {
            let Some(pickup) = arena.get(pickup_id).and_then(|e| e.as_pickup()) else {
                continue;
            };
            if overlaps(player_pos, player_radius, pickup.transform.position, pickup.radius) {
                contacts.push(Contact::PlayerTouchedPickup {
                    player,
                    pickup: pickup_id,
                });
            }
        }
    }

    contacts
}
