//! Entity module for the arena shooter simulation.
//!
//! This module provides the core entity types:
//! - [`EntityId`]: Unique identifier for entities
//! - [`EntityTag`]: Category used for registry lookups (player, enemy, ...)
//! - [`EntityInner`]: Type-safe storage for entity-specific components
//! - [`Entity`]: The complete entity container
//!
//! # Example
//!
//! ```
//! use overdrive_core::config::SimConfig;
//! use overdrive_core::entity::{Entity, EntityId, EntityInner, EntityTag};
//! use overdrive_core::entity::components::PlayerComponents;
//! use glam::Vec2;
//!
//! let player = Entity::new(
//!     EntityId::new(7),
//!     EntityInner::Player(PlayerComponents::new(Vec2::ZERO, &SimConfig::default())),
//! );
//!
//! assert_eq!(player.id().as_u64(), 7);
//! assert_eq!(player.tag(), EntityTag::Player);
//! ```

pub mod components;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{
    BulletComponents, BulletOwner, EnemyComponents, PickupComponents, PlayerComponents,
    Subsystems,
};

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Entity IDs are assigned
/// monotonically by the [`Arena`](crate::arena::Arena) and never reused
/// within a playthrough.
///
/// # Ordering
///
/// Entity IDs are ordered by their numeric value, which is used to ensure
/// deterministic iteration order across all entities.
///
/// ```
/// use overdrive_core::entity::EntityId;
///
/// assert!(EntityId::new(1) < EntityId::new(2));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity category.
///
/// The arena keeps an index of live entities per tag so systems can visit
/// "all enemies" without scanning everything.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// The player ship
    Player,
    /// An enemy ship
    Enemy,
    /// A bullet in flight (either side)
    Bullet,
    /// A collectible (shield pickup)
    Pickup,
}

impl EntityTag {
    /// Every tag, in index order.
    pub const ALL: [Self; 4] = [Self::Player, Self::Enemy, Self::Bullet, Self::Pickup];
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Bullet => write!(f, "Bullet"),
            Self::Pickup => write!(f, "Pickup"),
        }
    }
}

/// Type-safe storage for entity-specific components.
///
/// The variant always determines the entity's [`EntityTag`]; there is no way
/// to build an entity whose tag and storage disagree.
#[derive(Debug, Clone)]
pub enum EntityInner {
    /// Player ship components
    Player(PlayerComponents),
    /// Enemy ship components
    Enemy(EnemyComponents),
    /// Bullet components
    Bullet(BulletComponents),
    /// Pickup components
    Pickup(PickupComponents),
}

impl EntityInner {
    /// Returns the corresponding `EntityTag` for this inner storage.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Player(_) => EntityTag::Player,
            Self::Enemy(_) => EntityTag::Enemy,
            Self::Bullet(_) => EntityTag::Bullet,
            Self::Pickup(_) => EntityTag::Pickup,
        }
    }

    /// World position of the entity.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Player(c) => c.transform.position,
            Self::Enemy(c) => c.transform.position,
            Self::Bullet(c) => c.transform.position,
            Self::Pickup(c) => c.transform.position,
        }
    }
}

/// A complete entity in the simulation.
///
/// An `Entity` combines a unique [`EntityId`] with its [`EntityInner`]
/// component storage.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    inner: EntityInner,
}

impl Entity {
    /// Creates a new entity with the given ID and inner storage.
    #[must_use]
    pub const fn new(id: EntityId, inner: EntityInner) -> Self {
        Self { id, inner }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's category.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// Returns a reference to the entity's inner component storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns a mutable reference to the entity's inner component storage.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// World position of the entity.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.inner.position()
    }

    /// Returns the player components if this is the player, `None` otherwise.
    #[must_use]
    pub const fn as_player(&self) -> Option<&PlayerComponents> {
        match &self.inner {
            EntityInner::Player(c) => Some(c),
            _ => None,
        }
    }

    /// Returns mutable player components if this is the player.
    #[must_use]
    pub fn as_player_mut(&mut self) -> Option<&mut PlayerComponents> {
        match &mut self.inner {
            EntityInner::Player(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the enemy components if this is an enemy, `None` otherwise.
    #[must_use]
    pub const fn as_enemy(&self) -> Option<&EnemyComponents> {
        match &self.inner {
            EntityInner::Enemy(c) => Some(c),
            _ => None,
        }
    }

    /// Returns mutable enemy components if this is an enemy.
    #[must_use]
    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyComponents> {
        match &mut self.inner {
            EntityInner::Enemy(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the bullet components if this is a bullet, `None` otherwise.
    #[must_use]
    pub const fn as_bullet(&self) -> Option<&BulletComponents> {
        match &self.inner {
            EntityInner::Bullet(c) => Some(c),
            _ => None,
        }
    }

    /// Returns mutable bullet components if this is a bullet.
    #[must_use]
    pub fn as_bullet_mut(&mut self) -> Option<&mut BulletComponents> {
        match &mut self.inner {
            EntityInner::Bullet(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the pickup components if this is a pickup, `None` otherwise.
    #[must_use]
    pub const fn as_pickup(&self) -> Option<&PickupComponents> {
        match &self.inner {
            EntityInner::Pickup(c) => Some(c),
            _ => None,
        }
    }

    /// Returns mutable pickup components if this is a pickup.
    #[must_use]
    pub fn as_pickup_mut(&mut self) -> Option<&mut PickupComponents> {
        match &mut self.inner {
            EntityInner::Pickup(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::components::{Color, PhysicsState, TransformState};

    fn bullet_inner() -> EntityInner {
        EntityInner::Bullet(BulletComponents {
            transform: TransformState::new(Vec2::new(3.0, 4.0), 0.0),
            physics: PhysicsState::with_radius(0.1),
            owner: BulletOwner::Player,
            shooter: None,
            damage: 1,
            remaining_life: 2.0,
        })
    }

    mod entity_id_tests {
        use super::*;

        #[test]
        fn new_creates_id_with_value() {
            assert_eq!(EntityId::new(42).as_u64(), 42);
        }

        #[test]
        fn ordering() {
            let mut ids = vec![EntityId::new(3), EntityId::new(1), EntityId::new(2)];
            ids.sort();
            assert_eq!(ids, vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)]);
        }

        #[test]
        fn debug_and_display_format() {
            let id = EntityId::new(42);
            assert_eq!(format!("{id:?}"), "EntityId(42)");
            assert_eq!(format!("{id}"), "42");
        }

        #[test]
        fn u64_conversions() {
            let id: EntityId = 42u64.into();
            let raw: u64 = id.into();
            assert_eq!(raw, 42);
        }

        #[test]
        fn serialization_roundtrip() {
            let id = EntityId::new(12345);
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(serde_json::from_str::<EntityId>(&json).unwrap(), id);
        }
    }

    mod entity_tag_tests {
        use super::*;

        #[test]
        fn display_format() {
            assert_eq!(EntityTag::Player.to_string(), "Player");
            assert_eq!(EntityTag::Enemy.to_string(), "Enemy");
            assert_eq!(EntityTag::Bullet.to_string(), "Bullet");
            assert_eq!(EntityTag::Pickup.to_string(), "Pickup");
        }

        #[test]
        fn all_lists_every_tag_once() {
            use std::collections::HashSet;
            let set: HashSet<_> = EntityTag::ALL.iter().collect();
            assert_eq!(set.len(), 4);
        }
    }

    mod entity_tests {
        use super::*;

        #[test]
        fn tag_follows_inner() {
            let config = SimConfig::default();
            let enemy = Entity::new(
                EntityId::new(1),
                EntityInner::Enemy(EnemyComponents::new(Vec2::ZERO, Color::WHITE, &config)),
            );
            assert_eq!(enemy.tag(), EntityTag::Enemy);

            let bullet = Entity::new(EntityId::new(2), bullet_inner());
            assert_eq!(bullet.tag(), EntityTag::Bullet);
        }

        #[test]
        fn typed_accessors() {
            let mut bullet = Entity::new(EntityId::new(2), bullet_inner());
            assert!(bullet.as_bullet().is_some());
            assert!(bullet.as_bullet_mut().is_some());
            assert!(bullet.as_enemy().is_none());
            assert!(bullet.as_player_mut().is_none());
            assert!(bullet.as_pickup().is_none());
        }

        #[test]
        fn position_reads_transform() {
            let bullet = Entity::new(EntityId::new(2), bullet_inner());
            assert_eq!(bullet.position(), Vec2::new(3.0, 4.0));
        }
    }
}
