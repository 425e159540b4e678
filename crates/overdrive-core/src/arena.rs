//! Arena module for the shooter simulation.
//!
//! The Arena is the container for all entities in a playthrough. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - A category index of live entities per [`EntityTag`]
//! - Entity lifecycle management (spawn/despawn)
//!
//! # Category Index
//!
//! Systems that act on "every enemy" (the freeze ability, enemy weapons, the
//! AI step) read [`Arena::ids_with_tag`] instead of scanning the whole entity
//! map. The index is maintained incrementally by [`Arena::spawn`] and
//! [`Arena::despawn`]; an entity's tag never changes, so no other mutation
//! can invalidate it.
//!
//! # Example
//!
//! ```
//! use overdrive_core::arena::Arena;
//! use overdrive_core::config::SimConfig;
//! use overdrive_core::entity::{EntityInner, EntityTag};
//! use overdrive_core::entity::components::{Color, EnemyComponents};
//! use glam::Vec2;
//!
//! let config = SimConfig::default();
//! let mut arena = Arena::new();
//! let a = arena.spawn(EntityInner::Enemy(EnemyComponents::new(Vec2::ZERO, Color::WHITE, &config)));
//! let b = arena.spawn(EntityInner::Enemy(EnemyComponents::new(Vec2::X, Color::WHITE, &config)));
//!
//! assert_eq!(arena.ids_with_tag(EntityTag::Enemy), vec![a, b]);
//! arena.despawn(a);
//! assert_eq!(arena.ids_with_tag(EntityTag::Enemy), vec![b]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::entity::{Entity, EntityId, EntityInner, EntityTag};

/// Entity container for one playthrough.
///
/// # Determinism
///
/// Entity IDs are assigned monotonically and stored in a `BTreeMap`, so
/// iterating entities (or the ids of one category) always yields the same
/// sequence for the same history of spawns.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    /// Monotonically increasing entity ID counter.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Entity>,
    /// Live entity ids per category.
    by_tag: BTreeMap<EntityTag, BTreeSet<EntityId>>,
    /// Fixed steps run so far.
    tick: u64,
}

impl Arena {
    /// Creates a new empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new entity and returns its id.
    ///
    /// The entity's tag is taken from `inner`, and the id is added to that
    /// tag's index.
    pub fn spawn(&mut self, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let entity = Entity::new(id, inner);
        self.by_tag.entry(entity.tag()).or_default().insert(id);
        self.entities.insert(id, entity);
        id
    }

    /// Despawns an entity, returning it if it existed.
    ///
    /// Despawning an id that is already gone is a no-op.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        if let Some(ids) = self.by_tag.get_mut(&entity.tag()) {
            ids.remove(&id);
        }
        Some(entity)
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns `true` if the entity is alive.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Ids of live entities with `tag`, in ascending order.
    ///
    /// Returns an owned snapshot, so callers may spawn or despawn while
    /// walking it.
    #[must_use]
    pub fn ids_with_tag(&self, tag: EntityTag) -> Vec<EntityId> {
        self.by_tag
            .get(&tag)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of live entities with `tag`.
    #[must_use]
    pub fn count_with_tag(&self, tag: EntityTag) -> usize {
        self.by_tag.get(&tag).map_or(0, BTreeSet::len)
    }

    /// Returns an iterator over entity IDs in deterministic (sorted) order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Returns an iterator over entities in deterministic (sorted by ID) order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Returns an iterator over mutable entities in deterministic order.
    pub fn entities_sorted_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.values_mut()
    }

    /// Returns the number of entities in the arena.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the number of fixed steps run so far.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the fixed-step counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::components::{Color, EnemyComponents, PickupComponents, TransformState};
    use glam::Vec2;

    fn enemy(at: Vec2) -> EntityInner {
        EntityInner::Enemy(EnemyComponents::new(at, Color::WHITE, &SimConfig::default()))
    }

    fn pickup(at: Vec2) -> EntityInner {
        EntityInner::Pickup(PickupComponents {
            transform: TransformState::new(at, 0.0),
            radius: 0.4,
            shield_value: 1,
            remaining_life: None,
            spawner_owned: false,
        })
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn new_arena_is_empty() {
            let arena = Arena::new();
            assert!(arena.is_empty());
            assert_eq!(arena.entity_count(), 0);
            assert_eq!(arena.current_tick(), 0);
        }

        #[test]
        fn spawn_assigns_increasing_ids() {
            let mut arena = Arena::new();
            let a = arena.spawn(enemy(Vec2::ZERO));
            let b = arena.spawn(pickup(Vec2::ONE));
            assert!(a < b);
            assert_eq!(arena.entity_count(), 2);
        }

        #[test]
        fn ids_are_not_reused() {
            let mut arena = Arena::new();
            let a = arena.spawn(enemy(Vec2::ZERO));
            arena.despawn(a);
            let b = arena.spawn(enemy(Vec2::ZERO));
            assert_ne!(a, b);
        }

        #[test]
        fn despawn_returns_entity_once() {
            let mut arena = Arena::new();
            let a = arena.spawn(enemy(Vec2::new(2.0, 3.0)));
            let removed = arena.despawn(a).unwrap();
            assert_eq!(removed.position(), Vec2::new(2.0, 3.0));
            assert!(arena.despawn(a).is_none());
            assert!(!arena.contains(a));
        }

        #[test]
        fn tick_advances() {
            let mut arena = Arena::new();
            arena.advance_tick();
            arena.advance_tick();
            assert_eq!(arena.current_tick(), 2);
        }
    }

    mod category_index_tests {
        use super::*;

        #[test]
        fn index_tracks_spawn_and_despawn() {
            let mut arena = Arena::new();
            let e1 = arena.spawn(enemy(Vec2::ZERO));
            let p1 = arena.spawn(pickup(Vec2::ZERO));
            let e2 = arena.spawn(enemy(Vec2::ZERO));

            assert_eq!(arena.ids_with_tag(EntityTag::Enemy), vec![e1, e2]);
            assert_eq!(arena.ids_with_tag(EntityTag::Pickup), vec![p1]);
            assert_eq!(arena.count_with_tag(EntityTag::Bullet), 0);

            arena.despawn(e1);
            assert_eq!(arena.ids_with_tag(EntityTag::Enemy), vec![e2]);
            assert_eq!(arena.count_with_tag(EntityTag::Enemy), 1);
        }

        #[test]
        fn unknown_tag_is_empty() {
            let arena = Arena::new();
            assert!(arena.ids_with_tag(EntityTag::Player).is_empty());
        }

        #[test]
        fn iteration_is_sorted() {
            let mut arena = Arena::new();
            let ids: Vec<_> = (0..5).map(|_| arena.spawn(enemy(Vec2::ZERO))).collect();
            let seen: Vec<_> = arena.entity_ids_sorted().collect();
            assert_eq!(seen, ids);
        }
    }
}
