//! # Entity Manager
//!
//! Allocates and recycles entity ids and commits structural changes.
//!
//! Creates, destroys, and attach/detach calls made during a tick are only
//! staged. [`EntityManager::update`] is the single commit point, draining
//! the queues in a fixed order:
//!
//! ```text
//! added   -> compute composition, mark Active, fire on_added
//! changed -> recompute composition, fire on_changed
//! removed -> fire on_removed (stores still intact), wipe stores, free id
//! ```
//!
//! Every Active entity that was written to since the last commit gets
//! exactly one `on_changed`, however many attach/detach calls it saw and
//! even if they cancel out. Entities that became Active in the same commit
//! only get `on_added`.
//!
//! An entity created and destroyed within the same tick never becomes
//! Active: it is released at commit without firing any event.

use std::mem;

use super::aspect::Aspect;
use super::bitmask::BitMask;
use super::entity::{Entity, EntityId, EntityState};
use super::manager::ComponentManager;
use super::subscription::{Subscription, SubscriptionId};
use crate::error::{EcsError, EcsResult};

/// Receives lifecycle events while the entity manager commits a tick.
///
/// All methods default to no-ops.
pub trait EntityObserver {
    /// An entity became Active with the given composition.
    fn on_added(&mut self, _entity: EntityId, _composition: &BitMask) {}

    /// An Active entity's composition changed.
    fn on_changed(&mut self, _entity: EntityId, _previous: &BitMask, _current: &BitMask) {}

    /// An Active entity is being removed. Its components are still readable
    /// through `components`; they are wiped right after this call returns.
    fn on_removed(&mut self, _entity: EntityId, _composition: &BitMask, _components: &ComponentManager) {}
}

/// Counts of what one call to [`EntityManager::update`] committed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Entities that became Active.
    pub added: usize,
    /// Active entities taken from the changed queue.
    pub changed: usize,
    /// Entities released back to the pool (including same-tick create/destroy).
    pub removed: usize,
}

/// Owner of entity slots, the id pool, lifecycle queues, and subscriptions.
pub struct EntityManager {
    /// Every slot ever allocated, indexed by entity index.
    slots: Vec<Entity>,
    /// Free list of slot indices for reuse.
    free_indices: Vec<u32>,
    /// Created this tick.
    added: Vec<EntityId>,
    /// Indices drained from the component manager's dirty queue.
    changed: Vec<u32>,
    /// Destroyed this tick.
    removed: Vec<EntityId>,
    /// Number of Active entities.
    active_count: usize,
    subscriptions: Vec<Subscription>,
    observers: Vec<Box<dyn EntityObserver>>,
    /// Completed commits.
    tick: u64,
}

impl EntityManager {
    /// Creates an empty manager with room for `capacity` slots before reallocating.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_indices: Vec::with_capacity(capacity),
            added: Vec::new(),
            changed: Vec::new(),
            removed: Vec::new(),
            active_count: 0,
            subscriptions: Vec::new(),
            observers: Vec::new(),
            tick: 0,
        }
    }

    /// Draws an id from the pool and stages it on the added queue.
    ///
    /// The entity is invisible to subscriptions until the next commit.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` slots would be needed.
    pub fn create(&mut self) -> EntityId {
        let index = if let Some(index) = self.free_indices.pop() {
            index
        } else {
            let index = u32::try_from(self.slots.len())
                .ok()
                .filter(|&i| i < u32::MAX)
                .unwrap_or_else(|| panic!("entity slot count cannot exceed u32::MAX"));
            self.slots.push(Entity::vacant(index));
            index
        };

        let id = self.slots[index as usize].stage();
        self.added.push(id);
        tracing::trace!(entity = %id, "entity staged");
        id
    }

    /// Stages an entity for removal at the next commit.
    ///
    /// # Returns
    ///
    /// `true` if the entity was staged, `false` if it was already staged for
    /// removal this tick or the id is stale.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        if slot.pending_removal {
            return false;
        }
        slot.pending_removal = true;
        self.removed.push(id);
        true
    }

    /// Commits every staged structural change and fires lifecycle events.
    ///
    /// Call exactly once per tick, before any system reads a subscription.
    pub fn update(&mut self, components: &mut ComponentManager) -> CommitStats {
        let mut stats = CommitStats::default();
        let commit = self.tick + 1;
        components.drain_dirty_into(&mut self.changed);

        // Added
        let mut added = mem::take(&mut self.added);
        for &id in &added {
            let slot = &mut self.slots[id.index() as usize];
            if slot.pending_removal {
                continue;
            }
            slot.composition = components.composition_bits(id.index());
            slot.state = EntityState::Active;
            slot.activated_at = commit;
            self.active_count += 1;
            stats.added += 1;

            for sub in &mut self.subscriptions {
                sub.on_added(id, &slot.composition);
            }
            for observer in &mut self.observers {
                observer.on_added(id, &slot.composition);
            }
        }
        added.clear();
        self.added = added;

        // Changed
        let mut changed = mem::take(&mut self.changed);
        for &index in &changed {
            let Some(slot) = self.slots.get_mut(index as usize) else {
                continue;
            };
            if slot.state != EntityState::Active || slot.activated_at == commit {
                continue;
            }
            let current = components.composition_bits(index);
            let previous = mem::replace(&mut slot.composition, current);
            stats.changed += 1;

            for sub in &mut self.subscriptions {
                sub.on_changed(slot.id, &previous, &slot.composition);
            }
            for observer in &mut self.observers {
                observer.on_changed(slot.id, &previous, &slot.composition);
            }
        }
        changed.clear();
        self.changed = changed;

        // Removed
        let mut removed = mem::take(&mut self.removed);
        for &id in &removed {
            let index = id.index();
            let slot = &mut self.slots[index as usize];
            if slot.state == EntityState::Active {
                for sub in &mut self.subscriptions {
                    sub.on_removed(id, &slot.composition, components);
                }
                for observer in &mut self.observers {
                    observer.on_removed(id, &slot.composition, components);
                }
                self.active_count -= 1;
            }

            components.remove_all(index);
            slot.release();
            self.free_indices.push(index);
            stats.removed += 1;
            tracing::trace!(entity = %id, "entity released");
        }
        removed.clear();
        self.removed = removed;

        self.tick = commit;
        if stats != CommitStats::default() {
            tracing::debug!(
                tick = self.tick,
                added = stats.added,
                changed = stats.changed,
                removed = stats.removed,
                "committed structural changes"
            );
        }
        stats
    }

    /// Gets the record for a live (staged or active) entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.id == id && slot.is_alive())
    }

    /// Returns true if `id` refers to a staged or active entity.
    ///
    /// Entities staged for removal stay alive until the commit.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Validates an id, returning its record.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the id is not alive.
    pub fn validate(&self, id: EntityId) -> EcsResult<&Entity> {
        self.get(id).ok_or(EcsError::StaleEntity(id))
    }

    /// Committed composition of a live entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the id is not alive.
    pub fn composition(&self, id: EntityId) -> EcsResult<&BitMask> {
        self.validate(id).map(Entity::composition)
    }

    /// Number of Active entities.
    #[inline]
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active_count
    }

    /// Number of staged and active entities.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.slots.len() - self.free_indices.len()
    }

    /// Number of creates and destroys waiting for the next commit.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.added.len() + self.removed.len()
    }

    /// Number of commits performed so far.
    #[inline]
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Iterates over every Active entity in index order.
    pub fn iter_alive(&self) -> impl Iterator<Item = &Entity> {
        self.slots
            .iter()
            .filter(|slot| slot.state == EntityState::Active)
    }

    /// Registers an observer for lifecycle events.
    pub fn add_observer(&mut self, observer: Box<dyn EntityObserver>) {
        self.observers.push(observer);
    }

    /// Creates a subscription for `aspect`. It populates itself on first read.
    pub fn subscribe(&mut self, aspect: Aspect) -> SubscriptionId {
        self.subscriptions.push(Subscription::new(aspect));
        SubscriptionId(self.subscriptions.len() - 1)
    }

    /// Gets a subscription without refreshing it.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownSubscription`] if the id was not issued here.
    pub fn subscription(&self, id: SubscriptionId) -> EcsResult<&Subscription> {
        self.subscriptions
            .get(id.0)
            .ok_or(EcsError::UnknownSubscription(id.0))
    }

    /// Returns the entities matching a subscription, rebuilding it if stale.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownSubscription`] if the id was not issued here.
    pub fn active_entities(&mut self, id: SubscriptionId) -> EcsResult<&[EntityId]> {
        let Self {
            slots,
            subscriptions,
            ..
        } = self;
        let subscription = subscriptions
            .get_mut(id.0)
            .ok_or(EcsError::UnknownSubscription(id.0))?;
        let live = slots
            .iter()
            .filter(|slot| slot.state == EntityState::Active)
            .map(|slot| (slot.id, &slot.composition));
        Ok(subscription.refresh(live))
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.id == id && slot.is_alive())
    }
}
