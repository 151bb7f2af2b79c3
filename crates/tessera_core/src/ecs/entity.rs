//! # Entity Identity
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into component stores
//! - A generation counter, bumped each time the index is recycled
//!
//! The per-slot [`Entity`] record carries the cached composition bitmask and
//! the lifecycle state the entity manager drives at tick boundaries.

use std::fmt;

use super::bitmask::BitMask;
use super::component::ComponentTypeId;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into component stores
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity ID from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the raw packed representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// Where an entity slot sits in its lifecycle.
///
/// ```text
/// Free -> Staged -> Active -> Free
/// ```
///
/// Transitions happen only when the entity manager commits a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityState {
    /// Slot is in the id pool.
    Free,
    /// Created this tick, not yet visible to subscriptions.
    Staged,
    /// Committed and visible to subscriptions.
    Active,
}

/// Per-slot entity record owned by the entity manager.
#[derive(Clone, Debug)]
pub struct Entity {
    /// Identifier currently issued for this slot.
    pub(crate) id: EntityId,
    /// Composition as of the last committed tick.
    pub(crate) composition: BitMask,
    pub(crate) state: EntityState,
    /// Queued on the removed list this tick.
    pub(crate) pending_removal: bool,
    /// Commit in which the slot last became Active.
    pub(crate) activated_at: u64,
}

impl Entity {
    /// Creates a free slot at `index`, generation zero.
    #[must_use]
    pub(crate) fn vacant(index: u32) -> Self {
        Self {
            id: EntityId::new(index, 0),
            composition: BitMask::new(),
            state: EntityState::Free,
            pending_removal: false,
            activated_at: 0,
        }
    }

    /// The identifier currently issued for this slot.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// The lifecycle state of this slot.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> EntityState {
        self.state
    }

    /// Composition bitmask as of the last committed tick.
    ///
    /// Attach/detach calls made since then show up only after the next commit.
    #[inline]
    #[must_use]
    pub fn composition(&self) -> &BitMask {
        &self.composition
    }

    /// Checks the committed composition for a component type.
    #[inline]
    #[must_use]
    pub fn has_component(&self, component: ComponentTypeId) -> bool {
        self.composition.contains(component.index())
    }

    /// Returns true if a destroy has been requested and not yet committed.
    #[inline]
    #[must_use]
    pub const fn is_pending_removal(&self) -> bool {
        self.pending_removal
    }

    /// Returns true if the slot holds a logically alive entity (staged or active).
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state != EntityState::Free
    }

    /// Issues a fresh id for this slot and stages it.
    pub(crate) fn stage(&mut self) -> EntityId {
        self.composition.reset();
        self.state = EntityState::Staged;
        self.pending_removal = false;
        self.id
    }

    /// Returns the slot to the pool, bumping the generation so old ids go stale.
    pub(crate) fn release(&mut self) {
        let generation = self.id.generation().wrapping_add(1);
        self.id = EntityId::new(self.id.index(), generation);
        self.composition.reset();
        self.state = EntityState::Free;
        self.pending_removal = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_roundtrip() {
        let id = EntityId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
        assert_eq!(id.to_string(), "12345v67890");
    }

    #[test]
    fn test_release_bumps_generation() {
        let mut slot = Entity::vacant(7);
        let first = slot.stage();
        assert!(slot.is_alive());

        slot.release();
        assert_eq!(slot.state(), EntityState::Free);
        let second = slot.stage();

        assert_eq!(first.index(), second.index());
        assert_ne!(first, second);
        assert_eq!(second.generation(), first.generation() + 1);
    }

    #[test]
    fn test_release_clears_composition() {
        let mut slot = Entity::vacant(0);
        slot.stage();
        slot.composition.set(3);
        slot.state = EntityState::Active;
        assert!(slot.has_component(ComponentTypeId::new(3)));

        slot.release();
        assert!(slot.composition().is_empty());
    }
}
