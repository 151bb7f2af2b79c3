//! # Subscriptions
//!
//! A subscription caches the ids of entities that match one aspect.
//!
//! - Added entities that already match are appended directly.
//! - Removals and changes that can alter membership mark the cache stale.
//! - The next read of a stale cache re-tests every active entity.
//!
//! Events only arrive while the entity manager commits a tick, so every read
//! taken after a commit reflects exactly that tick's composition state.

use std::fmt;

use super::aspect::Aspect;
use super::bitmask::BitMask;
use super::entity::EntityId;
use super::entity_manager::EntityObserver;
use super::manager::ComponentManager;

/// Handle to a subscription owned by a world's entity manager.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) usize);

impl SubscriptionId {
    /// Position of the subscription in registration order.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

/// Cached set of entity ids matching an aspect.
#[derive(Debug)]
pub struct Subscription {
    aspect: Aspect,
    active: Vec<EntityId>,
    stale: bool,
    rebuilds: u64,
}

impl Subscription {
    /// Creates a subscription that will populate itself on first read.
    #[must_use]
    pub fn new(aspect: Aspect) -> Self {
        Self {
            aspect,
            active: Vec::new(),
            stale: true,
            rebuilds: 0,
        }
    }

    /// The aspect this subscription tracks.
    #[inline]
    #[must_use]
    pub fn aspect(&self) -> &Aspect {
        &self.aspect
    }

    /// Returns true if the next read will rebuild the cache.
    #[inline]
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of full rebuilds performed so far.
    #[inline]
    #[must_use]
    pub const fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Returns the matching ids, rebuilding from `live` first if stale.
    ///
    /// `live` must yield every active entity with its committed composition.
    pub fn refresh<'a, I>(&mut self, live: I) -> &[EntityId]
    where
        I: IntoIterator<Item = (EntityId, &'a BitMask)>,
    {
        if self.stale {
            self.active.clear();
            self.active.extend(
                live.into_iter()
                    .filter(|(_, bits)| self.aspect.is_interested(bits))
                    .map(|(id, _)| id),
            );
            self.stale = false;
            self.rebuilds += 1;
        }
        &self.active
    }

    /// The cached ids without rebuilding. Meaningful only when not stale.
    #[inline]
    #[must_use]
    pub fn cached(&self) -> &[EntityId] {
        &self.active
    }
}

impl EntityObserver for Subscription {
    fn on_added(&mut self, entity: EntityId, composition: &BitMask) {
        if !self.stale && self.aspect.is_interested(composition) {
            self.active.push(entity);
        }
    }

    fn on_changed(&mut self, _entity: EntityId, previous: &BitMask, current: &BitMask) {
        if self.aspect.is_interested(previous) != self.aspect.is_interested(current) {
            self.stale = true;
        }
    }

    fn on_removed(&mut self, _entity: EntityId, composition: &BitMask, _components: &ComponentManager) {
        if self.aspect.is_interested(composition) {
            self.stale = true;
        }
    }
}
