//! # Component Manager
//!
//! Owns every component store and the type registry that maps each
//! component type to its slot in the composition bitmask.
//!
//! Slot assignment is append-only and capped at the configured capacity.
//! Every put/delete goes through the manager, which records the entity
//! index on a dirty queue; the entity manager drains that queue once per
//! tick and recomputes compositions only for the entities listed.
//!
//! The manager addresses entities by raw index and knows nothing about
//! generations, so adding and removing components is crate-private. Outside
//! the crate that goes through [`World::attach`](crate::World::attach) and
//! [`World::detach`](crate::World::detach), which reject stale ids.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use super::bitmask::BitMask;
use super::component::{Component, ComponentTypeId};
use super::storage::{AnyStore, ComponentStore};
use crate::error::{EcsError, EcsResult};

/// Registry and owner of all component stores.
pub struct ComponentManager {
    /// Maximum number of distinct component types.
    capacity: usize,
    /// Type registry: static type tag to slot.
    slots: HashMap<TypeId, ComponentTypeId>,
    /// Type names by slot, for diagnostics.
    type_names: Vec<&'static str>,
    /// One store per slot, in slot order.
    stores: Vec<Box<dyn AnyStore>>,
    /// Entity indices whose membership changed since the last drain.
    dirty: Vec<u32>,
    /// Dedupe set for `dirty`, keyed by entity index.
    dirty_flags: BitMask,
}

impl ComponentManager {
    /// Creates a manager with room for `capacity` component types.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Component capacity must be greater than zero");

        Self {
            capacity,
            slots: HashMap::with_capacity(capacity),
            type_names: Vec::with_capacity(capacity),
            stores: Vec::with_capacity(capacity),
            dirty: Vec::new(),
            dirty_flags: BitMask::new(),
        }
    }

    /// Maximum number of distinct component types.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of component types registered so far.
    #[inline]
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.stores.len()
    }

    /// Returns the slot for `T`, registering it and creating its store on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentTypeLimit`] if `T` is new and every slot
    /// is taken. This is a configuration error: there is no recovery short of
    /// building the world with a larger `component_capacity`.
    pub fn register<T: Component>(&mut self) -> EcsResult<ComponentTypeId> {
        if let Some(&id) = self.slots.get(&TypeId::of::<T>()) {
            return Ok(id);
        }

        if self.stores.len() >= self.capacity {
            tracing::warn!(
                limit = self.capacity,
                component = type_name::<T>(),
                "component type limit reached"
            );
            return Err(EcsError::ComponentTypeLimit {
                limit: self.capacity,
                type_name: type_name::<T>(),
            });
        }

        // Bounded by capacity, which fits in memory as a Vec length.
        #[allow(clippy::cast_possible_truncation)]
        let id = ComponentTypeId::new(self.stores.len() as u32);
        self.slots.insert(TypeId::of::<T>(), id);
        self.type_names.push(type_name::<T>());
        self.stores.push(Box::new(ComponentStore::<T>::new()));

        tracing::debug!(component = type_name::<T>(), slot = id.index(), "registered component type");
        Ok(id)
    }

    /// Returns the slot for `T` if it has been registered.
    #[inline]
    #[must_use]
    pub fn type_id<T: Component>(&self) -> Option<ComponentTypeId> {
        self.slots.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the type name registered at a slot.
    #[must_use]
    pub fn type_name(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.type_names.get(id.index()).copied()
    }

    /// Returns the store for `T`, or `None` if `T` was never registered.
    #[must_use]
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        let id = self.type_id::<T>()?;
        self.stores[id.index()]
            .as_any()
            .downcast_ref::<ComponentStore<T>>()
    }

    /// Returns the store for `T`, registering it on first use.
    ///
    /// The store can be used to mutate values in place. Adding or removing
    /// components goes through [`World::attach`](crate::World::attach) and
    /// [`World::detach`](crate::World::detach).
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentTypeLimit`] if registering `T` would exceed capacity.
    pub fn store_mut<T: Component>(&mut self) -> EcsResult<&mut ComponentStore<T>> {
        let id = self.register::<T>()?;
        Ok(self.typed_store_mut::<T>(id))
    }

    /// Stores a component for an entity index, overwriting any previous value,
    /// and queues the entity for a composition refresh.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentTypeLimit`] if `T` is new and every slot is taken.
    pub(crate) fn put<T: Component>(&mut self, index: u32, component: T) -> EcsResult<Option<T>> {
        let id = self.register::<T>()?;
        let previous = self.typed_store_mut::<T>(id).put(index as usize, component);
        self.mark_dirty(index);
        Ok(previous)
    }

    /// Removes a component from an entity index and queues the entity for a
    /// composition refresh. Deleting an absent component is a no-op.
    pub(crate) fn delete<T: Component>(&mut self, index: u32) -> Option<T> {
        let id = self.type_id::<T>()?;
        let removed = self.typed_store_mut::<T>(id).delete(index as usize);
        if removed.is_some() {
            self.mark_dirty(index);
        }
        removed
    }

    /// Gets the component of type `T` for an entity index.
    #[inline]
    #[must_use]
    pub fn get<T: Component>(&self, index: u32) -> Option<&T> {
        self.store::<T>()?.get(index as usize)
    }

    /// Gets the component of type `T` for an entity index, mutably.
    #[inline]
    pub fn get_mut<T: Component>(&mut self, index: u32) -> Option<&mut T> {
        let id = self.type_id::<T>()?;
        self.typed_store_mut::<T>(id).get_mut(index as usize)
    }

    /// Returns true if the entity index carries a component of type `T`.
    #[inline]
    #[must_use]
    pub fn has<T: Component>(&self, index: u32) -> bool {
        self.store::<T>().is_some_and(|store| store.has(index as usize))
    }

    /// Rebuilds the full composition bitmask for an entity index by asking
    /// every store whether it holds a value.
    ///
    /// The index is not checked against the entity pool: an index no store
    /// has seen yields an empty mask. Use
    /// [`World::composition`](crate::World::composition) for the committed,
    /// liveness-checked view.
    ///
    /// O(number of registered types); called only on structural change.
    #[must_use]
    pub fn composition_bits(&self, index: u32) -> BitMask {
        let mut bits = BitMask::with_capacity(self.capacity);
        for (slot, store) in self.stores.iter().enumerate() {
            if store.has(index as usize) {
                bits.set(slot);
            }
        }
        bits
    }

    /// Moves every queued dirty entity index into `out`, in queue order.
    pub(crate) fn drain_dirty_into(&mut self, out: &mut Vec<u32>) {
        for &index in &self.dirty {
            self.dirty_flags.clear(index as usize);
        }
        out.append(&mut self.dirty);
    }

    /// Drops every component of an entity index without queueing it.
    ///
    /// # Returns
    ///
    /// Number of components removed.
    pub(crate) fn remove_all(&mut self, index: u32) -> usize {
        let mut removed = 0;
        for store in &mut self.stores {
            if store.remove(index as usize) {
                removed += 1;
            }
        }
        removed
    }

    fn mark_dirty(&mut self, index: u32) {
        if !self.dirty_flags.contains(index as usize) {
            self.dirty_flags.set(index as usize);
            self.dirty.push(index);
        }
    }

    fn typed_store_mut<T: Component>(&mut self, id: ComponentTypeId) -> &mut ComponentStore<T> {
        match self.stores[id.index()]
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
        {
            Some(store) => store,
            None => unreachable!("slot {} holds a store of another type", id.index()),
        }
    }
}
