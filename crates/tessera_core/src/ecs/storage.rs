//! # Component Store
//!
//! Dense, index-addressed storage for a single component type.
//!
//! The store uses a dense array strategy:
//! - Slot `i` belongs to the entity with index `i`
//! - An empty slot means the entity does not carry this component
//! - Access is O(1) via entity index

use std::any::Any;

use super::component::Component;

/// Storage for every instance of one component type, keyed by entity index.
///
/// Stores never validate generations; the world checks the handle before
/// reaching the store. Membership changes are reported back to the
/// [`ComponentManager`](super::ComponentManager), which queues the entity
/// for a composition refresh.
///
/// # Example
///
/// ```rust,ignore
/// let store = world.components().store::<Position>().unwrap();
/// for (index, position) in store.iter() {
///     println!("{index}: {position:?}");
/// }
/// ```
pub struct ComponentStore<T: Component> {
    /// The dense array of optional components.
    slots: Vec<Option<T>>,
    /// Number of occupied slots.
    len: usize,
}

impl<T: Component> ComponentStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
        }
    }

    /// Number of entities carrying this component.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no entity carries this component.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the entity at `index` carries this component.
    #[inline]
    #[must_use]
    pub fn has(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Gets the component for an entity index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.as_ref()
    }

    /// Gets the component for an entity index, mutably.
    ///
    /// Mutating a value in place is not a structural change and does not
    /// touch the composition bitmask.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.as_mut()
    }

    /// Stores a component for an entity index, overwriting any previous value.
    ///
    /// # Returns
    ///
    /// The value that was replaced, if any.
    pub(crate) fn put(&mut self, index: usize, component: T) -> Option<T> {
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        let previous = self.slots[index].replace(component);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Removes the component for an entity index.
    ///
    /// Deleting an absent component is a no-op.
    ///
    /// # Returns
    ///
    /// The removed value, if there was one.
    pub(crate) fn delete(&mut self, index: usize) -> Option<T> {
        let removed = self.slots.get_mut(index)?.take();
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Iterates over occupied slots with their entity indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|c| (index, c)))
    }

    /// Iterates mutably over occupied slots with their entity indices.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|c| (index, c)))
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a store, used by the manager for composition
/// queries and teardown without knowing `T`.
pub(crate) trait AnyStore {
    fn has(&self, index: usize) -> bool;

    /// Drops the component at `index`; returns true if one was present.
    fn remove(&mut self, index: usize) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyStore for ComponentStore<T> {
    #[inline]
    fn has(&self, index: usize) -> bool {
        ComponentStore::has(self, index)
    }

    fn remove(&mut self, index: usize) -> bool {
        self.delete(index).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
