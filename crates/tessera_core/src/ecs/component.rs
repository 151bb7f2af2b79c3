//! # Component Types
//!
//! Components are plain data values with no behavior. Each concrete type is
//! assigned a manager-local slot the first time it is seen; the slot is its
//! bit in every composition bitmask.

use std::any::Any;
use std::fmt;

use super::manager::ComponentManager;
use crate::error::EcsResult;

/// Marker trait for ECS components.
///
/// The slot a type occupies is not part of the type: it is assigned by the
/// [`ComponentManager`] on first use, in registration order.
///
/// # Example
///
/// ```rust
/// use tessera_core::Component;
///
/// #[derive(Clone, Copy, Debug, Default, PartialEq)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {}
/// ```
pub trait Component: Any {}

/// Slot index of a component type within one component manager.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ComponentTypeId(u32);

impl ComponentTypeId {
    /// Wraps a raw slot index.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The bit position of this type in a composition bitmask.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentTypeId({})", self.0)
    }
}

/// Deferred registration of one component type against a manager.
pub type Registrar = fn(&mut ComponentManager) -> EcsResult<ComponentTypeId>;

/// A list of component types, written as a tuple: `(Position, Velocity)`.
///
/// Used by aspect builders to name types before a manager is available.
pub trait ComponentSet {
    /// Appends one registrar per type in the set.
    fn registrars(out: &mut Vec<Registrar>);
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn registrars(out: &mut Vec<Registrar>) {
                $( out.push(ComponentManager::register::<$name>); )+
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);
