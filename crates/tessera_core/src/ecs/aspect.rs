//! # Aspects
//!
//! An aspect is a predicate over a composition bitmask:
//!
//! ```text
//! interested(bits) = (bits & all) == all
//!                  && (bits & exclude) == 0
//!                  && (one == 0 || (bits & one) != 0)
//! ```
//!
//! Empty sets act as wildcards. Aspects are declared with an
//! [`AspectBuilder`] and compiled once against a [`ComponentManager`],
//! which resolves each type to its slot (registering unseen types).

use super::bitmask::BitMask;
use super::component::{ComponentSet, Registrar};
use super::manager::ComponentManager;
use crate::error::EcsResult;

/// Compiled, immutable aspect: three bitmasks resolved against one manager.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Aspect {
    all: BitMask,
    one: BitMask,
    exclude: BitMask,
}

impl Aspect {
    /// Starts a builder requiring every type in `S`.
    #[must_use]
    pub fn all<S: ComponentSet>() -> AspectBuilder {
        AspectBuilder::new().all::<S>()
    }

    /// Starts a builder requiring at least one type in `S`.
    #[must_use]
    pub fn one<S: ComponentSet>() -> AspectBuilder {
        AspectBuilder::new().one::<S>()
    }

    /// Starts a builder rejecting every type in `S`.
    #[must_use]
    pub fn exclude<S: ComponentSet>() -> AspectBuilder {
        AspectBuilder::new().exclude::<S>()
    }

    /// Returns true if an entity with composition `bits` matches this aspect.
    ///
    /// Pure function of its inputs; safe to re-evaluate at any time.
    #[inline]
    #[must_use]
    pub fn is_interested(&self, bits: &BitMask) -> bool {
        if !bits.contains_all(&self.all) {
            return false;
        }
        if bits.intersects(&self.exclude) {
            return false;
        }
        self.one.is_empty() || bits.intersects(&self.one)
    }

    /// Types that must all be present.
    #[inline]
    #[must_use]
    pub fn all_set(&self) -> &BitMask {
        &self.all
    }

    /// Types of which at least one must be present (empty: no constraint).
    #[inline]
    #[must_use]
    pub fn one_set(&self) -> &BitMask {
        &self.one
    }

    /// Types that must all be absent.
    #[inline]
    #[must_use]
    pub fn exclude_set(&self) -> &BitMask {
        &self.exclude
    }
}

/// Accumulates component types for an [`Aspect`] before a manager exists.
///
/// # Example
///
/// ```rust,ignore
/// let aspect = Aspect::all::<(Position, Velocity)>()
///     .exclude::<(Frozen,)>()
///     .build(world.components_mut())?;
/// ```
#[derive(Clone, Default)]
pub struct AspectBuilder {
    all: Vec<Registrar>,
    one: Vec<Registrar>,
    exclude: Vec<Registrar>,
}

impl AspectBuilder {
    /// Creates an empty builder, which matches every entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires every type in `S`.
    #[must_use]
    pub fn all<S: ComponentSet>(mut self) -> Self {
        S::registrars(&mut self.all);
        self
    }

    /// Requires at least one type in `S` (accumulates with earlier `one` calls).
    #[must_use]
    pub fn one<S: ComponentSet>(mut self) -> Self {
        S::registrars(&mut self.one);
        self
    }

    /// Rejects every type in `S`.
    #[must_use]
    pub fn exclude<S: ComponentSet>(mut self) -> Self {
        S::registrars(&mut self.exclude);
        self
    }

    /// Resolves every named type to its slot and produces the aspect.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentTypeLimit`](crate::EcsError::ComponentTypeLimit)
    /// if a type named here is new to the manager and every slot is taken.
    pub fn build(&self, manager: &mut ComponentManager) -> EcsResult<Aspect> {
        Ok(Aspect {
            all: resolve(&self.all, manager)?,
            one: resolve(&self.one, manager)?,
            exclude: resolve(&self.exclude, manager)?,
        })
    }
}

fn resolve(registrars: &[Registrar], manager: &mut ComponentManager) -> EcsResult<BitMask> {
    let mut bits = BitMask::with_capacity(manager.capacity());
    for register in registrars {
        bits.set(register(manager)?.index());
    }
    Ok(bits)
}
