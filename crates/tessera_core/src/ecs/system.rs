//! # Systems
//!
//! Systems hold the per-tick logic. The world calls them in registration
//! order, after the entity manager has committed the tick's structural
//! changes, so every subscription a system reads is already stable.

use super::aspect::AspectBuilder;
use super::entity::EntityId;
use super::subscription::SubscriptionId;
use super::world::World;
use crate::error::EcsResult;

/// Which per-frame callbacks a system wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemCapabilities {
    update: bool,
    draw: bool,
}

impl SystemCapabilities {
    /// Called from [`World::update`].
    pub const UPDATE: Self = Self { update: true, draw: false };
    /// Called from [`World::draw`].
    pub const DRAW: Self = Self { update: false, draw: true };
    /// Called from both.
    pub const BOTH: Self = Self { update: true, draw: true };

    /// Returns true if the system takes part in [`World::update`].
    #[inline]
    #[must_use]
    pub const fn updates(self) -> bool {
        self.update
    }

    /// Returns true if the system takes part in [`World::draw`].
    #[inline]
    #[must_use]
    pub const fn draws(self) -> bool {
        self.draw
    }
}

/// System trait for the ECS runtime.
///
/// # Examples
///
/// ```rust,ignore
/// struct Gravity {
///     bodies: Option<SubscriptionId>,
/// }
///
/// impl System for Gravity {
///     fn initialize(&mut self, world: &mut World) -> EcsResult<()> {
///         self.bodies = Some(world.subscribe(Aspect::all::<(Velocity,)>())?);
///         Ok(())
///     }
///
///     fn update(&mut self, world: &mut World, delta_time: f32) {
///         // ...
///     }
/// }
/// ```
pub trait System {
    /// Called once when the world is built, in registration order.
    ///
    /// This is where systems build their aspects and subscribe.
    ///
    /// # Errors
    ///
    /// Any error aborts world construction.
    fn initialize(&mut self, _world: &mut World) -> EcsResult<()> {
        Ok(())
    }

    /// Which of `update`/`draw` the world should call.
    fn capabilities(&self) -> SystemCapabilities {
        SystemCapabilities::UPDATE
    }

    /// Per-tick logic.
    fn update(&mut self, _world: &mut World, _delta_time: f32) {}

    /// Per-frame presentation logic.
    fn draw(&mut self, _world: &mut World, _delta_time: f32) {}

    /// Returns the name of this system for debugging purposes.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A system that runs the same logic on every entity matching an aspect.
///
/// Wrap it in [`Processing`] to register it with a world.
pub trait ProcessingSystem {
    /// The entities this system processes.
    fn aspect(&self) -> AspectBuilder;

    /// Called before the first entity each tick.
    fn begin(&mut self, _world: &mut World) {}

    /// Called once per matching entity each tick.
    fn process(&mut self, world: &mut World, entity: EntityId, delta_time: f32);

    /// Called after the last entity each tick.
    fn end(&mut self, _world: &mut World) {}
}

/// Adapter running a [`ProcessingSystem`] over its subscription.
pub struct Processing<S> {
    inner: S,
    subscription: Option<SubscriptionId>,
    /// Snapshot of the subscription, reused across ticks.
    batch: Vec<EntityId>,
}

impl<S: ProcessingSystem> Processing<S> {
    /// Wraps a processing system.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            subscription: None,
            batch: Vec::new(),
        }
    }

    /// The wrapped system.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// The subscription created at initialization.
    #[must_use]
    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }
}

impl<S: ProcessingSystem> System for Processing<S> {
    fn initialize(&mut self, world: &mut World) -> EcsResult<()> {
        self.subscription = Some(world.subscribe(self.inner.aspect())?);
        Ok(())
    }

    fn update(&mut self, world: &mut World, delta_time: f32) {
        let Some(subscription) = self.subscription else {
            return;
        };

        self.batch.clear();
        match world.active_entities(subscription) {
            Ok(ids) => self.batch.extend_from_slice(ids),
            Err(err) => {
                tracing::warn!(error = %err, "processing system lost its subscription");
                return;
            }
        }

        self.inner.begin(world);
        for &entity in &self.batch {
            self.inner.process(world, entity, delta_time);
        }
        self.inner.end(world);
    }

    fn name(&self) -> &str {
        std::any::type_name::<S>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        assert!(SystemCapabilities::UPDATE.updates());
        assert!(!SystemCapabilities::UPDATE.draws());
        assert!(SystemCapabilities::DRAW.draws());
        assert!(!SystemCapabilities::DRAW.updates());
        assert!(SystemCapabilities::BOTH.updates() && SystemCapabilities::BOTH.draws());
    }

    struct Idle;
    impl System for Idle {}

    #[test]
    fn test_default_system_is_update_only() {
        let system = Idle;
        assert_eq!(system.capabilities(), SystemCapabilities::UPDATE);
        assert!(system.name().ends_with("Idle"));
    }
}
