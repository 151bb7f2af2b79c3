//! # ECS World
//!
//! The composition root: owns the component manager, the entity manager,
//! and the registered systems, and drives the per-tick pipeline.
//!
//! ```text
//! World::update(dt)
//!   1. EntityManager::update   commit added -> changed -> removed
//!   2. System::update          every UPDATE system, registration order
//! World::draw(dt)
//!   3. System::draw            every DRAW system, registration order
//! ```

use std::mem;

use super::aspect::AspectBuilder;
use super::bitmask::BitMask;
use super::component::{Component, ComponentTypeId};
use super::entity::EntityId;
use super::entity_manager::{CommitStats, EntityManager};
use super::manager::ComponentManager;
use super::subscription::{Subscription, SubscriptionId};
use super::system::System;
use crate::config::WorldConfig;
use crate::error::{EcsError, EcsResult};

/// The ECS World - container for all entities, components, and systems.
///
/// # Example
///
/// ```rust
/// use tessera_core::{Aspect, Component, World};
///
/// struct Position(f32, f32);
/// impl Component for Position {}
///
/// let mut world = World::new();
/// let movers = world.subscribe(Aspect::all::<(Position,)>()).unwrap();
///
/// let id = world.create_entity().attach(Position(0.0, 0.0)).unwrap().id();
/// assert!(world.active_entities(movers).unwrap().is_empty());
///
/// world.update(1.0 / 60.0);
/// assert_eq!(world.active_entities(movers).unwrap(), &[id]);
/// ```
pub struct World {
    config: WorldConfig,
    components: ComponentManager,
    entities: EntityManager,
    systems: Vec<Box<dyn System>>,
    /// Registered systems, stable while they are taken out to run.
    system_count: usize,
    /// Set while `update`/`draw` are calling into systems.
    running_systems: bool,
}

impl World {
    /// Creates an empty world with the default configuration and no systems.
    #[must_use]
    pub fn new() -> Self {
        let config = WorldConfig::default();
        Self {
            components: ComponentManager::new(config.component_capacity),
            entities: EntityManager::new(config.entity_capacity),
            systems: Vec::new(),
            system_count: 0,
            running_systems: false,
            config,
        }
    }

    /// Creates an empty world with the given configuration and no systems.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the configuration does not validate.
    pub fn with_config(config: WorldConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self {
            components: ComponentManager::new(config.component_capacity),
            entities: EntityManager::new(config.entity_capacity),
            systems: Vec::new(),
            system_count: 0,
            running_systems: false,
            config,
        })
    }

    /// Starts a [`WorldBuilder`].
    #[must_use]
    pub fn builder() -> WorldBuilder {
        WorldBuilder::new()
    }

    /// The configuration this world was built with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The component manager.
    #[inline]
    #[must_use]
    pub fn components(&self) -> &ComponentManager {
        &self.components
    }

    /// The component manager, mutably.
    #[inline]
    pub fn components_mut(&mut self) -> &mut ComponentManager {
        &mut self.components
    }

    /// The entity manager.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// The entity manager, mutably.
    #[inline]
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    /// Number of registered systems.
    #[inline]
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.system_count
    }

    /// Number of committed (Active) entities.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.active_count()
    }

    /// Number of commits performed so far.
    #[inline]
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.entities.tick()
    }

    /// Assigns `T` a component slot ahead of first use.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentTypeLimit`] if every slot is taken.
    pub fn register_component<T: Component>(&mut self) -> EcsResult<ComponentTypeId> {
        self.components.register::<T>()
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity, visible to subscriptions after the next update.
    pub fn create_entity(&mut self) -> EntityHandle<'_> {
        let id = self.entities.create();
        let leftovers = self.components.remove_all(id.index());
        if leftovers > 0 {
            tracing::warn!(entity = %id, leftovers, "recycled slot still held components");
        }
        EntityHandle { world: self, id }
    }

    /// Stages an entity for removal at the next update.
    ///
    /// # Returns
    ///
    /// `true` if staged, `false` if already staged this tick or stale.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        self.entities.destroy(id)
    }

    /// Returns a handle to a live entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the id is not alive.
    pub fn entity_mut(&mut self, id: EntityId) -> EcsResult<EntityHandle<'_>> {
        self.entities.validate(id)?;
        Ok(EntityHandle { world: self, id })
    }

    /// Returns true if `id` refers to a staged or active entity.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.is_alive(id)
    }

    /// Committed composition bitmask of a live entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the id is not alive.
    pub fn composition(&self, id: EntityId) -> EcsResult<&BitMask> {
        self.entities.composition(id)
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches a component, replacing any existing value of the same type.
    ///
    /// The store changes immediately; subscriptions see it after the next update.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] for a dead id and
    /// [`EcsError::ComponentTypeLimit`] if `T` is new and every slot is taken.
    pub fn attach<T: Component>(&mut self, id: EntityId, component: T) -> EcsResult<Option<T>> {
        self.check_mutation(id)?;
        self.components.put(id.index(), component)
    }

    /// Detaches a component. Detaching an absent component is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] for a dead id.
    pub fn detach<T: Component>(&mut self, id: EntityId) -> EcsResult<Option<T>> {
        self.check_mutation(id)?;
        Ok(self.components.delete::<T>(id.index()))
    }

    /// Gets a component of a live entity.
    #[must_use]
    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        if !self.entities.is_alive(id) {
            return None;
        }
        self.components.get::<T>(id.index())
    }

    /// Gets a component of a live entity, mutably.
    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        if !self.entities.is_alive(id) {
            return None;
        }
        self.components.get_mut::<T>(id.index())
    }

    /// Returns true if a live entity carries a component of type `T`.
    #[must_use]
    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        self.entities.is_alive(id) && self.components.has::<T>(id.index())
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Compiles an aspect against this world's components and subscribes to it.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentTypeLimit`] if the aspect names a new
    /// type and every slot is taken.
    pub fn subscribe(&mut self, aspect: AspectBuilder) -> EcsResult<SubscriptionId> {
        let aspect = aspect.build(&mut self.components)?;
        Ok(self.entities.subscribe(aspect))
    }

    /// Entities currently matching a subscription, rebuilt if stale.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownSubscription`] if the id was not issued here.
    pub fn active_entities(&mut self, subscription: SubscriptionId) -> EcsResult<&[EntityId]> {
        self.entities.active_entities(subscription)
    }

    /// Gets a subscription without refreshing it.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownSubscription`] if the id was not issued here.
    pub fn subscription(&self, subscription: SubscriptionId) -> EcsResult<&Subscription> {
        self.entities.subscription(subscription)
    }

    // =========================================================================
    // Tick pipeline
    // =========================================================================

    /// Commits staged structural changes without running any system.
    ///
    /// For hosts driving the world by hand. [`update`](Self::update) already
    /// commits once per tick; a call made from inside a running system is
    /// ignored and returns empty stats, so the commit stays at the tick
    /// boundary.
    pub fn commit(&mut self) -> CommitStats {
        if self.running_systems {
            tracing::warn!("commit requested from a running system, deferred to the next update");
            return CommitStats::default();
        }
        self.entities.update(&mut self.components)
    }

    /// Runs one tick: commit, then every update-capable system in order.
    pub fn update(&mut self, delta_time: f32) {
        self.commit();

        let mut systems = mem::take(&mut self.systems);
        self.running_systems = true;
        for system in &mut systems {
            if system.capabilities().updates() {
                system.update(self, delta_time);
            }
        }
        self.running_systems = false;
        self.systems = systems;
    }

    /// Runs every draw-capable system in order. Commits nothing.
    pub fn draw(&mut self, delta_time: f32) {
        let mut systems = mem::take(&mut self.systems);
        self.running_systems = true;
        for system in &mut systems {
            if system.capabilities().draws() {
                system.draw(self, delta_time);
            }
        }
        self.running_systems = false;
        self.systems = systems;
    }

    fn check_mutation(&self, id: EntityId) -> EcsResult<()> {
        if self.entities.is_alive(id) {
            Ok(())
        } else {
            tracing::warn!(entity = %id, "mutation through stale entity handle");
            Err(EcsError::StaleEntity(id))
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Stages systems and configuration, then builds a [`World`].
#[derive(Default)]
pub struct WorldBuilder {
    config: WorldConfig,
    systems: Vec<Box<dyn System>>,
}

impl WorldBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: WorldConfig) -> Self {
        self.config = config;
        self
    }

    /// Stages a system. Systems run in the order they are added.
    #[must_use]
    pub fn add_system<S: System + 'static>(mut self, system: S) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Stages an already boxed system.
    #[must_use]
    pub fn add_boxed_system(mut self, system: Box<dyn System>) -> Self {
        self.systems.push(system);
        self
    }

    /// Builds the world and initializes every staged system in order.
    ///
    /// The entity manager always commits before any system runs, so systems
    /// never observe a partially applied tick.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] for a bad configuration, or the
    /// first error a system's `initialize` returns (typically
    /// [`EcsError::ComponentTypeLimit`]).
    pub fn build(self) -> EcsResult<World> {
        let mut world = World::with_config(self.config)?;
        for mut system in self.systems {
            system.initialize(&mut world)?;
            world.systems.push(system);
            world.system_count = world.systems.len();
        }

        tracing::info!(
            systems = world.systems.len(),
            component_capacity = world.config.component_capacity,
            "world built"
        );
        Ok(world)
    }
}

/// A live entity id paired with the world it belongs to.
///
/// Component access is synchronous: `attach` then `get` sees the value
/// immediately, even though subscriptions only see it after the next update.
pub struct EntityHandle<'w> {
    world: &'w mut World,
    id: EntityId,
}

impl<'w> EntityHandle<'w> {
    /// The entity's id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Attaches a component, replacing any existing value of the same type.
    ///
    /// # Errors
    ///
    /// See [`World::attach`].
    pub fn attach<T: Component>(&mut self, component: T) -> EcsResult<&mut Self> {
        self.world.attach(self.id, component)?;
        Ok(self)
    }

    /// Detaches a component, returning it if it was present.
    ///
    /// # Errors
    ///
    /// See [`World::detach`].
    pub fn detach<T: Component>(&mut self) -> EcsResult<Option<T>> {
        self.world.detach::<T>(self.id)
    }

    /// Gets a component.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.world.get::<T>(self.id)
    }

    /// Gets a component, mutably.
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.world.get_mut::<T>(self.id)
    }

    /// Returns true if the entity carries a component of type `T`.
    #[must_use]
    pub fn has<T: Component>(&self) -> bool {
        self.world.has::<T>(self.id)
    }

    /// Returns true if the entity is still staged or active.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.world.is_alive(self.id)
    }

    /// Stages the entity for removal at the next update.
    ///
    /// # Returns
    ///
    /// `true` if staged, `false` if already staged this tick.
    pub fn destroy(self) -> bool {
        self.world.destroy_entity(self.id)
    }

    /// Gives back the world borrow.
    #[must_use]
    pub fn into_world(self) -> &'w mut World {
        self.world
    }
}
