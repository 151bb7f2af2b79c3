//! # TESSERA Core
//!
//! Entity-component runtime for single-threaded, tick-driven games:
//! - Entity identity with generation-checked id recycling
//! - Per-type component stores behind a type-slot registry
//! - Aspect predicates (all / one / exclude) over composition bitmasks
//! - Lazily rebuilt subscriptions, stable for the whole tick
//!
//! ## Tick Rules
//!
//! 1. **Stores are synchronous** - `attach` then `get` sees the value at once
//! 2. **Structure is deferred** - creates, destroys and composition changes
//!    reach subscriptions only when the world commits
//! 3. **One commit per tick** - the commit runs before any system's update
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{Aspect, World};
//!
//! let mut world = World::builder().add_system(Movement::default()).build()?;
//! world.create_entity().attach(Position::default())?.attach(Velocity::default())?;
//! world.update(1.0 / 60.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::WorldConfig;
pub use ecs::{
    Aspect, AspectBuilder, BitMask, CommitStats, Component, ComponentManager, ComponentSet,
    ComponentStore, ComponentTypeId, Entity, EntityHandle, EntityId, EntityManager,
    EntityObserver, EntityState, Processing, ProcessingSystem, Subscription, SubscriptionId,
    System, SystemCapabilities, World, WorldBuilder,
};
pub use error::{EcsError, EcsResult};
