//! # Entity Component System
//!
//! An in-memory relational index: components keyed by entity id, queries
//! expressed as bitmask predicates, and deferred structural commits.
//!
//! ## Design Philosophy
//!
//! - Component stores are dense arrays indexed by entity index
//! - Entity IDs are indices with generation counters
//! - Structural changes commit once per tick, before any system runs
//! - Subscriptions are rebuilt lazily, only when a commit invalidated them

mod aspect;
mod bitmask;
mod component;
mod entity;
mod entity_manager;
mod manager;
mod storage;
mod subscription;
mod system;
mod world;

pub use aspect::{Aspect, AspectBuilder};
pub use bitmask::BitMask;
pub use component::{Component, ComponentSet, ComponentTypeId, Registrar};
pub use entity::{Entity, EntityId, EntityState};
pub use entity_manager::{CommitStats, EntityManager, EntityObserver};
pub use manager::ComponentManager;
pub use storage::ComponentStore;
pub use subscription::{Subscription, SubscriptionId};
pub use system::{Processing, ProcessingSystem, System, SystemCapabilities};
pub use world::{EntityHandle, World, WorldBuilder};
