//! # ECS Error Types
//!
//! All errors that can occur in the entity-component runtime.
//!
//! Benign no-ops (deleting an absent component, destroying an entity that is
//! already staged for removal) are not errors and never show up here.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors that can occur in the entity-component runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// More distinct component types were registered than the composition
    /// bitmask can represent. Fatal: widen `component_capacity` to recover.
    #[error("component type limit reached: {limit} slots in use, cannot register {type_name}")]
    ComponentTypeLimit {
        /// The configured number of component slots.
        limit: usize,
        /// The type that could not be registered.
        type_name: &'static str,
    },

    /// The entity id does not refer to a live entity (destroyed, recycled, or never issued).
    #[error("stale entity handle: {0}")]
    StaleEntity(EntityId),

    /// The subscription id was not issued by this world.
    #[error("unknown subscription: {0}")]
    UnknownSubscription(usize),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
