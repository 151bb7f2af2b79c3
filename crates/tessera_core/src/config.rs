//! # World Configuration
//!
//! Sizing parameters for a world, loadable from TOML at startup.
//!
//! ```toml
//! component_capacity = 64
//! entity_capacity = 4096
//! ```

use serde::Deserialize;

use crate::error::{EcsError, EcsResult};

/// Default number of distinct component types a world can hold.
pub const DEFAULT_COMPONENT_CAPACITY: usize = 32;

/// Default number of entity slots reserved up front.
pub const DEFAULT_ENTITY_CAPACITY: usize = 1024;

/// Configuration for a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Width of the composition bitmask, i.e. the maximum number of
    /// distinct component types. Registering one more is a fatal error.
    pub component_capacity: usize,
    /// Number of entity slots to reserve at creation. The pool still grows
    /// past this; it only avoids early reallocations.
    pub entity_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            component_capacity: DEFAULT_COMPONENT_CAPACITY,
            entity_capacity: DEFAULT_ENTITY_CAPACITY,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a configuration from a TOML document.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the document does not parse or
    /// fails [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|err| EcsError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a usable world.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `component_capacity` is zero.
    pub fn validate(&self) -> EcsResult<()> {
        if self.component_capacity == 0 {
            return Err(EcsError::InvalidConfig(
                "component_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorldConfig::default();
        assert_eq!(config.component_capacity, 32);
        assert_eq!(config.entity_capacity, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = WorldConfig::from_toml_str("component_capacity = 64").unwrap();
        assert_eq!(config.component_capacity, 64);
        assert_eq!(config.entity_capacity, DEFAULT_ENTITY_CAPACITY);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = WorldConfig::from_toml_str("component_capacity = 0").unwrap_err();
        assert!(matches!(err, EcsError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(WorldConfig::from_toml_str("max_types = 8").is_err());
    }
}
