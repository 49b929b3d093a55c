//! # Manager Configuration
//!
//! Sizing policy for the entity table, loaded once at startup.
//!
//! ```toml
//! initial_capacity = 1024
//! grow_amount = 512
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, EcsResult};

/// Entity capacity allocated when a manager is created.
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

/// Slots added each time the entity table fills up.
pub const DEFAULT_GROW_AMOUNT: usize = 256;

/// Sizing policy for a [`Manager`](crate::Manager).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    /// Entity slots (and component slots per type) allocated up front.
    pub initial_capacity: usize,
    /// Slots added when `add_entity` finds the table full. Must be non-zero.
    pub grow_amount: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            grow_amount: DEFAULT_GROW_AMOUNT,
        }
    }
}

impl ManagerConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] if the text is not valid TOML, has unknown
    /// keys, or fails [`ManagerConfig::validate`].
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// [`EcsError::ConfigRead`] if the file cannot be read, otherwise as
    /// [`ManagerConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EcsError::ConfigRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks that the growth policy is strictly monotonic.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] if `grow_amount` is zero.
    pub fn validate(&self) -> EcsResult<()> {
        if self.grow_amount == 0 {
            tracing::warn!("Rejected manager config: grow_amount must be non-zero");
            return Err(EcsError::InvalidConfig(
                "grow_amount must be greater than zero".to_owned(),
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
        let config = ManagerConfig::default();
        assert_eq!(config.initial_capacity, 256);
        assert_eq!(config.grow_amount, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full() {
        let config = ManagerConfig::from_toml_str("initial_capacity = 8\ngrow_amount = 4\n").unwrap();
        assert_eq!(config.initial_capacity, 8);
        assert_eq!(config.grow_amount, 4);
    }

    #[test]
    fn test_parse_partial_uses_defaults() {
        let config = ManagerConfig::from_toml_str("grow_amount = 32").unwrap();
        assert_eq!(config.initial_capacity, DEFAULT_INITIAL_CAPACITY);
        assert_eq!(config.grow_amount, 32);

        let config = ManagerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ManagerConfig::default());
    }

    #[test]
    fn test_zero_growth_rejected() {
        let err = ManagerConfig::from_toml_str("grow_amount = 0").unwrap_err();
        assert!(matches!(err, EcsError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ManagerConfig::from_toml_str("growth = 3").unwrap_err();
        assert!(matches!(err, EcsError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_initial_capacity_allowed() {
        let config = ManagerConfig::from_toml_str("initial_capacity = 0").unwrap();
        assert_eq!(config.initial_capacity, 0);
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("ec_core_missing_config_7f3a.toml");
        let err = ManagerConfig::from_toml_file(&path).unwrap_err();
        assert!(matches!(err, EcsError::ConfigRead { .. }));
    }

    #[test]
    fn test_read_file() {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("ec_core_config_{id}.toml"));
        std::fs::write(&path, "initial_capacity = 16\n").unwrap();

        let config = ManagerConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.initial_capacity, 16);
        assert_eq!(config.grow_amount, DEFAULT_GROW_AMOUNT);

        std::fs::remove_file(&path).ok();
    }
}
