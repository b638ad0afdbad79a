//! Engine configuration.
//!
//! The defaults carry the built-in policy; a JSON file can override them for
//! deployments that need a different trial shape.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tollgate_types::{Capability, SubscriptionStatus};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Policy knobs for permission resolution.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Capabilities withheld while the subscription is trialing.
    pub trial_restricted: Vec<Capability>,
    /// Subscription statuses under which the organization is usable.
    pub usable_statuses: Vec<SubscriptionStatus>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trial_restricted: vec![Capability::OrgBilling],
            usable_statuses: vec![SubscriptionStatus::Active, SubscriptionStatus::Trialing],
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn is_usable(&self, status: SubscriptionStatus) -> bool {
        self.usable_statuses.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = EngineConfig::default();
        assert_eq!(config.trial_restricted, vec![Capability::OrgBilling]);
        assert!(config.is_usable(SubscriptionStatus::Active));
        assert!(config.is_usable(SubscriptionStatus::Trialing));
        assert!(!config.is_usable(SubscriptionStatus::PastDue));
        assert!(!config.is_usable(SubscriptionStatus::Canceled));
        assert!(!config.is_usable(SubscriptionStatus::Incomplete));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "tollgate-config-{}.json",
            uuid::Uuid::new_v4()
        ));

        let config = EngineConfig {
            trial_restricted: vec![Capability::OrgBilling, Capability::ApiAccess],
            usable_statuses: vec![SubscriptionStatus::Active],
        };
        config.save_to(&path).unwrap();

        let loaded = EngineConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = EngineConfig::load_from("/nonexistent/tollgate.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_malformed_json_is_parse_error() {
        let path = std::env::temp_dir().join(format!(
            "tollgate-config-bad-{}.json",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, "{not json").unwrap();

        let result = EngineConfig::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unknown_capability_in_file_fails_closed() {
        let path = std::env::temp_dir().join(format!(
            "tollgate-config-unknown-{}.json",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(
            &path,
            r#"{"trial_restricted": ["time_travel"], "usable_statuses": ["active"]}"#,
        )
        .unwrap();

        let result = EngineConfig::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_file(&path).ok();
    }
}
