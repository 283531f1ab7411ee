//! Group-size policy and its configuration.
//!
//! Load the allowed-size set and default size from TOML to change the
//! grouping rules without code changes.
//!
//! # Examples
//!
//! ```
//! use groupmeet_core::GroupSizePolicy;
//!
//! let policy = GroupSizePolicy::from_toml_str(r#"
//!     allowed_sizes = [0, 3, 4]
//!     default_size = 4
//! "#).unwrap();
//! assert_eq!(policy.max_size(), 4);
//! ```
//!
//! Use the built-in policy when no file is present:
//!
//! ```
//! use groupmeet_core::GroupSizePolicy;
//!
//! let policy = GroupSizePolicy::load("groupmeet.toml").unwrap_or_default();
//! assert_eq!(policy.default_size, 5);
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Policy configuration error
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid group size policy: {0}")]
    Invalid(String),
}

/// The finite allowed group-size set plus the size used for students
/// with no declared partners.
///
/// Size 0 must always be allowed: an unused unit is a valid outcome.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSizePolicy {
    #[serde(default = "default_allowed_sizes")]
    pub allowed_sizes: BTreeSet<u32>,
    #[serde(default = "default_default_size")]
    pub default_size: u32,
}

fn default_allowed_sizes() -> BTreeSet<u32> {
    BTreeSet::from([0, 4, 5, 6])
}

fn default_default_size() -> u32 {
    5
}

impl Default for GroupSizePolicy {
    fn default() -> Self {
        Self {
            allowed_sizes: default_allowed_sizes(),
            default_size: default_default_size(),
        }
    }
}

impl GroupSizePolicy {
    /// Loads and validates a policy from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, is not valid TOML, or
    /// fails [`GroupSizePolicy::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a policy from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, PolicyError> {
        let policy: Self = toml::from_str(toml_str)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !self.allowed_sizes.contains(&0) {
            return Err(PolicyError::Invalid(
                "allowed_sizes must include 0 (an unused unit is always valid)".to_string(),
            ));
        }
        if self.max_size() == 0 {
            return Err(PolicyError::Invalid(
                "allowed_sizes must include at least one non-zero size".to_string(),
            ));
        }
        if self.default_size == 0 || !self.allowed_sizes.contains(&self.default_size) {
            return Err(PolicyError::Invalid(format!(
                "default_size {} must be a non-zero member of allowed_sizes",
                self.default_size
            )));
        }
        Ok(())
    }

    /// The largest allowed size, which is also the width of the
    /// member columns in the output table.
    pub fn max_size(&self) -> u32 {
        self.allowed_sizes.iter().next_back().copied().unwrap_or(0)
    }

    /// Allowed sizes in ascending order.
    pub fn sizes(&self) -> impl Iterator<Item = u32> + '_ {
        self.allowed_sizes.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = GroupSizePolicy::default();
        assert_eq!(policy.allowed_sizes, BTreeSet::from([0, 4, 5, 6]));
        assert_eq!(policy.default_size, 5);
        assert_eq!(policy.max_size(), 6);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_toml_parsing() {
        let policy = GroupSizePolicy::from_toml_str(
            r#"
            allowed_sizes = [0, 3]
            default_size = 3
            "#,
        )
        .unwrap();
        assert_eq!(policy.max_size(), 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let policy = GroupSizePolicy::from_toml_str("default_size = 4").unwrap();
        assert_eq!(policy.allowed_sizes, BTreeSet::from([0, 4, 5, 6]));
        assert_eq!(policy.default_size, 4);
    }

    #[test]
    fn test_zero_must_be_allowed() {
        let err = GroupSizePolicy::from_toml_str(
            "allowed_sizes = [4, 5]\ndefault_size = 5",
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::Invalid(_)));
    }

    #[test]
    fn test_default_size_must_be_allowed() {
        let err = GroupSizePolicy::from_toml_str(
            "allowed_sizes = [0, 4]\ndefault_size = 5",
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::Invalid(_)));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(GroupSizePolicy::load("/definitely/not/here.toml").is_err());
    }
}
