//! Error types for configuration loading.

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Environment variable that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str, value: &str) -> Self {
        Self::InvalidField {
            field,
            reason,
            value: Some(value.to_string()),
        }
    }

    /// Name of the field that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidField { field, .. } => field,
        }
    }

    /// Machine-readable reason for the failure.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidField { reason, .. } => reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_helper_captures_context() {
        let err = ConfigError::invalid("DRYDOCK_MAX_DISK_BYTES", "not_a_number", "ten");
        assert_eq!(err.field(), "DRYDOCK_MAX_DISK_BYTES");
        assert_eq!(err.reason(), "not_a_number");
        assert!(matches!(
            err,
            ConfigError::InvalidField { value: Some(ref value), .. } if value == "ten"
        ));
        assert_eq!(err.to_string(), "invalid configuration field");
    }
}
