//! CLI error type and exit-code mapping.

use std::fmt::{self, Display, Formatter};

use drydock_app::AppError;
use drydock_config::ConfigError;
use drydock_identity::IdentityError;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    NotFound(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

/// Successful command outcomes that still map to distinct exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    Ok,
    Paused,
}

impl Status {
    pub(crate) const fn exit_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Paused => 4,
        }
    }
}

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::NotFound(_) => 5,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::NotFound(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let ConfigError::InvalidField {
            field,
            reason,
            value,
        } = &err;
        let message = match value {
            Some(value) => format!("invalid value '{value}' for {field}: {reason}"),
            None => format!("invalid value for {field}: {reason}"),
        };
        Self::Validation(message)
    }
}

impl From<AppError> for CliError {
    fn from(err: AppError) -> Self {
        match &err {
            AppError::IdentityNotConfigured => Self::validation(
                "identity resolution requires DRYDOCK_CONTAINER_NAME and DRYDOCK_CLUSTER_NAME",
            ),
            AppError::Identity {
                source: IdentityError::NotFound { container },
                ..
            } => Self::NotFound(format!(
                "container '{container}' is not listed by the local container agent"
            )),
            _ => {
                let context = describe(&err);
                Self::Failure(anyhow::Error::new(err).context(context))
            }
        }
    }
}

fn describe(err: &AppError) -> String {
    match err {
        AppError::Volume { operation, source } => {
            format!("{operation} failed for {}", source.path().display())
        }
        AppError::Identity { operation, source } => match source {
            IdentityError::LocalAgent { .. } => {
                format!("{operation}: local container agent unavailable")
            }
            IdentityError::MalformedTaskArn { arn } => {
                format!("{operation}: agent reported malformed task ARN '{arn}'")
            }
            IdentityError::NotFound { container } => {
                format!("{operation}: container '{container}' not found")
            }
            IdentityError::ClusterQuery {
                cluster, task_arn, ..
            } => format!("{operation}: cluster '{cluster}' could not describe task {task_arn}"),
        },
        AppError::Telemetry { operation, .. }
        | AppError::IdentityBackend { operation, .. } => format!("{operation} failed"),
        AppError::IdentityNotConfigured => "identity resolution is not configured".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drydock_fsops::VolumeError;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn exit_codes_match_variants() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow::anyhow!("boom")).exit_code(), 3);
        assert_eq!(CliError::NotFound("gone".to_string()).exit_code(), 5);
        assert_eq!(Status::Ok.exit_code(), 0);
        assert_eq!(Status::Paused.exit_code(), 4);
    }

    #[test]
    fn config_error_becomes_validation_message() {
        let err = CliError::from(ConfigError::InvalidField {
            field: "DRYDOCK_MAX_DISK_BYTES",
            reason: "must_be_positive",
            value: Some("0".to_string()),
        });
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.display_message(),
            "invalid value '0' for DRYDOCK_MAX_DISK_BYTES: must_be_positive"
        );
    }

    #[test]
    fn volume_failure_message_names_path() {
        let err = CliError::from(AppError::Volume {
            operation: "volumes.clean",
            source: VolumeError::Cleanup {
                path: PathBuf::from("/scratch/a"),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
        });
        assert_eq!(err.exit_code(), 3);
        let message = err.display_message();
        assert!(message.starts_with("volumes.clean failed for /scratch/a: volume operation failed"));
    }

    #[test]
    fn identity_not_found_maps_to_dedicated_exit_code() {
        let err = CliError::from(AppError::Identity {
            operation: "identity.resolve",
            source: IdentityError::NotFound {
                container: "watcher".to_string(),
            },
        });
        assert_eq!(err.exit_code(), 5);
        assert!(err.display_message().contains("watcher"));

        assert_eq!(CliError::from(AppError::IdentityNotConfigured).exit_code(), 2);
    }
}
