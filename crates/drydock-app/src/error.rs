//! # Design
//!
//! - Centralize worker-level errors for startup and per-run maintenance.
//! - Keep error messages constant while carrying an operation label for debugging.
//! - Preserve source errors without re-logging at call sites.

use drydock_fsops::VolumeError;
use drydock_identity::{AgentError, IdentityError};
use thiserror::Error;

/// Result alias for worker operations.
pub type AppResult<T> = Result<T, AppError>;

/// Worker-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Telemetry setup failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: drydock_telemetry::TelemetryError,
    },
    /// A volume operation failed.
    #[error("volume operation failed")]
    Volume {
        /// Operation identifier.
        operation: &'static str,
        /// Source volume error.
        source: VolumeError,
    },
    /// The container agent client could not be constructed.
    #[error("identity backend setup failed")]
    IdentityBackend {
        /// Operation identifier.
        operation: &'static str,
        /// Source agent error.
        source: AgentError,
    },
    /// Identity resolution failed.
    #[error("identity resolution failed")]
    Identity {
        /// Operation identifier.
        operation: &'static str,
        /// Source identity error.
        source: IdentityError,
    },
    /// Identity resolution was requested without a container or cluster name.
    #[error("identity resolution is not configured")]
    IdentityNotConfigured,
}

impl AppError {
    pub(crate) const fn telemetry(
        operation: &'static str,
        source: drydock_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn volume(operation: &'static str, source: VolumeError) -> Self {
        Self::Volume { operation, source }
    }

    pub(crate) const fn identity_backend(operation: &'static str, source: AgentError) -> Self {
        Self::IdentityBackend { operation, source }
    }

    pub(crate) const fn identity(operation: &'static str, source: IdentityError) -> Self {
        Self::Identity { operation, source }
    }
}
