//! Errors raised while wiring up logging and counters.

use thiserror::Error;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Telemetry setup failures.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global tracing subscriber was already installed, or installation failed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Underlying subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// A counter family could not be created or added to the registry.
    #[error("failed to register counter")]
    Counter {
        /// Counter family name.
        name: &'static str,
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
}
