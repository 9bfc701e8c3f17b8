//! Outcome types reported by the worker lifecycle.

use drydock_identity::{IdentityErrorKind, ServiceId};

/// Whether the worker may claim another job after maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Capacity is within budget.
    Accept,
    /// The worker should stop claiming jobs until capacity recovers.
    Pause {
        /// Why work is paused.
        reason: PauseReason,
    },
}

/// Reason attached to [`Admission::Pause`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    /// Usage exceeds the disk budget.
    DiskFull,
    /// Usage could not be measured.
    MeasurementFailed,
}

impl Admission {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Pause { .. } => "pause",
        }
    }

    /// Pause reason, if any.
    #[must_use]
    pub const fn pause_reason(self) -> Option<PauseReason> {
        match self {
            Self::Accept => None,
            Self::Pause { reason } => Some(reason),
        }
    }
}

impl PauseReason {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DiskFull => "disk_full",
            Self::MeasurementFailed => "measurement_failed",
        }
    }
}

/// Identity of the worker as far as startup could establish it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStatus {
    /// The starting service is known.
    Resolved(ServiceId),
    /// Resolution was attempted and failed.
    Unresolved {
        /// System at fault.
        kind: IdentityErrorKind,
    },
    /// Container or cluster name is not configured.
    NotConfigured,
}

impl IdentityStatus {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved(_) => "resolved",
            Self::Unresolved { .. } => "unresolved",
            Self::NotConfigured => "not_configured",
        }
    }

    /// Service id when resolved.
    #[must_use]
    pub const fn service_id(&self) -> Option<&ServiceId> {
        match self {
            Self::Resolved(id) => Some(id),
            _ => None,
        }
    }
}
