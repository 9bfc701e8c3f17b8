//! # Design
//!
//! - Provide structured, constant-message errors for volume maintenance.
//! - Capture the offending path or measurement command so callers can decide remediation.
//! - Preserve source errors without interpolating context into error messages.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for volume operations.
pub type VolumeResult<T> = Result<T, VolumeError>;

/// Errors produced by the volume manager.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// Opening the permissions of a volume failed.
    #[error("volume permission change failed")]
    Permission {
        /// Volume whose permissions could not be changed.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Emptying a volume or the temporary root failed.
    #[error("volume cleanup failed")]
    Cleanup {
        /// Directory that could not be emptied.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Measuring disk usage failed or produced unusable output.
    #[error("disk usage measurement failed")]
    Measurement {
        /// Program used for the measurement.
        program: String,
        /// Root that was being measured.
        root: PathBuf,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Output or exit status captured from the program.
        detail: Option<String>,
        /// Underlying IO error when the program could not be run.
        source: Option<io::Error>,
    },
}

impl VolumeError {
    pub(crate) const fn permission(path: PathBuf, source: io::Error) -> Self {
        Self::Permission { path, source }
    }

    pub(crate) const fn cleanup(path: PathBuf, source: io::Error) -> Self {
        Self::Cleanup { path, source }
    }

    /// Path the failure relates to: the volume, or the measured root.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Permission { path, .. } | Self::Cleanup { path, .. } => path,
            Self::Measurement { root, .. } => root,
        }
    }
}
