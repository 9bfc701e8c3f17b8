//! Typed configuration models for a drydock worker.
//!
//! # Design
//! - Settings are immutable once loaded; the worker builds its managers from a snapshot.
//! - Defaults live next to the types so the loader and tests agree on them.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Disk budget applied when `DRYDOCK_MAX_DISK_BYTES` is unset (10 GiB).
pub const DEFAULT_MAX_DISK_BYTES: u64 = 10 * 1024 * 1024 * 1024;
/// Temporary-files root emptied alongside the configured volumes.
pub const DEFAULT_TEMP_ROOT: &str = "/tmp";
/// Root measured by the capacity check.
pub const DEFAULT_USAGE_ROOT: &str = "/";
/// Program used to measure disk usage.
pub const DEFAULT_DU_PROGRAM: &str = "du";
/// Container-agent introspection endpoint reachable from the default bridge network.
pub const DEFAULT_AGENT_URL: &str = "http://172.17.0.1:51678/v1/tasks";
/// Upper bound for a single container-agent request.
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(5);
/// Upper bound for a single cluster control-plane query.
pub const DEFAULT_CLUSTER_TIMEOUT: Duration = Duration::from_secs(15);
/// Program used to query the cluster control plane.
pub const DEFAULT_AWS_PROGRAM: &str = "aws";
/// Default log level when neither `RUST_LOG` nor `DRYDOCK_LOG_LEVEL` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Full configuration snapshot for one worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Scratch volume and disk budget settings.
    pub volumes: VolumeSettings,
    /// Identity resolution settings.
    pub identity: IdentitySettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Scratch volumes managed between job runs and the disk budget enforced across them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSettings {
    /// Ordered volume paths. Duplicates are not filtered.
    pub volumes: Vec<PathBuf>,
    /// When `false`, cleaning between runs is skipped entirely.
    pub auto_clean: bool,
    /// Maximum tolerated root filesystem usage in bytes.
    pub max_disk_bytes: u64,
    /// Temporary-files root emptied with the volumes.
    pub temp_root: PathBuf,
    /// Root whose aggregate usage is compared against the budget.
    pub usage_root: PathBuf,
    /// Program invoked to measure disk usage.
    pub du_program: String,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            volumes: Vec::new(),
            auto_clean: true,
            max_disk_bytes: DEFAULT_MAX_DISK_BYTES,
            temp_root: PathBuf::from(DEFAULT_TEMP_ROOT),
            usage_root: PathBuf::from(DEFAULT_USAGE_ROOT),
            du_program: DEFAULT_DU_PROGRAM.to_string(),
        }
    }
}

/// Settings for resolving which service started this container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySettings {
    /// Name of this worker's container within its task.
    pub container_name: Option<String>,
    /// Cluster the task runs under.
    pub cluster_name: Option<String>,
    /// Container-agent task listing endpoint.
    pub agent_url: Url,
    /// Timeout applied to the container-agent request.
    pub agent_timeout: Duration,
    /// Timeout applied to the control-plane query.
    pub cluster_timeout: Duration,
    /// Program invoked to query the control plane.
    pub aws_program: String,
}

/// Borrowed pair of names needed to resolve identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityTarget<'a> {
    /// Container name to look for in the local task list.
    pub container_name: &'a str,
    /// Cluster name passed to the control plane.
    pub cluster_name: &'a str,
}

impl IdentitySettings {
    /// Build settings with the default endpoint, timeouts, and program.
    #[must_use]
    pub fn new(agent_url: Url) -> Self {
        Self {
            container_name: None,
            cluster_name: None,
            agent_url,
            agent_timeout: DEFAULT_AGENT_TIMEOUT,
            cluster_timeout: DEFAULT_CLUSTER_TIMEOUT,
            aws_program: DEFAULT_AWS_PROGRAM.to_string(),
        }
    }

    /// Names to resolve, or `None` when either one is not configured.
    #[must_use]
    pub fn target(&self) -> Option<IdentityTarget<'_>> {
        Some(IdentityTarget {
            container_name: self.container_name.as_deref()?,
            cluster_name: self.cluster_name.as_deref()?,
        })
    }
}

/// Logging output selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormatSetting {
    /// Pretty output in debug builds, JSON in release builds.
    #[default]
    Auto,
    /// Structured JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
}

impl LogFormatSetting {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}

/// Logging configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormatSetting,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormatSetting::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Result<IdentitySettings, url::ParseError> {
        Ok(IdentitySettings::new(Url::parse(DEFAULT_AGENT_URL)?))
    }

    #[test]
    fn target_requires_both_names() -> Result<(), url::ParseError> {
        let mut settings = identity()?;
        assert!(settings.target().is_none());

        settings.container_name = Some("watcher".to_string());
        assert!(settings.target().is_none());

        settings.cluster_name = Some("my-cluster".to_string());
        let target = settings.target();
        assert_eq!(
            target,
            Some(IdentityTarget {
                container_name: "watcher",
                cluster_name: "my-cluster",
            })
        );
        Ok(())
    }

    #[test]
    fn volume_defaults_enable_cleaning() {
        let settings = VolumeSettings::default();
        assert!(settings.auto_clean);
        assert!(settings.volumes.is_empty());
        assert_eq!(settings.max_disk_bytes, DEFAULT_MAX_DISK_BYTES);
        assert_eq!(settings.temp_root, PathBuf::from("/tmp"));
        assert_eq!(settings.usage_root, PathBuf::from("/"));
    }
}
