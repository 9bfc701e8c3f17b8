//! Environment loading for [`WorkerConfig`].
//!
//! Every setting is read from a `DRYDOCK_*` variable. Blank values count as unset.

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    DEFAULT_AGENT_URL, IdentitySettings, LoggingSettings, VolumeSettings, WorkerConfig,
};
use crate::validate::{
    parse_absolute_path, parse_bool, parse_http_url, parse_log_format, parse_non_empty,
    parse_path_list, parse_positive_u64, parse_secs,
};

/// Comma-separated scratch volume paths.
pub const ENV_VOLUMES: &str = "DRYDOCK_VOLUMES";
/// Toggle for cleaning between runs.
pub const ENV_AUTO_CLEAN: &str = "DRYDOCK_AUTO_CLEAN";
/// Disk budget in bytes.
pub const ENV_MAX_DISK_BYTES: &str = "DRYDOCK_MAX_DISK_BYTES";
/// Temporary-files root emptied with the volumes.
pub const ENV_TEMP_ROOT: &str = "DRYDOCK_TEMP_ROOT";
/// Root measured by the capacity check.
pub const ENV_USAGE_ROOT: &str = "DRYDOCK_USAGE_ROOT";
/// Disk usage program.
pub const ENV_DU_PROGRAM: &str = "DRYDOCK_DU_PROGRAM";
/// Container name to resolve.
pub const ENV_CONTAINER_NAME: &str = "DRYDOCK_CONTAINER_NAME";
/// Cluster name to query.
pub const ENV_CLUSTER_NAME: &str = "DRYDOCK_CLUSTER_NAME";
/// Container-agent endpoint.
pub const ENV_AGENT_URL: &str = "DRYDOCK_AGENT_URL";
/// Container-agent timeout in seconds.
pub const ENV_AGENT_TIMEOUT_SECS: &str = "DRYDOCK_AGENT_TIMEOUT_SECS";
/// Control-plane timeout in seconds.
pub const ENV_CLUSTER_TIMEOUT_SECS: &str = "DRYDOCK_CLUSTER_TIMEOUT_SECS";
/// Control-plane program.
pub const ENV_AWS_PROGRAM: &str = "DRYDOCK_AWS_PROGRAM";
/// Log level directive.
pub const ENV_LOG_LEVEL: &str = "DRYDOCK_LOG_LEVEL";
/// Log output format.
pub const ENV_LOG_FORMAT: &str = "DRYDOCK_LOG_FORMAT";

impl WorkerConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] naming the first variable that fails validation.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] naming the first variable that fails validation.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut volumes = VolumeSettings::default();
        if let Some(raw) = get(ENV_VOLUMES) {
            volumes.volumes = parse_path_list(ENV_VOLUMES, &raw)?;
        }
        if let Some(raw) = get(ENV_AUTO_CLEAN) {
            volumes.auto_clean = parse_bool(ENV_AUTO_CLEAN, &raw)?;
        }
        if let Some(raw) = get(ENV_MAX_DISK_BYTES) {
            volumes.max_disk_bytes = parse_positive_u64(ENV_MAX_DISK_BYTES, &raw)?;
        }
        if let Some(raw) = get(ENV_TEMP_ROOT) {
            volumes.temp_root = parse_absolute_path(ENV_TEMP_ROOT, &raw)?;
        }
        if let Some(raw) = get(ENV_USAGE_ROOT) {
            volumes.usage_root = parse_absolute_path(ENV_USAGE_ROOT, &raw)?;
        }
        if let Some(raw) = get(ENV_DU_PROGRAM) {
            volumes.du_program = parse_non_empty(ENV_DU_PROGRAM, &raw)?;
        }

        let agent_url = match get(ENV_AGENT_URL) {
            Some(raw) => parse_http_url(ENV_AGENT_URL, &raw)?,
            None => Url::parse(DEFAULT_AGENT_URL).map_err(|_| ConfigError::InvalidField {
                field: ENV_AGENT_URL,
                reason: "invalid_default",
                value: Some(DEFAULT_AGENT_URL.to_string()),
            })?,
        };
        let mut identity = IdentitySettings::new(agent_url);
        if let Some(raw) = get(ENV_CONTAINER_NAME) {
            identity.container_name = Some(parse_non_empty(ENV_CONTAINER_NAME, &raw)?);
        }
        if let Some(raw) = get(ENV_CLUSTER_NAME) {
            identity.cluster_name = Some(parse_non_empty(ENV_CLUSTER_NAME, &raw)?);
        }
        if let Some(raw) = get(ENV_AGENT_TIMEOUT_SECS) {
            identity.agent_timeout = parse_secs(ENV_AGENT_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = get(ENV_CLUSTER_TIMEOUT_SECS) {
            identity.cluster_timeout = parse_secs(ENV_CLUSTER_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = get(ENV_AWS_PROGRAM) {
            identity.aws_program = parse_non_empty(ENV_AWS_PROGRAM, &raw)?;
        }

        let mut logging = LoggingSettings::default();
        if let Some(raw) = get(ENV_LOG_LEVEL) {
            logging.level = parse_non_empty(ENV_LOG_LEVEL, &raw)?;
        }
        if let Some(raw) = get(ENV_LOG_FORMAT) {
            logging.format = parse_log_format(ENV_LOG_FORMAT, &raw)?;
        }

        Ok(Self {
            volumes,
            identity,
            logging,
        })
    }
}
