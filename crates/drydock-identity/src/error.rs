//! # Design
//!
//! - Constant error messages; the agent URL, task ARN, and cluster travel as fields.
//! - Backend errors are carried unchanged as sources so callers can inspect them.
//! - [`IdentityErrorKind`] groups failures by the system at fault.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failures talking to the local container agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The request could not be sent or the body could not be read.
    #[error("container agent request failed")]
    Request {
        /// Endpoint that was queried.
        url: String,
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
    /// The agent answered with a non-success status.
    #[error("container agent returned an error status")]
    Status {
        /// Endpoint that was queried.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The agent's response was not a valid task list.
    #[error("container agent response could not be decoded")]
    Decode {
        /// Endpoint that was queried.
        url: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// Failures querying the cluster control plane.
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    /// The control-plane client could not be started.
    #[error("control plane command could not be started")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The control-plane client did not finish in time and was killed.
    #[error("control plane command timed out")]
    Timeout {
        /// Program that was invoked.
        program: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },
    /// The control-plane client exited unsuccessfully.
    #[error("control plane command failed")]
    ExitStatus {
        /// Program that was invoked.
        program: String,
        /// Exit status as reported by the OS.
        status: String,
        /// Truncated standard error output.
        stderr: String,
    },
    /// The response was not valid JSON of the expected shape.
    #[error("control plane response could not be parsed")]
    Parse {
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The response did not describe the requested task.
    #[error("task missing from control plane response")]
    TaskMissing {
        /// Task that was requested.
        task_arn: String,
        /// Failure reason reported by the control plane, if any.
        reason: Option<String>,
    },
    /// The task descriptor carries no starter identity.
    #[error("task has no starting service")]
    StartedByMissing {
        /// Task that was described.
        task_arn: String,
    },
}

/// Errors produced while resolving the worker's service identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The local container agent could not be queried.
    #[error("local container agent query failed")]
    LocalAgent {
        /// Agent failure.
        source: AgentError,
    },
    /// The agent reported a task ARN without a region field.
    #[error("task ARN is malformed")]
    MalformedTaskArn {
        /// ARN as reported by the agent.
        arn: String,
    },
    /// No local task contains a container with the requested name.
    #[error("container not found in local task list")]
    NotFound {
        /// Container name that was looked up.
        container: String,
    },
    /// The cluster control plane could not provide the starter identity.
    #[error("cluster control plane query failed")]
    ClusterQuery {
        /// Cluster that was queried.
        cluster: String,
        /// Task that was described.
        task_arn: String,
        /// Control-plane failure.
        source: ControlPlaneError,
    },
}

/// System at fault for an [`IdentityError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityErrorKind {
    /// Local container agent, including malformed data it reported.
    LocalAgent,
    /// Expected negative result: no matching container.
    NotFound,
    /// Cluster control plane.
    ClusterQuery,
}

impl IdentityErrorKind {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalAgent => "local_agent",
            Self::NotFound => "not_found",
            Self::ClusterQuery => "cluster_query",
        }
    }
}

impl IdentityError {
    /// Classify the failure by the system at fault.
    #[must_use]
    pub const fn kind(&self) -> IdentityErrorKind {
        match self {
            Self::LocalAgent { .. } | Self::MalformedTaskArn { .. } => IdentityErrorKind::LocalAgent,
            Self::NotFound { .. } => IdentityErrorKind::NotFound,
            Self::ClusterQuery { .. } => IdentityErrorKind::ClusterQuery,
        }
    }

    /// Whether this is the expected "not running under the orchestrator" result.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
