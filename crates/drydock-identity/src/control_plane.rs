//! Cluster control-plane lookup of a task's descriptor.
//!
//! The production backend runs `aws ecs describe-tasks` and parses its JSON output.
//! Worker images therefore need the AWS CLI (v2) installed, either on `PATH` or at
//! the location named by `DRYDOCK_AWS_PROGRAM`, with credentials allowed to call
//! `ecs:DescribeTasks` on the worker's cluster.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use drydock_config::IdentitySettings;
use serde::Deserialize;
use tokio::process::Command;

use crate::error::ControlPlaneError;

const STDERR_LIMIT: usize = 512;

/// Task descriptor returned by the control plane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTask {
    /// Fully qualified task ARN.
    pub task_arn: String,
    /// Identifier of whatever launched the task, typically the owning service.
    #[serde(default)]
    pub started_by: Option<String>,
    /// Task group, e.g. `service:<name>`.
    #[serde(default)]
    pub group: Option<String>,
    /// Last status observed by the control plane.
    #[serde(default)]
    pub last_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DescribeTasksOutput {
    #[serde(default)]
    tasks: Vec<ClusterTask>,
    #[serde(default)]
    failures: Vec<DescribeFailure>,
}

#[derive(Debug, Deserialize)]
struct DescribeFailure {
    #[serde(default)]
    arn: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Remote source of cluster task descriptors.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Describe `task_arn` running in `cluster` within `region`.
    async fn describe_task(
        &self,
        region: &str,
        cluster: &str,
        task_arn: &str,
    ) -> Result<ClusterTask, ControlPlaneError>;
}

/// [`ControlPlane`] backed by the AWS command line client.
#[derive(Debug, Clone)]
pub struct AwsCliControlPlane {
    program: String,
    timeout: Duration,
}

impl AwsCliControlPlane {
    /// Backend running `program`, killed once `timeout` elapses.
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Backend configured from identity settings.
    #[must_use]
    pub fn from_settings(settings: &IdentitySettings) -> Self {
        Self::new(settings.aws_program.clone(), settings.cluster_timeout)
    }
}

#[async_trait]
impl ControlPlane for AwsCliControlPlane {
    async fn describe_task(
        &self,
        region: &str,
        cluster: &str,
        task_arn: &str,
    ) -> Result<ClusterTask, ControlPlaneError> {
        let run = Command::new(&self.program)
            .args(["ecs", "describe-tasks", "--region", region])
            .args(["--cluster", cluster, "--tasks", task_arn])
            .args(["--output", "json"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| ControlPlaneError::Timeout {
                program: self.program.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| ControlPlaneError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ControlPlaneError::ExitStatus {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: stderr.trim().chars().take(STDERR_LIMIT).collect(),
            });
        }

        parse_describe_tasks(&output.stdout, task_arn)
    }
}

/// Pick the descriptor for `task_arn` out of a `describe-tasks` JSON response.
///
/// # Errors
///
/// Returns [`ControlPlaneError::Parse`] for malformed JSON and
/// [`ControlPlaneError::TaskMissing`] when the response does not describe the task.
pub fn parse_describe_tasks(body: &[u8], task_arn: &str) -> Result<ClusterTask, ControlPlaneError> {
    let output: DescribeTasksOutput =
        serde_json::from_slice(body).map_err(|source| ControlPlaneError::Parse { source })?;

    if let Some(task) = output
        .tasks
        .into_iter()
        .find(|task| task.task_arn == task_arn)
    {
        return Ok(task);
    }

    let reason = output
        .failures
        .into_iter()
        .find(|failure| failure.arn.as_deref().is_none_or(|arn| arn == task_arn))
        .and_then(|failure| failure.reason);
    Err(ControlPlaneError::TaskMissing {
        task_arn: task_arn.to_string(),
        reason,
    })
}
