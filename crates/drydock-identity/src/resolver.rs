//! Resolution of the service that started this worker's container.

use std::fmt;
use std::sync::Arc;

use drydock_config::IdentitySettings;
use tracing::debug;

use crate::agent::{AgentClient, HttpAgentClient};
use crate::control_plane::{AwsCliControlPlane, ControlPlane};
use crate::error::{AgentError, ControlPlaneError, IdentityError};

/// Opaque identifier of the service that launched this worker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceId(String);

impl ServiceId {
    /// Wrap an identifier obtained elsewhere.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a container name to the orchestrator service that started it.
///
/// Resolution is a local agent lookup followed by at most one control-plane query.
/// Nothing is retried.
#[derive(Clone)]
pub struct IdentityResolver {
    agent: Arc<dyn AgentClient>,
    control_plane: Arc<dyn ControlPlane>,
}

impl IdentityResolver {
    /// Resolver over the given backends.
    #[must_use]
    pub fn new(agent: Arc<dyn AgentClient>, control_plane: Arc<dyn ControlPlane>) -> Self {
        Self {
            agent,
            control_plane,
        }
    }

    /// Resolver using the HTTP agent client and the AWS CLI control plane.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Request`] when the HTTP client cannot be built.
    pub fn from_settings(settings: &IdentitySettings) -> Result<Self, AgentError> {
        Ok(Self::new(
            Arc::new(HttpAgentClient::from_settings(settings)?),
            Arc::new(AwsCliControlPlane::from_settings(settings)),
        ))
    }

    /// Resolve the service that started the task containing `container_name`.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::LocalAgent`] when the agent cannot be queried.
    /// - [`IdentityError::NotFound`] when no local task has such a container; the
    ///   control plane is not contacted.
    /// - [`IdentityError::MalformedTaskArn`] when the task ARN carries no region.
    /// - [`IdentityError::ClusterQuery`] when the control plane fails, omits the task,
    ///   or reports no starter.
    pub async fn resolve(
        &self,
        container_name: &str,
        cluster_name: &str,
    ) -> Result<ServiceId, IdentityError> {
        let tasks = self
            .agent
            .list_tasks()
            .await
            .map_err(|source| IdentityError::LocalAgent { source })?;

        let Some(task) = tasks.find_by_container(container_name) else {
            debug!(
                container = container_name,
                tasks = tasks.tasks.len(),
                "no local task runs the container"
            );
            return Err(IdentityError::NotFound {
                container: container_name.to_string(),
            });
        };

        let task_arn = task.arn.as_str();
        let region =
            region_from_task_arn(task_arn).ok_or_else(|| IdentityError::MalformedTaskArn {
                arn: task_arn.to_string(),
            })?;
        debug!(
            container = container_name,
            task_arn, region, "local task found; querying control plane"
        );

        let cluster_query = |source: ControlPlaneError| IdentityError::ClusterQuery {
            cluster: cluster_name.to_string(),
            task_arn: task_arn.to_string(),
            source,
        };
        let described = self
            .control_plane
            .describe_task(region, cluster_name, task_arn)
            .await
            .map_err(cluster_query)?;

        match described.started_by {
            Some(started_by) if !started_by.trim().is_empty() => Ok(ServiceId(started_by)),
            _ => Err(cluster_query(ControlPlaneError::StartedByMissing {
                task_arn: task_arn.to_string(),
            })),
        }
    }
}

/// Region segment of an ARN shaped `arn:<partition>:<service>:<region>:<account>:<resource>`.
#[must_use]
pub fn region_from_task_arn(arn: &str) -> Option<&str> {
    let fields: Vec<&str> = arn.splitn(6, ':').collect();
    match fields.as_slice() {
        ["arn", _, _, region, _, resource] if !region.is_empty() && !resource.is_empty() => {
            Some(*region)
        }
        _ => None,
    }
}
