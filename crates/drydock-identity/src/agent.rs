//! Client for the container agent's local task introspection endpoint.

use std::time::Duration;

use async_trait::async_trait;
use drydock_config::IdentitySettings;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::AgentError;

/// Task inventory reported by the container agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskList {
    /// Tasks currently known to the agent on this host.
    #[serde(default)]
    pub tasks: Vec<AgentTask>,
}

impl TaskList {
    /// First task, in listing order, with a container named `container_name`.
    #[must_use]
    pub fn find_by_container(&self, container_name: &str) -> Option<&AgentTask> {
        self.tasks.iter().find(|task| {
            task.containers
                .iter()
                .any(|container| container.name == container_name)
        })
    }
}

/// One task as reported by the container agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentTask {
    /// Fully qualified task ARN.
    pub arn: String,
    /// Status the orchestrator wants the task in.
    #[serde(default)]
    pub desired_status: Option<String>,
    /// Status last observed by the agent.
    #[serde(default)]
    pub known_status: Option<String>,
    /// Task definition family.
    #[serde(default)]
    pub family: Option<String>,
    /// Task definition revision.
    #[serde(default)]
    pub version: Option<String>,
    /// Containers belonging to the task.
    #[serde(default)]
    pub containers: Vec<AgentContainer>,
}

/// One container inside an agent task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentContainer {
    /// Docker container id.
    #[serde(default)]
    pub docker_id: Option<String>,
    /// Name assigned by the Docker daemon.
    #[serde(default)]
    pub docker_name: Option<String>,
    /// Container name from the task definition.
    pub name: String,
}

/// Source of the local task inventory.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Fetch every task currently known to the local agent.
    async fn list_tasks(&self) -> Result<TaskList, AgentError>;
}

/// [`AgentClient`] talking to the agent over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAgentClient {
    client: Client,
    url: Url,
}

impl HttpAgentClient {
    /// Client for `url` whose requests are abandoned after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Request`] when the HTTP client cannot be built.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| AgentError::Request {
                url: url.to_string(),
                source,
            })?;
        Ok(Self { client, url })
    }

    /// Client configured from identity settings.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Request`] when the HTTP client cannot be built.
    pub fn from_settings(settings: &IdentitySettings) -> Result<Self, AgentError> {
        Self::new(settings.agent_url.clone(), settings.agent_timeout)
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn list_tasks(&self) -> Result<TaskList, AgentError> {
        let url = self.url.to_string();
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|source| AgentError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| AgentError::Request {
                url: url.clone(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| AgentError::Decode { url, source })
    }
}
