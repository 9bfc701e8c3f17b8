#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Service identity resolution for drydock workers.
//!
//! A worker knows its own container name. The local container agent maps that name
//! to a task ARN, and the cluster control plane maps the task to the service that
//! started it.
//!
//! Deployment requirement: the control-plane lookup shells out to the AWS CLI, so the
//! worker image must ship an `aws` binary (see [`control_plane`]).

pub mod agent;
pub mod control_plane;
pub mod error;
pub mod resolver;

pub use agent::{AgentClient, AgentContainer, AgentTask, HttpAgentClient, TaskList};
pub use control_plane::{AwsCliControlPlane, ClusterTask, ControlPlane, parse_describe_tasks};
pub use error::{AgentError, ControlPlaneError, IdentityError, IdentityErrorKind};
pub use resolver::{IdentityResolver, ServiceId, region_from_task_arn};
