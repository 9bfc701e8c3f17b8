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

//! Environment-backed configuration for drydock workers.
//!
//! Layout: `model.rs` (typed settings and defaults), `validate.rs`
//! (parsing helpers for raw values), `loader.rs` (`WorkerConfig::from_env`).

pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{
    DEFAULT_AGENT_TIMEOUT, DEFAULT_AGENT_URL, DEFAULT_AWS_PROGRAM, DEFAULT_CLUSTER_TIMEOUT,
    DEFAULT_DU_PROGRAM, DEFAULT_LOG_LEVEL, DEFAULT_MAX_DISK_BYTES, DEFAULT_TEMP_ROOT,
    DEFAULT_USAGE_ROOT, IdentitySettings, IdentityTarget, LogFormatSetting, LoggingSettings,
    VolumeSettings, WorkerConfig,
};
