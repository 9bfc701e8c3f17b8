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

//! Telemetry primitives shared across the drydock workspace.
//!
//! This crate centralises logging, the process span, and metrics so the worker
//! components and the CLI share one observability story.
//!
//! Layout: `init.rs` (subscriber installation), `context.rs` (process and
//! maintenance spans), `metrics.rs` (Prometheus registry), `error.rs`.

pub mod context;
pub mod error;
pub mod init;
pub mod metrics;

pub use context::{GlobalContextGuard, maintenance_span, record_service_identity};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use metrics::{Metrics, MetricsSnapshot};
