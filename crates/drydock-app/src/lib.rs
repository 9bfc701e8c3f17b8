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

//! Drydock worker lifecycle wiring.
//!
//! Layout: `worker.rs` (startup and per-run maintenance), `admission.rs` (outcome
//! types), `error.rs`.

pub mod admission;
pub mod error;
pub mod worker;

pub use admission::{Admission, IdentityStatus, PauseReason};
pub use error::{AppError, AppResult};
pub use worker::{MaintenanceReport, StartupReport, WorkerContext};
