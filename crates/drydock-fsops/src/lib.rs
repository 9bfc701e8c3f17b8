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

//! Scratch volume maintenance for drydock workers.
//!
//! The [`VolumeManager`] opens volume permissions at startup, empties volumes between
//! runs, and classifies root filesystem usage against the configured disk budget.
//!
//! Layout: `service.rs` (the manager), `fs.rs` (filesystem backend), `probe.rs`
//! (disk usage measurement), `fanout.rs` (concurrent per-path operations), `error.rs`.

pub mod error;
pub mod fanout;
pub mod fs;
pub mod probe;
pub mod service;

pub use error::{VolumeError, VolumeResult};
pub use fs::{LocalFs, OPEN_MODE, VolumeFs};
pub use probe::{DiskUsageProbe, DuProbe, parse_du_kib};
pub use service::{CapacityState, VolumeManager, classify};
