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
#![allow(clippy::redundant_pub_crate)]

//! Command-line entrypoint for drydock worker maintenance.
//!
//! Layout:
//! - `cli.rs`: argument parsing, logging setup, and command dispatch
//! - `commands/`: command handlers grouped by concern
//! - `error.rs`: CLI errors and exit codes
//! - `output.rs`: text and JSON renderers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod commands;
pub(crate) mod error;
pub(crate) mod output;

pub use cli::run;
