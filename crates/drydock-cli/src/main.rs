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

//! Binary entrypoint for the `drydock` command.

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = drydock_cli::run().await;
    process::exit(exit_code);
}
