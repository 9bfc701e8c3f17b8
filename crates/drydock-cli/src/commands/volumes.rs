//! Volume maintenance commands: `init`, `clean`, `check-capacity`.

use drydock_app::WorkerContext;
use drydock_fsops::CapacityState;

use crate::cli::OutputFormat;
use crate::error::{CliResult, Status};
use crate::output::{render_capacity, render_cleaned, render_initialized};

pub(crate) async fn handle_init(ctx: &WorkerContext, format: OutputFormat) -> CliResult<Status> {
    ctx.initialize_volumes().await?;
    let volumes = ctx.config().volumes.volumes.len();
    println!("{}", render_initialized(volumes, format, &ctx.metrics().snapshot())?);
    Ok(Status::Ok)
}

pub(crate) async fn handle_clean(ctx: &WorkerContext, format: OutputFormat) -> CliResult<Status> {
    ctx.clean_volumes().await?;
    let auto_clean = ctx.config().volumes.auto_clean;
    println!(
        "{}",
        render_cleaned(auto_clean, format, &ctx.metrics().snapshot())?
    );
    Ok(Status::Ok)
}

pub(crate) async fn handle_check_capacity(
    ctx: &WorkerContext,
    format: OutputFormat,
) -> CliResult<Status> {
    let state = ctx.check_capacity().await?;
    let budget = ctx.config().volumes.max_disk_bytes;
    println!("{}", render_capacity(state, budget, format, &ctx.metrics().snapshot())?);
    Ok(match state {
        CapacityState::Ok => Status::Ok,
        CapacityState::Full => Status::Paused,
    })
}
