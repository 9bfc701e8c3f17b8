//! Argument parsing, logging setup, and command dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use drydock_app::WorkerContext;
use drydock_config::{LogFormatSetting, LoggingSettings, WorkerConfig};
use drydock_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, init_logging};
use tracing::error;

use crate::commands::lifecycle::{handle_after_run, handle_startup, handle_whoami};
use crate::commands::volumes::{handle_check_capacity, handle_clean, handle_init};
use crate::error::{CliError, CliResult, Status};

const BUILD_SHA: &str = match option_env!("DRYDOCK_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};

#[derive(Parser)]
#[command(
    name = "drydock",
    version,
    about = "Keeps worker scratch volumes clean and within their disk budget"
)]
pub(crate) struct Cli {
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Select output format for command results"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        help = "Log level directive, overriding DRYDOCK_LOG_LEVEL"
    )]
    pub(crate) log_level: Option<String>,
    #[arg(
        long,
        global = true,
        value_enum,
        help = "Log format, overriding DRYDOCK_LOG_FORMAT"
    )]
    pub(crate) log_format: Option<LogFormatArg>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    /// Open permissions on every configured volume.
    Init,
    /// Empty every configured volume and the temporary root.
    Clean,
    /// Compare root filesystem usage against the disk budget.
    CheckCapacity,
    /// Print the service that started this container.
    Whoami,
    /// Initialise volumes and resolve identity before the first job.
    Startup,
    /// Clean up after a job run and decide whether to accept more work.
    AfterRun,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Auto,
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormatSetting {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Auto => Self::Auto,
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Pretty => Self::Pretty,
        }
    }
}

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let command_name = command_label(cli.command);

    let config = match load_config(&cli, |name| std::env::var(name).ok()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    if let Err(err) = install_logging(&config.logging) {
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }
    let _context = GlobalContextGuard::new(command_name);

    match dispatch(&cli, config).await {
        Ok(status) => status.exit_code(),
        Err(err) => {
            let message = err.display_message();
            error!(command = command_name, exit_code = err.exit_code(), error = %message, "command failed");
            eprintln!("error: {message}");
            err.exit_code()
        }
    }
}

/// Load worker configuration and apply command-line logging overrides.
pub(crate) fn load_config<F>(cli: &Cli, lookup: F) -> CliResult<WorkerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = WorkerConfig::from_lookup(lookup)?;
    if let Some(level) = cli.log_level.as_deref() {
        if level.trim().is_empty() {
            return Err(CliError::validation("--log-level cannot be empty"));
        }
        config.logging.level = level.trim().to_string();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format.into();
    }
    Ok(config)
}

fn install_logging(settings: &LoggingSettings) -> CliResult<()> {
    let format = match settings.format {
        LogFormatSetting::Auto => LogFormat::infer(),
        LogFormatSetting::Json => LogFormat::Json,
        LogFormatSetting::Pretty => LogFormat::Pretty,
    };
    init_logging(&LoggingConfig {
        level: &settings.level,
        format,
        build_sha: BUILD_SHA,
    })
    .map_err(CliError::failure)
}

async fn dispatch(cli: &Cli, config: WorkerConfig) -> CliResult<Status> {
    let ctx = WorkerContext::from_config(config)?;
    execute(&ctx, cli.command, cli.output).await
}

pub(crate) async fn execute(
    ctx: &WorkerContext,
    command: Command,
    format: OutputFormat,
) -> CliResult<Status> {
    match command {
        Command::Init => handle_init(ctx, format).await,
        Command::Clean => handle_clean(ctx, format).await,
        Command::CheckCapacity => handle_check_capacity(ctx, format).await,
        Command::Whoami => handle_whoami(ctx, format).await,
        Command::Startup => handle_startup(ctx, format).await,
        Command::AfterRun => handle_after_run(ctx, format).await,
    }
}

pub(crate) const fn command_label(command: Command) -> &'static str {
    match command {
        Command::Init => "init",
        Command::Clean => "clean",
        Command::CheckCapacity => "check_capacity",
        Command::Whoami => "whoami",
        Command::Startup => "startup",
        Command::AfterRun => "after_run",
    }
}
