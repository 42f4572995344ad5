use crate::{
    commands::{Commands, IngestArgs},
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use engine_runtime::execution::executor;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod error;
mod output;
mod shutdown;

#[derive(Parser, Debug)]
#[command(
    name = "tileload",
    version,
    about = "Bulk loader for tile performance datasets into ClickHouse",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Ingest flags, used when no subcommand is given
    #[command(flatten)]
    ingest: IngestArgs,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let result = match cli.command {
        Some(Commands::Ingest(args)) => ingest(args, &shutdown).await,
        Some(Commands::TestConn(args)) => conn::test_conn(args).await,
        None => ingest(cli.ingest, &shutdown).await,
    };

    if let Err(e) = &result {
        error!(error = %e, "tileload failed");
    }

    let code = ExitCode::from_result(&result, shutdown.is_shutdown_requested());
    std::process::exit(code.as_i32());
}

/// Logs to stderr so that a printed report stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn ingest(args: IngestArgs, shutdown: &ShutdownCoordinator) -> Result<(), CliError> {
    let output = args.output.clone();
    let report = executor::run(args.into(), shutdown.cancel_token()).await?;

    if shutdown.is_shutdown_requested() {
        return Err(CliError::ShutdownRequested);
    }

    match output {
        Some(path) => {
            output::write_report(&report, &path).await?;
            info!(path = %path.display(), "Summary report written");
        }
        None => output::print_report(&report).await?,
    }

    Ok(())
}
