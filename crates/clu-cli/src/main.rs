//! clu CLI binary entrypoint.
//!
//! This is the main entry point for the `clu` command-line tool.

use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use clu_cli::cli::{Cli, Commands};
use clu_cli::commands::{DeviceCommand, DevicesCommand, ErrorCodeCommand, PlatformsCommand};
use clu_cli::output::OutputFormat;
use clu_cli::CliError;
use clu_core::fake::FakeApi;
use clu_core::{ComputeApi, PlatformStore};

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    // Status codes need no backend.
    if let Commands::Error { code } = cli.command {
        return ErrorCodeCommand.execute(&mut stdout, &format, code);
    }

    match &cli.inventory {
        Some(path) => {
            let store = inventory_store(path)?;
            dispatch(&store, cli, &mut stdout, &format)
        }
        None => live(cli, &mut stdout, &format),
    }
}

fn inventory_store(path: &Path) -> Result<PlatformStore<FakeApi>, CliError> {
    info!(path = %path.display(), "replaying inventory");
    Ok(PlatformStore::new(FakeApi::from_path(path)?))
}

#[cfg(feature = "opencl")]
fn live<W: io::Write>(cli: &Cli, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
    info!("querying installed OpenCL driver");
    dispatch(clu_core::opencl::global_store(), cli, writer, format)
}

#[cfg(not(feature = "opencl"))]
fn live<W: io::Write>(_cli: &Cli, _writer: &mut W, _format: &OutputFormat) -> Result<(), CliError> {
    Err(CliError::Config(
        "no OpenCL driver support in this build; pass --inventory FILE".into(),
    ))
}

fn dispatch<A: ComputeApi, W: io::Write>(
    store: &PlatformStore<A>,
    cli: &Cli,
    writer: &mut W,
    format: &OutputFormat,
) -> Result<(), CliError> {
    match &cli.command {
        Commands::Platforms => PlatformsCommand::new(store).execute(writer, format),
        Commands::Devices(args) => DevicesCommand::new(store).execute(writer, format, args),
        Commands::Device(args) => DeviceCommand::new(store).execute(writer, format, args),
        Commands::Error { code } => ErrorCodeCommand.execute(writer, format, *code),
    }
}
