//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clu_core::DeviceType;

/// clu - inspect OpenCL platforms and devices.
#[derive(Parser, Debug, Clone)]
#[command(name = "clu")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Replay a JSON inventory instead of querying the installed driver.
    #[arg(short, long, env = "CLU_INVENTORY", global = true)]
    pub inventory: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, env = "CLU_FORMAT", global = true, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List every platform.
    Platforms,

    /// List the devices of one platform.
    Devices(DevicesArgs),

    /// Show every attribute of one device.
    Device(DeviceArgs),

    /// Describe an OpenCL status code.
    Error {
        /// Status code, e.g. -33.
        #[arg(allow_negative_numbers = true)]
        code: i32,
    },
}

/// Platform selection shared by device commands.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformArg {
    /// Platform ordinal (decimal, 0x hex or 0 octal) or name prefix.
    /// Defaults to the first platform.
    #[arg(short, long, env = "CLU_PLATFORM")]
    pub platform: Option<String>,
}

/// Arguments for the devices command.
#[derive(Args, Debug, Clone)]
pub struct DevicesArgs {
    /// Platform to list.
    #[command(flatten)]
    pub platform: PlatformArg,

    /// Device type filter: all, default, cpu, gpu or accelerator.
    #[arg(short = 't', long = "type", default_value = "all")]
    pub device_type: DeviceType,
}

/// Arguments for the device command.
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Platform owning the device.
    #[command(flatten)]
    pub platform: PlatformArg,

    /// Device ordinal within the platform.
    #[arg(default_value_t = 0)]
    pub index: usize,
}
