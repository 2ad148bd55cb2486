//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`platforms`] - Platform listing
//! - [`devices`] - Device listing and detail
//! - [`code`] - Status code lookup

pub mod code;
pub mod devices;
pub mod platforms;

pub use code::ErrorCodeCommand;
pub use devices::{DeviceCommand, DevicesCommand};
pub use platforms::PlatformsCommand;

use clu_core::{ComputeApi, PlatformRef, PlatformStore};

use crate::cli::PlatformArg;
use crate::error::CliError;

/// Resolve `--platform`: absent selects the first platform.
pub(crate) fn select_platform<'a, A: ComputeApi>(
    store: &'a PlatformStore<A>,
    arg: &PlatformArg,
) -> Result<PlatformRef<'a>, CliError> {
    let platform = match arg.platform.as_deref() {
        Some(arg) => store.platform_from_arg(arg)?,
        None => store.platform_by_name(None)?,
    };
    Ok(platform)
}
