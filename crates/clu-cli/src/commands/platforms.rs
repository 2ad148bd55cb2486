//! Platform listing command implementation.

use std::io::Write;

use clu_core::{ComputeApi, DeviceType, PlatformStore, Status};
use tracing::info;

use crate::error::CliError;
use crate::output::{OutputFormat, PlatformList, PlatformSummary};

/// Platforms command executor.
pub struct PlatformsCommand<'a, A> {
    store: &'a PlatformStore<A>,
}

impl<'a, A: ComputeApi> PlatformsCommand<'a, A> {
    /// Create a new platforms command.
    #[must_use]
    pub const fn new(store: &'a PlatformStore<A>) -> Self {
        Self { store }
    }

    /// Execute the platforms command.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery or output fails.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let list = self.fetch()?;
        info!(count = list.platforms.len(), "listed platforms");
        format.write(writer, &list)
    }

    /// Collect every platform with its device count.
    ///
    /// # Errors
    ///
    /// Returns the first discovery failure.
    pub fn fetch(&self) -> Result<PlatformList, CliError> {
        let mut platforms = Vec::new();
        for platform in self.store.platforms()? {
            let devices = match self.store.device_count(platform.id(), DeviceType::ALL) {
                Ok(count) => count,
                Err(err) if err.status() == Status::DEVICE_NOT_FOUND => 0,
                Err(err) => return Err(err.into()),
            };
            platforms.push(PlatformSummary::new(&platform, devices));
        }
        Ok(PlatformList { platforms })
    }
}
