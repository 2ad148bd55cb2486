//! Device listing and detail command implementations.

use std::io::Write;

use clu_core::{ComputeApi, PlatformStore, Status};
use tracing::info;

use super::select_platform;
use crate::cli::{DeviceArgs, DevicesArgs};
use crate::error::CliError;
use crate::output::{DeviceDetail, DeviceList, DeviceSummary, OutputFormat};

/// Devices command executor.
pub struct DevicesCommand<'a, A> {
    store: &'a PlatformStore<A>,
}

impl<'a, A: ComputeApi> DevicesCommand<'a, A> {
    /// Create a new devices command.
    #[must_use]
    pub const fn new(store: &'a PlatformStore<A>) -> Self {
        Self { store }
    }

    /// Execute the devices command.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot be selected, discovery fails
    /// or output fails.
    pub fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &DevicesArgs,
    ) -> Result<(), CliError> {
        let list = self.fetch(args)?;
        info!(platform = %list.platform, filter = %list.filter, count = list.devices.len(), "listed devices");
        format.write(writer, &list)
    }

    /// Collect the selected devices.
    ///
    /// A filter nothing matches yields an empty list rather than an error.
    ///
    /// # Errors
    ///
    /// Returns the first discovery failure.
    pub fn fetch(&self, args: &DevicesArgs) -> Result<DeviceList, CliError> {
        let platform = select_platform(self.store, &args.platform)?;
        let devices = match self.store.devices(platform.id(), args.device_type) {
            Ok(devices) => devices.iter().map(DeviceSummary::new).collect(),
            Err(err) if err.status() == Status::DEVICE_NOT_FOUND => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(DeviceList {
            platform: platform.name.clone(),
            filter: filter_name(args),
            devices,
        })
    }
}

fn filter_name(args: &DevicesArgs) -> String {
    if args.device_type.is_all() {
        "all".to_string()
    } else {
        args.device_type.to_string()
    }
}

/// Device detail command executor.
pub struct DeviceCommand<'a, A> {
    store: &'a PlatformStore<A>,
}

impl<'a, A: ComputeApi> DeviceCommand<'a, A> {
    /// Create a new device command.
    #[must_use]
    pub const fn new(store: &'a PlatformStore<A>) -> Self {
        Self { store }
    }

    /// Execute the device command.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform or device cannot be found, or
    /// output fails.
    pub fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &DeviceArgs,
    ) -> Result<(), CliError> {
        let detail = self.fetch(args)?;
        format.write(writer, &detail)
    }

    /// Look up one device.
    ///
    /// # Errors
    ///
    /// Returns the discovery failure, `InvalidValue` for an index past the
    /// end.
    pub fn fetch(&self, args: &DeviceArgs) -> Result<DeviceDetail, CliError> {
        let platform = select_platform(self.store, &args.platform)?;
        let device = self.store.device_by_index(platform.id(), args.index)?;
        Ok(DeviceDetail::new(&platform, &device))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Format, PlatformArg};
    use clu_core::fake::{FakeApi, FakeDevice, FakePlatform};
    use clu_core::DeviceType;

    fn api() -> FakeApi {
        FakeApi::new()
            .with_platform(FakePlatform::named("Host").with_device(FakeDevice::cpu("Host CPU")))
            .with_platform(
                FakePlatform::named("Graphics")
                    .with_device(FakeDevice::cpu("Helper"))
                    .with_device(FakeDevice::gpu("GPU 0"))
                    .with_device(FakeDevice::gpu("GPU 1")),
            )
    }

    fn devices_args(platform: Option<&str>, device_type: DeviceType) -> DevicesArgs {
        DevicesArgs {
            platform: PlatformArg {
                platform: platform.map(str::to_string),
            },
            device_type,
        }
    }

    #[test]
    fn devices_default_to_first_platform() {
        let api = api();
        let store = PlatformStore::new(&api);
        let list = DevicesCommand::new(&store)
            .fetch(&devices_args(None, DeviceType::ALL))
            .expect("should fetch");

        assert_eq!(list.platform, "Host");
        assert_eq!(list.filter, "all");
        assert_eq!(list.devices.len(), 1);
    }

    #[test]
    fn devices_filter_by_type() {
        let api = api();
        let store = PlatformStore::new(&api);
        let list = DevicesCommand::new(&store)
            .fetch(&devices_args(Some("graph"), DeviceType::GPU))
            .expect("should fetch");

        let names: Vec<_> = list.devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["GPU 0", "GPU 1"]);
        assert_eq!(list.devices[0].index, 1);
        assert_eq!(list.filter, "GPU");
    }

    #[test]
    fn devices_without_match_are_empty() {
        let api = api();
        let store = PlatformStore::new(&api);
        let mut buf = Vec::new();
        DevicesCommand::new(&store)
            .execute(&mut buf, &OutputFormat::default(), &devices_args(Some("0"), DeviceType::GPU))
            .expect("should execute");

        let output = String::from_utf8(buf).expect("valid utf8");
        assert!(output.contains("No GPU devices found"));
    }

    #[test]
    fn devices_unknown_platform() {
        let api = api();
        let store = PlatformStore::new(&api);
        let err = DevicesCommand::new(&store)
            .fetch(&devices_args(Some("nvidia"), DeviceType::ALL))
            .unwrap_err();
        assert_eq!(err.status(), Some(Status::INVALID_PLATFORM));
    }

    #[test]
    fn device_detail_by_index() {
        let api = api();
        let store = PlatformStore::new(&api);
        let args = DeviceArgs {
            platform: PlatformArg {
                platform: Some("1".into()),
            },
            index: 2,
        };
        let mut buf = Vec::new();
        DeviceCommand::new(&store)
            .execute(&mut buf, &OutputFormat::new(Format::Json), &args)
            .expect("should execute");

        let value: serde_json::Value =
            serde_json::from_slice(&buf).expect("valid json");
        assert_eq!(value["info"]["name"], "GPU 1");
        assert_eq!(value["platform"], "Graphics");
    }

    #[test]
    fn device_detail_index_out_of_range() {
        let api = api();
        let store = PlatformStore::new(&api);
        let args = DeviceArgs {
            platform: PlatformArg::default(),
            index: 1,
        };
        let err = DeviceCommand::new(&store).fetch(&args).unwrap_err();
        assert_eq!(err.status(), Some(Status::INVALID_VALUE));
    }
}
