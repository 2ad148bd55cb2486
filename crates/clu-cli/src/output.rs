//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use clu_core::{DeviceId, DeviceInfo, DeviceRef, PlatformId, PlatformRef};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

const MIB: u64 = 1024 * 1024;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone, Default)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// One row of the platform listing.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformSummary {
    /// Position in enumeration order.
    pub index: usize,
    /// Platform identity.
    pub id: PlatformId,
    /// Platform name.
    pub name: String,
    /// Platform vendor.
    pub vendor: String,
    /// OpenCL version string.
    pub version: String,
    /// Number of devices.
    pub devices: usize,
}

impl PlatformSummary {
    /// Summarize a hydrated platform.
    #[must_use]
    pub fn new(platform: &PlatformRef<'_>, devices: usize) -> Self {
        Self {
            index: platform.index(),
            id: platform.id(),
            name: platform.name.clone(),
            vendor: platform.vendor.clone(),
            version: platform.version.clone(),
            devices,
        }
    }
}

/// Every platform.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformList {
    /// Platforms in enumeration order.
    pub platforms: Vec<PlatformSummary>,
}

impl TableDisplay for PlatformList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.platforms.is_empty() {
            writeln!(writer, "No OpenCL platforms found")?;
            return Ok(());
        }

        // Names are what `--platform` matches against, so they are never cut.
        let name_width = self
            .platforms
            .iter()
            .map(|platform| platform.name.chars().count())
            .fold("NAME".len(), usize::max);

        writeln!(
            writer,
            "{:>3}  {:<name_width$}  {:<20}  {:<24}  {:>7}",
            "#", "NAME", "VENDOR", "VERSION", "DEVICES"
        )?;
        writeln!(writer, "{}", "─".repeat(name_width + 62))?;

        for platform in &self.platforms {
            writeln!(
                writer,
                "{:>3}  {:<name_width$}  {:<20}  {:<24}  {:>7}",
                platform.index,
                platform.name,
                truncate(&platform.vendor, 20),
                truncate(&platform.version, 24),
                platform.devices
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} platform(s)", self.platforms.len())?;
        Ok(())
    }
}

/// One row of a device listing.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSummary {
    /// Position in the platform's device list.
    pub index: usize,
    /// Device identity.
    pub id: DeviceId,
    /// Device name.
    pub name: String,
    /// Device type description.
    pub kind: String,
    /// Parallel compute units.
    pub compute_units: u32,
    /// Maximum clock in MHz.
    pub clock_mhz: u32,
    /// Global memory in MiB.
    pub global_mem_mib: u64,
    /// Maximum work-group size.
    pub max_work_group_size: usize,
    /// Maximum work-items per dimension.
    pub max_work_item_sizes: Vec<usize>,
}

impl DeviceSummary {
    /// Summarize a hydrated device.
    #[must_use]
    pub fn new(device: &DeviceRef<'_>) -> Self {
        Self {
            index: device.index(),
            id: device.id(),
            name: device.name.clone(),
            kind: device.device_type.to_string(),
            compute_units: device.max_compute_units,
            clock_mhz: device.max_clock_frequency,
            global_mem_mib: device.global_mem_size / MIB,
            max_work_group_size: device.max_work_group_size,
            max_work_item_sizes: device.max_work_item_sizes.clone(),
        }
    }
}

/// The devices of one platform.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceList {
    /// Owning platform name.
    pub platform: String,
    /// Filter the listing was made with.
    pub filter: String,
    /// Devices in driver order.
    pub devices: Vec<DeviceSummary>,
}

impl TableDisplay for DeviceList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Platform: {}", self.platform)?;
        writeln!(writer)?;

        if self.devices.is_empty() {
            writeln!(writer, "No {} devices found", self.filter)?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:>3}  {:<32}  {:<12}  {:>4}  {:>6}  {:>10}  {:>6}  {:<18}",
            "#", "NAME", "TYPE", "CUS", "MHZ", "MEM (MiB)", "WG", "WORK ITEMS"
        )?;
        writeln!(writer, "{}", "─".repeat(106))?;

        for device in &self.devices {
            writeln!(
                writer,
                "{:>3}  {:<32}  {:<12}  {:>4}  {:>6}  {:>10}  {:>6}  {:<18}",
                device.index,
                truncate(&device.name, 32),
                truncate(&device.kind, 12),
                device.compute_units,
                device.clock_mhz,
                device.global_mem_mib,
                device.max_work_group_size,
                join_sizes(&device.max_work_item_sizes)
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} device(s)", self.devices.len())?;
        Ok(())
    }
}

/// Every attribute of one device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceDetail {
    /// Owning platform name.
    pub platform: String,
    /// Position in the platform's device list.
    pub index: usize,
    /// Device identity.
    pub id: DeviceId,
    /// All attributes.
    pub info: DeviceInfo,
}

impl DeviceDetail {
    /// Capture a hydrated device.
    #[must_use]
    pub fn new(platform: &PlatformRef<'_>, device: &DeviceRef<'_>) -> Self {
        Self {
            platform: platform.name.clone(),
            index: device.index(),
            id: device.id(),
            info: device.info().clone(),
        }
    }
}

impl TableDisplay for DeviceDetail {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let info = &self.info;
        writeln!(writer, "Device {}: {}", self.index, info.name)?;
        writeln!(writer, "══════════════════════════════════════════════════")?;
        writeln!(writer)?;
        writeln!(writer, "General")?;
        writeln!(writer, "  Platform:       {}", self.platform)?;
        writeln!(writer, "  Type:           {}", info.device_type)?;
        writeln!(writer, "  Vendor:         {} ({:#x})", info.vendor, info.vendor_id)?;
        writeln!(writer, "  Version:        {}", info.version)?;
        writeln!(writer, "  Driver:         {}", info.driver_version)?;
        writeln!(writer, "  OpenCL C:       {}", info.opencl_c_version)?;
        writeln!(writer, "  Profile:        {}", info.profile)?;
        writeln!(writer, "  Available:      {}", yes_no(info.available))?;
        writeln!(writer, "  Compiler:       {}", yes_no(info.compiler_available))?;
        writeln!(writer)?;
        writeln!(writer, "Compute")?;
        writeln!(writer, "  Compute Units:  {}", info.max_compute_units)?;
        writeln!(writer, "  Clock:          {} MHz", info.max_clock_frequency)?;
        writeln!(writer, "  Work Group:     {}", info.max_work_group_size)?;
        writeln!(writer, "  Work Items:     {}", join_sizes(&info.max_work_item_sizes))?;
        writeln!(writer, "  Address Bits:   {}", info.address_bits)?;
        writeln!(writer)?;
        writeln!(writer, "Memory")?;
        writeln!(writer, "  Global:         {:.2} GiB", info.global_mem_gib())?;
        writeln!(writer, "  Max Alloc:      {} MiB", info.max_mem_alloc_size / MIB)?;
        writeln!(writer, "  Local:          {} KiB", info.local_mem_size / 1024)?;
        writeln!(writer, "  Constant:       {} KiB", info.max_constant_buffer_size / 1024)?;
        writeln!(writer, "  Unified:        {}", yes_no(info.host_unified_memory))?;
        writeln!(writer, "  ECC:            {}", yes_no(info.error_correction_support))?;
        writeln!(writer)?;

        let extensions: Vec<&str> = info.extensions.split_whitespace().collect();
        if extensions.is_empty() {
            writeln!(writer, "Extensions: None")?;
        } else {
            writeln!(writer, "Extensions ({}):", extensions.len())?;
            for extension in extensions {
                writeln!(writer, "  {extension}")?;
            }
        }
        Ok(())
    }
}

/// Description of a status code.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDescription {
    /// The code.
    pub code: i32,
    /// Its description.
    pub description: &'static str,
}

impl TableDisplay for ErrorDescription {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{}: {}", self.code, self.description)?;
        Ok(())
    }
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn join_sizes(sizes: &[usize]) -> String {
    if sizes.is_empty() {
        return "-".to_string();
    }
    sizes.iter().map(ToString::to_string).collect::<Vec<_>>().join(" x ")
}

/// Truncate a string for display, on a character boundary.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}
