//! In-memory platform API.
//!
//! [`FakeApi`] answers every query from a fixed inventory, counts the raw
//! calls it receives and can be told to fail the next matching call. It
//! backs the test suites and the `--inventory` replay mode of the CLI.
//!
//! Inventories are plain JSON:
//!
//! ```json
//! { "platforms": [
//!     { "name": "Example", "vendor": "ACME",
//!       "devices": [ { "name": "GPU 0", "device_type": 4 } ] } ] }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::api::{ApiResult, ComputeApi, DeviceParam, PlatformParam, ProgramApi, QueueApi};
use crate::info::{DeviceInfo, PlatformInfo};
use crate::status::Status;
use crate::types::{ContextId, DeviceId, DeviceType, PlatformId, ProgramId, QueueId};

const FIRST_PLATFORM: usize = 0x100;
const FIRST_DEVICE: usize = 0x1000;
const FIRST_PROGRAM: usize = 0x8000;

/// Errors loading an inventory file.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The file could not be read.
    #[error("cannot read inventory {}: {source}", path.display())]
    Io {
        /// Inventory path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid inventory.
    #[error("invalid inventory: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One device of a fake platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FakeDevice {
    /// Attributes reported for the device.
    pub info: DeviceInfo,
}

impl FakeDevice {
    /// A device reporting exactly `info`.
    #[must_use]
    pub const fn new(info: DeviceInfo) -> Self {
        Self { info }
    }

    fn base(name: &str, device_type: DeviceType) -> DeviceInfo {
        DeviceInfo {
            device_type,
            name: name.to_string(),
            vendor: "clu".to_string(),
            driver_version: "1.0".to_string(),
            profile: "FULL_PROFILE".to_string(),
            version: "OpenCL 1.2".to_string(),
            opencl_c_version: "OpenCL C 1.2".to_string(),
            extensions: "cl_khr_global_int32_base_atomics cl_khr_fp64".to_string(),
            address_bits: 64,
            max_work_item_dimensions: 3,
            endian_little: true,
            available: true,
            compiler_available: true,
            image_support: true,
            preferred_vector_width_float: 4,
            native_vector_width_float: 4,
            max_parameter_size: 1024,
            ..DeviceInfo::default()
        }
    }

    /// A typical host CPU device.
    #[must_use]
    pub fn cpu(name: &str) -> Self {
        Self::new(DeviceInfo {
            max_compute_units: 8,
            max_clock_frequency: 3200,
            max_work_group_size: 8192,
            max_work_item_sizes: vec![8192, 8192, 8192],
            global_mem_size: 16 << 30,
            max_mem_alloc_size: 4 << 30,
            local_mem_size: 32 << 10,
            host_unified_memory: true,
            ..Self::base(name, DeviceType::CPU)
        })
    }

    /// A typical discrete GPU device.
    #[must_use]
    pub fn gpu(name: &str) -> Self {
        Self::new(DeviceInfo {
            max_compute_units: 32,
            max_clock_frequency: 1500,
            max_work_group_size: 1024,
            max_work_item_sizes: vec![1024, 1024, 64],
            global_mem_size: 8 << 30,
            max_mem_alloc_size: 2 << 30,
            local_mem_size: 48 << 10,
            ..Self::base(name, DeviceType::GPU)
        })
    }
}

/// One platform of a fake inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakePlatform {
    /// Attributes reported for the platform.
    #[serde(flatten)]
    pub info: PlatformInfo,
    /// Devices in driver order.
    #[serde(default)]
    pub devices: Vec<FakeDevice>,
}

impl FakePlatform {
    /// An empty platform called `name`.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            info: PlatformInfo {
                profile: "FULL_PROFILE".to_string(),
                version: "OpenCL 1.2 clu".to_string(),
                name: name.to_string(),
                vendor: "clu".to_string(),
                extensions: "cl_khr_icd".to_string(),
            },
            devices: Vec::new(),
        }
    }

    /// Append a device.
    #[must_use]
    pub fn with_device(mut self, device: FakeDevice) -> Self {
        self.devices.push(device);
        self
    }
}

/// Serialized form of a [`FakeApi`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Platforms in driver order.
    #[serde(default)]
    pub platforms: Vec<FakePlatform>,
}

/// A call that [`FakeApi::fail_next`] can make fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Platform enumeration.
    PlatformIds,
    /// Device enumeration on a platform, any filter.
    DeviceIds(PlatformId),
    /// Any attribute query on a platform.
    PlatformInfo(PlatformId),
    /// One attribute query on a device.
    DeviceInfo(DeviceId, DeviceParam),
    /// Program creation.
    CreateProgram,
    /// Context or device lookup for a queue.
    Queue(QueueId),
}

/// Raw call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `get_platform_ids` calls.
    pub platform_ids: usize,
    /// `get_device_ids` calls.
    pub device_ids: usize,
    /// `get_platform_info` calls.
    pub platform_info: usize,
    /// `get_device_info` calls.
    pub device_info: usize,
    /// `create_program_with_source` calls.
    pub create_program: usize,
    /// Queue lookups.
    pub queue: usize,
}

#[derive(Debug, Default)]
struct Counters {
    platform_ids: AtomicUsize,
    device_ids: AtomicUsize,
    platform_info: AtomicUsize,
    device_info: AtomicUsize,
    create_program: AtomicUsize,
    queue: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug)]
struct PlatformEntry {
    id: PlatformId,
    info: PlatformInfo,
    devices: Vec<(DeviceId, DeviceInfo)>,
}

/// A program created through [`ProgramApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeProgram {
    /// Owning context.
    pub context: ContextId,
    /// Concatenated source text.
    pub source: String,
}

/// In-memory [`ComputeApi`] with call counting and failure injection.
#[derive(Debug, Default)]
pub struct FakeApi {
    platforms: Vec<PlatformEntry>,
    next_device: usize,
    contexts: Vec<ContextId>,
    queues: HashMap<QueueId, (ContextId, DeviceId)>,
    programs: Mutex<Vec<FakeProgram>>,
    failures: Mutex<Vec<(Failure, Status)>>,
    counters: Counters,
}

impl FakeApi {
    /// An API with no platforms.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_device: FIRST_DEVICE,
            ..Self::default()
        }
    }

    /// Build an API from a parsed inventory.
    #[must_use]
    pub fn from_inventory(inventory: Inventory) -> Self {
        inventory
            .platforms
            .into_iter()
            .fold(Self::new(), Self::with_platform)
    }

    /// Parse an inventory from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Parse`] if the text is not an inventory.
    pub fn from_json(json: &str) -> Result<Self, InventoryError> {
        Ok(Self::from_inventory(serde_json::from_str(json)?))
    }

    /// Load an inventory file.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InventoryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| InventoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let api = Self::from_json(&json)?;
        debug!(path = %path.display(), platforms = api.platforms.len(), "loaded inventory");
        Ok(api)
    }

    /// The inventory this API serves, with identities resolved.
    #[must_use]
    pub fn inventory(&self) -> Inventory {
        Inventory {
            platforms: self
                .platforms
                .iter()
                .map(|entry| FakePlatform {
                    info: entry.info.clone(),
                    devices: entry
                        .devices
                        .iter()
                        .map(|(_, info)| FakeDevice::new(info.clone()))
                        .collect(),
                })
                .collect(),
        }
    }

    /// Append a platform. Its identity and those of its devices are
    /// assigned in insertion order.
    #[must_use]
    pub fn with_platform(mut self, platform: FakePlatform) -> Self {
        let id = PlatformId(FIRST_PLATFORM + self.platforms.len());
        let mut devices = Vec::with_capacity(platform.devices.len());
        for device in platform.devices {
            let mut info = device.info;
            info.platform = id;
            devices.push((DeviceId(self.next_device), info));
            self.next_device += 1;
        }
        self.platforms.push(PlatformEntry {
            id,
            info: platform.info,
            devices,
        });
        self
    }

    /// Register a context that programs may be created in.
    #[must_use]
    pub fn with_context(mut self, context: ContextId) -> Self {
        self.contexts.push(context);
        self
    }

    /// Register a command queue on `device` in `context`.
    #[must_use]
    pub fn with_queue(mut self, queue: QueueId, context: ContextId, device: DeviceId) -> Self {
        if !self.contexts.contains(&context) {
            self.contexts.push(context);
        }
        self.queues.insert(queue, (context, device));
        self
    }

    /// Identities of every device, across platforms, in driver order.
    #[must_use]
    pub fn all_device_ids(&self) -> Vec<DeviceId> {
        self.platforms
            .iter()
            .flat_map(|entry| entry.devices.iter().map(|(id, _)| *id))
            .collect()
    }

    /// Make the next call matching `failure` return `status`.
    ///
    /// Each injected failure fires once. Several may be queued.
    pub fn fail_next(&self, failure: Failure, status: Status) {
        self.failures.lock().push((failure, status));
    }

    /// Snapshot of the call counters.
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        let load = |counter: &AtomicUsize| counter.load(Ordering::Relaxed);
        CallCounts {
            platform_ids: load(&self.counters.platform_ids),
            device_ids: load(&self.counters.device_ids),
            platform_info: load(&self.counters.platform_info),
            device_info: load(&self.counters.device_info),
            create_program: load(&self.counters.create_program),
            queue: load(&self.counters.queue),
        }
    }

    /// A program created earlier, if `program` names one.
    #[must_use]
    pub fn program(&self, program: ProgramId) -> Option<FakeProgram> {
        let index = program.raw().checked_sub(FIRST_PROGRAM)?;
        self.programs.lock().get(index).cloned()
    }

    fn check(&self, matches: impl Fn(&Failure) -> bool) -> ApiResult<()> {
        let mut failures = self.failures.lock();
        match failures.iter().position(|(failure, _)| matches(failure)) {
            Some(position) => Err(failures.remove(position).1),
            None => Ok(()),
        }
    }

    fn platform(&self, id: PlatformId) -> ApiResult<&PlatformEntry> {
        self.platforms
            .iter()
            .find(|entry| entry.id == id)
            .ok_or(Status::INVALID_PLATFORM)
    }

    fn device(&self, id: DeviceId) -> ApiResult<&DeviceInfo> {
        self.platforms
            .iter()
            .flat_map(|entry| entry.devices.iter())
            .find(|(device, _)| *device == id)
            .map(|(_, info)| info)
            .ok_or(Status::INVALID_DEVICE)
    }

    fn queue(&self, queue: QueueId) -> ApiResult<(ContextId, DeviceId)> {
        bump(&self.counters.queue);
        self.check(|failure| *failure == Failure::Queue(queue))?;
        self.queues
            .get(&queue)
            .copied()
            .ok_or(Status::INVALID_COMMAND_QUEUE)
    }
}

/// Copy `items` into `out` if given; report how many are available.
fn fill_list<T: Copy>(items: &[T], out: Option<&mut [T]>) -> ApiResult<usize> {
    if let Some(out) = out {
        if out.is_empty() {
            return Err(Status::INVALID_VALUE);
        }
        let n = out.len().min(items.len());
        out[..n].copy_from_slice(&items[..n]);
    }
    Ok(items.len())
}

/// Copy an encoded attribute into `out` if given; report its size.
fn fill_value(bytes: &[u8], out: Option<&mut [u8]>) -> ApiResult<usize> {
    if let Some(out) = out {
        if out.len() < bytes.len() {
            return Err(Status::INVALID_VALUE);
        }
        out[..bytes.len()].copy_from_slice(bytes);
    }
    Ok(bytes.len())
}

impl ComputeApi for FakeApi {
    fn get_platform_ids(&self, out: Option<&mut [PlatformId]>) -> ApiResult<usize> {
        bump(&self.counters.platform_ids);
        self.check(|failure| *failure == Failure::PlatformIds)?;
        let ids: Vec<_> = self.platforms.iter().map(|entry| entry.id).collect();
        fill_list(&ids, out)
    }

    fn get_device_ids(
        &self,
        platform: PlatformId,
        device_type: DeviceType,
        out: Option<&mut [DeviceId]>,
    ) -> ApiResult<usize> {
        bump(&self.counters.device_ids);
        self.check(|failure| *failure == Failure::DeviceIds(platform))?;
        let entry = self.platform(platform)?;
        if device_type.bits() == 0 {
            return Err(Status::INVALID_DEVICE_TYPE);
        }
        let ids: Vec<_> = entry
            .devices
            .iter()
            .filter(|(_, info)| info.device_type.matches(device_type))
            .map(|(id, _)| *id)
            .collect();
        if ids.is_empty() {
            return Err(Status::DEVICE_NOT_FOUND);
        }
        fill_list(&ids, out)
    }

    fn get_platform_info(
        &self,
        platform: PlatformId,
        param: PlatformParam,
        out: Option<&mut [u8]>,
    ) -> ApiResult<usize> {
        bump(&self.counters.platform_info);
        self.check(|failure| *failure == Failure::PlatformInfo(platform))?;
        let entry = self.platform(platform)?;
        fill_value(&entry.info.raw(param), out)
    }

    fn get_device_info(
        &self,
        device: DeviceId,
        param: DeviceParam,
        out: Option<&mut [u8]>,
    ) -> ApiResult<usize> {
        bump(&self.counters.device_info);
        self.check(|failure| *failure == Failure::DeviceInfo(device, param))?;
        let info = self.device(device)?;
        fill_value(&info.raw(param), out)
    }
}

impl ProgramApi for FakeApi {
    fn create_program_with_source(
        &self,
        context: ContextId,
        sources: &[&str],
    ) -> ApiResult<ProgramId> {
        bump(&self.counters.create_program);
        self.check(|failure| *failure == Failure::CreateProgram)?;
        if !self.contexts.contains(&context) {
            return Err(Status::INVALID_CONTEXT);
        }
        if sources.is_empty() {
            return Err(Status::INVALID_VALUE);
        }
        let mut programs = self.programs.lock();
        let id = ProgramId(FIRST_PROGRAM + programs.len());
        programs.push(FakeProgram {
            context,
            source: sources.concat(),
        });
        Ok(id)
    }
}

impl QueueApi for FakeApi {
    fn queue_context(&self, queue: QueueId) -> ApiResult<ContextId> {
        self.queue(queue).map(|(context, _)| context)
    }

    fn queue_device(&self, queue: QueueId) -> ApiResult<DeviceId> {
        self.queue(queue).map(|(_, device)| device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FakeApi {
        FakeApi::new()
            .with_platform(FakePlatform::named("One").with_device(FakeDevice::cpu("cpu")))
            .with_platform(
                FakePlatform::named("Two")
                    .with_device(FakeDevice::gpu("gpu a"))
                    .with_device(FakeDevice::gpu("gpu b")),
            )
    }

    #[test]
    fn identities_follow_insertion_order() {
        let api = sample();
        let mut ids = [PlatformId::default(); 2];
        assert_eq!(api.get_platform_ids(Some(&mut ids[..])), Ok(2));
        assert_eq!(ids, [PlatformId(0x100), PlatformId(0x101)]);
        assert_eq!(
            api.all_device_ids(),
            [DeviceId(0x1000), DeviceId(0x1001), DeviceId(0x1002)]
        );
    }

    #[test]
    fn devices_report_owning_platform() {
        let api = sample();
        let mut buf = [0u8; std::mem::size_of::<usize>()];
        api.get_device_info(DeviceId(0x1002), DeviceParam::Platform, Some(&mut buf[..]))
            .expect("platform");
        assert_eq!(usize::from_ne_bytes(buf), 0x101);
    }

    #[test]
    fn device_filter_without_matches_is_not_found() {
        let api = sample();
        assert_eq!(
            api.get_device_ids(PlatformId(0x100), DeviceType::GPU, None),
            Err(Status::DEVICE_NOT_FOUND)
        );
        assert_eq!(
            api.get_device_ids(PlatformId(0x100), DeviceType(0), None),
            Err(Status::INVALID_DEVICE_TYPE)
        );
        assert_eq!(
            api.get_device_ids(PlatformId(7), DeviceType::ALL, None),
            Err(Status::INVALID_PLATFORM)
        );
    }

    #[test]
    fn short_value_buffer_is_rejected() {
        let api = sample();
        let mut buf = [0u8; 2];
        assert_eq!(
            api.get_platform_info(PlatformId(0x100), PlatformParam::Name, Some(&mut buf[..])),
            Err(Status::INVALID_VALUE)
        );
        assert_eq!(
            api.get_platform_info(PlatformId(0x100), PlatformParam::Name, None),
            Ok(4)
        );
    }

    #[test]
    fn injected_failure_fires_once() {
        let api = sample();
        api.fail_next(Failure::PlatformIds, Status::OUT_OF_RESOURCES);
        assert_eq!(api.get_platform_ids(None), Err(Status::OUT_OF_RESOURCES));
        assert_eq!(api.get_platform_ids(None), Ok(2));
        assert_eq!(api.calls().platform_ids, 2);
    }

    #[test]
    fn inventory_json_round_trips_through_api() {
        let json = r#"{
            "platforms": [
                { "name": "Replay", "vendor": "ACME",
                  "devices": [ { "name": "Tahiti", "device_type": 4,
                                 "max_work_item_dimensions": 2,
                                 "max_work_item_sizes": [256, 256] } ] },
                { "name": "Empty" }
            ]
        }"#;
        let api = FakeApi::from_json(json).expect("inventory");
        let inventory = api.inventory();
        assert_eq!(inventory.platforms.len(), 2);
        assert_eq!(inventory.platforms[0].info.vendor, "ACME");
        assert!(inventory.platforms[1].devices.is_empty());
        let device = &inventory.platforms[0].devices[0].info;
        assert_eq!(device.name, "Tahiti");
        assert_eq!(device.platform, PlatformId(0x100));
    }

    #[test]
    fn malformed_inventory_is_a_parse_error() {
        let err = FakeApi::from_json("{ \"platforms\": 3 }").unwrap_err();
        assert!(matches!(err, InventoryError::Parse(_)));
    }

    #[test]
    fn programs_need_a_known_context() {
        let api = FakeApi::new().with_context(ContextId(1));
        assert_eq!(
            api.create_program_with_source(ContextId(2), &["kernel"]),
            Err(Status::INVALID_CONTEXT)
        );
        let id = api
            .create_program_with_source(ContextId(1), &["a", "b"])
            .expect("program");
        let program = api.program(id).expect("stored");
        assert_eq!(program.source, "ab");
        assert_eq!(program.context, ContextId(1));
    }

    #[test]
    fn queue_lookup() {
        let api = sample().with_queue(QueueId(9), ContextId(1), DeviceId(0x1000));
        assert_eq!(api.queue_context(QueueId(9)), Ok(ContextId(1)));
        assert_eq!(api.queue_device(QueueId(9)), Ok(DeviceId(0x1000)));
        assert_eq!(api.queue_device(QueueId(8)), Err(Status::INVALID_COMMAND_QUEUE));
    }
}
