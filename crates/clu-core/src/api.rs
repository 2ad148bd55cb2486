//! The platform API consumed by the caches.
//!
//! Every entry point follows the OpenCL two-call convention: called without
//! an output buffer it reports how much data is available, called with one it
//! fills the buffer. The caches never repeat that dance themselves; they go
//! through the helpers in [`crate::query`].

use crate::status::Status;
use crate::types::{ContextId, DeviceId, DeviceType, PlatformId, ProgramId, QueueId};

/// Raw result of an API entry point.
pub type ApiResult<T> = std::result::Result<T, Status>;

/// Platform attribute selector (`cl_platform_info`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PlatformParam {
    /// `CL_PLATFORM_PROFILE`.
    Profile = 0x0900,
    /// `CL_PLATFORM_VERSION`.
    Version = 0x0901,
    /// `CL_PLATFORM_NAME`.
    Name = 0x0902,
    /// `CL_PLATFORM_VENDOR`.
    Vendor = 0x0903,
    /// `CL_PLATFORM_EXTENSIONS`.
    Extensions = 0x0904,
}

impl PlatformParam {
    /// Raw `cl_platform_info` value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Device attribute selector (`cl_device_info`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum DeviceParam {
    Type = 0x1000,
    VendorId = 0x1001,
    MaxComputeUnits = 0x1002,
    MaxWorkItemDimensions = 0x1003,
    MaxWorkGroupSize = 0x1004,
    MaxWorkItemSizes = 0x1005,
    PreferredVectorWidthChar = 0x1006,
    PreferredVectorWidthShort = 0x1007,
    PreferredVectorWidthInt = 0x1008,
    PreferredVectorWidthLong = 0x1009,
    PreferredVectorWidthFloat = 0x100A,
    PreferredVectorWidthDouble = 0x100B,
    MaxClockFrequency = 0x100C,
    AddressBits = 0x100D,
    MaxReadImageArgs = 0x100E,
    MaxWriteImageArgs = 0x100F,
    MaxMemAllocSize = 0x1010,
    Image2dMaxWidth = 0x1011,
    Image2dMaxHeight = 0x1012,
    Image3dMaxWidth = 0x1013,
    Image3dMaxHeight = 0x1014,
    Image3dMaxDepth = 0x1015,
    ImageSupport = 0x1016,
    MaxParameterSize = 0x1017,
    MaxSamplers = 0x1018,
    MemBaseAddrAlign = 0x1019,
    MinDataTypeAlignSize = 0x101A,
    SingleFpConfig = 0x101B,
    GlobalMemCacheType = 0x101C,
    GlobalMemCachelineSize = 0x101D,
    GlobalMemCacheSize = 0x101E,
    GlobalMemSize = 0x101F,
    MaxConstantBufferSize = 0x1020,
    MaxConstantArgs = 0x1021,
    LocalMemType = 0x1022,
    LocalMemSize = 0x1023,
    ErrorCorrectionSupport = 0x1024,
    ProfilingTimerResolution = 0x1025,
    EndianLittle = 0x1026,
    Available = 0x1027,
    CompilerAvailable = 0x1028,
    ExecutionCapabilities = 0x1029,
    QueueProperties = 0x102A,
    Name = 0x102B,
    Vendor = 0x102C,
    DriverVersion = 0x102D,
    Profile = 0x102E,
    Version = 0x102F,
    Extensions = 0x1030,
    Platform = 0x1031,
    PreferredVectorWidthHalf = 0x1034,
    HostUnifiedMemory = 0x1035,
    NativeVectorWidthChar = 0x1036,
    NativeVectorWidthShort = 0x1037,
    NativeVectorWidthInt = 0x1038,
    NativeVectorWidthLong = 0x1039,
    NativeVectorWidthFloat = 0x103A,
    NativeVectorWidthDouble = 0x103B,
    NativeVectorWidthHalf = 0x103C,
    OpenclCVersion = 0x103D,
}

impl DeviceParam {
    /// Raw `cl_device_info` value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Discovery and attribute queries against a compute platform driver.
///
/// Implementations report failures with the driver's own status code; the
/// caches forward those codes untouched.
pub trait ComputeApi {
    /// List platforms. Returns the number available; when `out` is given,
    /// fills as many entries as fit.
    fn get_platform_ids(&self, out: Option<&mut [PlatformId]>) -> ApiResult<usize>;

    /// List devices of `device_type` on `platform`, same convention as
    /// [`ComputeApi::get_platform_ids`].
    fn get_device_ids(
        &self,
        platform: PlatformId,
        device_type: DeviceType,
        out: Option<&mut [DeviceId]>,
    ) -> ApiResult<usize>;

    /// Query a platform attribute. Returns its size in bytes; when `out` is
    /// given it must be at least that large and receives the value.
    fn get_platform_info(
        &self,
        platform: PlatformId,
        param: PlatformParam,
        out: Option<&mut [u8]>,
    ) -> ApiResult<usize>;

    /// Query a device attribute, same convention as
    /// [`ComputeApi::get_platform_info`].
    fn get_device_info(
        &self,
        device: DeviceId,
        param: DeviceParam,
        out: Option<&mut [u8]>,
    ) -> ApiResult<usize>;
}

/// Program creation.
pub trait ProgramApi {
    /// Create a program in `context` from the concatenation of `sources`.
    fn create_program_with_source(
        &self,
        context: ContextId,
        sources: &[&str],
    ) -> ApiResult<ProgramId>;
}

/// Command queue introspection.
pub trait QueueApi {
    /// Context a queue was created in.
    fn queue_context(&self, queue: QueueId) -> ApiResult<ContextId>;

    /// Device a queue submits to.
    fn queue_device(&self, queue: QueueId) -> ApiResult<DeviceId>;
}

impl<A: ComputeApi + ?Sized> ComputeApi for &A {
    fn get_platform_ids(&self, out: Option<&mut [PlatformId]>) -> ApiResult<usize> {
        (**self).get_platform_ids(out)
    }

    fn get_device_ids(
        &self,
        platform: PlatformId,
        device_type: DeviceType,
        out: Option<&mut [DeviceId]>,
    ) -> ApiResult<usize> {
        (**self).get_device_ids(platform, device_type, out)
    }

    fn get_platform_info(
        &self,
        platform: PlatformId,
        param: PlatformParam,
        out: Option<&mut [u8]>,
    ) -> ApiResult<usize> {
        (**self).get_platform_info(platform, param, out)
    }

    fn get_device_info(
        &self,
        device: DeviceId,
        param: DeviceParam,
        out: Option<&mut [u8]>,
    ) -> ApiResult<usize> {
        (**self).get_device_info(device, param, out)
    }
}
