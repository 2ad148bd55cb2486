//! Descriptive attributes of platforms and devices.
//!
//! Both descriptors are fetched in one go by the caches and never change
//! afterwards.

use serde::{Deserialize, Serialize};

use crate::api::{ComputeApi, DeviceParam, PlatformParam};
use crate::error::Result;
use crate::query::{device_info, encode_sizes, platform_info, work_item_sizes, InfoValue};
use crate::types::{DeviceId, DeviceType, PlatformId};

/// Descriptive attributes of a platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformInfo {
    /// `FULL_PROFILE` or `EMBEDDED_PROFILE`.
    pub profile: String,
    /// OpenCL version string.
    pub version: String,
    /// Platform name.
    pub name: String,
    /// Platform vendor.
    pub vendor: String,
    /// Space-separated extension list.
    pub extensions: String,
}

impl PlatformInfo {
    /// Query every attribute of `platform`. Fails on the first failing query.
    pub(crate) fn fetch<A: ComputeApi + ?Sized>(api: &A, platform: PlatformId) -> Result<Self> {
        Ok(Self {
            profile: platform_info(api, platform, PlatformParam::Profile)?,
            version: platform_info(api, platform, PlatformParam::Version)?,
            name: platform_info(api, platform, PlatformParam::Name)?,
            vendor: platform_info(api, platform, PlatformParam::Vendor)?,
            extensions: platform_info(api, platform, PlatformParam::Extensions)?,
        })
    }

    /// Raw driver encoding of one attribute.
    #[must_use]
    pub fn raw(&self, param: PlatformParam) -> Vec<u8> {
        match param {
            PlatformParam::Profile => self.profile.to_bytes(),
            PlatformParam::Version => self.version.to_bytes(),
            PlatformParam::Name => self.name.to_bytes(),
            PlatformParam::Vendor => self.vendor.to_bytes(),
            PlatformParam::Extensions => self.extensions.to_bytes(),
        }
    }

    /// Whether `extension` appears in the extension list.
    #[must_use]
    pub fn has_extension(&self, extension: &str) -> bool {
        self.extensions.split_whitespace().any(|e| e == extension)
    }
}

macro_rules! device_info {
    ($($(#[$doc:meta])* $field:ident: $ty:ty = $param:ident,)*) => {
        /// Descriptive attributes of a device.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct DeviceInfo {
            $($(#[$doc])* pub $field: $ty,)*
            /// Maximum work items per dimension, one entry per dimension.
            pub max_work_item_sizes: Vec<usize>,
        }

        impl DeviceInfo {
            /// Query every attribute of `device`. Fails on the first failing
            /// query; nothing fetched so far is kept.
            pub(crate) fn fetch<A: ComputeApi + ?Sized>(api: &A, device: DeviceId) -> Result<Self> {
                let mut info = Self {
                    $($field: device_info(api, device, DeviceParam::$param)?,)*
                    max_work_item_sizes: Vec::new(),
                };
                info.max_work_item_sizes =
                    work_item_sizes(api, device, info.max_work_item_dimensions)?;
                Ok(info)
            }

            /// Raw driver encoding of one attribute.
            #[must_use]
            pub fn raw(&self, param: DeviceParam) -> Vec<u8> {
                match param {
                    $(DeviceParam::$param => self.$field.to_bytes(),)*
                    DeviceParam::MaxWorkItemSizes => encode_sizes(&self.max_work_item_sizes),
                }
            }
        }
    };
}

device_info! {
    /// Device type bitfield.
    device_type: DeviceType = Type,
    /// PCIe vendor identifier.
    vendor_id: u32 = VendorId,
    /// Parallel compute units.
    max_compute_units: u32 = MaxComputeUnits,
    /// Work-item dimensionality; length of `max_work_item_sizes`.
    max_work_item_dimensions: u32 = MaxWorkItemDimensions,
    /// Maximum work-items in a work-group.
    max_work_group_size: usize = MaxWorkGroupSize,
    /// Preferred `char` vector width.
    preferred_vector_width_char: u32 = PreferredVectorWidthChar,
    /// Preferred `short` vector width.
    preferred_vector_width_short: u32 = PreferredVectorWidthShort,
    /// Preferred `int` vector width.
    preferred_vector_width_int: u32 = PreferredVectorWidthInt,
    /// Preferred `long` vector width.
    preferred_vector_width_long: u32 = PreferredVectorWidthLong,
    /// Preferred `float` vector width.
    preferred_vector_width_float: u32 = PreferredVectorWidthFloat,
    /// Preferred `double` vector width, 0 without double support.
    preferred_vector_width_double: u32 = PreferredVectorWidthDouble,
    /// Maximum clock in MHz.
    max_clock_frequency: u32 = MaxClockFrequency,
    /// Address space width in bits.
    address_bits: u32 = AddressBits,
    /// Read-only image arguments per kernel.
    max_read_image_args: u32 = MaxReadImageArgs,
    /// Write-only image arguments per kernel.
    max_write_image_args: u32 = MaxWriteImageArgs,
    /// Largest single memory object in bytes.
    max_mem_alloc_size: u64 = MaxMemAllocSize,
    /// 2D image width limit in pixels.
    image2d_max_width: usize = Image2dMaxWidth,
    /// 2D image height limit in pixels.
    image2d_max_height: usize = Image2dMaxHeight,
    /// 3D image width limit in pixels.
    image3d_max_width: usize = Image3dMaxWidth,
    /// 3D image height limit in pixels.
    image3d_max_height: usize = Image3dMaxHeight,
    /// 3D image depth limit in pixels.
    image3d_max_depth: usize = Image3dMaxDepth,
    /// Whether images are supported.
    image_support: bool = ImageSupport,
    /// Kernel argument size limit in bytes.
    max_parameter_size: usize = MaxParameterSize,
    /// Samplers per kernel.
    max_samplers: u32 = MaxSamplers,
    /// Base address alignment in bits.
    mem_base_addr_align: u32 = MemBaseAddrAlign,
    /// Smallest alignment for any data type, in bytes.
    min_data_type_align_size: u32 = MinDataTypeAlignSize,
    /// Single precision capability bitfield.
    single_fp_config: u64 = SingleFpConfig,
    /// Global memory cache kind.
    global_mem_cache_type: u32 = GlobalMemCacheType,
    /// Global memory cache line in bytes.
    global_mem_cacheline_size: u32 = GlobalMemCachelineSize,
    /// Global memory cache in bytes.
    global_mem_cache_size: u64 = GlobalMemCacheSize,
    /// Global memory in bytes.
    global_mem_size: u64 = GlobalMemSize,
    /// Constant buffer limit in bytes.
    max_constant_buffer_size: u64 = MaxConstantBufferSize,
    /// Constant arguments per kernel.
    max_constant_args: u32 = MaxConstantArgs,
    /// Local memory kind.
    local_mem_type: u32 = LocalMemType,
    /// Local memory in bytes.
    local_mem_size: u64 = LocalMemSize,
    /// Whether memory is error-corrected.
    error_correction_support: bool = ErrorCorrectionSupport,
    /// Profiling timer resolution in nanoseconds.
    profiling_timer_resolution: usize = ProfilingTimerResolution,
    /// Whether the device is little-endian.
    endian_little: bool = EndianLittle,
    /// Whether the device is available.
    available: bool = Available,
    /// Whether a compiler is available.
    compiler_available: bool = CompilerAvailable,
    /// Execution capability bitfield.
    execution_capabilities: u64 = ExecutionCapabilities,
    /// Supported command queue properties.
    queue_properties: u64 = QueueProperties,
    /// Device name.
    name: String = Name,
    /// Device vendor.
    vendor: String = Vendor,
    /// Driver version.
    driver_version: String = DriverVersion,
    /// `FULL_PROFILE` or `EMBEDDED_PROFILE`.
    profile: String = Profile,
    /// OpenCL version string.
    version: String = Version,
    /// Space-separated extension list.
    extensions: String = Extensions,
    /// Platform reported by the driver.
    platform: PlatformId = Platform,
    /// Preferred `half` vector width.
    preferred_vector_width_half: u32 = PreferredVectorWidthHalf,
    /// Whether device and host share memory.
    host_unified_memory: bool = HostUnifiedMemory,
    /// Native `char` vector width.
    native_vector_width_char: u32 = NativeVectorWidthChar,
    /// Native `short` vector width.
    native_vector_width_short: u32 = NativeVectorWidthShort,
    /// Native `int` vector width.
    native_vector_width_int: u32 = NativeVectorWidthInt,
    /// Native `long` vector width.
    native_vector_width_long: u32 = NativeVectorWidthLong,
    /// Native `float` vector width.
    native_vector_width_float: u32 = NativeVectorWidthFloat,
    /// Native `double` vector width.
    native_vector_width_double: u32 = NativeVectorWidthDouble,
    /// Native `half` vector width.
    native_vector_width_half: u32 = NativeVectorWidthHalf,
    /// OpenCL C version string.
    opencl_c_version: String = OpenclCVersion,
}

impl DeviceInfo {
    /// Global memory in GiB.
    #[must_use]
    pub fn global_mem_gib(&self) -> f64 {
        self.global_mem_size as f64 / (1024.0 * 1024.0 * 1024.0)
    }

    /// Whether the device is a GPU.
    #[must_use]
    pub const fn is_gpu(&self) -> bool {
        self.device_type.intersects(DeviceType::GPU)
    }

    /// Whether `extension` appears in the extension list.
    #[must_use]
    pub fn has_extension(&self, extension: &str) -> bool {
        self.extensions.split_whitespace().any(|e| e == extension)
    }
}
