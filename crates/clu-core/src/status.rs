//! OpenCL status codes and their human-readable descriptions.

use serde::{Deserialize, Serialize};

/// Description returned for codes outside the known table.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// A raw status code as returned by the platform API.
///
/// Codes are carried verbatim: a failure reported by the driver reaches the
/// caller with exactly the value the driver produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(pub i32);

impl Status {
    /// `CL_SUCCESS`.
    pub const SUCCESS: Self = Self(0);
    /// `CL_DEVICE_NOT_FOUND`.
    pub const DEVICE_NOT_FOUND: Self = Self(-1);
    /// `CL_DEVICE_NOT_AVAILABLE`.
    pub const DEVICE_NOT_AVAILABLE: Self = Self(-2);
    /// `CL_COMPILER_NOT_AVAILABLE`.
    pub const COMPILER_NOT_AVAILABLE: Self = Self(-3);
    /// `CL_MEM_OBJECT_ALLOCATION_FAILURE`.
    pub const MEM_OBJECT_ALLOCATION_FAILURE: Self = Self(-4);
    /// `CL_OUT_OF_RESOURCES`.
    pub const OUT_OF_RESOURCES: Self = Self(-5);
    /// `CL_OUT_OF_HOST_MEMORY`.
    pub const OUT_OF_HOST_MEMORY: Self = Self(-6);
    /// `CL_BUILD_PROGRAM_FAILURE`.
    pub const BUILD_PROGRAM_FAILURE: Self = Self(-11);
    /// `CL_INVALID_VALUE`.
    pub const INVALID_VALUE: Self = Self(-30);
    /// `CL_INVALID_DEVICE_TYPE`.
    pub const INVALID_DEVICE_TYPE: Self = Self(-31);
    /// `CL_INVALID_PLATFORM`.
    pub const INVALID_PLATFORM: Self = Self(-32);
    /// `CL_INVALID_DEVICE`.
    pub const INVALID_DEVICE: Self = Self(-33);
    /// `CL_INVALID_CONTEXT`.
    pub const INVALID_CONTEXT: Self = Self(-34);
    /// `CL_INVALID_COMMAND_QUEUE`.
    pub const INVALID_COMMAND_QUEUE: Self = Self(-36);
    /// `CL_INVALID_PROGRAM`.
    pub const INVALID_PROGRAM: Self = Self(-44);
    /// `CL_INVALID_OPERATION`.
    pub const INVALID_OPERATION: Self = Self(-59);
    /// `CL_INVALID_PROPERTY`, the last code with a description.
    pub const INVALID_PROPERTY: Self = Self(-64);

    /// Raw integer value.
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Whether this is `CL_SUCCESS`.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Human-readable description, see [`error_string`].
    #[must_use]
    pub const fn description(self) -> &'static str {
        error_string(self.0)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.0)
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

/// Describe an OpenCL status code.
///
/// `0` is "no error". Positive codes, the unassigned range between
/// `-15` and `-29`, and anything below `-64` all map to [`UNKNOWN_ERROR`].
#[must_use]
pub const fn error_string(code: i32) -> &'static str {
    match code {
        0 => "no error",
        -1 => "device not found",
        -2 => "device not available",
        -3 => "compiler not available",
        -4 => "memory object allocation failure",
        -5 => "out of resources",
        -6 => "out of host memory",
        -7 => "profiling information not available",
        -8 => "memory copy overlap",
        -9 => "image format mismatch",
        -10 => "image format not supported",
        -11 => "build program failure",
        -12 => "map failure",
        -13 => "misaligned sub-buffer offset",
        -14 => "exec status error for events in wait list",
        -30 => "invalid value",
        -31 => "invalid device type",
        -32 => "invalid platform",
        -33 => "invalid device",
        -34 => "invalid context",
        -35 => "invalid queue properties",
        -36 => "invalid command queue",
        -37 => "invalid host pointer",
        -38 => "invalid memory object",
        -39 => "invalid image format descriptor",
        -40 => "invalid image size",
        -41 => "invalid sampler",
        -42 => "invalid binary",
        -43 => "invalid build options",
        -44 => "invalid program",
        -45 => "invalid program executable",
        -46 => "invalid kernel name",
        -47 => "invalid kernel definition",
        -48 => "invalid kernel",
        -49 => "invalid argument index",
        -50 => "invalid argument value",
        -51 => "invalid argument size",
        -52 => "invalid kernel arguments",
        -53 => "invalid work dimension",
        -54 => "invalid workgroup size",
        -55 => "invalid work-item size",
        -56 => "invalid global offset",
        -57 => "invalid event wait list",
        -58 => "invalid event",
        -59 => "invalid operation",
        -60 => "invalid GL object",
        -61 => "invalid buffer size",
        -62 => "invalid MIP level",
        -63 => "invalid global work size",
        -64 => "invalid property",
        _ => UNKNOWN_ERROR,
    }
}
