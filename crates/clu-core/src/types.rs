//! Opaque handles and the device type bitfield.

use serde::{Deserialize, Serialize};

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// Raw handle value.
            #[must_use]
            pub const fn raw(self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }
    };
}

handle!(
    /// Identity of a platform, stable for the life of the process.
    PlatformId
);
handle!(
    /// Identity of a device, stable for the life of the process.
    DeviceId
);
handle!(
    /// An OpenCL context.
    ContextId
);
handle!(
    /// An OpenCL command queue.
    QueueId
);
handle!(
    /// An OpenCL program object.
    ProgramId
);

/// Device type bitfield (`cl_device_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceType(pub u64);

impl DeviceType {
    /// `CL_DEVICE_TYPE_DEFAULT`.
    pub const DEFAULT: Self = Self(1 << 0);
    /// `CL_DEVICE_TYPE_CPU`.
    pub const CPU: Self = Self(1 << 1);
    /// `CL_DEVICE_TYPE_GPU`.
    pub const GPU: Self = Self(1 << 2);
    /// `CL_DEVICE_TYPE_ACCELERATOR`.
    pub const ACCELERATOR: Self = Self(1 << 3);
    /// `CL_DEVICE_TYPE_ALL`.
    pub const ALL: Self = Self(0xFFFF_FFFF);

    /// Raw bitfield.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether this is the unrestricted filter.
    #[must_use]
    pub const fn is_all(self) -> bool {
        self.0 == Self::ALL.0
    }

    /// Whether any bit of `other` is set in `self`.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether a device of this type is selected by `filter`.
    #[must_use]
    pub const fn matches(self, filter: Self) -> bool {
        filter.is_all() || self.intersects(filter)
    }

    /// Human-readable name, see [`device_type_string`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        device_type_string(self.0)
    }
}

impl std::ops::BitOr for DeviceType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::ALL),
            "default" => Ok(Self::DEFAULT),
            "cpu" => Ok(Self::CPU),
            "gpu" => Ok(Self::GPU),
            "accelerator" | "acc" => Ok(Self::ACCELERATOR),
            other => Err(format!("unknown device type '{other}'")),
        }
    }
}

const DEVICE_TYPE_NAMES: [&str; 17] = [
    "no device",
    "default",
    "CPU",
    "default CPU",
    "GPU",
    "default GPU",
    "CPU/GPU",
    "default CPU/GPU",
    "accelerator",
    "default accelerator",
    "CPU/accelerator",
    "default CPU/accelerator",
    "GPU/accelerator",
    "default GPU/accelerator",
    "CPU/GPU/accelerator",
    "default CPU/GPU/accelerator",
    "unknown",
];

/// Describe a device type bitfield.
///
/// Every combination of the default, CPU, GPU and accelerator bits has a
/// name; anything larger (including `CL_DEVICE_TYPE_ALL`) is "unknown".
#[must_use]
pub const fn device_type_string(bits: u64) -> &'static str {
    let last = DEVICE_TYPE_NAMES.len() - 1;
    let index = if bits > last as u64 { last } else { bits as usize };
    DEVICE_TYPE_NAMES[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, "no device" ; "empty")]
    #[test_case(2, "CPU" ; "cpu")]
    #[test_case(4, "GPU" ; "gpu")]
    #[test_case(5, "default GPU" ; "default gpu")]
    #[test_case(14, "CPU/GPU/accelerator" ; "three kinds")]
    #[test_case(15, "default CPU/GPU/accelerator" ; "last named")]
    #[test_case(16, "unknown" ; "custom bit")]
    #[test_case(0xFFFF_FFFF, "unknown" ; "all")]
    #[test_case(u64::MAX, "unknown" ; "max")]
    fn device_type_names(bits: u64, expected: &str) {
        assert_eq!(device_type_string(bits), expected);
    }

    #[test]
    fn filter_matching() {
        assert!(DeviceType::GPU.matches(DeviceType::ALL));
        assert!(DeviceType::GPU.matches(DeviceType::GPU));
        assert!((DeviceType::GPU | DeviceType::DEFAULT).matches(DeviceType::GPU));
        assert!(!DeviceType::CPU.matches(DeviceType::GPU));
        assert!(DeviceType::ALL.is_all());
    }

    #[test]
    fn parse_device_type() {
        assert_eq!("gpu".parse::<DeviceType>(), Ok(DeviceType::GPU));
        assert_eq!("ALL".parse::<DeviceType>(), Ok(DeviceType::ALL));
        assert!("fpga".parse::<DeviceType>().is_err());
    }

    #[test]
    fn handle_display_is_hex() {
        assert_eq!(PlatformId(0x10).to_string(), "0x10");
        assert_eq!(DeviceId(255).raw(), 255);
    }
}
