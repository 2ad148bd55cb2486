//! Platform and device discovery cache.
//!
//! A [`PlatformStore`] owns one Platform Cache: the list of platforms the
//! driver reported the first time anyone asked. Each platform record owns a
//! Device Cache, filled the first time any of its devices is needed, and
//! each record (platform or device) owns an attribute slot filled the first
//! time its attributes are needed.
//!
//! ```text
//! PlatformStore
//!   └─ platforms: OnceCell<Vec<PlatformRecord>>
//!        ├─ info:    OnceCell<PlatformInfo>
//!        └─ devices: OnceCell<Vec<DeviceRecord>>
//!             └─ info: OnceCell<DeviceInfo>
//! ```
//!
//! Every cell is written at most once. Population runs the driver query
//! without holding any lock and then commits; when two callers race, the
//! first commit wins and the other result is dropped. A failed query commits
//! nothing, so the same call can be retried. Committed vectors are never
//! touched again, which keeps every handed-out reference valid for as long
//! as the store lives.

mod device;
mod lookup;
mod platform;

use std::ops::Deref;

use once_cell::sync::OnceCell;

use crate::info::{DeviceInfo, PlatformInfo};
use crate::types::{DeviceId, PlatformId};

pub use lookup::parse_ordinal;

/// Store the first value offered to `cell` and return whichever value won.
fn commit<T>(cell: &OnceCell<T>, value: T) -> &T {
    match cell.try_insert(value) {
        Ok(stored) | Err((stored, _)) => stored,
    }
}

/// Cached state of one platform.
#[derive(Debug)]
pub struct PlatformRecord {
    id: PlatformId,
    info: OnceCell<PlatformInfo>,
    devices: OnceCell<Vec<DeviceRecord>>,
}

impl PlatformRecord {
    fn new(id: PlatformId) -> Self {
        Self {
            id,
            info: OnceCell::new(),
            devices: OnceCell::new(),
        }
    }

    /// Platform identity.
    #[must_use]
    pub const fn id(&self) -> PlatformId {
        self.id
    }

    /// Attributes, if already hydrated.
    #[must_use]
    pub fn info(&self) -> Option<&PlatformInfo> {
        self.info.get()
    }

    /// Whether attributes have been fetched.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.info.get().is_some()
    }

    /// The permanent device snapshot, if already taken.
    #[must_use]
    pub fn cached_devices(&self) -> Option<&[DeviceRecord]> {
        self.devices.get().map(Vec::as_slice)
    }
}

/// Cached state of one device.
#[derive(Debug)]
pub struct DeviceRecord {
    id: DeviceId,
    platform: PlatformId,
    info: OnceCell<DeviceInfo>,
}

impl DeviceRecord {
    fn new(id: DeviceId, platform: PlatformId) -> Self {
        Self {
            id,
            platform,
            info: OnceCell::new(),
        }
    }

    /// Device identity.
    #[must_use]
    pub const fn id(&self) -> DeviceId {
        self.id
    }

    /// Identity of the platform whose cache holds this device.
    #[must_use]
    pub const fn platform_id(&self) -> PlatformId {
        self.platform
    }

    /// Attributes, if already hydrated.
    #[must_use]
    pub fn info(&self) -> Option<&DeviceInfo> {
        self.info.get()
    }

    /// Whether attributes have been fetched.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.info.get().is_some()
    }
}

/// Process-scoped discovery cache over a platform API.
///
/// Production code typically keeps one store for the whole process (see
/// `opencl::global_store` with the `opencl` feature); tests build as many
/// isolated stores as they like.
#[derive(Debug)]
pub struct PlatformStore<A> {
    api: A,
    platforms: OnceCell<Vec<PlatformRecord>>,
}

impl<A> PlatformStore<A> {
    /// Create an empty store. Nothing is queried until first use.
    pub const fn new(api: A) -> Self {
        Self {
            api,
            platforms: OnceCell::new(),
        }
    }

    /// The underlying platform API.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Whether the platform list has been fetched.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.platforms.get().is_some()
    }
}

/// Read-only handle to a hydrated platform.
#[derive(Debug, Clone, Copy)]
pub struct PlatformRef<'a> {
    index: usize,
    record: &'a PlatformRecord,
    info: &'a PlatformInfo,
}

impl<'a> PlatformRef<'a> {
    /// Platform identity.
    #[must_use]
    pub const fn id(&self) -> PlatformId {
        self.record.id
    }

    /// Position in enumeration order.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Attributes, borrowed for the life of the store.
    #[must_use]
    pub const fn info(&self) -> &'a PlatformInfo {
        self.info
    }

    /// The underlying cache record.
    #[must_use]
    pub const fn record(&self) -> &'a PlatformRecord {
        self.record
    }
}

impl Deref for PlatformRef<'_> {
    type Target = PlatformInfo;

    fn deref(&self) -> &PlatformInfo {
        self.info
    }
}

/// Read-only handle to a hydrated device.
#[derive(Debug, Clone, Copy)]
pub struct DeviceRef<'a> {
    index: usize,
    platform: &'a PlatformRecord,
    record: &'a DeviceRecord,
    info: &'a DeviceInfo,
}

impl<'a> DeviceRef<'a> {
    /// Device identity.
    #[must_use]
    pub const fn id(&self) -> DeviceId {
        self.record.id
    }

    /// Position in the platform's device snapshot.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Identity of the owning platform.
    #[must_use]
    pub const fn platform_id(&self) -> PlatformId {
        self.platform.id
    }

    /// The owning platform's record.
    #[must_use]
    pub const fn platform(&self) -> &'a PlatformRecord {
        self.platform
    }

    /// Attributes, borrowed for the life of the store.
    #[must_use]
    pub const fn info(&self) -> &'a DeviceInfo {
        self.info
    }

    /// The underlying cache record.
    #[must_use]
    pub const fn record(&self) -> &'a DeviceRecord {
        self.record
    }
}

impl Deref for DeviceRef<'_> {
    type Target = DeviceInfo;

    fn deref(&self) -> &DeviceInfo {
        self.info
    }
}
