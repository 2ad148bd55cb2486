//! Device Cache population and device hydration.
//!
//! Only an unrestricted (`CL_DEVICE_TYPE_ALL`) listing is ever stored. A
//! filtered listing is a one-off view and leaves the cache untouched.

use tracing::debug;

use super::{commit, DeviceRecord, DeviceRef, PlatformRecord, PlatformStore};
use crate::api::ComputeApi;
use crate::error::{CluError, Result};
use crate::info::DeviceInfo;
use crate::query::{self, try_with_capacity, GET_DEVICE_IDS};
use crate::types::{DeviceId, DeviceType, PlatformId};

impl DeviceRecord {
    /// Fetch attributes unless already present.
    ///
    /// On failure nothing is stored and a later call retries from scratch.
    pub(crate) fn hydrate<A: ComputeApi + ?Sized>(&self, api: &A) -> Result<&DeviceInfo> {
        if let Some(info) = self.info.get() {
            return Ok(info);
        }
        let fetched = DeviceInfo::fetch(api, self.id)?;
        debug!(device = %self.id, name = %fetched.name, kind = %fetched.device_type, "hydrated device");
        Ok(commit(&self.info, fetched))
    }
}

impl PlatformRecord {
    /// The permanent device snapshot, taking it on first use.
    pub(crate) fn ensure_devices<A: ComputeApi + ?Sized>(&self, api: &A) -> Result<&[DeviceRecord]> {
        if let Some(devices) = self.devices.get() {
            return Ok(devices.as_slice());
        }
        let ids = query::device_ids(api, self.id, DeviceType::ALL)?;
        self.commit_devices(ids)
    }

    fn commit_devices(&self, ids: Vec<DeviceId>) -> Result<&[DeviceRecord]> {
        let mut records = try_with_capacity(ids.len())?;
        records.extend(ids.into_iter().map(|id| DeviceRecord::new(id, self.id)));
        debug!(platform = %self.id, count = records.len(), "enumerated devices");
        Ok(commit(&self.devices, records).as_slice())
    }

    /// Locate a device in the snapshot, taking the snapshot if needed.
    fn locate_device<A: ComputeApi + ?Sized>(
        &self,
        api: &A,
        id: DeviceId,
    ) -> Result<Option<(usize, &DeviceRecord)>> {
        Ok(self
            .ensure_devices(api)?
            .iter()
            .enumerate()
            .find(|(_, record)| record.id == id))
    }
}

impl<A: ComputeApi> PlatformStore<A> {
    /// Device identities of `platform` selected by `filter`.
    ///
    /// With [`DeviceType::ALL`] the answer comes from the platform's device
    /// snapshot, which is taken from this very query if it does not exist
    /// yet. Any narrower filter performs a fresh driver query whose result is
    /// returned but never cached.
    ///
    /// # Errors
    ///
    /// `InvalidPlatform` for an unknown platform, otherwise the driver's
    /// error.
    pub fn device_ids(&self, platform: PlatformId, filter: DeviceType) -> Result<Vec<DeviceId>> {
        let (_, record) = self.locate_platform(platform)?;
        if filter.is_all() {
            let devices = record.ensure_devices(&self.api)?;
            let mut ids = try_with_capacity(devices.len())?;
            ids.extend(devices.iter().map(DeviceRecord::id));
            return Ok(ids);
        }
        query::device_ids(&self.api, platform, filter)
    }

    /// Number of devices of `platform` selected by `filter`.
    ///
    /// A filtered count is a single size-only driver query.
    ///
    /// # Errors
    ///
    /// `InvalidPlatform` for an unknown platform, otherwise the driver's
    /// error.
    pub fn device_count(&self, platform: PlatformId, filter: DeviceType) -> Result<usize> {
        let (_, record) = self.locate_platform(platform)?;
        if filter.is_all() {
            return record.ensure_devices(&self.api).map(<[DeviceRecord]>::len);
        }
        self.api
            .get_device_ids(platform, filter, None)
            .map_err(|status| CluError::api(GET_DEVICE_IDS, status))
    }

    /// Devices of `platform` selected by `filter`, hydrated, in the order
    /// the driver lists them.
    ///
    /// # Errors
    ///
    /// `InvalidPlatform` for an unknown platform, `InvalidDevice` if the
    /// driver lists a device missing from the snapshot, otherwise the first
    /// driver error.
    pub fn devices(&self, platform: PlatformId, filter: DeviceType) -> Result<Vec<DeviceRef<'_>>> {
        let (_, record) = self.locate_platform(platform)?;
        record.ensure_devices(&self.api)?;
        let ids = self.device_ids(platform, filter)?;

        let mut handles = try_with_capacity(ids.len())?;
        for id in ids {
            handles.push(self.device_handle(record, id)?);
        }
        Ok(handles)
    }

    /// Find a cached device by identity without hydrating it.
    ///
    /// # Errors
    ///
    /// `InvalidPlatform` for an unknown platform, otherwise the driver's
    /// error if the device snapshot cannot be taken.
    pub fn device_record(&self, platform: PlatformId, id: DeviceId) -> Result<Option<&DeviceRecord>> {
        let (_, record) = self.locate_platform(platform)?;
        Ok(record.locate_device(&self.api, id)?.map(|(_, device)| device))
    }

    /// Hydrate the device `id` of `platform` and wrap it in a handle.
    pub(crate) fn device_handle<'a>(
        &'a self,
        platform: &'a PlatformRecord,
        id: DeviceId,
    ) -> Result<DeviceRef<'a>> {
        let (index, record) = platform
            .locate_device(&self.api, id)?
            .ok_or_else(|| {
                CluError::InvalidDevice(format!("no device {id} on platform {}", platform.id))
            })?;
        self.wrap_device(platform, index, record)
    }

    pub(crate) fn wrap_device<'a>(
        &'a self,
        platform: &'a PlatformRecord,
        index: usize,
        record: &'a DeviceRecord,
    ) -> Result<DeviceRef<'a>> {
        let info = record.hydrate(&self.api)?;
        Ok(DeviceRef {
            index,
            platform,
            record,
            info,
        })
    }
}
