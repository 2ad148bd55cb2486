//! Platform Cache population and platform hydration.

use tracing::debug;

use super::{commit, PlatformRecord, PlatformRef, PlatformStore};
use crate::api::ComputeApi;
use crate::error::{CluError, Result};
use crate::info::PlatformInfo;
use crate::query::{self, try_with_capacity};
use crate::types::PlatformId;

impl PlatformRecord {
    /// Fetch attributes unless already present.
    ///
    /// On failure nothing is stored and a later call retries from scratch.
    pub(crate) fn hydrate<A: ComputeApi + ?Sized>(&self, api: &A) -> Result<&PlatformInfo> {
        if let Some(info) = self.info.get() {
            return Ok(info);
        }
        let fetched = PlatformInfo::fetch(api, self.id)?;
        debug!(platform = %self.id, name = %fetched.name, "hydrated platform");
        Ok(commit(&self.info, fetched))
    }
}

impl<A: ComputeApi> PlatformStore<A> {
    /// The cached platform list, enumerating on first use.
    pub(crate) fn cached_platforms(&self) -> Result<&[PlatformRecord]> {
        if let Some(platforms) = self.platforms.get() {
            return Ok(platforms.as_slice());
        }
        let ids = query::platform_ids(&self.api)?;
        let mut records = try_with_capacity(ids.len())?;
        records.extend(ids.into_iter().map(PlatformRecord::new));
        debug!(count = records.len(), "enumerated platforms");
        Ok(commit(&self.platforms, records).as_slice())
    }

    /// Make sure the platform list is cached and return its length.
    ///
    /// Only the first successful call reaches the driver.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if enumeration fails; the cache stays
    /// empty and the call may be retried.
    pub fn ensure_platforms(&self) -> Result<usize> {
        self.cached_platforms().map(<[PlatformRecord]>::len)
    }

    /// Find a cached platform by identity without hydrating it.
    ///
    /// # Errors
    ///
    /// Returns an error only if the platform list cannot be enumerated.
    pub fn platform_record(&self, id: PlatformId) -> Result<Option<&PlatformRecord>> {
        Ok(self.cached_platforms()?.iter().find(|record| record.id == id))
    }

    /// Locate a cached platform by identity.
    pub(crate) fn locate_platform(&self, id: PlatformId) -> Result<(usize, &PlatformRecord)> {
        self.cached_platforms()?
            .iter()
            .enumerate()
            .find(|(_, record)| record.id == id)
            .ok_or_else(|| CluError::InvalidPlatform(format!("no platform with id {id}")))
    }

    /// Hydrate the record at `index` and wrap it in a handle.
    pub(crate) fn platform_handle<'a>(
        &'a self,
        index: usize,
        record: &'a PlatformRecord,
    ) -> Result<PlatformRef<'a>> {
        let info = record.hydrate(&self.api)?;
        Ok(PlatformRef {
            index,
            record,
            info,
        })
    }

    /// Identities of every platform, in enumeration order.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if enumeration fails.
    pub fn platform_ids(&self) -> Result<Vec<PlatformId>> {
        let platforms = self.cached_platforms()?;
        let mut ids = try_with_capacity(platforms.len())?;
        ids.extend(platforms.iter().map(PlatformRecord::id));
        Ok(ids)
    }

    /// Every platform, hydrated, in enumeration order.
    ///
    /// # Errors
    ///
    /// Returns the first enumeration or hydration failure.
    pub fn platforms(&self) -> Result<Vec<PlatformRef<'_>>> {
        let platforms = self.cached_platforms()?;
        let mut handles = try_with_capacity(platforms.len())?;
        for (index, record) in platforms.iter().enumerate() {
            handles.push(self.platform_handle(index, record)?);
        }
        Ok(handles)
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::PlatformStore;
    use crate::error::CluError;
    use crate::fake::{FakeApi, FakePlatform, Failure};
    use crate::status::Status;
    use crate::types::PlatformId;

    fn two_platforms() -> FakeApi {
        FakeApi::new()
            .with_platform(FakePlatform::named("Alpha"))
            .with_platform(FakePlatform::named("Beta"))
    }

    #[test]
    fn enumeration_is_cached() {
        let api = two_platforms();
        let store = PlatformStore::new(&api);

        assert!(!store.is_populated());
        assert_eq!(store.ensure_platforms(), Ok(2));
        let calls = api.calls().platform_ids;
        assert_eq!(store.ensure_platforms(), Ok(2));
        assert_eq!(store.platform_ids().expect("ids").len(), 2);
        assert_eq!(api.calls().platform_ids, calls);
        assert!(store.is_populated());
    }

    #[test]
    fn failed_enumeration_can_be_retried() {
        let api = two_platforms();
        api.fail_next(Failure::PlatformIds, Status::OUT_OF_RESOURCES);
        let store = PlatformStore::new(&api);

        let err = store.ensure_platforms().unwrap_err();
        assert_eq!(err.status(), Status::OUT_OF_RESOURCES);
        assert!(!store.is_populated());

        assert_eq!(store.ensure_platforms(), Ok(2));
    }

    #[test]
    fn records_start_unhydrated() {
        let api = two_platforms();
        let store = PlatformStore::new(&api);
        let ids = store.platform_ids().expect("ids");

        let record = store.platform_record(ids[0]).expect("enumerate").expect("record");
        assert!(!record.is_hydrated());
        assert!(record.info().is_none());
        assert_eq!(api.calls().platform_info, 0);
    }

    #[test]
    fn unknown_platform_record_is_none() {
        let api = two_platforms();
        let store = PlatformStore::new(&api);
        assert!(store
            .platform_record(PlatformId(0xdead))
            .expect("enumerate")
            .is_none());
    }

    #[test]
    fn platforms_hydrates_all() {
        let api = two_platforms();
        let store = PlatformStore::new(&api);

        let names: Vec<_> = store
            .platforms()
            .expect("platforms")
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, ["Alpha", "Beta"]);
    }

    #[test]
    fn failed_hydration_leaves_record_unhydrated() {
        let api = two_platforms();
        let store = PlatformStore::new(&api);
        let id = store.platform_ids().expect("ids")[1];
        api.fail_next(Failure::PlatformInfo(id), Status::INVALID_VALUE);

        let err = store.platform_by_id(id).unwrap_err();
        assert!(matches!(err, CluError::Api { status: Status::INVALID_VALUE, .. }));
        let record = store.platform_record(id).expect("enumerate").expect("record");
        assert!(!record.is_hydrated());

        let platform = store.platform_by_id(id).expect("retry");
        assert_eq!(platform.name, "Beta");
    }

    #[test]
    fn empty_platform_list() {
        let api = FakeApi::new();
        let store = PlatformStore::new(&api);
        assert_eq!(store.ensure_platforms(), Ok(0));
        assert!(store.platforms().expect("platforms").is_empty());
    }
}
