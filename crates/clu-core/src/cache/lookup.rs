//! Lookup facade: find a platform or device and hand back a hydrated handle.

use super::{DeviceRef, PlatformRef, PlatformStore};
use crate::api::ComputeApi;
use crate::error::{CluError, Result};
use crate::types::{DeviceId, PlatformId};

/// Parse a whole string as an unsigned ordinal, the way `strtoul(arg, 0)`
/// reads it when it consumes the entire string.
///
/// After optional leading whitespace and an optional `+` or `-` sign,
/// accepts decimal, `0x`/`0X` hexadecimal and leading-zero octal. Returns
/// `None` unless every remaining character is a digit of the detected base.
/// A minus sign negates modulo `usize`, and numbers too large for `usize`
/// saturate, so both still read as (out of range) ordinals. The empty
/// string is ordinal 0.
#[must_use]
pub fn parse_ordinal(arg: &str) -> Option<usize> {
    if arg.is_empty() {
        return Some(0);
    }
    let arg = arg.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, arg) = match arg.as_bytes().first() {
        Some(b'-') => (true, &arg[1..]),
        Some(b'+') => (false, &arg[1..]),
        _ => (false, arg),
    };
    let (digits, radix) = if let Some(hex) = arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        (hex, 16)
    } else if arg.len() > 1 && arg.starts_with('0') {
        (&arg[1..], 8)
    } else {
        (arg, 10)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let value = match usize::from_str_radix(digits, radix) {
        Ok(magnitude) if negative => magnitude.wrapping_neg(),
        Ok(magnitude) => magnitude,
        Err(_) => usize::MAX,
    };
    Some(value)
}

/// ASCII case-insensitive prefix test.
fn has_prefix_ignore_case(name: &str, prefix: &str) -> bool {
    name.as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

impl<A: ComputeApi> PlatformStore<A> {
    /// Platform with the given identity.
    ///
    /// # Errors
    ///
    /// `InvalidPlatform` if no cached platform has this identity, otherwise
    /// the driver's error.
    pub fn platform_by_id(&self, id: PlatformId) -> Result<PlatformRef<'_>> {
        let (index, record) = self.locate_platform(id)?;
        self.platform_handle(index, record)
    }

    /// First platform whose name starts with `name`, ignoring ASCII case.
    ///
    /// `None` or an empty name selects the first platform without looking
    /// at any name. Names are only known after hydration, so the scan
    /// hydrates every platform it passes.
    ///
    /// # Errors
    ///
    /// `InvalidPlatform` if nothing matches (or there are no platforms at
    /// all), otherwise the driver's error.
    pub fn platform_by_name(&self, name: Option<&str>) -> Result<PlatformRef<'_>> {
        let platforms = self.cached_platforms()?;
        let Some(name) = name.filter(|name| !name.is_empty()) else {
            let first = platforms
                .first()
                .ok_or_else(|| CluError::InvalidPlatform("no platforms available".to_string()))?;
            return self.platform_handle(0, first);
        };

        for (index, record) in platforms.iter().enumerate() {
            let platform = self.platform_handle(index, record)?;
            if has_prefix_ignore_case(&platform.name, name) {
                return Ok(platform);
            }
        }
        Err(CluError::InvalidPlatform(format!("no platform named '{name}'")))
    }

    /// Platform at zero-based position `index` in enumeration order.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if `index` is out of range, otherwise the driver's
    /// error.
    pub fn platform_by_index(&self, index: usize) -> Result<PlatformRef<'_>> {
        let platforms = self.cached_platforms()?;
        let record = platforms.get(index).ok_or_else(|| {
            CluError::InvalidValue(format!(
                "platform index {index} out of range ({} available)",
                platforms.len()
            ))
        })?;
        self.platform_handle(index, record)
    }

    /// Platform selected by a command-line style argument.
    ///
    /// An argument that is entirely a number (see [`parse_ordinal`]) selects
    /// by position, anything else by name.
    ///
    /// # Errors
    ///
    /// As [`PlatformStore::platform_by_index`] or
    /// [`PlatformStore::platform_by_name`].
    pub fn platform_from_arg(&self, arg: &str) -> Result<PlatformRef<'_>> {
        match parse_ordinal(arg) {
            Some(index) => self.platform_by_index(index),
            None => self.platform_by_name(Some(arg)),
        }
    }

    /// Device with the given identity on `platform`.
    ///
    /// # Errors
    ///
    /// `InvalidPlatform` or `InvalidDevice` if either is unknown, otherwise
    /// the driver's error.
    pub fn device_by_id(&self, platform: PlatformId, id: DeviceId) -> Result<DeviceRef<'_>> {
        let (_, record) = self.locate_platform(platform)?;
        self.device_handle(record, id)
    }

    /// Device at zero-based position `index` in the platform's snapshot.
    ///
    /// # Errors
    ///
    /// `InvalidPlatform` for an unknown platform, `InvalidValue` if `index`
    /// is out of range, otherwise the driver's error.
    pub fn device_by_index(&self, platform: PlatformId, index: usize) -> Result<DeviceRef<'_>> {
        let (_, record) = self.locate_platform(platform)?;
        let devices = record.ensure_devices(&self.api)?;
        let device = devices.get(index).ok_or_else(|| {
            CluError::InvalidValue(format!(
                "device index {index} out of range ({} available)",
                devices.len()
            ))
        })?;
        self.wrap_device(record, index, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeApi, FakeDevice, FakePlatform};
    use crate::status::Status;
    use crate::types::DeviceType;
    use test_case::test_case;

    fn vendors() -> FakeApi {
        FakeApi::new()
            .with_platform(FakePlatform::named("AMD Accelerated Parallel Processing"))
            .with_platform(
                FakePlatform::named("NVIDIA CUDA")
                    .with_device(FakeDevice::gpu("GeForce"))
                    .with_device(FakeDevice::gpu("Tesla")),
            )
            .with_platform(FakePlatform::named("Intel(R) OpenCL"))
    }

    #[test_case("12", Some(12) ; "decimal")]
    #[test_case("0", Some(0) ; "zero")]
    #[test_case("0x1f", Some(31) ; "hex")]
    #[test_case("0X10", Some(16) ; "upper hex")]
    #[test_case("017", Some(15) ; "octal")]
    #[test_case("  3", Some(3) ; "leading space")]
    #[test_case("99999999999999999999999999", Some(usize::MAX) ; "saturates")]
    #[test_case("+1", Some(1) ; "plus sign")]
    #[test_case(" +0x10", Some(16) ; "signed hex")]
    #[test_case("-0", Some(0) ; "negative zero")]
    #[test_case("-1", Some(usize::MAX) ; "minus wraps")]
    #[test_case("-99999999999999999999999999", Some(usize::MAX) ; "negative saturates")]
    #[test_case("", Some(0) ; "empty")]
    #[test_case("   ", None ; "only whitespace")]
    #[test_case("+", None ; "bare sign")]
    #[test_case("0x", None ; "bare hex prefix")]
    #[test_case("08", None ; "bad octal digit")]
    #[test_case("2nd", None ; "trailing text")]
    #[test_case("nvidia", None ; "name")]
    fn ordinal_parsing(arg: &str, expected: Option<usize>) {
        assert_eq!(parse_ordinal(arg), expected);
    }

    #[test_case("nvidia", "NVIDIA CUDA" ; "lowercase prefix")]
    #[test_case("AMD", "AMD Accelerated Parallel Processing" ; "exact case")]
    #[test_case("intel(r) opencl", "Intel(R) OpenCL" ; "full name")]
    fn name_prefix_matches(query: &str, expected: &str) {
        let api = vendors();
        let store = PlatformStore::new(&api);
        let platform = store.platform_by_name(Some(query)).expect("match");
        assert_eq!(platform.name, expected);
    }

    #[test]
    fn name_longer_than_platform_name_does_not_match() {
        let api = vendors();
        let store = PlatformStore::new(&api);
        let err = store.platform_by_name(Some("NVIDIA CUDA 12")).unwrap_err();
        assert_eq!(err.status(), Status::INVALID_PLATFORM);
    }

    #[test]
    fn empty_name_selects_first_without_scanning() {
        let api = vendors();
        let store = PlatformStore::new(&api);
        store.ensure_platforms().expect("enumerate");

        let first = store.platform_by_name(None).expect("first");
        assert_eq!(first.index(), 0);
        let ids = store.platform_ids().expect("ids");
        for id in &ids[1..] {
            let record = store.platform_record(*id).expect("enumerate").expect("record");
            assert!(!record.is_hydrated());
        }
        assert_eq!(store.platform_by_name(Some("")).expect("first").id(), first.id());
    }

    #[test]
    fn empty_name_without_platforms_fails() {
        let api = FakeApi::new();
        let store = PlatformStore::new(&api);
        let err = store.platform_by_name(None).unwrap_err();
        assert_eq!(err.status(), Status::INVALID_PLATFORM);
    }

    #[test]
    fn index_out_of_range_is_invalid_value() {
        let api = vendors();
        let store = PlatformStore::new(&api);
        let err = store.platform_by_index(3).unwrap_err();
        assert_eq!(err.status(), Status::INVALID_VALUE);
        assert!(matches!(err, CluError::InvalidValue(_)));
    }

    #[test]
    fn unknown_id_is_invalid_platform() {
        let api = vendors();
        let store = PlatformStore::new(&api);
        let err = store.platform_by_id(PlatformId(0xbad)).unwrap_err();
        assert_eq!(err.status(), Status::INVALID_PLATFORM);
    }

    #[test]
    fn arg_dispatches_on_numeric_form() {
        let api = vendors();
        let store = PlatformStore::new(&api);
        assert_eq!(
            store.platform_from_arg("1").expect("ordinal").id(),
            store.platform_by_index(1).expect("ordinal").id()
        );
        assert_eq!(
            store.platform_from_arg("intel").expect("name").id(),
            store.platform_by_name(Some("intel")).expect("name").id()
        );
        assert_eq!(
            store.platform_from_arg("7").unwrap_err().status(),
            Status::INVALID_VALUE
        );
    }

    #[test]
    fn arg_with_sign_selects_by_ordinal() {
        let api = vendors();
        let store = PlatformStore::new(&api);
        assert_eq!(store.platform_from_arg("+1").expect("ordinal").name, "NVIDIA CUDA");
        assert_eq!(store.platform_from_arg("-0").expect("ordinal").index(), 0);
        assert_eq!(
            store.platform_from_arg("-1").unwrap_err().status(),
            Status::INVALID_VALUE
        );
    }

    #[test]
    fn empty_arg_is_ordinal_zero() {
        let api = vendors();
        let store = PlatformStore::new(&api);
        assert_eq!(store.platform_from_arg("").expect("first").index(), 0);

        let empty = FakeApi::new();
        let store = PlatformStore::new(&empty);
        let err = store.platform_from_arg("").unwrap_err();
        assert!(matches!(err, CluError::InvalidValue(_)));
        assert_eq!(err.status(), Status::INVALID_VALUE);
    }

    #[test]
    fn device_lookup_by_id_and_index() {
        let api = vendors();
        let store = PlatformStore::new(&api);
        let platform = store.platform_by_name(Some("nvidia")).expect("platform").id();

        let tesla = store.device_by_index(platform, 1).expect("index");
        assert_eq!(tesla.name, "Tesla");
        assert_eq!(tesla.index(), 1);
        let same = store.device_by_id(platform, tesla.id()).expect("id");
        assert!(std::ptr::eq(same.info(), tesla.info()));

        let err = store.device_by_index(platform, 2).unwrap_err();
        assert_eq!(err.status(), Status::INVALID_VALUE);
        let err = store.device_by_id(platform, DeviceId(1)).unwrap_err();
        assert_eq!(err.status(), Status::INVALID_DEVICE);
    }

    #[test]
    fn device_lookup_on_platform_without_devices() {
        let api = vendors();
        let store = PlatformStore::new(&api);
        let platform = store.platform_by_index(0).expect("platform").id();
        let err = store.devices(platform, DeviceType::ALL).unwrap_err();
        assert_eq!(err.status(), Status::DEVICE_NOT_FOUND);
    }
}
