//! Typed wrappers over the two-call query convention.
//!
//! Sized values (lists, strings, arrays) are fetched by asking for the size,
//! reserving a buffer of that size fallibly, then asking for the value.
//! Scalars are read directly into a buffer of their own width.

use std::mem::size_of;

use crate::api::{ApiResult, ComputeApi, DeviceParam, PlatformParam};
use crate::error::{CluError, Result};
use crate::types::{DeviceId, DeviceType, PlatformId};

pub(crate) const GET_PLATFORM_IDS: &str = "clGetPlatformIDs";
pub(crate) const GET_DEVICE_IDS: &str = "clGetDeviceIDs";
pub(crate) const GET_PLATFORM_INFO: &str = "clGetPlatformInfo";
pub(crate) const GET_DEVICE_INFO: &str = "clGetDeviceInfo";

/// A raw query bound to one entity and one parameter.
pub type RawQuery<'a, T> = dyn FnMut(Option<&mut [T]>) -> ApiResult<usize> + 'a;

/// Reserve room for `len` elements, reporting exhaustion instead of aborting.
pub(crate) fn try_with_capacity<T>(len: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| CluError::OutOfHostMemory {
            size: len.saturating_mul(size_of::<T>()),
        })?;
    Ok(buf)
}

/// Allocate `len` default elements, reporting exhaustion instead of aborting.
pub(crate) fn try_alloc<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut buf = try_with_capacity(len)?;
    buf.resize(len, T::default());
    Ok(buf)
}

/// Run a size-then-fill query and return exactly the filled prefix.
pub fn read_sized<T: Clone + Default>(call: &'static str, query: &mut RawQuery<'_, T>) -> Result<Vec<T>> {
    let len = query(None).map_err(|status| CluError::api(call, status))?;
    if len == 0 {
        return Ok(Vec::new());
    }
    let mut buf = try_alloc(len)?;
    let filled = query(Some(buf.as_mut_slice())).map_err(|status| CluError::api(call, status))?;
    buf.truncate(filled.min(len));
    Ok(buf)
}

/// Read a fixed-width value in a single call.
pub fn read_fixed<const N: usize>(call: &'static str, query: &mut RawQuery<'_, u8>) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    query(Some(&mut buf[..])).map_err(|status| CluError::api(call, status))?;
    Ok(buf)
}

/// A value that can be fetched through an info query and encoded back.
pub trait InfoValue: Sized {
    /// Fetch the value using the strategy appropriate for its type.
    fn fetch(call: &'static str, query: &mut RawQuery<'_, u8>) -> Result<Self>;

    /// Encode the value the way the driver lays it out.
    fn to_bytes(&self) -> Vec<u8>;
}

macro_rules! scalar_info {
    ($($ty:ty),* $(,)?) => {
        $(
            impl InfoValue for $ty {
                fn fetch(call: &'static str, query: &mut RawQuery<'_, u8>) -> Result<Self> {
                    read_fixed::<{ size_of::<$ty>() }>(call, query).map(<$ty>::from_ne_bytes)
                }

                fn to_bytes(&self) -> Vec<u8> {
                    self.to_ne_bytes().to_vec()
                }
            }
        )*
    };
}

scalar_info!(u32, u64, usize);

// cl_bool is a 32-bit integer
impl InfoValue for bool {
    fn fetch(call: &'static str, query: &mut RawQuery<'_, u8>) -> Result<Self> {
        u32::fetch(call, query).map(|raw| raw != 0)
    }

    fn to_bytes(&self) -> Vec<u8> {
        u32::from(*self).to_bytes()
    }
}

impl InfoValue for DeviceType {
    fn fetch(call: &'static str, query: &mut RawQuery<'_, u8>) -> Result<Self> {
        u64::fetch(call, query).map(DeviceType)
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }
}

impl InfoValue for PlatformId {
    fn fetch(call: &'static str, query: &mut RawQuery<'_, u8>) -> Result<Self> {
        usize::fetch(call, query).map(PlatformId)
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }
}

impl InfoValue for String {
    fn fetch(call: &'static str, query: &mut RawQuery<'_, u8>) -> Result<Self> {
        let mut bytes = read_sized(call, query)?;
        while bytes.last() == Some(&0) {
            bytes.pop();
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len() + 1);
        bytes.extend_from_slice(self.as_bytes());
        bytes.push(0);
        bytes
    }
}

/// Fetch one platform attribute.
pub fn platform_info<A, T>(api: &A, platform: PlatformId, param: PlatformParam) -> Result<T>
where
    A: ComputeApi + ?Sized,
    T: InfoValue,
{
    T::fetch(GET_PLATFORM_INFO, &mut |out| {
        api.get_platform_info(platform, param, out)
    })
}

/// Fetch one device attribute.
pub fn device_info<A, T>(api: &A, device: DeviceId, param: DeviceParam) -> Result<T>
where
    A: ComputeApi + ?Sized,
    T: InfoValue,
{
    T::fetch(GET_DEVICE_INFO, &mut |out| api.get_device_info(device, param, out))
}

/// Fetch `CL_DEVICE_MAX_WORK_ITEM_SIZES`, whose length is the device's
/// previously reported dimensionality.
pub fn work_item_sizes<A>(api: &A, device: DeviceId, dimensions: u32) -> Result<Vec<usize>>
where
    A: ComputeApi + ?Sized,
{
    const WORD: usize = size_of::<usize>();

    let len = dimensions as usize;
    if len == 0 {
        return Ok(Vec::new());
    }
    let mut sizes: Vec<usize> = try_alloc(len)?;
    let mut bytes: Vec<u8> = try_alloc(len.saturating_mul(WORD))?;
    api.get_device_info(device, DeviceParam::MaxWorkItemSizes, Some(bytes.as_mut_slice()))
        .map_err(|status| CluError::api(GET_DEVICE_INFO, status))?;

    for (slot, chunk) in sizes.iter_mut().zip(bytes.chunks_exact(WORD)) {
        let mut word = [0u8; WORD];
        word.copy_from_slice(chunk);
        *slot = usize::from_ne_bytes(word);
    }
    Ok(sizes)
}

/// Encode a work-item size array the way the driver lays it out.
#[must_use]
pub fn encode_sizes(sizes: &[usize]) -> Vec<u8> {
    sizes.iter().flat_map(|size| size.to_ne_bytes()).collect()
}

/// Enumerate every platform.
pub fn platform_ids<A: ComputeApi + ?Sized>(api: &A) -> Result<Vec<PlatformId>> {
    read_sized(GET_PLATFORM_IDS, &mut |out| api.get_platform_ids(out))
}

/// Enumerate the devices of `platform` selected by `device_type`.
pub fn device_ids<A: ComputeApi + ?Sized>(
    api: &A,
    platform: PlatformId,
    device_type: DeviceType,
) -> Result<Vec<DeviceId>> {
    read_sized(GET_DEVICE_IDS, &mut |out| {
        api.get_device_ids(platform, device_type, out)
    })
}
