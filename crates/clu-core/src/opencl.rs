//! Live binding to the system OpenCL ICD loader.
//!
//! # Safety
//!
//! Every entry point here is a thin wrapper around one OpenCL call. Buffers
//! are always passed together with their true length, and handles cross the
//! boundary only as the opaque integers the driver handed out.
#![allow(unsafe_code)]

use std::ffi::c_void;
use std::os::raw::c_char;
use std::ptr;

use once_cell::sync::Lazy;
use opencl_sys::{
    clCreateProgramWithSource, clGetCommandQueueInfo, clGetDeviceIDs, clGetDeviceInfo,
    clGetPlatformIDs, clGetPlatformInfo, cl_command_queue, cl_context, cl_device_id, cl_int,
    cl_platform_id, cl_uint, CL_QUEUE_CONTEXT, CL_QUEUE_DEVICE, CL_SUCCESS,
};

use crate::api::{ApiResult, ComputeApi, DeviceParam, PlatformParam, ProgramApi, QueueApi};
use crate::cache::PlatformStore;
use crate::current::CurrentQueue;
use crate::status::Status;
use crate::types::{ContextId, DeviceId, DeviceType, PlatformId, ProgramId, QueueId};

/// Reported by the ICD loader when no vendor driver is installed.
const PLATFORM_NOT_FOUND_KHR: cl_int = -1001;

static STORE: Lazy<PlatformStore<OpenCl>> = Lazy::new(|| PlatformStore::new(OpenCl));
static CURRENT: Lazy<CurrentQueue> = Lazy::new(CurrentQueue::new);

/// The process-wide discovery cache over the live driver.
pub fn global_store() -> &'static PlatformStore<OpenCl> {
    &STORE
}

/// The process-wide current queue.
pub fn current_queue() -> &'static CurrentQueue {
    &CURRENT
}

fn check(status: cl_int) -> ApiResult<()> {
    if status == CL_SUCCESS {
        Ok(())
    } else {
        Err(Status(status))
    }
}

fn entries(len: usize) -> ApiResult<cl_uint> {
    cl_uint::try_from(len).map_err(|_| Status::INVALID_VALUE)
}

/// [`ComputeApi`] backed by the installed OpenCL runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCl;

impl ComputeApi for OpenCl {
    fn get_platform_ids(&self, out: Option<&mut [PlatformId]>) -> ApiResult<usize> {
        let mut count: cl_uint = 0;
        let status = match out {
            None => unsafe { clGetPlatformIDs(0, ptr::null_mut(), &mut count) },
            Some(out) => {
                let mut raw: Vec<cl_platform_id> = vec![ptr::null_mut(); out.len()];
                let status = unsafe { clGetPlatformIDs(entries(raw.len())?, raw.as_mut_ptr(), &mut count) };
                for (slot, handle) in out.iter_mut().zip(&raw) {
                    *slot = PlatformId(*handle as usize);
                }
                status
            }
        };
        if status == PLATFORM_NOT_FOUND_KHR {
            return Ok(0);
        }
        check(status)?;
        Ok(count as usize)
    }

    fn get_device_ids(
        &self,
        platform: PlatformId,
        device_type: DeviceType,
        out: Option<&mut [DeviceId]>,
    ) -> ApiResult<usize> {
        let handle = platform.raw() as cl_platform_id;
        let mut count: cl_uint = 0;
        match out {
            None => check(unsafe {
                clGetDeviceIDs(handle, device_type.bits(), 0, ptr::null_mut(), &mut count)
            })?,
            Some(out) => {
                let mut raw: Vec<cl_device_id> = vec![ptr::null_mut(); out.len()];
                check(unsafe {
                    clGetDeviceIDs(
                        handle,
                        device_type.bits(),
                        entries(raw.len())?,
                        raw.as_mut_ptr(),
                        &mut count,
                    )
                })?;
                for (slot, handle) in out.iter_mut().zip(&raw) {
                    *slot = DeviceId(*handle as usize);
                }
            }
        }
        Ok(count as usize)
    }

    fn get_platform_info(
        &self,
        platform: PlatformId,
        param: PlatformParam,
        out: Option<&mut [u8]>,
    ) -> ApiResult<usize> {
        let (len, value) = raw_out(out);
        let mut size = 0;
        check(unsafe {
            clGetPlatformInfo(platform.raw() as cl_platform_id, param.raw(), len, value, &mut size)
        })?;
        Ok(size)
    }

    fn get_device_info(
        &self,
        device: DeviceId,
        param: DeviceParam,
        out: Option<&mut [u8]>,
    ) -> ApiResult<usize> {
        let (len, value) = raw_out(out);
        let mut size = 0;
        check(unsafe {
            clGetDeviceInfo(device.raw() as cl_device_id, param.raw(), len, value, &mut size)
        })?;
        Ok(size)
    }
}

fn raw_out(out: Option<&mut [u8]>) -> (usize, *mut c_void) {
    match out {
        Some(buf) => (buf.len(), buf.as_mut_ptr().cast()),
        None => (0, ptr::null_mut()),
    }
}

impl ProgramApi for OpenCl {
    fn create_program_with_source(
        &self,
        context: ContextId,
        sources: &[&str],
    ) -> ApiResult<ProgramId> {
        let strings: Vec<*const c_char> = sources.iter().map(|s| s.as_ptr().cast()).collect();
        let lengths: Vec<usize> = sources.iter().map(|s| s.len()).collect();
        let mut status = CL_SUCCESS;
        let program = unsafe {
            clCreateProgramWithSource(
                context.raw() as cl_context,
                entries(strings.len())?,
                strings.as_ptr(),
                lengths.as_ptr(),
                &mut status,
            )
        };
        check(status)?;
        Ok(ProgramId(program as usize))
    }
}

fn queue_handle(queue: QueueId, param: cl_uint) -> ApiResult<usize> {
    let mut handle: *mut c_void = ptr::null_mut();
    check(unsafe {
        clGetCommandQueueInfo(
            queue.raw() as cl_command_queue,
            param,
            std::mem::size_of::<*mut c_void>(),
            ptr::addr_of_mut!(handle).cast(),
            ptr::null_mut(),
        )
    })?;
    Ok(handle as usize)
}

impl QueueApi for OpenCl {
    fn queue_context(&self, queue: QueueId) -> ApiResult<ContextId> {
        queue_handle(queue, CL_QUEUE_CONTEXT).map(ContextId)
    }

    fn queue_device(&self, queue: QueueId) -> ApiResult<DeviceId> {
        queue_handle(queue, CL_QUEUE_DEVICE).map(DeviceId)
    }
}
