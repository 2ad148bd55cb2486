//! # clu-core
//!
//! Platform and device discovery for OpenCL, with caching.
//!
//! The first question any OpenCL host program asks is "what hardware is
//! there?". Answering it takes a few dozen driver calls, each in the
//! size-then-fill style, and the answer never changes for the life of the
//! process. This crate asks once and keeps the answer:
//!
//! - a [`PlatformStore`] enumerates platforms and devices lazily and caches
//!   both the lists and every record's attributes;
//! - lookups by identity, name prefix, ordinal or free-form argument return
//!   read-only handles borrowed from the store;
//! - every failure maps back onto an OpenCL status code, which renders
//!   through [`error_string`].
//!
//! ## Features
//!
//! - `opencl` - live binding to the system ICD loader (`opencl::OpenCl`)
//!   and the process-wide [`opencl::global_store`].
//!
//! Without it, [`fake::FakeApi`] serves an in-memory inventory.
//!
//! ## Example
//!
//! ```rust
//! use clu_core::fake::{FakeApi, FakeDevice, FakePlatform};
//! use clu_core::{DeviceType, PlatformStore};
//!
//! let api = FakeApi::new().with_platform(
//!     FakePlatform::named("Example").with_device(FakeDevice::gpu("GPU 0")),
//! );
//! let store = PlatformStore::new(&api);
//!
//! let platform = store.platform_from_arg("ex").unwrap();
//! for device in store.devices(platform.id(), DeviceType::GPU).unwrap() {
//!     println!("{}: {} ({} CUs)", platform.name, device.name, device.max_compute_units);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │    Lookup facade (by id/name/ordinal)    │
//! └────────────────────┬─────────────────────┘
//!                      │
//! ┌────────────────────▼─────────────────────┐
//! │   PlatformStore: platform + device cache │
//! └────────────────────┬─────────────────────┘
//!                      │  query helpers
//! ┌────────────────────▼─────────────────────┐
//! │          ComputeApi (two-call)           │
//! └──────────┬─────────────────────┬─────────┘
//!            ▼                     ▼
//!        FakeApi            OpenCl (feature)
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod cache;
pub mod current;
pub mod error;
pub mod fake;
pub mod info;
#[cfg(feature = "opencl")]
pub mod opencl;
pub mod program;
pub mod query;
pub mod status;
pub mod types;

// Re-exports
pub use api::{ApiResult, ComputeApi, DeviceParam, PlatformParam, ProgramApi, QueueApi};
pub use cache::{parse_ordinal, DeviceRecord, DeviceRef, PlatformRecord, PlatformRef, PlatformStore};
pub use current::{CurrentQueue, QueueBinding};
pub use error::{CluError, Result};
pub use info::{DeviceInfo, PlatformInfo};
pub use program::{load_program, load_program_file, read_program_sources, ProgramSource};
pub use status::{error_string, Status};
pub use types::{device_type_string, ContextId, DeviceId, DeviceType, PlatformId, ProgramId, QueueId};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
