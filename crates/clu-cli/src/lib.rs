//! # clu-cli
//!
//! The `clu` command-line inspector for OpenCL platforms and devices.
//!
//! Provides commands for:
//! - Listing platforms with their device counts
//! - Listing the devices of a platform, optionally filtered by type
//! - Dumping every attribute of one device
//! - Describing OpenCL status codes
//!
//! # Architecture
//!
//! Every command reads from a [`clu_core::PlatformStore`]. The store is
//! backed either by a JSON inventory (`--inventory`) replayed through
//! [`clu_core::fake::FakeApi`], or, with the `opencl` feature, by the
//! installed driver.
//!
//! ```text
//! ┌───────────┐               ┌───────────────┐     ┌──────────────────┐
//! │  clu-cli  │──────────────►│ PlatformStore │────►│ inventory / ICD  │
//! └───────────┘               └───────────────┘     └──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, DeviceArgs, DevicesArgs, Format, PlatformArg};
pub use error::CliError;
pub use output::OutputFormat;
