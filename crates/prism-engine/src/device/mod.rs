//! Headless GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a surface
//! - flushing and waiting on submitted work
//! - scoped acquisition of resources shared between texture and compute work
//! - reading GPU storage back into host memory

mod context;
mod error;
mod init;
mod readback;
mod shared;

pub use context::GpuContext;
pub use error::DeviceError;
pub use init::GpuInit;
pub use readback::{align_to, padded_bytes_per_row};
pub use shared::SharedAccess;
