//! Converters between the engine's own backends.
//!
//! Host converters need nothing but the filesystem. Device converters hold an
//! `Arc<GpuContext>` for the destinations they allocate.

mod disk_ram;
mod ram_buffer;
mod ram_texture;
mod texture_buffer;

use std::sync::Arc;

use crate::device::GpuContext;

use super::{typed, ConverterRegistry};

pub use disk_ram::DiskToRam;
pub use ram_buffer::{DeviceBufferToRam, RamToDeviceBuffer};
pub use ram_texture::{RamToTexture, TextureToRam};
pub use texture_buffer::{DeviceBufferToTexture, TextureToDeviceBuffer};

/// Registers the converters that need no device.
pub fn register_host(registry: &mut ConverterRegistry) {
    registry.register(typed(DiskToRam));
}

/// Registers the converters to, from and between device representations.
pub fn register_gpu(registry: &mut ConverterRegistry, ctx: &Arc<GpuContext>) {
    registry.register(typed(RamToTexture::new(ctx.clone())));
    registry.register(typed(TextureToRam));
    registry.register(typed(RamToDeviceBuffer::new(ctx.clone())));
    registry.register(typed(DeviceBufferToRam));
    registry.register(typed(TextureToDeviceBuffer));
    registry.register(typed(DeviceBufferToTexture));
}
