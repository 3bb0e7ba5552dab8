use std::sync::Arc;

use crate::convert::ReprConverter;
use crate::device::GpuContext;
use crate::error::ConvertError;
use crate::repr::{DeviceBufferRepr, RamRepr, Representation};

/// Uploads main-memory content into a compute storage buffer.
pub struct RamToDeviceBuffer {
    ctx: Arc<GpuContext>,
}

impl RamToDeviceBuffer {
    pub fn new(ctx: Arc<GpuContext>) -> Self {
        Self { ctx }
    }
}

impl ReprConverter<RamRepr, DeviceBufferRepr> for RamToDeviceBuffer {
    fn create(&self, source: &RamRepr) -> Result<DeviceBufferRepr, ConvertError> {
        DeviceBufferRepr::from_bytes(
            self.ctx.clone(),
            source.extent(),
            source.format(),
            source.bytes(),
        )
    }

    fn update(
        &self,
        source: &RamRepr,
        destination: &mut DeviceBufferRepr,
    ) -> Result<(), ConvertError> {
        destination.reallocate(source.extent(), source.format())?;
        destination.write_bytes(source.bytes())
    }
}

/// Reads a compute storage buffer back into main memory.
pub struct DeviceBufferToRam;

impl ReprConverter<DeviceBufferRepr, RamRepr> for DeviceBufferToRam {
    fn create(&self, source: &DeviceBufferRepr) -> Result<RamRepr, ConvertError> {
        RamRepr::from_bytes(source.extent(), source.format(), &source.read_bytes()?)
    }

    fn update(
        &self,
        source: &DeviceBufferRepr,
        destination: &mut RamRepr,
    ) -> Result<(), ConvertError> {
        if destination.extent() != source.extent() || destination.format() != source.format() {
            destination.reallocate(source.extent(), source.format());
        }
        destination.write_bytes(&source.read_bytes()?)
    }
}
