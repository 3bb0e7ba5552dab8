use core::any::Any;
use core::fmt;
use std::sync::Arc;

use crate::device::{align_to, GpuContext};
use crate::error::ConvertError;
use crate::extent::Extent;
use crate::format::DataFormat;

use super::{ReprType, Representation};

/// Compute-device storage buffer representation.
///
/// Elements are tightly packed in x, y, z order. The allocation is padded up
/// to `wgpu::COPY_BUFFER_ALIGNMENT`; the padding is never part of the content.
pub struct DeviceBufferRepr {
    ctx: Arc<GpuContext>,
    buffer: wgpu::Buffer,
    extent: Extent,
    format: DataFormat,
    allocations: u32,
}

impl DeviceBufferRepr {
    /// Allocates a zero-initialized buffer.
    pub fn new(
        ctx: Arc<GpuContext>,
        extent: Extent,
        format: DataFormat,
    ) -> Result<Self, ConvertError> {
        let buffer = allocate(&ctx, extent, format)?;
        Ok(Self {
            ctx,
            buffer,
            extent,
            format,
            allocations: 1,
        })
    }

    /// Allocates a buffer and uploads `bytes` (tightly packed, native endian).
    pub fn from_bytes(
        ctx: Arc<GpuContext>,
        extent: Extent,
        format: DataFormat,
        bytes: &[u8],
    ) -> Result<Self, ConvertError> {
        let repr = Self::new(ctx, extent, format)?;
        repr.write_bytes(bytes)?;
        Ok(repr)
    }

    #[inline]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    #[inline]
    pub fn ctx(&self) -> &Arc<GpuContext> {
        &self.ctx
    }

    #[inline]
    pub fn allocations(&self) -> u32 {
        self.allocations
    }

    /// Content size in bytes (without alignment padding).
    #[inline]
    pub fn content_len(&self) -> u64 {
        content_len(self.extent, self.format)
    }

    /// Uploads tightly packed bytes over the whole content range.
    pub fn write_bytes(&self, bytes: &[u8]) -> Result<(), ConvertError> {
        let len = self.content_len() as usize;
        if bytes.len() != len {
            return Err(ConvertError::ExtentMismatch {
                expected: format!("{len} bytes"),
                got: self.extent,
            });
        }

        let aligned = align_to(len as u64, wgpu::COPY_BUFFER_ALIGNMENT) as usize;
        if aligned == len {
            self.ctx.queue().write_buffer(&self.buffer, 0, bytes);
        } else {
            // write_buffer needs an aligned size; pad the tail with zeros.
            let mut padded = Vec::with_capacity(aligned);
            padded.extend_from_slice(bytes);
            padded.resize(aligned, 0);
            self.ctx.queue().write_buffer(&self.buffer, 0, &padded);
        }
        Ok(())
    }

    /// Reads the content range back into host memory.
    pub fn read_bytes(&self) -> Result<Vec<u8>, ConvertError> {
        let len = self.content_len();
        let mut bytes = self.ctx.read_buffer(&self.buffer, self.buffer.size())?;
        bytes.truncate(len as usize);
        Ok(bytes)
    }

    /// Reallocates when the required size changes; otherwise keeps the buffer.
    pub(crate) fn reallocate(
        &mut self,
        extent: Extent,
        format: DataFormat,
    ) -> Result<(), ConvertError> {
        if extent == self.extent && format == self.format {
            return Ok(());
        }
        if allocation_size(extent, format) != self.buffer.size() {
            self.buffer = allocate(&self.ctx, extent, format)?;
            self.allocations += 1;
        }
        self.extent = extent;
        self.format = format;
        Ok(())
    }
}

fn content_len(extent: Extent, format: DataFormat) -> u64 {
    extent.element_count() as u64 * format.bytes_per_element() as u64
}

fn allocation_size(extent: Extent, format: DataFormat) -> u64 {
    align_to(content_len(extent, format), wgpu::COPY_BUFFER_ALIGNMENT)
        .max(wgpu::COPY_BUFFER_ALIGNMENT)
}

fn allocate(
    ctx: &GpuContext,
    extent: Extent,
    format: DataFormat,
) -> Result<wgpu::Buffer, ConvertError> {
    let size = allocation_size(extent, format);
    let max = ctx.limits().max_buffer_size;
    if size > max {
        return Err(ConvertError::Allocation {
            repr: "DeviceBufferRepr",
            extent,
            format,
            reason: format!("{size} bytes exceeds max_buffer_size {max}"),
        });
    }

    log::debug!("allocating {extent} {format} device buffer ({size} bytes)");

    Ok(ctx.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("prism device buffer repr"),
        size,
        usage: wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_SRC
            | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    }))
}

impl fmt::Debug for DeviceBufferRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBufferRepr")
            .field("extent", &self.extent)
            .field("format", &self.format)
            .field("size", &self.buffer.size())
            .finish()
    }
}

impl Representation for DeviceBufferRepr {
    fn repr_type(&self) -> ReprType {
        ReprType::of::<Self>()
    }

    fn extent(&self) -> Extent {
        self.extent
    }

    fn format(&self) -> DataFormat {
        self.format
    }

    fn try_clone(&self) -> Result<Box<dyn Representation>, ConvertError> {
        let copy = Self::new(self.ctx.clone(), self.extent, self.format)?;
        let mut encoder = self.ctx.create_encoder("prism device buffer clone");
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &copy.buffer, 0, self.buffer.size());
        self.ctx.submit(encoder);
        Ok(Box::new(copy))
    }

    fn set_extent(&mut self, extent: Extent) -> Result<(), ConvertError> {
        self.reallocate(extent, self.format)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::gpu;

    #[test]
    fn allocation_is_padded_to_copy_alignment() {
        assert_eq!(allocation_size(Extent::d1(3), DataFormat::U8), 4);
        assert_eq!(allocation_size(Extent::d1(0), DataFormat::U8), 4);
        assert_eq!(allocation_size(Extent::d2(4, 4), DataFormat::F32), 64);
    }

    #[test]
    fn odd_sized_payload_round_trips() {
        let Some(ctx) = gpu() else { return };
        let bytes = [7u8, 8, 9, 10, 11];
        let buf = DeviceBufferRepr::from_bytes(ctx, Extent::d1(5), DataFormat::U8, &bytes).unwrap();
        assert_eq!(buf.read_bytes().unwrap(), bytes);
    }

    #[test]
    fn clone_copies_content() {
        let Some(ctx) = gpu() else { return };
        let values: Vec<i32> = (-8..8).collect();
        let buf = DeviceBufferRepr::from_bytes(
            ctx,
            Extent::d2(4, 4),
            DataFormat::of::<i32>(1).unwrap(),
            bytemuck::cast_slice(&values),
        )
        .unwrap();
        let copy = buf.try_clone().unwrap();
        let copy = copy.downcast_ref::<DeviceBufferRepr>().unwrap();
        assert_eq!(copy.read_bytes().unwrap(), bytemuck::cast_slice::<i32, u8>(&values));
    }

    #[test]
    fn same_size_reallocate_keeps_buffer() {
        let Some(ctx) = gpu() else { return };
        let mut buf = DeviceBufferRepr::new(ctx, Extent::d2(4, 4), DataFormat::F32).unwrap();
        buf.reallocate(Extent::d2(2, 8), DataFormat::F32).unwrap();
        assert_eq!(buf.allocations(), 1);
        buf.set_extent(Extent::d2(8, 8)).unwrap();
        assert_eq!(buf.allocations(), 2);
    }
}
