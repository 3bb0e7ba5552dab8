//! Device-side copies between textures and compute buffers.
//!
//! Both directions run inside a [`SharedAccess`](crate::device::SharedAccess)
//! scope: pending work on either resource is flushed before the copy and the
//! copy itself has completed when the converter returns.

use crate::convert::ReprConverter;
use crate::error::ConvertError;
use crate::extent::Extent;
use crate::repr::{extent_3d, texture_format_for, DeviceBufferRepr, Representation, TextureRepr};

/// Copies a texture into a tightly packed storage buffer.
pub struct TextureToDeviceBuffer;

impl ReprConverter<TextureRepr, DeviceBufferRepr> for TextureToDeviceBuffer {
    fn create(&self, source: &TextureRepr) -> Result<DeviceBufferRepr, ConvertError> {
        let mut buffer =
            DeviceBufferRepr::new(source.ctx().clone(), source.extent(), source.format())?;
        self.update(source, &mut buffer)?;
        Ok(buffer)
    }

    fn update(
        &self,
        source: &TextureRepr,
        destination: &mut DeviceBufferRepr,
    ) -> Result<(), ConvertError> {
        destination.reallocate(source.extent(), source.format())?;

        let ctx = source.ctx();
        let _shared = ctx.acquire_shared("texture -> device buffer")?;
        let mut encoder = ctx.create_encoder("prism texture to buffer");
        for region in copy_regions(source.extent(), source.format().bytes_per_element() as u32) {
            encoder.copy_texture_to_buffer(
                region.texture(source.texture()),
                region.buffer(destination.buffer()),
                region.size,
            );
        }
        ctx.submit(encoder);
        Ok(())
    }
}

/// Copies a tightly packed storage buffer into a texture.
pub struct DeviceBufferToTexture;

impl ReprConverter<DeviceBufferRepr, TextureRepr> for DeviceBufferToTexture {
    fn can_convert(&self, source: &DeviceBufferRepr) -> Result<(), String> {
        match texture_format_for(source.format()) {
            Some(_) => Ok(()),
            None => Err(format!("no texture format stores {} exactly", source.format())),
        }
    }

    fn create(&self, source: &DeviceBufferRepr) -> Result<TextureRepr, ConvertError> {
        let mut texture = TextureRepr::new(source.ctx().clone(), source.extent(), source.format())?;
        self.update(source, &mut texture)?;
        Ok(texture)
    }

    fn update(
        &self,
        source: &DeviceBufferRepr,
        destination: &mut TextureRepr,
    ) -> Result<(), ConvertError> {
        destination.reallocate(source.extent(), source.format())?;

        let ctx = source.ctx();
        let _shared = ctx.acquire_shared("device buffer -> texture")?;
        let mut encoder = ctx.create_encoder("prism buffer to texture");
        for region in copy_regions(source.extent(), source.format().bytes_per_element() as u32) {
            encoder.copy_buffer_to_texture(
                region.buffer(source.buffer()),
                region.texture(destination.texture()),
                region.size,
            );
        }
        ctx.submit(encoder);
        Ok(())
    }
}

/// One texture <-> buffer copy command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CopyRegion {
    origin: wgpu::Origin3d,
    offset: u64,
    bytes_per_row: Option<u32>,
    rows_per_image: Option<u32>,
    size: wgpu::Extent3d,
}

impl CopyRegion {
    fn texture<'t>(&self, texture: &'t wgpu::Texture) -> wgpu::TexelCopyTextureInfo<'t> {
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: self.origin,
            aspect: wgpu::TextureAspect::All,
        }
    }

    fn buffer<'b>(&self, buffer: &'b wgpu::Buffer) -> wgpu::TexelCopyBufferInfo<'b> {
        wgpu::TexelCopyBufferInfo {
            buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: self.offset,
                bytes_per_row: self.bytes_per_row,
                rows_per_image: self.rows_per_image,
            },
        }
    }
}

/// Copy commands covering `extent` with a tightly packed buffer layout.
///
/// Multi-row copies need a 256-byte aligned row pitch; otherwise every row
/// is copied on its own.
fn copy_regions(extent: Extent, bytes_per_element: u32) -> Vec<CopyRegion> {
    let row_bytes = extent.width() * bytes_per_element;
    let aligned = row_bytes % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT == 0;
    if aligned || extent.row_count() == 1 {
        // A single row carries no pitch at all.
        let (bytes_per_row, rows_per_image) = if aligned {
            (Some(row_bytes), Some(extent.height()))
        } else {
            (None, None)
        };
        return vec![CopyRegion {
            origin: wgpu::Origin3d::ZERO,
            offset: 0,
            bytes_per_row,
            rows_per_image,
            size: extent_3d(extent),
        }];
    }

    let mut regions = Vec::with_capacity(extent.row_count() as usize);
    for z in 0..extent.depth() {
        for y in 0..extent.height() {
            let row = (z * extent.height() + y) as u64;
            regions.push(CopyRegion {
                origin: wgpu::Origin3d { x: 0, y, z },
                offset: row * row_bytes as u64,
                bytes_per_row: None,
                rows_per_image: None,
                size: wgpu::Extent3d {
                    width: extent.width(),
                    height: 1,
                    depth_or_array_layers: 1,
                },
            });
        }
    }
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DataFormat;
    use crate::testing::gpu;

    #[test]
    fn aligned_rows_copy_in_one_command() {
        let regions = copy_regions(Extent::d2(64, 3), 4);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bytes_per_row, Some(256));
        assert_eq!(regions[0].rows_per_image, Some(3));
    }

    #[test]
    fn unaligned_rows_copy_one_by_one() {
        let regions = copy_regions(Extent::d3(3, 2, 2), 1);
        assert_eq!(regions.len(), 4);
        assert_eq!(regions[3].origin, wgpu::Origin3d { x: 0, y: 1, z: 1 });
        assert_eq!(regions[3].offset, 9);
        assert_eq!(regions[3].bytes_per_row, None);
    }

    #[test]
    fn single_row_needs_no_alignment() {
        let regions = copy_regions(Extent::d1(7), 2);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].size.width, 7);
        assert_eq!(regions[0].bytes_per_row, None);
    }

    #[test]
    fn texture_to_buffer_and_back_unaligned() {
        let Some(ctx) = gpu() else { return };
        let extent = Extent::d2(5, 3);
        let values: Vec<u8> = (0..15).collect();
        let tex = TextureRepr::from_bytes(ctx.clone(), extent, DataFormat::U8, &values).unwrap();

        let buf = TextureToDeviceBuffer.create(&tex).unwrap();
        assert_eq!(buf.read_bytes().unwrap(), values);
        assert_eq!(ctx.shared_active(), 0);

        let tex2 = DeviceBufferToTexture.create(&buf).unwrap();
        assert_eq!(tex2.read_bytes().unwrap(), values);
    }

    #[test]
    fn texture_to_buffer_aligned_volume() {
        let Some(ctx) = gpu() else { return };
        let extent = Extent::d3(64, 2, 2);
        let values: Vec<f32> = (0..256).map(|v| v as f32 - 128.0).collect();
        let tex =
            TextureRepr::from_bytes(ctx, extent, DataFormat::F32, bytemuck::cast_slice(&values)).unwrap();

        let buf = TextureToDeviceBuffer.create(&tex).unwrap();
        assert_eq!(buf.read_bytes().unwrap(), bytemuck::cast_slice::<f32, u8>(&values));
    }

    #[test]
    fn buffer_without_texture_format_is_rejected() {
        let Some(ctx) = gpu() else { return };
        let buf = DeviceBufferRepr::new(ctx, Extent::d1(4), DataFormat::of::<f64>(1).unwrap()).unwrap();
        assert!(DeviceBufferToTexture.can_convert(&buf).is_err());
    }
}
