use core::any::Any;
use core::fmt;
use std::sync::Arc;

use crate::device::GpuContext;
use crate::error::ConvertError;
use crate::extent::{Extent, Rank};
use crate::format::{DataFormat, ScalarType};

use super::{ReprType, Representation};

/// Texture format that stores `format` without any value conversion.
///
/// Three-channel formats and `f64` have no such texture format.
pub fn texture_format_for(format: DataFormat) -> Option<wgpu::TextureFormat> {
    use wgpu::TextureFormat as T;

    let f = match (format.scalar(), format.channels()) {
        (ScalarType::U8, 1) => T::R8Uint,
        (ScalarType::U8, 2) => T::Rg8Uint,
        (ScalarType::U8, 4) => T::Rgba8Uint,
        (ScalarType::I8, 1) => T::R8Sint,
        (ScalarType::I8, 2) => T::Rg8Sint,
        (ScalarType::I8, 4) => T::Rgba8Sint,
        (ScalarType::U16, 1) => T::R16Uint,
        (ScalarType::U16, 2) => T::Rg16Uint,
        (ScalarType::U16, 4) => T::Rgba16Uint,
        (ScalarType::I16, 1) => T::R16Sint,
        (ScalarType::I16, 2) => T::Rg16Sint,
        (ScalarType::I16, 4) => T::Rgba16Sint,
        (ScalarType::U32, 1) => T::R32Uint,
        (ScalarType::U32, 2) => T::Rg32Uint,
        (ScalarType::U32, 4) => T::Rgba32Uint,
        (ScalarType::I32, 1) => T::R32Sint,
        (ScalarType::I32, 2) => T::Rg32Sint,
        (ScalarType::I32, 4) => T::Rgba32Sint,
        (ScalarType::F32, 1) => T::R32Float,
        (ScalarType::F32, 2) => T::Rg32Float,
        (ScalarType::F32, 4) => T::Rgba32Float,
        _ => return None,
    };
    Some(f)
}

/// GPU texture representation.
///
/// Texture dimension follows the extent rank: volumes become 3D textures,
/// layers 2D and element buffers 1D.
pub struct TextureRepr {
    ctx: Arc<GpuContext>,
    texture: wgpu::Texture,
    extent: Extent,
    format: DataFormat,
    allocations: u32,
}

impl TextureRepr {
    /// Allocates an uninitialized texture.
    pub fn new(
        ctx: Arc<GpuContext>,
        extent: Extent,
        format: DataFormat,
    ) -> Result<Self, ConvertError> {
        let texture = allocate(&ctx, extent, format)?;
        Ok(Self {
            ctx,
            texture,
            extent,
            format,
            allocations: 1,
        })
    }

    /// Allocates a texture and uploads `bytes` (tightly packed, native endian).
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
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[inline]
    pub fn ctx(&self) -> &Arc<GpuContext> {
        &self.ctx
    }

    /// Number of GPU allocations this representation has made, including the first.
    #[inline]
    pub fn allocations(&self) -> u32 {
        self.allocations
    }

    /// A default view over the whole texture, for binding in consumers' passes.
    pub fn create_view(&self) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Uploads tightly packed bytes over the whole texture.
    pub fn write_bytes(&self, bytes: &[u8]) -> Result<(), ConvertError> {
        let row_bytes = self.extent.width() * self.format.bytes_per_element() as u32;
        let expected = row_bytes as usize * self.extent.row_count() as usize;
        if bytes.len() != expected {
            return Err(ConvertError::ExtentMismatch {
                expected: format!("{expected} bytes"),
                got: self.extent,
            });
        }

        self.ctx.queue().write_texture(
            self.texture.as_image_copy(),
            bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(row_bytes),
                rows_per_image: Some(self.extent.height()),
            },
            extent_3d(self.extent),
        );
        Ok(())
    }

    /// Reads the texture back into tightly packed host bytes.
    pub fn read_bytes(&self) -> Result<Vec<u8>, ConvertError> {
        let bytes = self
            .ctx
            .read_texture(&self.texture, self.format.bytes_per_element() as u32)?;
        Ok(bytes)
    }

    /// Reallocates when extent or format differ; otherwise keeps the texture.
    pub(crate) fn reallocate(
        &mut self,
        extent: Extent,
        format: DataFormat,
    ) -> Result<(), ConvertError> {
        if extent == self.extent && format == self.format {
            return Ok(());
        }
        self.texture = allocate(&self.ctx, extent, format)?;
        self.allocations += 1;
        self.extent = extent;
        self.format = format;
        Ok(())
    }
}

pub(crate) fn extent_3d(extent: Extent) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: extent.width(),
        height: extent.height(),
        depth_or_array_layers: extent.depth(),
    }
}

fn allocate(
    ctx: &GpuContext,
    extent: Extent,
    format: DataFormat,
) -> Result<wgpu::Texture, ConvertError> {
    let alloc_err = |reason: String| ConvertError::Allocation {
        repr: "TextureRepr",
        extent,
        format,
        reason,
    };

    let tex_format = texture_format_for(format)
        .ok_or_else(|| alloc_err(format!("no texture format stores {format} exactly")))?;

    if extent.is_empty() {
        return Err(alloc_err("empty extent".into()));
    }

    let limits = ctx.limits();
    let (dimension, max_dim) = match extent.rank() {
        Rank::D1 => (wgpu::TextureDimension::D1, limits.max_texture_dimension_1d),
        Rank::D2 => (wgpu::TextureDimension::D2, limits.max_texture_dimension_2d),
        Rank::D3 => (wgpu::TextureDimension::D3, limits.max_texture_dimension_3d),
    };
    if extent.max_axis() > max_dim {
        return Err(alloc_err(format!("axis exceeds device limit {max_dim}")));
    }

    log::debug!("allocating {extent} {format} texture ({tex_format:?})");

    Ok(ctx.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("prism texture repr"),
        size: extent_3d(extent),
        mip_level_count: 1,
        sample_count: 1,
        dimension,
        format: tex_format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    }))
}

impl fmt::Debug for TextureRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureRepr")
            .field("extent", &self.extent)
            .field("format", &self.format)
            .field("texture_format", &self.texture.format())
            .finish()
    }
}

impl Representation for TextureRepr {
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
        let mut encoder = self.ctx.create_encoder("prism texture clone");
        encoder.copy_texture_to_texture(
            self.texture.as_image_copy(),
            copy.texture.as_image_copy(),
            extent_3d(self.extent),
        );
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
