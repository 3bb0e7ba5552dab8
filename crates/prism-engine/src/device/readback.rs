use std::sync::mpsc;

use super::{DeviceError, GpuContext};

/// Rounds `value` up to a multiple of `alignment` (a power of two).
#[inline]
pub const fn align_to(value: u64, alignment: u64) -> u64 {
    (value + alignment - 1) & !(alignment - 1)
}

/// Row pitch accepted by texture <-> buffer copies spanning several rows.
#[inline]
pub const fn padded_bytes_per_row(row_bytes: u32) -> u32 {
    align_to(row_bytes as u64, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64) as u32
}

impl GpuContext {
    /// Copies the first `size` bytes of `buffer` into host memory.
    ///
    /// `buffer` needs `COPY_SRC`; `size` must be a multiple of
    /// `wgpu::COPY_BUFFER_ALIGNMENT`.
    pub fn read_buffer(&self, buffer: &wgpu::Buffer, size: u64) -> Result<Vec<u8>, DeviceError> {
        let staging = self.staging_buffer("prism readback staging", size);

        let mut encoder = self.create_encoder("prism buffer readback");
        encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, size);
        self.submit(encoder);

        self.map_staging(&staging)
    }

    /// Copies mip level 0 of `texture` into tightly packed host memory.
    pub fn read_texture(
        &self,
        texture: &wgpu::Texture,
        bytes_per_texel: u32,
    ) -> Result<Vec<u8>, DeviceError> {
        let size = texture.size();
        let row_bytes = size.width * bytes_per_texel;
        let padded = padded_bytes_per_row(row_bytes);
        let rows = size.height * size.depth_or_array_layers;

        let staging = self.staging_buffer("prism texture staging", padded as u64 * rows as u64);

        let mut encoder = self.create_encoder("prism texture readback");
        encoder.copy_texture_to_buffer(
            texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(size.height),
                },
            },
            size,
        );
        self.submit(encoder);

        let padded_bytes = self.map_staging(&staging)?;
        if padded == row_bytes {
            return Ok(padded_bytes);
        }

        // Strip per-row padding.
        let mut packed = Vec::with_capacity(row_bytes as usize * rows as usize);
        for row in padded_bytes.chunks_exact(padded as usize) {
            packed.extend_from_slice(&row[..row_bytes as usize]);
        }
        Ok(packed)
    }

    fn staging_buffer(&self, label: &str, size: u64) -> wgpu::Buffer {
        self.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn map_staging(&self, staging: &wgpu::Buffer) -> Result<Vec<u8>, DeviceError> {
        let slice = staging.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.finish()?;

        match receiver.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(DeviceError(format!("failed to map staging buffer: {err}"))),
            Err(_) => return Err(DeviceError("map_async callback was dropped".into())),
        }

        let bytes = slice.get_mapped_range().to_vec();
        staging.unmap();
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_rounds_up_to_power_of_two() {
        assert_eq!(align_to(0, 4), 0);
        assert_eq!(align_to(5, 4), 8);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
    }

    #[test]
    fn padded_row_matches_copy_alignment() {
        assert_eq!(padded_bytes_per_row(16), 256);
        assert_eq!(padded_bytes_per_row(256), 256);
        assert_eq!(padded_bytes_per_row(1024), 1024);
    }
}
