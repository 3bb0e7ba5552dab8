use core::any::Any;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::extent::Extent;
use crate::format::DataFormat;

use super::{ReprType, Representation};

/// Raw native-endian payload stored in a file.
///
/// This is the representation a reader hands over before anything touched the
/// data: it only knows where the bytes live. It is read-only and cannot be
/// resized; conversions only ever leave it.
#[derive(Debug, Clone)]
pub struct DiskRepr {
    path: PathBuf,
    offset: u64,
    extent: Extent,
    format: DataFormat,
}

impl DiskRepr {
    pub fn new(path: impl Into<PathBuf>, extent: Extent, format: DataFormat) -> Self {
        Self::with_offset(path, 0, extent, format)
    }

    /// Payload starting `offset` bytes into the file (e.g. after a header).
    pub fn with_offset(
        path: impl Into<PathBuf>,
        offset: u64,
        extent: Extent,
        format: DataFormat,
    ) -> Self {
        Self {
            path: path.into(),
            offset,
            extent,
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Payload size in bytes.
    pub fn byte_len(&self) -> usize {
        self.format.bytes_per_element() * self.extent.element_count()
    }

    /// Reads the payload into `dst`, which must be exactly [`byte_len`](Self::byte_len) long.
    pub fn read_into(&self, dst: &mut [u8]) -> Result<(), ConvertError> {
        let io_err = |source| ConvertError::Io {
            path: self.path.clone(),
            source,
        };

        if dst.len() != self.byte_len() {
            return Err(ConvertError::ExtentMismatch {
                expected: format!("{} bytes", self.byte_len()),
                got: self.extent,
            });
        }

        let mut file = File::open(&self.path).map_err(io_err)?;
        file.seek(SeekFrom::Start(self.offset)).map_err(io_err)?;
        file.read_exact(dst).map_err(io_err)?;
        Ok(())
    }
}

impl Representation for DiskRepr {
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
        Ok(Box::new(self.clone()))
    }

    fn set_extent(&mut self, _extent: Extent) -> Result<(), ConvertError> {
        Err(ConvertError::Unsupported {
            repr: self.repr_type().name(),
            operation: "resize",
        })
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
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_payload_after_offset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"HDR!").unwrap();
        file.write_all(&[1, 2, 3, 4, 5, 6]).unwrap();
        file.flush().unwrap();

        let disk = DiskRepr::with_offset(file.path(), 4, Extent::d2(3, 2), DataFormat::U8);
        let mut buf = vec![0u8; disk.byte_len()];
        disk.read_into(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn short_file_is_an_io_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 8]).unwrap();
        file.flush().unwrap();

        let disk = DiskRepr::new(file.path(), Extent::d1(4), DataFormat::F32);
        let mut buf = vec![0u8; disk.byte_len()];
        let err = disk.read_into(&mut buf).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }

    #[test]
    fn cannot_be_resized() {
        let mut disk = DiskRepr::new("missing.raw", Extent::d1(4), DataFormat::U8);
        let err = disk.set_extent(Extent::d1(8)).unwrap_err();
        assert!(matches!(err, ConvertError::Unsupported { operation: "resize", .. }));
        assert_eq!(disk.extent(), Extent::d1(4));
    }
}
