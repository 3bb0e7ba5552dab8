use core::any::Any;

use crate::error::ConvertError;
use crate::extent::Extent;
use crate::format::{DataFormat, Scalar, ScalarType};

use super::{ReprType, Representation};

/// Main-memory payload: one typed vector per scalar type.
///
/// Keeping the vector typed guarantees alignment, so byte views and typed
/// views can be produced with `bytemuck` without copying.
#[derive(Debug, Clone, PartialEq)]
pub enum RamData {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl RamData {
    /// `len` zero-initialized scalars of type `scalar`.
    pub fn zeroed(scalar: ScalarType, len: usize) -> Self {
        match scalar {
            ScalarType::U8 => RamData::U8(vec![0; len]),
            ScalarType::I8 => RamData::I8(vec![0; len]),
            ScalarType::U16 => RamData::U16(vec![0; len]),
            ScalarType::I16 => RamData::I16(vec![0; len]),
            ScalarType::U32 => RamData::U32(vec![0; len]),
            ScalarType::I32 => RamData::I32(vec![0; len]),
            ScalarType::F32 => RamData::F32(vec![0.0; len]),
            ScalarType::F64 => RamData::F64(vec![0.0; len]),
        }
    }

    /// Copies native-endian `bytes` into a freshly allocated typed vector.
    ///
    /// Returns `None` if `bytes` is not a whole number of scalars.
    pub fn from_bytes(scalar: ScalarType, bytes: &[u8]) -> Option<Self> {
        if bytes.len() % scalar.size() != 0 {
            return None;
        }
        let mut data = Self::zeroed(scalar, bytes.len() / scalar.size());
        data.as_bytes_mut().copy_from_slice(bytes);
        Some(data)
    }

    pub fn scalar(&self) -> ScalarType {
        match self {
            RamData::U8(_) => ScalarType::U8,
            RamData::I8(_) => ScalarType::I8,
            RamData::U16(_) => ScalarType::U16,
            RamData::I16(_) => ScalarType::I16,
            RamData::U32(_) => ScalarType::U32,
            RamData::I32(_) => ScalarType::I32,
            RamData::F32(_) => ScalarType::F32,
            RamData::F64(_) => ScalarType::F64,
        }
    }

    /// Number of scalars (not elements).
    pub fn len(&self) -> usize {
        self.as_bytes().len() / self.scalar().size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RamData::U8(v) => v.as_slice(),
            RamData::I8(v) => bytemuck::cast_slice(v),
            RamData::U16(v) => bytemuck::cast_slice(v),
            RamData::I16(v) => bytemuck::cast_slice(v),
            RamData::U32(v) => bytemuck::cast_slice(v),
            RamData::I32(v) => bytemuck::cast_slice(v),
            RamData::F32(v) => bytemuck::cast_slice(v),
            RamData::F64(v) => bytemuck::cast_slice(v),
        }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            RamData::U8(v) => v.as_mut_slice(),
            RamData::I8(v) => bytemuck::cast_slice_mut(v),
            RamData::U16(v) => bytemuck::cast_slice_mut(v),
            RamData::I16(v) => bytemuck::cast_slice_mut(v),
            RamData::U32(v) => bytemuck::cast_slice_mut(v),
            RamData::I32(v) => bytemuck::cast_slice_mut(v),
            RamData::F32(v) => bytemuck::cast_slice_mut(v),
            RamData::F64(v) => bytemuck::cast_slice_mut(v),
        }
    }

    /// Typed view; `None` if `T` is not this payload's scalar type.
    pub fn as_slice<T: Scalar>(&self) -> Option<&[T]> {
        if T::TYPE != self.scalar() {
            return None;
        }
        bytemuck::try_cast_slice(self.as_bytes()).ok()
    }

    pub fn as_mut_slice<T: Scalar>(&mut self) -> Option<&mut [T]> {
        if T::TYPE != self.scalar() {
            return None;
        }
        bytemuck::try_cast_slice_mut(self.as_bytes_mut()).ok()
    }

    /// Format-aware equality: same scalar type and identical bit patterns.
    ///
    /// Floats are compared bitwise, so NaN payloads and signed zeros must
    /// survive a conversion unchanged to compare equal.
    pub fn content_eq(&self, other: &RamData) -> bool {
        self.scalar() == other.scalar() && self.as_bytes() == other.as_bytes()
    }
}

/// Main-memory representation.
#[derive(Debug, Clone)]
pub struct RamRepr {
    extent: Extent,
    format: DataFormat,
    data: RamData,
}

impl RamRepr {
    /// Zero-filled storage for `extent` elements of `format`.
    pub fn new(extent: Extent, format: DataFormat) -> Self {
        let len = format.scalar_count(extent.element_count());
        Self {
            extent,
            format,
            data: RamData::zeroed(format.scalar(), len),
        }
    }

    /// Wraps an existing vector of scalars with `channels` scalars per element.
    pub fn from_vec<T: Scalar>(
        extent: Extent,
        channels: u8,
        values: Vec<T>,
    ) -> Result<Self, ConvertError> {
        let format = DataFormat::of::<T>(channels).ok_or_else(|| ConvertError::ExtentMismatch {
            expected: format!("1..=4 channels, got {channels}"),
            got: extent,
        })?;
        let expected = format.scalar_count(extent.element_count());
        if values.len() != expected {
            return Err(ConvertError::ExtentMismatch {
                expected: format!("{expected} {} values", T::TYPE),
                got: extent,
            });
        }

        let mut data = RamData::zeroed(T::TYPE, 0);
        if let Some(dst) = data_vec_mut::<T>(&mut data) {
            *dst = values;
        }
        Ok(Self {
            extent,
            format,
            data,
        })
    }

    /// Copies raw native-endian bytes, e.g. from a reader or a GPU readback.
    pub fn from_bytes(
        extent: Extent,
        format: DataFormat,
        bytes: &[u8],
    ) -> Result<Self, ConvertError> {
        let mut repr = Self::new(extent, format);
        repr.write_bytes(bytes)?;
        Ok(repr)
    }

    #[inline]
    pub fn data(&self) -> &RamData {
        &self.data
    }

    #[inline]
    pub(crate) fn data_mut(&mut self) -> &mut RamData {
        &mut self.data
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    #[inline]
    pub fn as_slice<T: Scalar>(&self) -> Option<&[T]> {
        self.data.as_slice()
    }

    #[inline]
    pub fn as_mut_slice<T: Scalar>(&mut self) -> Option<&mut [T]> {
        self.data.as_mut_slice()
    }

    /// Channels of the element at `(x, y, z)`.
    pub fn element<T: Scalar>(&self, x: u32, y: u32, z: u32) -> Option<&[T]> {
        let c = self.format.channels() as usize;
        let i = self.extent.index_of(x, y, z)?;
        self.as_slice::<T>()?.get(i * c..(i + 1) * c)
    }

    pub fn element_mut<T: Scalar>(&mut self, x: u32, y: u32, z: u32) -> Option<&mut [T]> {
        let c = self.format.channels() as usize;
        let i = self.extent.index_of(x, y, z)?;
        self.as_mut_slice::<T>()?.get_mut(i * c..(i + 1) * c)
    }

    /// Overwrites the whole payload with `bytes`; the length must match exactly.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConvertError> {
        let dst = self.data.as_bytes_mut();
        if dst.len() != bytes.len() {
            return Err(ConvertError::ExtentMismatch {
                expected: format!("{} bytes", bytes.len()),
                got: self.extent,
            });
        }
        dst.copy_from_slice(bytes);
        Ok(())
    }

    /// Reallocates for a new extent and/or format. Content is zeroed.
    pub(crate) fn reallocate(&mut self, extent: Extent, format: DataFormat) {
        *self = Self::new(extent, format);
    }

    /// Same extent, same format and bit-identical payload.
    pub fn content_eq(&self, other: &RamRepr) -> bool {
        self.extent == other.extent
            && self.format == other.format
            && self.data.content_eq(&other.data)
    }
}

fn data_vec_mut<T: Scalar>(data: &mut RamData) -> Option<&mut Vec<T>> {
    let any: &mut dyn Any = match data {
        RamData::U8(v) => v,
        RamData::I8(v) => v,
        RamData::U16(v) => v,
        RamData::I16(v) => v,
        RamData::U32(v) => v,
        RamData::I32(v) => v,
        RamData::F32(v) => v,
        RamData::F64(v) => v,
    };
    any.downcast_mut::<Vec<T>>()
}

impl Representation for RamRepr {
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

    fn set_extent(&mut self, extent: Extent) -> Result<(), ConvertError> {
        self.reallocate(extent, self.format);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
