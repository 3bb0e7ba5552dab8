use core::fmt;

use bytemuck::Pod;

/// Numeric type of one channel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ScalarType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl ScalarType {
    /// Size of one channel in bytes.
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            ScalarType::U8 | ScalarType::I8 => 1,
            ScalarType::U16 | ScalarType::I16 => 2,
            ScalarType::U32 | ScalarType::I32 | ScalarType::F32 => 4,
            ScalarType::F64 => 8,
        }
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, ScalarType::F32 | ScalarType::F64)
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            ScalarType::U8 => "u8",
            ScalarType::I8 => "i8",
            ScalarType::U16 => "u16",
            ScalarType::I16 => "i16",
            ScalarType::U32 => "u32",
            ScalarType::I32 => "i32",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust primitive that stores one channel of a [`ScalarType`].
pub trait Scalar: Pod + PartialEq + fmt::Debug + Send + Sync + 'static {
    const TYPE: ScalarType;
}

impl Scalar for u8 {
    const TYPE: ScalarType = ScalarType::U8;
}

impl Scalar for i8 {
    const TYPE: ScalarType = ScalarType::I8;
}

impl Scalar for u16 {
    const TYPE: ScalarType = ScalarType::U16;
}

impl Scalar for i16 {
    const TYPE: ScalarType = ScalarType::I16;
}

impl Scalar for u32 {
    const TYPE: ScalarType = ScalarType::U32;
}

impl Scalar for i32 {
    const TYPE: ScalarType = ScalarType::I32;
}

impl Scalar for f32 {
    const TYPE: ScalarType = ScalarType::F32;
}

impl Scalar for f64 {
    const TYPE: ScalarType = ScalarType::F64;
}
