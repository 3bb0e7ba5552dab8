use core::fmt;

use super::{Scalar, ScalarType};

/// Element format: scalar type and channel count (1..=4).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DataFormat {
    scalar: ScalarType,
    channels: u8,
}

impl DataFormat {
    pub const U8: Self = Self {
        scalar: ScalarType::U8,
        channels: 1,
    };
    pub const RGBA8: Self = Self {
        scalar: ScalarType::U8,
        channels: 4,
    };
    pub const U16: Self = Self {
        scalar: ScalarType::U16,
        channels: 1,
    };
    pub const F32: Self = Self {
        scalar: ScalarType::F32,
        channels: 1,
    };
    pub const VEC4F32: Self = Self {
        scalar: ScalarType::F32,
        channels: 4,
    };

    /// Returns `None` unless `channels` is in `1..=4`.
    #[inline]
    pub const fn new(scalar: ScalarType, channels: u8) -> Option<Self> {
        if channels == 0 || channels > 4 {
            return None;
        }
        Some(Self { scalar, channels })
    }

    /// Format whose scalar type matches the Rust primitive `T`.
    #[inline]
    pub fn of<T: Scalar>(channels: u8) -> Option<Self> {
        Self::new(T::TYPE, channels)
    }

    #[inline]
    pub const fn scalar(self) -> ScalarType {
        self.scalar
    }

    #[inline]
    pub const fn channels(self) -> u8 {
        self.channels
    }

    /// Bytes occupied by one element (all channels).
    #[inline]
    pub const fn bytes_per_element(self) -> usize {
        self.scalar.size() * self.channels as usize
    }

    /// Number of scalar values needed for `elements` elements.
    #[inline]
    pub const fn scalar_count(self, elements: usize) -> usize {
        elements * self.channels as usize
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.scalar, self.channels)
    }
}
