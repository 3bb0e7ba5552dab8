use core::fmt;

/// Number of meaningful axes of an [`Extent`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Rank {
    D1,
    D2,
    D3,
}

/// Element extent of a 1D, 2D or 3D grid.
///
/// Unused axes are always 1, so `width * height * depth` is the element count
/// regardless of rank. The axes are only reachable through the rank
/// constructors to keep that true.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Extent {
    width: u32,
    height: u32,
    depth: u32,
    rank: Rank,
}

impl Extent {
    #[inline]
    pub const fn d1(width: u32) -> Self {
        Self {
            width,
            height: 1,
            depth: 1,
            rank: Rank::D1,
        }
    }

    #[inline]
    pub const fn d2(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: 1,
            rank: Rank::D2,
        }
    }

    #[inline]
    pub const fn d3(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
            rank: Rank::D3,
        }
    }

    #[inline]
    pub const fn rank(self) -> Rank {
        self.rank
    }

    #[inline]
    pub const fn width(self) -> u32 {
        self.width
    }

    /// 1 for 1D extents.
    #[inline]
    pub const fn height(self) -> u32 {
        self.height
    }

    /// 1 below 3D.
    #[inline]
    pub const fn depth(self) -> u32 {
        self.depth
    }

    #[inline]
    pub const fn element_count(self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    /// Number of rows across all slices.
    #[inline]
    pub const fn row_count(self) -> u32 {
        self.height * self.depth
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0 || self.depth == 0
    }

    /// Largest axis; used against per-dimension device limits.
    #[inline]
    pub fn max_axis(self) -> u32 {
        self.width.max(self.height).max(self.depth)
    }

    /// Linear index of `(x, y, z)`, or `None` when out of bounds.
    #[inline]
    pub fn index_of(self, x: u32, y: u32, z: u32) -> Option<usize> {
        if x >= self.width || y >= self.height || z >= self.depth {
            return None;
        }
        let w = self.width as usize;
        let h = self.height as usize;
        Some((z as usize * h + y as usize) * w + x as usize)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank {
            Rank::D1 => write!(f, "{}", self.width),
            Rank::D2 => write!(f, "{}x{}", self.width, self.height),
            Rank::D3 => write!(f, "{}x{}x{}", self.width, self.height, self.depth),
        }
    }
}
