//! Spatial extents shared by data objects and representations.
//!
//! Canonical layout:
//! - x varies fastest, then y, then z
//! - a row is `width` elements, a slice is `height` rows

mod extent;

pub use extent::{Extent, Rank};
