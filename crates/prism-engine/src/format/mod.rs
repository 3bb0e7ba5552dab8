//! Element format descriptors.
//!
//! A format is a numeric type plus a channel count. Readers supply it; the
//! engine only passes it through to converters and uses it to size payloads.

mod data_format;
mod scalar;

pub use data_format::DataFormat;
pub use scalar::{Scalar, ScalarType};
