//! Prism engine crate.
//!
//! This crate owns data objects that keep several physical representations of
//! the same content (main memory, raw files, GPU textures, compute buffers) and
//! converts between them lazily and coherently.

pub mod convert;
pub mod core;
pub mod data;
pub mod device;
pub mod error;
pub mod extent;
pub mod format;
pub mod logging;
pub mod repr;

#[cfg(test)]
mod testing;

pub use crate::core::{Engine, EngineConfig};
pub use convert::{ConverterRegistry, RegistryConfig, TieBreak};
pub use data::{ConversionStats, Data, DataKind, ElementBuffer, Layer, ReprState, Volume};
pub use error::{ConvertError, RegistryError};
pub use extent::Extent;
pub use format::{DataFormat, ScalarType};
pub use repr::{DeviceBufferRepr, DiskRepr, RamRepr, ReprType, Representation, TextureRepr};
