//! Data objects: one logical payload, several physical representations.
//!
//! A [`Data`] owns every representation of its content and keeps them
//! coherent. Reads convert lazily from the last written representation;
//! editable access marks every other representation stale.

mod kind;
mod owner;
mod state;

pub use kind::{BufferKind, DataKind, ElementBuffer, Layer, LayerKind, Volume, VolumeKind};
pub use owner::Data;
pub use state::{ConversionStats, ReprState};
