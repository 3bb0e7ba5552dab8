//! Conversion between representation types.
//!
//! This module is responsible for:
//! - the elementary [`Converter`] contract and its statically typed form
//! - validated multi-hop [`ConverterPackage`]s
//! - the [`ConverterRegistry`] that resolves `(from, to)` to a path
//! - the built-in converters between the engine's own backends

pub mod builtin;
mod converter;
mod key;
mod package;
mod registry;

pub use converter::{typed, Converter, ReprConverter, Typed};
pub use key::{PathKey, TieBreak};
pub use package::ConverterPackage;
pub use registry::{ConversionPath, ConverterRegistry, RegistryConfig};
