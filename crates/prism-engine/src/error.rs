//! Engine error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::extent::Extent;
use crate::format::DataFormat;

/// Failure of a representation request or of a representation operation.
///
/// Conversion failures are never retried and never replaced by a degraded
/// result; they surface synchronously to the caller.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No registered path from any valid representation to the requested type.
    #[error("no conversion path from {from} ({format}) to {to} ({format})")]
    Unavailable {
        from: &'static str,
        to: &'static str,
        format: DataFormat,
    },

    /// A converter matched by type but rejected the presented source at runtime.
    #[error("{converter} rejected {from} -> {to} for {format} at {extent}: {reason}")]
    FormatMismatch {
        converter: &'static str,
        from: &'static str,
        to: &'static str,
        format: DataFormat,
        extent: Extent,
        reason: String,
    },

    /// Destination storage could not be allocated at the requested size/format.
    #[error("failed to allocate {repr} of {extent} ({format}): {reason}")]
    Allocation {
        repr: &'static str,
        extent: Extent,
        format: DataFormat,
        reason: String,
    },

    #[error("extent {got} does not fit {expected}")]
    ExtentMismatch { expected: String, got: Extent },

    /// A representation handed to a data object carries another element format.
    #[error("format {got} does not match {expected}")]
    WrongFormat { expected: DataFormat, got: DataFormat },

    #[error("{repr} does not support {operation}")]
    Unsupported {
        repr: &'static str,
        operation: &'static str,
    },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("device operation failed: {0}")]
    Device(String),

    /// Removing the representation would leave the data object without a valid one.
    #[error("{0} is the only valid representation")]
    LastValid(&'static str),

    #[error("no {0} representation present")]
    NotPresent(&'static str),
}

impl ConvertError {
    /// True for failures a caller treats as "this port cannot be served":
    /// an absent path or a runtime rejection.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ConvertError::Unavailable { .. } | ConvertError::FormatMismatch { .. })
    }
}

/// Invalid converter registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a converter package needs at least two stages, got {0}")]
    TooShort(usize),

    #[error("stage {index} produces {produced} but the next stage expects {expected}")]
    BrokenChain {
        index: usize,
        produced: &'static str,
        expected: &'static str,
    },

    #[error("package {from} -> {to} revisits {repeated}")]
    Cycle {
        from: &'static str,
        to: &'static str,
        repeated: &'static str,
    },
}
