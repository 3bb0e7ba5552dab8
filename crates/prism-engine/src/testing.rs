//! Test-only backends and fixtures.
//!
//! `ShadowRepr` and `MirrorRepr` are host-side stand-ins for device backends so
//! the owner protocol can be exercised without a GPU; `gpu()` hands out a shared
//! headless device, or `None` when the machine has no adapter.

use core::any::Any;
use std::io::Write;
use std::sync::{Arc, OnceLock};

use crate::convert::ReprConverter;
use crate::device::{GpuContext, GpuInit};
use crate::error::ConvertError;
use crate::extent::Extent;
use crate::format::DataFormat;
use crate::repr::{RamRepr, ReprType, Representation};

pub(crate) fn gpu() -> Option<Arc<GpuContext>> {
    static GPU: OnceLock<Option<Arc<GpuContext>>> = OnceLock::new();
    GPU.get_or_init(|| match GpuContext::new_blocking(GpuInit::default()) {
        Ok(ctx) => Some(Arc::new(ctx)),
        Err(err) => {
            eprintln!("no gpu adapter, skipping device tests: {err:#}");
            None
        }
    })
    .clone()
}

/// Temporary raw file holding `bytes`.
pub(crate) fn raw_file(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

pub(crate) fn ramp_f32(extent: Extent) -> Vec<f32> {
    (0..extent.element_count()).map(|v| v as f32).collect()
}

/// Host-side backend holding a byte copy of the content.
#[derive(Debug, Clone)]
pub(crate) struct ShadowRepr {
    pub extent: Extent,
    pub format: DataFormat,
    pub bytes: Vec<u8>,
    pub allocations: u32,
}

impl ShadowRepr {
    pub fn from_values(extent: Extent, values: Vec<f32>) -> Self {
        Self {
            extent,
            format: DataFormat::F32,
            bytes: bytemuck::cast_slice(&values).to_vec(),
            allocations: 1,
        }
    }

    pub fn values(&self) -> Vec<f32> {
        let mut out = vec![0.0f32; self.bytes.len() / 4];
        bytemuck::cast_slice_mut(&mut out).copy_from_slice(&self.bytes);
        out
    }

    pub fn set_value(&mut self, index: usize, value: f32) {
        self.bytes[index * 4..index * 4 + 4].copy_from_slice(&value.to_ne_bytes());
    }
}

impl Representation for ShadowRepr {
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
        self.extent = extent;
        self.bytes = vec![0; extent.element_count() * self.format.bytes_per_element()];
        self.allocations += 1;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Second stand-in backend, reachable only through `ShadowRepr` or `RamRepr`.
#[derive(Debug, Clone)]
pub(crate) struct MirrorRepr {
    pub extent: Extent,
    pub format: DataFormat,
    pub bytes: Vec<u8>,
}

impl Representation for MirrorRepr {
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
        self.extent = extent;
        self.bytes = vec![0; extent.element_count() * self.format.bytes_per_element()];
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Copies RAM into a shadow; optionally only for one channel count.
#[derive(Default)]
pub(crate) struct RamToShadow {
    channels: Option<u8>,
}

impl RamToShadow {
    pub fn accepting_channels(channels: u8) -> Self {
        Self {
            channels: Some(channels),
        }
    }
}

impl ReprConverter<RamRepr, ShadowRepr> for RamToShadow {
    fn can_convert(&self, source: &RamRepr) -> Result<(), String> {
        match self.channels {
            Some(c) if c != source.format().channels() => {
                Err(format!("only {c}-channel data, got {}", source.format()))
            }
            _ => Ok(()),
        }
    }

    fn create(&self, source: &RamRepr) -> Result<ShadowRepr, ConvertError> {
        Ok(ShadowRepr {
            extent: source.extent(),
            format: source.format(),
            bytes: source.bytes().to_vec(),
            allocations: 1,
        })
    }

    fn update(&self, source: &RamRepr, destination: &mut ShadowRepr) -> Result<(), ConvertError> {
        if destination.extent != source.extent() || destination.format != source.format() {
            destination.format = source.format();
            destination.set_extent(source.extent())?;
        }
        destination.bytes.copy_from_slice(source.bytes());
        Ok(())
    }
}

pub(crate) struct ShadowToRam;

impl ReprConverter<ShadowRepr, RamRepr> for ShadowToRam {
    fn create(&self, source: &ShadowRepr) -> Result<RamRepr, ConvertError> {
        RamRepr::from_bytes(source.extent, source.format, &source.bytes)
    }

    fn update(&self, source: &ShadowRepr, destination: &mut RamRepr) -> Result<(), ConvertError> {
        if destination.extent() != source.extent || destination.format() != source.format {
            destination.reallocate(source.extent, source.format);
        }
        destination.write_bytes(&source.bytes)
    }
}

pub(crate) struct ShadowToMirror;

impl ReprConverter<ShadowRepr, MirrorRepr> for ShadowToMirror {
    fn create(&self, source: &ShadowRepr) -> Result<MirrorRepr, ConvertError> {
        Ok(MirrorRepr {
            extent: source.extent,
            format: source.format,
            bytes: source.bytes.clone(),
        })
    }

    fn update(
        &self,
        source: &ShadowRepr,
        destination: &mut MirrorRepr,
    ) -> Result<(), ConvertError> {
        destination.extent = source.extent;
        destination.format = source.format;
        destination.bytes.clone_from(&source.bytes);
        Ok(())
    }
}

pub(crate) struct RamToMirror;

impl ReprConverter<RamRepr, MirrorRepr> for RamToMirror {
    fn create(&self, source: &RamRepr) -> Result<MirrorRepr, ConvertError> {
        Ok(MirrorRepr {
            extent: source.extent(),
            format: source.format(),
            bytes: source.bytes().to_vec(),
        })
    }

    fn update(&self, source: &RamRepr, destination: &mut MirrorRepr) -> Result<(), ConvertError> {
        destination.extent = source.extent();
        destination.format = source.format();
        destination.bytes = source.bytes().to_vec();
        Ok(())
    }
}
