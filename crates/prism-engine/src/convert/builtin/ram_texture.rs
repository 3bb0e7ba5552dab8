use std::sync::Arc;

use crate::convert::ReprConverter;
use crate::device::GpuContext;
use crate::error::ConvertError;
use crate::repr::{texture_format_for, RamRepr, Representation, TextureRepr};

/// Uploads main-memory content into a texture of the matching rank.
pub struct RamToTexture {
    ctx: Arc<GpuContext>,
}

impl RamToTexture {
    pub fn new(ctx: Arc<GpuContext>) -> Self {
        Self { ctx }
    }
}

impl ReprConverter<RamRepr, TextureRepr> for RamToTexture {
    fn can_convert(&self, source: &RamRepr) -> Result<(), String> {
        match texture_format_for(source.format()) {
            Some(_) => Ok(()),
            None => Err(format!("no texture format stores {} exactly", source.format())),
        }
    }

    fn create(&self, source: &RamRepr) -> Result<TextureRepr, ConvertError> {
        TextureRepr::from_bytes(self.ctx.clone(), source.extent(), source.format(), source.bytes())
    }

    fn update(&self, source: &RamRepr, destination: &mut TextureRepr) -> Result<(), ConvertError> {
        destination.reallocate(source.extent(), source.format())?;
        destination.write_bytes(source.bytes())
    }
}

/// Reads a texture back into main memory.
pub struct TextureToRam;

impl ReprConverter<TextureRepr, RamRepr> for TextureToRam {
    fn create(&self, source: &TextureRepr) -> Result<RamRepr, ConvertError> {
        RamRepr::from_bytes(source.extent(), source.format(), &source.read_bytes()?)
    }

    fn update(&self, source: &TextureRepr, destination: &mut RamRepr) -> Result<(), ConvertError> {
        if destination.extent() != source.extent() || destination.format() != source.format() {
            destination.reallocate(source.extent(), source.format());
        }
        destination.write_bytes(&source.read_bytes()?)
    }
}
