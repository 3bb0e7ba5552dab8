use crate::convert::ReprConverter;
use crate::error::ConvertError;
use crate::repr::{DiskRepr, RamRepr, Representation};

/// Loads a raw file payload into main memory.
pub struct DiskToRam;

impl ReprConverter<DiskRepr, RamRepr> for DiskToRam {
    fn create(&self, source: &DiskRepr) -> Result<RamRepr, ConvertError> {
        log::debug!("loading {} ({} bytes)", source.path().display(), source.byte_len());
        let mut ram = RamRepr::new(source.extent(), source.format());
        source.read_into(ram.data_mut().as_bytes_mut())?;
        Ok(ram)
    }

    fn update(&self, source: &DiskRepr, destination: &mut RamRepr) -> Result<(), ConvertError> {
        if destination.extent() != source.extent() || destination.format() != source.format() {
            destination.reallocate(source.extent(), source.format());
        }
        source.read_into(destination.data_mut().as_bytes_mut())
    }
}
