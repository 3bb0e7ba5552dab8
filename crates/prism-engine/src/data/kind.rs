use crate::extent::Rank;

use super::Data;

/// Compile-time tag for the shape of a data object.
pub trait DataKind: Send + Sync + 'static {
    const NAME: &'static str;
    const RANK: Rank;
}

#[derive(Debug)]
pub struct VolumeKind;

#[derive(Debug)]
pub struct LayerKind;

#[derive(Debug)]
pub struct BufferKind;

impl DataKind for VolumeKind {
    const NAME: &'static str = "Volume";
    const RANK: Rank = Rank::D3;
}

impl DataKind for LayerKind {
    const NAME: &'static str = "Layer";
    const RANK: Rank = Rank::D2;
}

impl DataKind for BufferKind {
    const NAME: &'static str = "ElementBuffer";
    const RANK: Rank = Rank::D1;
}

/// 3D grid of elements.
pub type Volume = Data<VolumeKind>;

/// 2D image-like grid of elements.
pub type Layer = Data<LayerKind>;

/// 1D array of elements.
pub type ElementBuffer = Data<BufferKind>;
