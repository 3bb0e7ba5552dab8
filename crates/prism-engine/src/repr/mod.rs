//! Backend-specific representations of a data object's content.
//!
//! Adding a backend:
//! - implement [`Representation`] for the storage type in a new module here
//! - add converters to and from an existing backend under `convert::builtin`
//! - register them in `convert::builtin::register_*`

mod device_buffer;
mod disk;
mod ram;
mod texture;

use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::error::ConvertError;
use crate::extent::Extent;
use crate::format::DataFormat;

pub use device_buffer::DeviceBufferRepr;
pub use disk::DiskRepr;
pub use ram::{RamData, RamRepr};
pub use texture::{texture_format_for, TextureRepr};

pub(crate) use texture::extent_3d;

/// Identifier of a representation type.
///
/// Equality and hashing use the type id only; the name is for diagnostics.
#[derive(Copy, Clone)]
pub struct ReprType {
    id: TypeId,
    name: &'static str,
}

impl ReprType {
    pub fn of<T: Representation>() -> Self {
        let full = core::any::type_name::<T>();
        let name = full.rsplit("::").next().unwrap_or(full);
        Self {
            id: TypeId::of::<T>(),
            name,
        }
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for ReprType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ReprType {}

impl Hash for ReprType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ReprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ReprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One physical encoding of a data object's content on one backend.
///
/// Representations are owned exclusively by their data object; consumers only
/// ever see borrows handed out by the owner.
pub trait Representation: Any + Send + Sync + fmt::Debug {
    /// Implementations return `ReprType::of::<Self>()`.
    fn repr_type(&self) -> ReprType;

    fn extent(&self) -> Extent;

    fn format(&self) -> DataFormat;

    /// Deep copy on the same backend.
    fn try_clone(&self) -> Result<Box<dyn Representation>, ConvertError>;

    /// Reallocates storage for `extent`. Previous content is not preserved.
    ///
    /// Data objects call this from `resize`. Calling it on a handle from
    /// `editable_representation` reshapes the content too, and the owner adopts
    /// the new extent on its next operation.
    fn set_extent(&mut self, extent: Extent) -> Result<(), ConvertError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<'a> dyn Representation + 'a {
    #[inline]
    pub fn downcast_ref<T: Representation>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Representation>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}
