use core::cmp::Reverse;
use core::fmt;
use core::marker::PhantomData;
use std::collections::HashMap;
use std::sync::Arc;

use crate::convert::{ConversionPath, Converter, ConverterRegistry};
use crate::error::ConvertError;
use crate::extent::Extent;
use crate::format::DataFormat;
use crate::repr::{ReprType, Representation};

use super::kind::DataKind;
use super::state::{ConversionStats, ReprState, Validity};

struct Slot {
    repr: Box<dyn Representation>,
    validity: Validity,
    /// Write counter value at which this slot last became valid.
    generation: u64,
}

impl Slot {
    #[inline]
    fn is_valid(&self) -> bool {
        self.validity == Validity::Valid
    }
}

/// A logical payload with any number of physical representations.
///
/// Invariants:
/// - at least one representation is valid at every observable point
/// - the last written representation is always valid
/// - all valid representations decode to the same content
///
/// Every converting method takes `&mut self`, so conversions on one object
/// never overlap and a mutable borrow handed out by
/// [`editable_representation`](Self::editable_representation) is exclusive.
pub struct Data<K: DataKind> {
    registry: Arc<ConverterRegistry>,
    slots: HashMap<ReprType, Slot>,
    last_written: ReprType,
    extent: Extent,
    format: DataFormat,
    generation: u64,
    stats: ConversionStats,
    _kind: PhantomData<K>,
}

impl<K: DataKind> Data<K> {
    /// Creates a data object whose only representation is `repr`; extent and
    /// format are taken from it.
    pub fn new<T: Representation>(
        registry: Arc<ConverterRegistry>,
        repr: T,
    ) -> Result<Self, ConvertError> {
        Self::from_boxed(registry, Box::new(repr))
    }

    pub fn from_boxed(
        registry: Arc<ConverterRegistry>,
        repr: Box<dyn Representation>,
    ) -> Result<Self, ConvertError> {
        check_rank::<K>(repr.extent())?;

        let ty = repr.repr_type();
        let extent = repr.extent();
        let format = repr.format();
        let mut slots = HashMap::new();
        slots.insert(
            ty,
            Slot {
                repr,
                validity: Validity::Valid,
                generation: 1,
            },
        );

        Ok(Self {
            registry,
            slots,
            last_written: ty,
            extent,
            format,
            generation: 1,
            stats: ConversionStats::default(),
            _kind: PhantomData,
        })
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ConverterRegistry> {
        &self.registry
    }

    /// Extent of the content, as held by the last written representation.
    pub fn extent(&self) -> Extent {
        self.slots
            .get(&self.last_written)
            .map_or(self.extent, |slot| slot.repr.extent())
    }

    pub fn format(&self) -> DataFormat {
        self.slots
            .get(&self.last_written)
            .map_or(self.format, |slot| slot.repr.format())
    }

    /// Type of the most recently written representation.
    #[inline]
    pub fn last_written(&self) -> ReprType {
        self.last_written
    }

    #[inline]
    pub fn stats(&self) -> ConversionStats {
        self.stats
    }

    /// An instance of `T` exists, valid or not. Never converts.
    pub fn has_representation<T: Representation>(&self) -> bool {
        self.slots.contains_key(&ReprType::of::<T>())
    }

    pub fn has_valid_representation<T: Representation>(&self) -> bool {
        self.state::<T>() == ReprState::Valid
    }

    pub fn state<T: Representation>(&self) -> ReprState {
        self.state_of(ReprType::of::<T>())
    }

    pub fn state_of(&self, ty: ReprType) -> ReprState {
        match self.slots.get(&ty) {
            None => ReprState::Absent,
            Some(slot) if slot.is_valid() => ReprState::Valid,
            Some(_) => ReprState::Stale,
        }
    }

    /// Types of all present representations, sorted by name.
    pub fn representation_types(&self) -> Vec<ReprType> {
        let mut types: Vec<ReprType> = self.slots.keys().copied().collect();
        types.sort_by_key(|t| t.name());
        types
    }

    /// Read access to the `T` representation, converting if it is absent or stale.
    ///
    /// Repeated calls without an intervening write return the same instance
    /// and convert nothing. Nothing is invalidated.
    pub fn representation<T: Representation>(&mut self) -> Result<&T, ConvertError> {
        let ty = ReprType::of::<T>();
        self.sync_shape()?;
        self.make_valid(ty)?;
        self.slots
            .get(&ty)
            .and_then(|slot| slot.repr.downcast_ref::<T>())
            .ok_or(ConvertError::NotPresent(ty.name()))
    }

    /// Write access to the `T` representation.
    ///
    /// Resolves like [`representation`](Self::representation), then marks every
    /// other representation stale and records `T` as last written. Reshaping
    /// through the handle is picked up by the next operation on the object.
    pub fn editable_representation<T: Representation>(&mut self) -> Result<&mut T, ConvertError> {
        let ty = ReprType::of::<T>();
        self.sync_shape()?;
        self.make_valid(ty)?;
        self.mark_written(ty);
        self.slots
            .get_mut(&ty)
            .and_then(|slot| slot.repr.downcast_mut::<T>())
            .ok_or(ConvertError::NotPresent(ty.name()))
    }

    /// Inserts or replaces a representation holding new content. It becomes
    /// the last written; every other representation becomes stale.
    pub fn add_representation<T: Representation>(&mut self, repr: T) -> Result<(), ConvertError> {
        self.sync_shape()?;
        if repr.extent() != self.extent {
            return Err(ConvertError::ExtentMismatch {
                expected: format!("{} of this {}", self.extent, K::NAME),
                got: repr.extent(),
            });
        }
        if repr.format() != self.format {
            return Err(ConvertError::WrongFormat {
                expected: self.format,
                got: repr.format(),
            });
        }

        let ty = repr.repr_type();
        self.slots.insert(
            ty,
            Slot {
                repr: Box::new(repr),
                validity: Validity::Valid,
                generation: 0,
            },
        );
        self.mark_written(ty);
        Ok(())
    }

    /// Declares `T` the sole valid representation, for callers that changed
    /// its content by other means.
    pub fn invalidate_all_other<T: Representation>(&mut self) -> Result<(), ConvertError> {
        let ty = ReprType::of::<T>();
        if !self.slots.contains_key(&ty) {
            return Err(ConvertError::NotPresent(ty.name()));
        }
        self.sync_shape()?;
        self.mark_written(ty);
        Ok(())
    }

    /// The content changed through the last written representation.
    pub fn notify_modified(&mut self) {
        let keep = self.last_written;
        for (ty, slot) in self.slots.iter_mut() {
            if *ty != keep {
                slot.validity = Validity::Stale;
            }
        }
        log::trace!("{}: modified through {keep}", K::NAME);
    }

    /// Drops the `T` representation. The only valid representation cannot
    /// be removed.
    pub fn remove_representation<T: Representation>(&mut self) -> Result<(), ConvertError> {
        let ty = ReprType::of::<T>();
        self.sync_shape()?;
        let slot = self.slots.get(&ty).ok_or(ConvertError::NotPresent(ty.name()))?;
        if slot.is_valid() && self.valid_count() == 1 {
            return Err(ConvertError::LastValid(ty.name()));
        }

        self.slots.remove(&ty);
        if ty == self.last_written {
            let newest = self
                .slots
                .iter()
                .filter(|(_, slot)| slot.is_valid())
                .max_by_key(|(_, slot)| slot.generation)
                .map(|(ty, _)| *ty);
            if let Some(newest) = newest {
                self.last_written = newest;
            }
        }
        log::debug!("{}: removed {ty}", K::NAME);
        Ok(())
    }

    /// Makes `T` valid and drops every other representation.
    pub fn remove_other_representations<T: Representation>(&mut self) -> Result<(), ConvertError> {
        let ty = ReprType::of::<T>();
        self.sync_shape()?;
        self.make_valid(ty)?;
        self.slots.retain(|t, _| *t == ty);
        self.last_written = ty;
        Ok(())
    }

    /// Resizes through `T`: `T` is made valid, resized in place and becomes
    /// the last written. Every other representation is dropped.
    ///
    /// This is also the way back to a valid shape after a handle from
    /// [`editable_representation`](Self::editable_representation) changed the
    /// rank of the content.
    pub fn resize<T: Representation>(&mut self, extent: Extent) -> Result<(), ConvertError> {
        self.resize_type(ReprType::of::<T>(), extent)
    }

    /// Resizes through the last written representation.
    pub fn resize_last_written(&mut self, extent: Extent) -> Result<(), ConvertError> {
        self.resize_type(self.last_written, extent)
    }

    fn resize_type(&mut self, ty: ReprType, extent: Extent) -> Result<(), ConvertError> {
        check_rank::<K>(extent)?;
        self.make_valid(ty)?;

        let slot = self.slots.get_mut(&ty).ok_or(ConvertError::NotPresent(ty.name()))?;
        slot.repr.set_extent(extent)?;
        let format = slot.repr.format();

        let dropped = self.slots.len() - 1;
        self.slots.retain(|t, _| *t == ty);
        self.extent = extent;
        self.format = format;
        self.mark_written(ty);
        log::debug!(
            "{}: resized {ty} to {extent}, dropped {dropped} other representations",
            K::NAME
        );
        Ok(())
    }

    /// Deep copy holding only a clone of the last written representation.
    pub fn try_clone(&self) -> Result<Self, ConvertError> {
        let slot = self
            .slots
            .get(&self.last_written)
            .ok_or(ConvertError::NotPresent(self.last_written.name()))?;
        Self::from_boxed(self.registry.clone(), slot.repr.try_clone()?)
    }

    /// One-line description, e.g. `Layer 4x4 f32x1 [RamRepr* valid, TextureRepr stale]`.
    pub fn info(&self) -> String {
        self.to_string()
    }

    /// Adopts the extent and format of the last written representation, which
    /// a caller may have reshaped through an editable handle. Content of the
    /// wrong rank is refused until the object is resized.
    fn sync_shape(&mut self) -> Result<(), ConvertError> {
        let (extent, format) = (self.extent(), self.format());
        if extent == self.extent && format == self.format {
            return Ok(());
        }
        check_rank::<K>(extent)?;
        log::debug!(
            "{}: {} reshaped from {} {} to {extent} {format}",
            K::NAME,
            self.last_written,
            self.extent,
            self.format
        );
        self.extent = extent;
        self.format = format;
        Ok(())
    }

    fn valid_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.is_valid()).count()
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn mark_written(&mut self, ty: ReprType) {
        let generation = self.next_generation();
        let mut invalidated = 0;
        for (t, slot) in self.slots.iter_mut() {
            if *t == ty {
                slot.validity = Validity::Valid;
                slot.generation = generation;
            } else if slot.is_valid() {
                slot.validity = Validity::Stale;
                invalidated += 1;
            }
        }
        self.last_written = ty;
        log::trace!("{}: {ty} written, {invalidated} representations now stale", K::NAME);
    }

    fn make_valid(&mut self, to: ReprType) -> Result<(), ConvertError> {
        if self.slots.get(&to).is_some_and(Slot::is_valid) {
            log::trace!("{}: {to} already valid", K::NAME);
            return Ok(());
        }

        let registry = Arc::clone(&self.registry);
        let path = self.plan(&registry, to)?;
        log::debug!("{}: converting via {}", K::NAME, path.describe());
        for stage in path.stages() {
            self.run_stage(stage.as_ref())?;
        }
        Ok(())
    }

    /// Valid sources, last written first, then the most recently validated.
    fn sources(&self) -> Vec<&dyn Representation> {
        let mut valid: Vec<(&ReprType, &Slot)> =
            self.slots.iter().filter(|(_, slot)| slot.is_valid()).collect();
        valid.sort_by_key(|(ty, slot)| (**ty != self.last_written, Reverse(slot.generation)));
        valid.into_iter().map(|(_, slot)| slot.repr.as_ref()).collect()
    }

    fn plan<'r>(
        &self,
        registry: &'r ConverterRegistry,
        to: ReprType,
    ) -> Result<ConversionPath<'r>, ConvertError> {
        let mut mismatch = None;
        for source in self.sources() {
            match registry.find(source, to) {
                Ok(path) => return Ok(path),
                Err(err @ ConvertError::FormatMismatch { .. }) => {
                    mismatch.get_or_insert(err);
                }
                Err(_) => {}
            }
        }

        if let Some(err) = mismatch {
            log::warn!("{}: {err}", K::NAME);
            return Err(err);
        }
        Err(ConvertError::Unavailable {
            from: self.last_written.name(),
            to: to.name(),
            format: self.format(),
        })
    }

    fn valid_repr(&self, ty: ReprType) -> Result<&dyn Representation, ConvertError> {
        self.slots
            .get(&ty)
            .filter(|slot| slot.is_valid())
            .map(|slot| slot.repr.as_ref())
            .ok_or(ConvertError::NotPresent(ty.name()))
    }

    /// Runs one stage of a path: skip, update in place or create.
    fn run_stage(&mut self, stage: &dyn Converter) -> Result<(), ConvertError> {
        let (from, to) = (stage.from_type(), stage.to_type());
        if self.slots.get(&to).is_some_and(Slot::is_valid) {
            self.stats.skipped += 1;
            log::trace!("{}: {} skipped, {to} already valid", K::NAME, stage.name());
            return Ok(());
        }

        let source = self.valid_repr(from)?;
        if let Err(reason) = stage.can_convert_from(source) {
            let err = ConvertError::FormatMismatch {
                converter: stage.name(),
                from: from.name(),
                to: to.name(),
                format: source.format(),
                extent: source.extent(),
                reason,
            };
            log::warn!("{}: {err}", K::NAME);
            return Err(err);
        }

        let generation = self.next_generation();
        match self.slots.remove(&to) {
            Some(mut slot) => {
                let result = self
                    .valid_repr(from)
                    .and_then(|source| stage.update(source, slot.repr.as_mut()));
                if result.is_ok() {
                    slot.validity = Validity::Valid;
                    slot.generation = generation;
                }
                self.slots.insert(to, slot);
                result?;
                self.stats.updated += 1;
                log::debug!("{}: updated {to} from {from} ({})", K::NAME, stage.name());
            }
            None => {
                let repr = stage.create(self.valid_repr(from)?)?;
                self.slots.insert(
                    to,
                    Slot {
                        repr,
                        validity: Validity::Valid,
                        generation,
                    },
                );
                self.stats.created += 1;
                log::debug!("{}: created {to} from {from} ({})", K::NAME, stage.name());
            }
        }
        Ok(())
    }
}

fn check_rank<K: DataKind>(extent: Extent) -> Result<(), ConvertError> {
    if extent.rank() == K::RANK {
        Ok(())
    } else {
        Err(ConvertError::ExtentMismatch {
            expected: format!("{:?} extent of a {}", K::RANK, K::NAME),
            got: extent,
        })
    }
}

impl<K: DataKind> fmt::Display for Data<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} [", K::NAME, self.extent(), self.format())?;
        for (i, ty) in self.representation_types().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let mark = if ty == self.last_written { "*" } else { "" };
            write!(f, "{ty}{mark} {}", self.state_of(ty))?;
        }
        f.write_str("]")
    }
}

impl<K: DataKind> fmt::Debug for Data<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::NAME)
            .field("extent", &self.extent())
            .field("format", &self.format())
            .field("last_written", &self.last_written)
            .field("representations", &self.representation_types())
            .finish()
    }
}
