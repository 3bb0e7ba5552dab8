use core::marker::PhantomData;

use crate::error::ConvertError;
use crate::repr::{ReprType, Representation};

/// Elementary conversion between two representation types.
///
/// The registry dispatches on `(from_type, to_type)`; `can_convert_from` is
/// the runtime check for the concrete source (format, subtype, size) that a
/// static type match cannot express.
pub trait Converter: Send + Sync {
    /// Diagnostic name.
    fn name(&self) -> &'static str;

    fn from_type(&self) -> ReprType;

    fn to_type(&self) -> ReprType;

    /// `Err(reason)` if this converter cannot handle `source`.
    fn can_convert_from(&self, source: &dyn Representation) -> Result<(), String>;

    /// Allocates a fresh destination from `source`.
    fn create(&self, source: &dyn Representation) -> Result<Box<dyn Representation>, ConvertError>;

    /// Refreshes `destination` from `source`, resizing it in place if the
    /// extent or format differ. The destination keeps its identity.
    fn update(
        &self,
        source: &dyn Representation,
        destination: &mut dyn Representation,
    ) -> Result<(), ConvertError>;
}

/// Statically typed converter; wrap it with [`typed`] to register it.
pub trait ReprConverter<S: Representation, D: Representation>: Send + Sync + 'static {
    fn can_convert(&self, source: &S) -> Result<(), String> {
        let _ = source;
        Ok(())
    }

    fn create(&self, source: &S) -> Result<D, ConvertError>;

    fn update(&self, source: &S, destination: &mut D) -> Result<(), ConvertError>;
}

/// Adapter from [`ReprConverter`] to the type-erased [`Converter`].
pub struct Typed<C, S, D> {
    inner: C,
    _types: PhantomData<fn(&S) -> D>,
}

/// Wraps a statically typed converter for registration.
pub fn typed<S, D, C>(converter: C) -> Typed<C, S, D>
where
    S: Representation,
    D: Representation,
    C: ReprConverter<S, D>,
{
    Typed {
        inner: converter,
        _types: PhantomData,
    }
}

impl<C, S, D> Typed<C, S, D> {
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

/// Erased call with a representation the converter was not registered for.
fn wrong_type(converter: &'static str, got: ReprType) -> ConvertError {
    ConvertError::Unsupported {
        repr: got.name(),
        operation: converter,
    }
}

impl<C, S, D> Converter for Typed<C, S, D>
where
    S: Representation,
    D: Representation,
    C: ReprConverter<S, D>,
{
    fn name(&self) -> &'static str {
        let full = core::any::type_name::<C>();
        full.rsplit("::").next().unwrap_or(full)
    }

    fn from_type(&self) -> ReprType {
        ReprType::of::<S>()
    }

    fn to_type(&self) -> ReprType {
        ReprType::of::<D>()
    }

    fn can_convert_from(&self, source: &dyn Representation) -> Result<(), String> {
        match source.downcast_ref::<S>() {
            Some(s) => self.inner.can_convert(s),
            None => Err(format!("expected {}, got {}", self.from_type(), source.repr_type())),
        }
    }

    fn create(&self, source: &dyn Representation) -> Result<Box<dyn Representation>, ConvertError> {
        let s = source
            .downcast_ref::<S>()
            .ok_or_else(|| wrong_type(self.name(), source.repr_type()))?;
        Ok(Box::new(self.inner.create(s)?))
    }

    fn update(
        &self,
        source: &dyn Representation,
        destination: &mut dyn Representation,
    ) -> Result<(), ConvertError> {
        let s = source
            .downcast_ref::<S>()
            .ok_or_else(|| wrong_type(self.name(), source.repr_type()))?;
        let got = destination.repr_type();
        let d = destination
            .downcast_mut::<D>()
            .ok_or_else(|| wrong_type(self.name(), got))?;
        self.inner.update(s, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::Extent;
    use crate::format::DataFormat;
    use crate::repr::{DiskRepr, RamRepr};
    use crate::testing::{ShadowRepr, ShadowToRam};

    #[test]
    fn typed_reports_static_types_and_name() {
        let c = typed(ShadowToRam);
        assert_eq!(c.from_type(), ReprType::of::<ShadowRepr>());
        assert_eq!(c.to_type(), ReprType::of::<RamRepr>());
        assert_eq!(c.name(), "ShadowToRam");
    }

    #[test]
    fn wrong_source_type_is_rejected_not_panicking() {
        let c = typed(ShadowToRam);
        let disk = DiskRepr::new("x.raw", Extent::d1(1), DataFormat::U8);
        let reason = c.can_convert_from(&disk).unwrap_err();
        assert!(reason.contains("ShadowRepr"));
        assert!(c.create(&disk).is_err());
    }

    #[test]
    fn update_through_erased_interface() {
        let c = typed(ShadowToRam);
        let src = ShadowRepr::from_values(Extent::d1(3), vec![1.0, 2.0, 3.0]);
        let mut dst: Box<dyn Representation> = c.create(&src).unwrap();

        let src2 = ShadowRepr::from_values(Extent::d1(3), vec![4.0, 5.0, 6.0]);
        c.update(&src2, dst.as_mut()).unwrap();

        let ram = dst.downcast_ref::<RamRepr>().unwrap();
        assert_eq!(ram.as_slice::<f32>().unwrap(), &[4.0, 5.0, 6.0]);
    }
}
