use std::sync::Arc;

use crate::error::RegistryError;
use crate::repr::ReprType;

use super::Converter;

/// Pre-composed chain of elementary converters bridging two representation
/// types that have no direct converter.
///
/// Built once at registration time and reused for every conversion along the
/// path. Each stage's destination type is the next stage's source type, and
/// no representation type is visited twice.
#[derive(Clone)]
pub struct ConverterPackage {
    stages: Vec<Arc<dyn Converter>>,
}

impl ConverterPackage {
    pub fn new(stages: Vec<Arc<dyn Converter>>) -> Result<Self, RegistryError> {
        if stages.len() < 2 {
            return Err(RegistryError::TooShort(stages.len()));
        }

        let mut visited = vec![stages[0].from_type()];
        for (index, pair) in stages.windows(2).enumerate() {
            if pair[0].to_type() != pair[1].from_type() {
                return Err(RegistryError::BrokenChain {
                    index,
                    produced: pair[0].to_type().name(),
                    expected: pair[1].from_type().name(),
                });
            }
        }
        for stage in &stages {
            let to = stage.to_type();
            if visited.contains(&to) {
                return Err(RegistryError::Cycle {
                    from: stages[0].from_type().name(),
                    to: stages[stages.len() - 1].to_type().name(),
                    repeated: to.name(),
                });
            }
            visited.push(to);
        }

        Ok(Self { stages })
    }

    #[inline]
    pub fn from_type(&self) -> ReprType {
        self.stages[0].from_type()
    }

    #[inline]
    pub fn to_type(&self) -> ReprType {
        self.stages[self.stages.len() - 1].to_type()
    }

    #[inline]
    pub fn stages(&self) -> &[Arc<dyn Converter>] {
        &self.stages
    }

    #[inline]
    pub fn hops(&self) -> usize {
        self.stages.len()
    }

    /// True if both packages run the very same converter instances.
    pub fn same_stages(&self, stages: &[Arc<dyn Converter>]) -> bool {
        self.stages.len() == stages.len()
            && self.stages.iter().zip(stages).all(|(a, b)| Arc::ptr_eq(a, b))
    }

    /// `"DiskRepr -> RamRepr -> TextureRepr"`.
    pub fn describe(&self) -> String {
        describe_stages(&self.stages)
    }
}

pub(crate) fn describe_stages(stages: &[Arc<dyn Converter>]) -> String {
    let mut out = String::new();
    if let Some(first) = stages.first() {
        out.push_str(first.from_type().name());
    }
    for stage in stages {
        out.push_str(" -> ");
        out.push_str(stage.to_type().name());
    }
    out
}

impl core::fmt::Debug for ConverterPackage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("ConverterPackage").field(&self.describe()).finish()
    }
}
