use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::convert::{builtin, ConverterRegistry};
use crate::data::{Data, DataKind, ElementBuffer, Layer, Volume};
use crate::device::GpuContext;
use crate::error::ConvertError;
use crate::repr::Representation;

use super::EngineConfig;

/// Owns the converter registry and the optional device context.
pub struct Engine {
    gpu: Option<Arc<GpuContext>>,
    registry: Arc<ConverterRegistry>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::new_with(config, |_, _| {})
    }

    /// Like [`new`](Self::new), with `extend` registering additional converters
    /// before chains are composed.
    pub fn new_with<F>(config: EngineConfig, extend: F) -> Result<Self>
    where
        F: FnOnce(&mut ConverterRegistry, Option<&Arc<GpuContext>>),
    {
        let mut registry = ConverterRegistry::new(config.registry.tie_break);
        builtin::register_host(&mut registry);

        let gpu = match config.gpu {
            None => None,
            Some(init) => match GpuContext::new_blocking(init) {
                Ok(ctx) => Some(Arc::new(ctx)),
                Err(err) if config.require_gpu => {
                    return Err(err).context("engine config requires a GPU");
                }
                Err(err) => {
                    log::warn!("no GPU, continuing with host converters only: {err:#}");
                    None
                }
            },
        };
        if let Some(ctx) = &gpu {
            builtin::register_gpu(&mut registry, ctx);
        }

        extend(&mut registry, gpu.as_ref());

        if config.registry.compose_chains {
            if config.registry.max_hops < 2 {
                bail!("max_hops must be at least 2, got {}", config.registry.max_hops);
            }
            registry.compose_chains(config.registry.max_hops);
        }

        log::info!(
            "engine ready: {} converters, {} packages, gpu: {}",
            registry.converter_count(),
            registry.package_count(),
            gpu.as_ref()
                .map(|ctx| ctx.adapter_info().name)
                .unwrap_or_else(|| "none".into())
        );
        for line in registry.describe() {
            log::debug!("  {line}");
        }

        Ok(Self {
            gpu,
            registry: Arc::new(registry),
        })
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ConverterRegistry> {
        &self.registry
    }

    #[inline]
    pub fn gpu(&self) -> Option<&Arc<GpuContext>> {
        self.gpu.as_ref()
    }

    /// Wraps `repr` in a data object bound to this engine's registry.
    pub fn data<K: DataKind, T: Representation>(&self, repr: T) -> Result<Data<K>, ConvertError> {
        Data::new(self.registry.clone(), repr)
    }

    pub fn volume<T: Representation>(&self, repr: T) -> Result<Volume, ConvertError> {
        self.data(repr)
    }

    pub fn layer<T: Representation>(&self, repr: T) -> Result<Layer, ConvertError> {
        self.data(repr)
    }

    pub fn element_buffer<T: Representation>(
        &self,
        repr: T,
    ) -> Result<ElementBuffer, ConvertError> {
        self.data(repr)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("gpu", &self.gpu)
            .field("converters", &self.registry.converter_count())
            .field("packages", &self.registry.package_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::typed;
    use crate::extent::Extent;
    use crate::format::DataFormat;
    use crate::repr::{DiskRepr, RamRepr, ReprType};
    use crate::testing::{ramp_f32, raw_file, RamToShadow, ShadowRepr};

    #[test]
    fn host_only_engine_has_disk_loader() {
        let engine = Engine::new(EngineConfig::host_only()).unwrap();
        assert!(engine.gpu().is_none());
        assert_eq!(engine.registry().converter_count(), 1);

        let extent = Extent::d3(2, 2, 2);
        let file = raw_file(bytemuck::cast_slice(&ramp_f32(extent)));
        let mut volume = engine.volume(DiskRepr::new(file.path(), extent, DataFormat::F32)).unwrap();
        let ram = volume.representation::<RamRepr>().unwrap();
        assert_eq!(ram.as_slice::<f32>().unwrap(), ramp_f32(extent).as_slice());
    }

    #[test]
    fn extension_converters_take_part_in_composition() {
        let engine = Engine::new_with(EngineConfig::host_only(), |reg, gpu| {
            assert!(gpu.is_none());
            reg.register(typed(RamToShadow::default()));
        })
        .unwrap();

        let registry = engine.registry();
        assert!(registry.has_path(ReprType::of::<DiskRepr>(), ReprType::of::<ShadowRepr>()));
        assert_eq!(registry.package_count(), 1);
    }

    #[test]
    fn chain_composition_can_be_disabled() {
        let mut config = EngineConfig::host_only();
        config.registry.compose_chains = false;
        let engine = Engine::new_with(config, |reg, _| {
            reg.register(typed(RamToShadow::default()));
        })
        .unwrap();
        assert_eq!(engine.registry().package_count(), 0);
    }

    #[test]
    fn single_hop_limit_is_refused() {
        let mut config = EngineConfig::host_only();
        config.registry.max_hops = 1;
        let err = Engine::new(config).unwrap_err();
        assert!(err.to_string().contains("max_hops"));
    }

    #[test]
    fn data_kind_follows_extent_rank() {
        let engine = Engine::new(EngineConfig::host_only()).unwrap();
        let ram = RamRepr::new(Extent::d1(16), DataFormat::U8);
        assert!(engine.layer(ram.clone()).is_err());
        assert!(engine.element_buffer(ram).is_ok());
    }

    #[test]
    fn default_config_asks_for_a_device() {
        let config = EngineConfig::default();
        assert!(config.gpu.is_some());
        assert!(!config.require_gpu);
        assert!(config.registry.compose_chains);
    }
}
