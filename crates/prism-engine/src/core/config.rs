use crate::convert::RegistryConfig;
use crate::device::GpuInit;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Device to create; `None` builds a host-only engine.
    pub gpu: Option<GpuInit>,

    /// Fail start-up instead of falling back to host-only when no device is found.
    pub require_gpu: bool,

    pub registry: RegistryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gpu: Some(GpuInit::default()),
            require_gpu: false,
            registry: RegistryConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Host converters only; never touches a GPU.
    pub fn host_only() -> Self {
        Self {
            gpu: None,
            ..Self::default()
        }
    }
}
