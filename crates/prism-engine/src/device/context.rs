use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};

use super::{DeviceError, GpuInit, SharedAccess};

/// Owns the wgpu adapter, device and queue used by GPU-resident representations.
///
/// This type is the low-level conversion context:
/// - creates and stores Adapter/Device/Queue (no surface, no window)
/// - records and submits copy encoders
/// - blocks until submitted work has finished when a conversion needs it
///
/// Representations hold it through an `Arc` so storage can be reallocated and
/// read back without the owner passing the device around.
pub struct GpuContext {
    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Limits actually granted by the device.
    limits: wgpu::Limits,

    /// Number of live [`SharedAccess`] guards.
    shared_active: AtomicUsize,
}

impl GpuContext {
    /// Creates a headless GPU context.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: GpuInit) -> Result<Self> {
        let GpuInit {
            backends,
            power_preference,
            force_fallback_adapter,
            required_features,
            required_limits,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prism-engine device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let limits = device.limits();
        let info = adapter.get_info();
        log::info!("gpu context on {} ({:?})", info.name, info.backend);

        Ok(Self {
            adapter,
            device,
            queue,
            limits,
            shared_active: AtomicUsize::new(0),
        })
    }

    /// Blocking variant of [`new`](Self::new) for synchronous callers.
    pub fn new_blocking(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    /// Returns adapter name/backend information.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the limits granted by the device.
    pub fn limits(&self) -> &wgpu::Limits {
        &self.limits
    }

    pub fn create_encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    /// Submits the recorded commands.
    pub fn submit(&self, encoder: wgpu::CommandEncoder) -> wgpu::SubmissionIndex {
        self.queue.submit(std::iter::once(encoder.finish()))
    }

    /// Blocks until all submitted work has completed.
    pub fn finish(&self) -> std::result::Result<(), DeviceError> {
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map(|_| ())
            .map_err(|e| DeviceError(e.to_string()))
    }

    /// Flushes the queue and returns a guard that keeps the shared scope open.
    ///
    /// Dropping the guard waits for the work recorded inside the scope before
    /// anything else may touch the resources again.
    pub fn acquire_shared(
        &self,
        label: &'static str,
    ) -> std::result::Result<SharedAccess<'_>, DeviceError> {
        self.finish()?;
        self.shared_active.fetch_add(1, Ordering::AcqRel);
        log::trace!("shared access acquired: {label}");
        Ok(SharedAccess::new(self, label))
    }

    /// Number of shared-access scopes currently open.
    pub fn shared_active(&self) -> usize {
        self.shared_active.load(Ordering::Acquire)
    }

    pub(super) fn release_shared(&self, label: &'static str) {
        if let Err(err) = self.finish() {
            log::warn!("shared access {label}: wait on release failed: {err}");
        }
        self.shared_active.fetch_sub(1, Ordering::AcqRel);
        log::trace!("shared access released: {label}");
    }
}

impl std::fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let info = self.adapter.get_info();
        f.debug_struct("GpuContext")
            .field("adapter", &info.name)
            .field("backend", &info.backend)
            .finish_non_exhaustive()
    }
}
