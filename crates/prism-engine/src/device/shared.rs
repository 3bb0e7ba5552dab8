use super::GpuContext;

/// Scope in which texture and compute work both touch the same resources.
///
/// Acquired through [`GpuContext::acquire_shared`]; the release wait runs in
/// `Drop`, so every exit path (early `?` returns, panics) closes the scope.
#[must_use = "the shared scope closes as soon as the guard is dropped"]
pub struct SharedAccess<'a> {
    ctx: &'a GpuContext,
    label: &'static str,
}

impl<'a> SharedAccess<'a> {
    pub(super) fn new(ctx: &'a GpuContext, label: &'static str) -> Self {
        Self { ctx, label }
    }

    #[inline]
    pub fn ctx(&self) -> &'a GpuContext {
        self.ctx
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Drop for SharedAccess<'_> {
    fn drop(&mut self) {
        self.ctx.release_shared(self.label);
    }
}
