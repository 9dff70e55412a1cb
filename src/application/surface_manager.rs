use crate::domain::{
    chart::{ChartBackend, ChartSurface, SurfaceConfig, SurfaceHandles},
    errors::ChartResult,
    logging::LogComponent,
};
use crate::{log_debug, log_info};

struct MountedSurface<B: ChartBackend> {
    handles: SurfaceHandles<B>,
    config: SurfaceConfig,
    _resize_watch: B::ResizeWatch,
}

/// Owns at most one live surface and the resize subscription that goes with it.
///
/// A surface is never reshaped in place: mounting always tears the previous
/// one down first, and dropping the manager releases whatever is still mounted.
pub struct SurfaceManager<B: ChartBackend> {
    backend: B,
    mounted: Option<MountedSurface<B>>,
    creations: u32,
    teardowns: u32,
}

impl<B: ChartBackend> SurfaceManager<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, mounted: None, creations: 0, teardowns: 0 }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Config of the live surface, if any
    pub fn config(&self) -> Option<SurfaceConfig> {
        self.mounted.as_ref().map(|m| m.config)
    }

    pub fn creations(&self) -> u32 {
        self.creations
    }

    pub fn teardowns(&self) -> u32 {
        self.teardowns
    }

    /// Replace the live surface with a fresh one built for `config`.
    ///
    /// Returns `Ok(false)` when the backend has no container to draw into; in
    /// that case nothing is left mounted.
    pub fn mount(&mut self, config: SurfaceConfig, on_resize: Box<dyn FnMut()>) -> ChartResult<bool> {
        self.teardown();

        let Some(handles) = self.backend.create_surface(&config)? else {
            log_debug!(
                LogComponent::Application("SurfaceManager"),
                "container not mounted, surface creation skipped"
            );
            return Ok(false);
        };

        let resize_watch = self.backend.watch_resize(on_resize);
        self.mounted = Some(MountedSurface { handles, config, _resize_watch: resize_watch });
        self.creations += 1;

        log_info!(
            LogComponent::Application("SurfaceManager"),
            "📐 surface #{} created ({})",
            self.creations,
            config
        );
        Ok(true)
    }

    /// Release the live surface and its resize subscription. Returns whether
    /// anything was mounted.
    pub fn teardown(&mut self) -> bool {
        let Some(mut mounted) = self.mounted.take() else {
            return false;
        };
        mounted.handles.surface.remove();
        drop(mounted);
        self.teardowns += 1;

        log_debug!(
            LogComponent::Application("SurfaceManager"),
            "🗑️ surface released ({} total)",
            self.teardowns
        );
        true
    }

    pub fn handles_mut(&mut self) -> Option<&mut SurfaceHandles<B>> {
        self.mounted.as_mut().map(|m| &mut m.handles)
    }

    /// Reflow the live surface to `width`. Returns `Ok(false)` without a surface.
    pub fn apply_width(&mut self, width: u32) -> ChartResult<bool> {
        match self.mounted.as_mut() {
            Some(mounted) => {
                mounted.handles.surface.apply_width(width)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<B: ChartBackend> Drop for SurfaceManager<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
