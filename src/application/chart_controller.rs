//! Coordinates surface lifecycle, data pushes and the viewport for one chart.
//!
//! Two independent triggers drive the controller: [`ChartController::reconfigure`]
//! for structural changes (height, volume pane) and
//! [`ChartController::update_data`] for new payloads. Only the first one may
//! rebuild the surface; the second only creates it when none exists yet.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::data_sync::{DataSynchronizer, SyncReport};
use super::debounce::TimerScheduler;
use super::surface_manager::SurfaceManager;
use super::viewport::{TimeframeCallback, ViewportController};
use crate::domain::{
    chart::{ChartBackend, ChartTheme, RESIZE_DEBOUNCE_MS, ResizeState, SurfaceConfig},
    errors::ChartResult,
    logging::LogComponent,
    market_data::{PricePoint, SignalMarker, Timeframe},
};
use crate::{log_debug, log_error, log_trace, log_warn};

/// Host-provided settings fixed for the lifetime of a controller
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSettings {
    pub config: SurfaceConfig,
    pub initial_timeframe: Timeframe,
    pub theme: ChartTheme,
    pub resize_debounce_ms: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            config: SurfaceConfig::default(),
            initial_timeframe: Timeframe::default(),
            theme: ChartTheme::default(),
            resize_debounce_ms: RESIZE_DEBOUNCE_MS,
        }
    }
}

/// Result of a data trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing was pushed: empty payload, missing container or disposed chart.
    Skipped,
    Pushed(SyncReport),
}

pub struct ChartController<B: ChartBackend, S: TimerScheduler> {
    this: Weak<RefCell<Self>>,
    surfaces: SurfaceManager<B>,
    synchronizer: DataSynchronizer,
    viewport: ViewportController<S>,
    config: SurfaceConfig,
    prices: Vec<PricePoint>,
    markers: Vec<SignalMarker>,
    loading: bool,
    disposed: bool,
}

impl<B, S> ChartController<B, S>
where
    B: ChartBackend + 'static,
    S: TimerScheduler + 'static,
{
    pub fn new(backend: B, scheduler: S, settings: ChartSettings) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                this: this.clone(),
                surfaces: SurfaceManager::new(backend),
                synchronizer: DataSynchronizer::new(settings.theme),
                viewport: ViewportController::new(
                    settings.initial_timeframe,
                    scheduler,
                    settings.resize_debounce_ms,
                ),
                config: settings.config,
                prices: Vec::new(),
                markers: Vec::new(),
                loading: true,
                disposed: false,
            })
        })
    }

    pub fn config(&self) -> SurfaceConfig {
        self.config
    }

    pub fn timeframe(&self) -> Timeframe {
        self.viewport.timeframe()
    }

    /// `true` until the first payload has been fully pushed.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn resize_state(&self) -> ResizeState {
        self.viewport.resize_state()
    }

    pub fn surfaces(&self) -> &SurfaceManager<B> {
        &self.surfaces
    }

    pub fn viewport(&self) -> &ViewportController<S> {
        &self.viewport
    }

    pub fn set_on_timeframe_change(&mut self, callback: Option<TimeframeCallback>) {
        self.viewport.set_on_timeframe_change(callback);
    }

    /// Structural trigger. The same config as the live surface is a no-op;
    /// anything else tears the surface down and, when data is already known,
    /// builds and fills a new one before returning.
    pub fn reconfigure(&mut self, config: SurfaceConfig) -> ChartResult<()> {
        if self.disposed {
            return Ok(());
        }
        if self.surfaces.config() == Some(config) {
            return Ok(());
        }

        self.config = config;
        self.viewport.cancel_resize();
        self.surfaces.teardown();

        if self.prices.is_empty() {
            log_debug!(
                LogComponent::Application("ChartController"),
                "no data yet, surface creation deferred ({})",
                config
            );
            return Ok(());
        }

        if self.mount()? {
            self.push_current()?;
        }
        Ok(())
    }

    /// Data trigger. Replaces the payload and pushes it into the live surface,
    /// creating the surface first if there is none.
    pub fn update_data(
        &mut self,
        prices: Vec<PricePoint>,
        markers: Vec<SignalMarker>,
    ) -> ChartResult<SyncOutcome> {
        if self.disposed {
            return Ok(SyncOutcome::Skipped);
        }
        self.prices = prices;
        self.markers = markers;

        if self.prices.is_empty() {
            log_trace!(LogComponent::Application("ChartController"), "empty payload ignored");
            return Ok(SyncOutcome::Skipped);
        }

        if !self.surfaces.is_mounted() && !self.mount()? {
            return Ok(SyncOutcome::Skipped);
        }
        self.push_current()
    }

    /// Apply a user timeframe selection, then tell the host. The callback runs
    /// after the controller borrow is released so it may push new data
    /// synchronously.
    pub fn select_timeframe(this: &Rc<RefCell<Self>>, timeframe: Timeframe) -> Timeframe {
        let change = {
            let mut ctl = this.borrow_mut();
            if ctl.disposed {
                return ctl.viewport.timeframe();
            }
            ctl.viewport.select_timeframe(timeframe)
        };
        change.notify();
        timeframe
    }

    /// Resize event: (re)start the debounce window.
    pub fn notify_resize(&mut self) {
        if self.disposed || !self.surfaces.is_mounted() {
            return;
        }
        let this = self.this.clone();
        self.viewport.begin_resize(move || {
            let Some(ctl) = this.upgrade() else {
                return;
            };
            match ctl.try_borrow_mut() {
                Ok(mut ctl) => ctl.finish_resize(),
                Err(_) => {
                    log_warn!(
                        LogComponent::Application("ChartController"),
                        "controller busy, reflow dropped"
                    );
                }
            };
        });
    }

    /// Release the surface, the resize listener and any pending reflow. Every
    /// later call is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.viewport.shutdown();
        self.surfaces.teardown();
        log_debug!(LogComponent::Application("ChartController"), "disposed");
    }

    fn finish_resize(&mut self) {
        if self.disposed || !self.viewport.complete_resize() {
            return;
        }
        let Some(width) = self.surfaces.backend().container_width() else {
            log_trace!(
                LogComponent::Application("ChartController"),
                "container gone, reflow dropped"
            );
            return;
        };
        if let Err(e) = self.surfaces.apply_width(width) {
            log_error!(LogComponent::Application("ChartController"), "❌ reflow failed: {}", e);
        }
    }

    fn mount(&mut self) -> ChartResult<bool> {
        let this = self.this.clone();
        let on_resize = Box::new(move || {
            if let Some(ctl) = this.upgrade() {
                if let Ok(mut ctl) = ctl.try_borrow_mut() {
                    ctl.notify_resize();
                };
            }
        });
        self.surfaces.mount(self.config, on_resize)
    }

    fn push_current(&mut self) -> ChartResult<SyncOutcome> {
        let Some(handles) = self.surfaces.handles_mut() else {
            return Ok(SyncOutcome::Skipped);
        };
        match self.synchronizer.push(handles, &self.prices, &self.markers)? {
            Some(report) => {
                // Cleared only once every series holds the new payload.
                self.loading = false;
                Ok(SyncOutcome::Pushed(report))
            }
            None => Ok(SyncOutcome::Skipped),
        }
    }
}
