//! Ports to the drawing backend.
//!
//! A backend hands out one surface per structural configuration together with
//! handles to its series and time axis. Every push is a full replacement of the
//! series contents; handles never diff.

use super::value_objects::{SurfaceConfig, VolumeBar};
use crate::domain::errors::ChartResult;
use crate::domain::market_data::{PricePoint, SignalMarker};

/// Main pane candle series
pub trait CandleSeriesApi {
    fn set_data(&mut self, points: &[PricePoint]) -> ChartResult<()>;
    /// An empty slice clears previously set markers.
    fn set_markers(&mut self, markers: &[SignalMarker]) -> ChartResult<()>;
}

/// Volume pane histogram
pub trait VolumeSeriesApi {
    fn set_data(&mut self, bars: &[VolumeBar]) -> ChartResult<()>;
}

/// Shared horizontal axis of both panes
pub trait TimeAxisApi {
    /// Fit the visible range to the full extent of the loaded data.
    fn fit_content(&mut self) -> ChartResult<()>;
}

/// The live surface bound to a container
pub trait ChartSurface {
    fn apply_width(&mut self, width: u32) -> ChartResult<()>;
    /// Detach from the container and free everything the surface holds.
    fn remove(&mut self);
}

/// Everything a backend returns for one created surface
pub struct SurfaceHandles<B: ChartBackend + ?Sized> {
    pub surface: B::Surface,
    pub candles: B::Candles,
    pub volume: Option<B::Volume>,
    pub time_axis: B::TimeAxis,
}

/// Factory for surfaces bound to one container
pub trait ChartBackend {
    type Surface: ChartSurface;
    type Candles: CandleSeriesApi;
    type Volume: VolumeSeriesApi;
    type TimeAxis: TimeAxisApi;
    /// Keeps the resize subscription alive; dropping it unsubscribes.
    type ResizeWatch;

    /// `Ok(None)` when the container is not mounted.
    fn create_surface(&mut self, config: &SurfaceConfig) -> ChartResult<Option<SurfaceHandles<Self>>>;

    /// Current container width, `None` once the container is gone.
    fn container_width(&self) -> Option<u32>;

    fn watch_resize(&mut self, on_resize: Box<dyn FnMut()>) -> Self::ResizeWatch;
}
