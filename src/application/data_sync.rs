use crate::domain::{
    chart::{
        CandleSeriesApi, ChartBackend, ChartTheme, SurfaceHandles, TimeAxisApi, VolumeBar,
        VolumeSeriesApi,
    },
    errors::ChartResult,
    logging::LogComponent,
    market_data::{PricePoint, SignalMarker},
};
use crate::log_debug;

/// What one synchronization pushed into the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub candles: usize,
    pub volume_bars: usize,
    pub markers: usize,
    /// Markers whose time matched no price point.
    pub dropped_markers: usize,
}

/// One volume bar per price point, colored by that point's own direction.
pub fn derive_volume_bars(prices: &[PricePoint], theme: &ChartTheme) -> Vec<VolumeBar> {
    prices.iter().map(|p| VolumeBar::from_point(p, theme)).collect()
}

/// Keep only markers that sit on an existing bar, in time order.
///
/// `prices` must be sorted by strictly increasing time. Returns the retained
/// markers and how many were dropped.
pub fn resolve_markers(prices: &[PricePoint], markers: &[SignalMarker]) -> (Vec<SignalMarker>, usize) {
    let mut kept: Vec<SignalMarker> = markers
        .iter()
        .filter(|m| prices.binary_search_by_key(&m.time, |p| p.time).is_ok())
        .cloned()
        .collect();
    kept.sort_by_key(|m| m.time);
    let dropped = markers.len() - kept.len();
    (kept, dropped)
}

/// Pushes full replacements of candles, volume and markers into a mounted
/// surface. Never creates or reshapes the surface.
#[derive(Debug, Clone, Default)]
pub struct DataSynchronizer {
    theme: ChartTheme,
}

impl DataSynchronizer {
    pub fn new(theme: ChartTheme) -> Self {
        Self { theme }
    }

    /// Replace every series with the given payload and fit the time axis.
    ///
    /// An empty `prices` slice pushes nothing and returns `Ok(None)`, leaving a
    /// populated chart as it was.
    pub fn push<B: ChartBackend>(
        &self,
        handles: &mut SurfaceHandles<B>,
        prices: &[PricePoint],
        markers: &[SignalMarker],
    ) -> ChartResult<Option<SyncReport>> {
        if prices.is_empty() {
            return Ok(None);
        }

        handles.candles.set_data(prices)?;

        let volume_bars = match handles.volume.as_mut() {
            Some(volume) => {
                let bars = derive_volume_bars(prices, &self.theme);
                volume.set_data(&bars)?;
                bars.len()
            }
            None => 0,
        };

        let (placed, dropped_markers) = resolve_markers(prices, markers);
        if dropped_markers > 0 {
            log_debug!(
                LogComponent::Application("DataSync"),
                "dropped {} marker(s) outside the price series",
                dropped_markers
            );
        }
        // An empty set clears markers left over from the previous payload.
        handles.candles.set_markers(&placed)?;

        handles.time_axis.fit_content()?;

        Ok(Some(SyncReport {
            candles: prices.len(),
            volume_bars,
            markers: placed.len(),
            dropped_markers,
        }))
    }
}
