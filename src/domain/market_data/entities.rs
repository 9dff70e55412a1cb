use super::value_objects::{MarkerPosition, MarkerShape};
use serde::{Deserialize, Serialize};

/// One OHLCV bucket. `time` is epoch seconds, unique and strictly increasing
/// within a series; the OHLC envelope is trusted from upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

impl PricePoint {
    pub fn new(time: u64, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self { time, open, high, low, close, volume }
    }

    /// Decided per bar against its own open, never against the previous close.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Same check the upstream feed is expected to guarantee
    pub fn is_valid(&self) -> bool {
        self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }
}

/// Annotation pinned to a bar of the price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalMarker {
    pub time: u64,
    pub position: MarkerPosition,
    pub shape: MarkerShape,
    pub color: String,
    #[serde(default)]
    pub text: String,
}

impl SignalMarker {
    pub fn new(
        time: u64,
        position: MarkerPosition,
        shape: MarkerShape,
        color: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self { time, position, shape, color: color.into(), text: text.into() }
    }

    /// Buy arrow under the bar.
    pub fn buy(time: u64, text: impl Into<String>) -> Self {
        Self::new(time, MarkerPosition::BelowBar, MarkerShape::ArrowUp, "#26a69a", text)
    }

    /// Sell arrow over the bar.
    pub fn sell(time: u64, text: impl Into<String>) -> Self {
        Self::new(time, MarkerPosition::AboveBar, MarkerShape::ArrowDown, "#ef5350", text)
    }
}
