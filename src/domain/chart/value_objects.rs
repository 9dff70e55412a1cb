use crate::domain::market_data::PricePoint;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Chart height when the host does not pass one
pub const DEFAULT_HEIGHT: u32 = 400;
/// Quiet period before a resize burst is applied
pub const RESIZE_DEBOUNCE_MS: u32 = 100;
/// Share of the surface height given to the volume pane
pub const VOLUME_PANE_RATIO: f64 = 0.2;

/// Value Object - shape of the surface. Any change means teardown + rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurfaceConfig {
    pub height: u32,
    pub show_volume: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self { height: DEFAULT_HEIGHT, show_volume: true }
    }
}

impl std::fmt::Display for SurfaceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}px", self.height)?;
        if self.show_volume {
            write!(f, "+volume")?;
        }
        Ok(())
    }
}

impl SurfaceConfig {
    pub fn new(height: u32, show_volume: bool) -> Self {
        Self { height, show_volume }
    }

    /// Pixel heights of the price pane and the (possibly empty) volume pane.
    pub fn pane_heights(&self) -> (f64, f64) {
        let total = self.height as f64;
        if self.show_volume {
            let volume = (total * VOLUME_PANE_RATIO).round();
            (total - volume, volume)
        } else {
            (total, 0.0)
        }
    }
}

/// Candle direction used for coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BarDirection {
    #[display(fmt = "up")]
    Up,
    #[display(fmt = "down")]
    Down,
}

impl BarDirection {
    pub fn of(point: &PricePoint) -> Self {
        if point.is_bullish() { Self::Up } else { Self::Down }
    }
}

/// Value Object - one bar of the volume pane, derived from a price point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeBar {
    pub time: u64,
    pub value: f64,
    pub color: String,
}

impl VolumeBar {
    pub fn from_point(point: &PricePoint, theme: &ChartTheme) -> Self {
        Self {
            time: point.time,
            value: point.volume as f64,
            color: theme.volume_color(BarDirection::of(point)).to_string(),
        }
    }
}

/// Colors used by the surface. Hosts may override it from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartTheme {
    pub up_color: String,
    pub down_color: String,
    pub volume_up_color: String,
    pub volume_down_color: String,
    pub background: String,
    pub text_color: String,
    pub grid_color: String,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            up_color: "#26a69a".to_string(),
            down_color: "#ef5350".to_string(),
            volume_up_color: "rgba(38, 166, 154, 0.5)".to_string(),
            volume_down_color: "rgba(239, 83, 80, 0.5)".to_string(),
            background: "#131722".to_string(),
            text_color: "#d1d4dc".to_string(),
            grid_color: "rgba(42, 46, 57, 0.6)".to_string(),
        }
    }
}

impl ChartTheme {
    pub fn candle_color(&self, direction: BarDirection) -> &str {
        match direction {
            BarDirection::Up => &self.up_color,
            BarDirection::Down => &self.down_color,
        }
    }

    pub fn volume_color(&self, direction: BarDirection) -> &str {
        match direction {
            BarDirection::Up => &self.volume_up_color,
            BarDirection::Down => &self.volume_down_color,
        }
    }
}

/// Resize debounce state: `Idle -> Resizing -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ResizeState {
    #[default]
    #[display(fmt = "idle")]
    Idle,
    #[display(fmt = "resizing")]
    Resizing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_pane_takes_a_fifth() {
        assert_eq!(SurfaceConfig::new(400, true).pane_heights(), (320.0, 80.0));
        assert_eq!(SurfaceConfig::new(400, false).pane_heights(), (400.0, 0.0));
    }

    #[test]
    fn config_display_mentions_volume_pane() {
        assert_eq!(SurfaceConfig::default().to_string(), "400px+volume");
        assert_eq!(SurfaceConfig::new(300, false).to_string(), "300px");
    }

    #[test]
    fn partial_theme_json_keeps_defaults() {
        let theme: ChartTheme = serde_json::from_str(r##"{"upColor":"#00ff00"}"##).unwrap();
        assert_eq!(theme.up_color, "#00ff00");
        assert_eq!(theme.down_color, ChartTheme::default().down_color);
    }
}
