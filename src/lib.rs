use wasm_bindgen::prelude::*;

use crate::domain::logging::{LogComponent, get_logger};

pub mod app;
pub mod application;
pub mod domain;
pub mod event_utils;
pub mod infrastructure;
pub mod presentation;
pub mod time_utils;

pub use app::PriceChart;
pub use application::{ChartController, ChartSettings, SyncOutcome, SyncReport};
pub use domain::{
    chart::{ChartTheme, SurfaceConfig},
    errors::{ChartError, ChartResult},
    market_data::{MarkerPosition, MarkerShape, PricePoint, SignalMarker, Timeframe},
};
pub use presentation::SignalChart;

/// Install the panic hook, console logger and browser clock.
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let console_logger = if cfg!(debug_assertions) {
        infrastructure::services::ConsoleLogger::new_development()
    } else {
        infrastructure::services::ConsoleLogger::new_production()
    };
    domain::logging::init_logger(Box::new(console_logger));
    domain::logging::init_time_provider(Box::new(infrastructure::services::BrowserTimeProvider::new()));

    get_logger().info(LogComponent::Presentation("Initialize"), "🚀 signal chart module ready");
}
