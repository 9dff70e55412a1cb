use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::application::{ChartController, ChartSettings, SyncOutcome};
use crate::domain::{
    chart::{ChartTheme, RESIZE_DEBOUNCE_MS, SurfaceConfig},
    errors::ChartError,
    logging::LogComponent,
    market_data::{PricePoint, SignalMarker, Timeframe},
};
use crate::infrastructure::{CanvasBackend, GlooScheduler};
use crate::{log_debug, log_warn};

type BrowserChart = ChartController<CanvasBackend, GlooScheduler>;

/// Chart handle for pages that do not use Leptos.
///
/// ```js
/// const chart = new SignalChart("chart", 400, true);
/// chart.onTimeframeChange(tf => api.fetch(tf).then(d => chart.setData(d.prices, d.markers)));
/// chart.setData(JSON.stringify(prices), JSON.stringify(markers));
/// ```
#[wasm_bindgen]
pub struct SignalChart {
    controller: Rc<RefCell<BrowserChart>>,
}

#[wasm_bindgen]
impl SignalChart {
    /// Bind to the element with `container_id`. The element is looked up again
    /// on every use, so it may be attached later.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container_id: String,
        height: Option<u32>,
        show_volume: Option<bool>,
        theme_json: Option<String>,
    ) -> Result<SignalChart, JsValue> {
        let theme = match theme_json {
            Some(json) => serde_json::from_str::<ChartTheme>(&json).map_err(ChartError::from)?,
            None => ChartTheme::default(),
        };
        let defaults = SurfaceConfig::default();
        let settings = ChartSettings {
            config: SurfaceConfig::new(
                height.unwrap_or(defaults.height),
                show_volume.unwrap_or(defaults.show_volume),
            ),
            initial_timeframe: Timeframe::default(),
            theme: theme.clone(),
            resize_debounce_ms: RESIZE_DEBOUNCE_MS,
        };
        log_debug!(LogComponent::Presentation("SignalChart"), "binding to #{}", container_id);
        let backend = CanvasBackend::for_element_id(container_id, theme);
        Ok(Self { controller: ChartController::new(backend, GlooScheduler, settings) })
    }

    /// Replace the chart payload. Both arguments are JSON arrays; `markers_json`
    /// may be omitted. Returns `true` when the data reached the surface.
    #[wasm_bindgen(js_name = setData)]
    pub fn set_data(&self, prices_json: &str, markers_json: Option<String>) -> Result<bool, JsValue> {
        let prices: Vec<PricePoint> = serde_json::from_str(prices_json).map_err(ChartError::from)?;
        let markers: Vec<SignalMarker> = match markers_json {
            Some(json) => serde_json::from_str(&json).map_err(ChartError::from)?,
            None => Vec::new(),
        };
        let outcome = self.borrow_mut()?.update_data(prices, markers)?;
        Ok(matches!(outcome, SyncOutcome::Pushed(_)))
    }

    #[wasm_bindgen(js_name = setHeight)]
    pub fn set_height(&self, height: u32) -> Result<(), JsValue> {
        let mut ctl = self.borrow_mut()?;
        let config = SurfaceConfig { height, ..ctl.config() };
        ctl.reconfigure(config)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setShowVolume)]
    pub fn set_show_volume(&self, show_volume: bool) -> Result<(), JsValue> {
        let mut ctl = self.borrow_mut()?;
        let config = SurfaceConfig { show_volume, ..ctl.config() };
        ctl.reconfigure(config)?;
        Ok(())
    }

    /// Select by label (`"1D"`, `"3M"`, `"ALL"`, ...). The registered
    /// `onTimeframeChange` callback runs before this returns.
    #[wasm_bindgen(js_name = selectTimeframe)]
    pub fn select_timeframe(&self, label: &str) -> Result<String, JsValue> {
        let timeframe: Timeframe = label
            .parse()
            .map_err(|_| ChartError::InvalidInput(format!("unknown timeframe '{}'", label)))?;
        Ok(ChartController::select_timeframe(&self.controller, timeframe).to_string())
    }

    /// Register `callback(label)`; pass `undefined` to unregister.
    #[wasm_bindgen(js_name = onTimeframeChange)]
    pub fn on_timeframe_change(&self, callback: Option<js_sys::Function>) -> Result<(), JsValue> {
        let callback = callback.map(|f| {
            Rc::new(move |timeframe: Timeframe| {
                if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(timeframe.label())) {
                    log_warn!(
                        LogComponent::Presentation("SignalChart"),
                        "timeframe callback threw: {:?}",
                        e
                    );
                }
            }) as Rc<dyn Fn(Timeframe)>
        });
        self.borrow_mut()?.set_on_timeframe_change(callback);
        Ok(())
    }

    pub fn timeframe(&self) -> String {
        self.controller.borrow().timeframe().to_string()
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.controller.borrow().is_loading()
    }

    /// Release the surface and listeners. The handle is inert afterwards.
    pub fn destroy(&self) -> Result<(), JsValue> {
        self.borrow_mut()?.dispose();
        Ok(())
    }

    fn borrow_mut(&self) -> Result<std::cell::RefMut<'_, BrowserChart>, ChartError> {
        self.controller
            .try_borrow_mut()
            .map_err(|_| ChartError::Browser("chart is busy (re-entrant call)".to_string()))
    }
}
