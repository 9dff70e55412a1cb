use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    application::{ChartController, ChartSettings, SyncOutcome, TimeframeCallback},
    domain::{
        chart::{ChartTheme, DEFAULT_HEIGHT, RESIZE_DEBOUNCE_MS, SurfaceConfig},
        logging::LogComponent,
        market_data::{PricePoint, SignalMarker, Timeframe},
    },
    infrastructure::{CanvasBackend, GlooScheduler},
    log_debug, log_error, log_warn,
};

type BrowserChart = ChartController<CanvasBackend, GlooScheduler>;

const STYLES: &str = r#"
.signal-chart {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    background: #131722;
    border: 1px solid #2a2e39;
    border-radius: 8px;
    color: #d1d4dc;
    overflow: hidden;
}

.signal-chart-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    padding: 8px 12px;
    border-bottom: 1px solid #2a2e39;
}

.signal-chart-ticker {
    font-size: 16px;
    font-weight: 600;
}

.timeframe-strip {
    display: flex;
    gap: 4px;
}

.timeframe-btn {
    background: transparent;
    color: #787b86;
    border: none;
    padding: 4px 8px;
    border-radius: 4px;
    cursor: pointer;
    font-size: 12px;
}

.timeframe-btn:hover {
    background: #2a2e39;
}

.timeframe-btn.active {
    background: #2962ff;
    color: white;
}

.signal-chart-body {
    position: relative;
}

.signal-chart-loading {
    position: absolute;
    inset: 0;
    display: flex;
    align-items: center;
    justify-content: center;
    color: #787b86;
    font-size: 13px;
    pointer-events: none;
}
"#;

/// Candlestick chart with volume pane and signal markers.
///
/// `height` and `show_volume` rebuild the surface when they change; `data` and
/// `signal_markers` are pushed into the existing surface.
#[component]
pub fn PriceChart(
    #[prop(into)] ticker: String,
    #[prop(into)] data: MaybeSignal<Vec<PricePoint>>,
    #[prop(optional, into)] signal_markers: MaybeSignal<Vec<SignalMarker>>,
    #[prop(default = DEFAULT_HEIGHT.into(), into)] height: MaybeSignal<u32>,
    #[prop(default = true.into(), into)] show_volume: MaybeSignal<bool>,
    #[prop(optional)] on_timeframe_change: Option<Callback<Timeframe>>,
    #[prop(optional)] initial_timeframe: Timeframe,
    #[prop(optional)] theme: ChartTheme,
) -> impl IntoView {
    let container_ref = create_node_ref::<html::Div>();
    let active = create_rw_signal(initial_timeframe);
    let loading = create_rw_signal(true);

    let backend = CanvasBackend::new(
        move || {
            container_ref.get_untracked().map(|div| {
                let element: &web_sys::HtmlDivElement = &div;
                web_sys::HtmlElement::from(element.clone())
            })
        },
        theme.clone(),
    );
    let settings = ChartSettings {
        config: SurfaceConfig::new(height.get_untracked(), show_volume.get_untracked()),
        initial_timeframe,
        theme,
        resize_debounce_ms: RESIZE_DEBOUNCE_MS,
    };
    let controller = ChartController::new(backend, GlooScheduler, settings);

    let notify: TimeframeCallback = Rc::new(move |timeframe: Timeframe| {
        active.set(timeframe);
        if let Some(callback) = on_timeframe_change {
            callback.call(timeframe);
        }
    });
    controller.borrow_mut().set_on_timeframe_change(Some(notify));

    // Структурный триггер: height / show_volume пересоздают поверхность
    {
        let controller = controller.clone();
        create_effect(move |_| {
            let config = SurfaceConfig::new(height.get(), show_volume.get());
            if container_ref.get().is_none() {
                return;
            }
            with_controller(&controller, |ctl| {
                if let Err(e) = ctl.reconfigure(config) {
                    log_error!(
                        LogComponent::Presentation("PriceChart"),
                        "❌ surface rebuild failed ({}): {}",
                        config,
                        e
                    );
                }
                loading.set(ctl.is_loading());
            });
        });
    }

    // Триггер данных: push в уже существующую поверхность
    {
        let controller = controller.clone();
        create_effect(move |_| {
            let prices = data.get();
            let markers = signal_markers.get();
            if container_ref.get().is_none() {
                return;
            }
            with_controller(&controller, |ctl| {
                match ctl.update_data(prices, markers) {
                    Ok(SyncOutcome::Pushed(report)) => {
                        log_debug!(
                            LogComponent::Presentation("PriceChart"),
                            "📊 {} candles, {} markers pushed",
                            report.candles,
                            report.markers
                        );
                    }
                    Ok(SyncOutcome::Skipped) => {}
                    Err(e) => {
                        log_error!(LogComponent::Presentation("PriceChart"), "❌ data push failed: {}", e);
                    }
                }
                loading.set(ctl.is_loading());
            });
        });
    }

    {
        let controller = controller.clone();
        on_cleanup(move || {
            with_controller(&controller, |ctl| ctl.dispose());
        });
    }

    let buttons = Timeframe::ALL_VALUES
        .iter()
        .map(|&timeframe| {
            let controller = controller.clone();
            view! {
                <button
                    class="timeframe-btn"
                    class:active=move || active.get() == timeframe
                    on:click=move |_| {
                        ChartController::select_timeframe(&controller, timeframe);
                    }
                >
                    {timeframe.label().to_string()}
                </button>
            }
        })
        .collect_view();

    view! {
        <style>{STYLES}</style>
        <div class="signal-chart">
            <div class="signal-chart-header">
                <span class="signal-chart-ticker">{ticker}</span>
                <div class="timeframe-strip">{buttons}</div>
            </div>
            <div class="signal-chart-body">
                <div
                    class="signal-chart-loading"
                    style:display=move || if loading.get() { "flex" } else { "none" }
                >
                    "Loading chart…"
                </div>
                <div
                    class="signal-chart-container"
                    node_ref=container_ref
                    style:height=move || format!("{}px", height.get())
                />
            </div>
        </div>
    }
}

/// Effects may fire while a click handler still holds the controller; such
/// runs are skipped.
fn with_controller(controller: &Rc<RefCell<BrowserChart>>, f: impl FnOnce(&mut BrowserChart)) {
    match controller.try_borrow_mut() {
        Ok(mut ctl) => f(&mut ctl),
        Err(_) => {
            log_warn!(LogComponent::Presentation("PriceChart"), "controller busy, update skipped");
        }
    };
}
