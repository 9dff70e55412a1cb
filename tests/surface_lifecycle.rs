mod common;

use common::{Harness, MockBackend, series};
use signal_chart_wasm::application::SyncOutcome;
use signal_chart_wasm::domain::chart::SurfaceConfig;
use signal_chart_wasm::domain::errors::ChartError;
use signal_chart_wasm::domain::market_data::SignalMarker;

#[test]
fn empty_data_creates_no_surface() {
    let h = Harness::new(SurfaceConfig::default());
    h.mount(Vec::new(), Vec::new());

    assert!(h.log().created.is_empty());
    assert_eq!(h.log().candle_pushes, 0);
    assert!(!h.chart.borrow().surfaces().is_mounted());
    assert!(h.chart.borrow().is_loading());
}

#[test]
fn surface_is_created_once_data_arrives() {
    let h = Harness::new(SurfaceConfig::default());
    h.mount(Vec::new(), Vec::new());

    let outcome = h.chart.borrow_mut().update_data(series(5), Vec::new()).unwrap();

    assert!(matches!(outcome, SyncOutcome::Pushed(_)));
    assert_eq!(h.log().created, vec![SurfaceConfig::default()]);
    assert_eq!(h.log().candles.len(), 5);
}

#[test]
fn data_updates_reuse_the_surface() {
    let h = Harness::new(SurfaceConfig::default());
    h.mount(series(10), Vec::new());

    for n in [11, 12, 5, 30] {
        h.chart.borrow_mut().update_data(series(n), Vec::new()).unwrap();
    }

    assert_eq!(h.log().created.len(), 1);
    assert_eq!(h.log().removed, 0);
    assert_eq!(h.log().candle_pushes, 5);
    assert_eq!(h.chart.borrow().surfaces().creations(), 1);
}

#[test]
fn same_config_is_a_noop() {
    let h = Harness::new(SurfaceConfig::default());
    h.mount(series(3), Vec::new());

    h.chart.borrow_mut().reconfigure(SurfaceConfig::default()).unwrap();

    assert_eq!(h.log().created.len(), 1);
    assert_eq!(h.log().removed, 0);
}

#[test]
fn structural_change_recreates_exactly_once() {
    let h = Harness::new(SurfaceConfig::new(400, true));
    h.mount(series(3), Vec::new());

    h.chart.borrow_mut().reconfigure(SurfaceConfig::new(400, false)).unwrap();

    let log = h.log();
    assert_eq!(log.created, vec![SurfaceConfig::new(400, true), SurfaceConfig::new(400, false)]);
    assert_eq!(log.removed, 1);
    assert_eq!(log.live, 1);
    assert_eq!(h.backend.listeners.active(), 1);
}

#[test]
fn rebuilt_surface_is_refilled_with_last_payload() {
    let h = Harness::new(SurfaceConfig::new(400, true));
    h.mount(series(4), vec![SignalMarker::buy(series(4)[1].time, "B")]);

    h.chart.borrow_mut().reconfigure(SurfaceConfig::new(600, true)).unwrap();

    let log = h.log();
    assert_eq!(log.candles, series(4));
    assert_eq!(log.volume.len(), 4);
    assert_eq!(log.markers.len(), 1);
    assert_eq!(log.stale_calls, 0);
}

#[test]
fn reconfigure_before_data_defers_creation() {
    let h = Harness::new(SurfaceConfig::default());

    h.chart.borrow_mut().reconfigure(SurfaceConfig::new(300, false)).unwrap();
    assert!(h.log().created.is_empty());

    h.chart.borrow_mut().update_data(series(2), Vec::new()).unwrap();
    assert_eq!(h.log().created, vec![SurfaceConfig::new(300, false)]);
}

#[test]
fn missing_container_is_a_silent_noop() {
    let h = Harness::with_backend(MockBackend::default(), SurfaceConfig::default());

    let outcome = h.chart.borrow_mut().update_data(series(3), Vec::new()).unwrap();

    assert_eq!(outcome, SyncOutcome::Skipped);
    assert!(h.log().created.is_empty());
    assert!(h.chart.borrow().is_loading());

    // Attached later: the next data trigger builds the surface.
    h.backend.container_width.set(Some(640));
    h.chart.borrow_mut().update_data(series(3), Vec::new()).unwrap();
    assert_eq!(h.log().created.len(), 1);
}

#[test]
fn zero_width_container_still_gets_a_surface() {
    let backend = MockBackend::with_width(0);
    let h = Harness::with_backend(backend, SurfaceConfig::default());
    h.mount(series(2), Vec::new());

    assert_eq!(h.log().created.len(), 1);
}

#[test]
fn backend_failure_propagates() {
    let h = Harness::new(SurfaceConfig::default());
    h.backend.fail_next_create.set(true);

    let err = h.chart.borrow_mut().update_data(series(3), Vec::new()).unwrap_err();

    assert!(matches!(err, ChartError::SurfaceCreation(_)));
    assert!(h.chart.borrow().is_loading());
    assert!(h.log().created.is_empty());
}

#[test]
fn dropping_the_controller_releases_the_surface() {
    let h = Harness::new(SurfaceConfig::default());
    h.mount(series(3), Vec::new());
    let backend = h.backend.clone();
    drop(h);

    assert_eq!(backend.log.borrow().live, 0);
    assert_eq!(backend.log.borrow().removed, 1);
    assert_eq!(backend.listeners.active(), 0);
}

#[test]
fn dispose_releases_and_blocks_later_calls() {
    let h = Harness::new(SurfaceConfig::default());
    h.mount(series(3), Vec::new());

    h.chart.borrow_mut().dispose();
    let outcome = h.chart.borrow_mut().update_data(series(6), Vec::new()).unwrap();
    h.chart.borrow_mut().reconfigure(SurfaceConfig::new(500, false)).unwrap();

    assert_eq!(outcome, SyncOutcome::Skipped);
    assert!(h.chart.borrow().is_disposed());
    let log = h.log();
    assert_eq!(log.created.len(), 1);
    assert_eq!(log.removed, 1);
    assert_eq!(log.stale_calls, 0);
}
