use std::rc::Rc;

use super::debounce::{Debouncer, TimerScheduler};
use crate::domain::{
    chart::ResizeState,
    logging::LogComponent,
    market_data::Timeframe,
};
use crate::log_trace;

/// Callback the host registers to fetch data for a newly selected window
pub type TimeframeCallback = Rc<dyn Fn(Timeframe)>;

/// A timeframe selection that has been applied locally and still has to be
/// announced to the host.
#[must_use = "call notify() so the host can fetch the new window"]
pub struct TimeframeChange {
    pub timeframe: Timeframe,
    callback: Option<TimeframeCallback>,
}

impl TimeframeChange {
    /// Invoke the host callback. Its result is neither awaited nor inspected.
    pub fn notify(self) {
        if let Some(callback) = self.callback {
            callback(self.timeframe);
        }
    }
}

/// Active timeframe plus the resize debounce state machine.
pub struct ViewportController<S: TimerScheduler> {
    timeframe: Timeframe,
    on_change: Option<TimeframeCallback>,
    state: ResizeState,
    debouncer: Debouncer<S>,
    reflows: u64,
}

impl<S: TimerScheduler> ViewportController<S> {
    pub fn new(initial: Timeframe, scheduler: S, debounce_ms: u32) -> Self {
        Self {
            timeframe: initial,
            on_change: None,
            state: ResizeState::Idle,
            debouncer: Debouncer::new(scheduler, debounce_ms),
            reflows: 0,
        }
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn set_on_timeframe_change(&mut self, callback: Option<TimeframeCallback>) {
        self.on_change = callback;
    }

    /// Update the selection right away; the host is told through the returned
    /// change. Re-selecting the active value is announced too.
    pub fn select_timeframe(&mut self, timeframe: Timeframe) -> TimeframeChange {
        let previous = std::mem::replace(&mut self.timeframe, timeframe);
        log_trace!(
            LogComponent::Application("Viewport"),
            "timeframe {} -> {}",
            previous,
            timeframe
        );
        TimeframeChange { timeframe, callback: self.on_change.clone() }
    }

    pub fn resize_state(&self) -> ResizeState {
        self.state
    }

    /// Enter `Resizing` and (re)start the quiet-period timer. `on_quiet` runs
    /// only if no further resize arrives before the timer elapses.
    pub fn begin_resize(&mut self, on_quiet: impl FnOnce() + 'static) {
        self.state = ResizeState::Resizing;
        self.debouncer.arm(on_quiet);
    }

    /// Leave `Resizing`. Returns `false` when there was nothing to finish,
    /// e.g. the pending reflow was cancelled in the meantime.
    pub fn complete_resize(&mut self) -> bool {
        if self.state != ResizeState::Resizing {
            return false;
        }
        self.state = ResizeState::Idle;
        self.reflows += 1;
        true
    }

    /// Drop a pending reflow without running it.
    pub fn cancel_resize(&mut self) {
        self.debouncer.cancel();
        self.state = ResizeState::Idle;
    }

    /// Cancel timers and forget the host callback.
    pub fn shutdown(&mut self) {
        self.cancel_resize();
        self.on_change = None;
    }

    /// Completed quiet periods since creation.
    pub fn reflow_count(&self) -> u64 {
        self.reflows
    }

    pub fn resize_events(&self) -> u64 {
        self.debouncer.armed_count()
    }
}
