//! Cancellable deferred tasks.

/// Source of one-shot timers. Dropping a handle cancels its timer.
pub trait TimerScheduler {
    type Handle;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Coalesces a burst of triggers into a single run once the burst goes quiet.
///
/// Every [`Debouncer::arm`] replaces the pending timer, so only the task armed
/// last can ever run.
pub struct Debouncer<S: TimerScheduler> {
    scheduler: S,
    delay_ms: u32,
    pending: Option<S::Handle>,
    armed_count: u64,
}

impl<S: TimerScheduler> Debouncer<S> {
    pub fn new(scheduler: S, delay_ms: u32) -> Self {
        Self { scheduler, delay_ms, pending: None, armed_count: 0 }
    }

    /// Schedule `task` after the quiet period, cancelling whatever was pending.
    pub fn arm(&mut self, task: impl FnOnce() + 'static) {
        // Drop the old handle first so two timers never coexist.
        self.pending = None;
        self.pending = Some(self.scheduler.schedule(self.delay_ms, Box::new(task)));
        self.armed_count += 1;
    }

    /// Returns whether a timer handle was held.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// How many times the timer was (re)armed since creation.
    pub fn armed_count(&self) -> u64 {
        self.armed_count
    }
}
