use gloo_timers::callback::Timeout;

use crate::application::debounce::TimerScheduler;

/// `setTimeout`-backed scheduler. Dropping the returned [`Timeout`] clears it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooScheduler;

impl TimerScheduler for GlooScheduler {
    type Handle = Timeout;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, task)
    }
}
