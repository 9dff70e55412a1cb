#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use signal_chart_wasm::application::{ChartController, ChartSettings, TimerScheduler};
use signal_chart_wasm::domain::chart::{
    CandleSeriesApi, ChartBackend, ChartSurface, SurfaceConfig, SurfaceHandles, TimeAxisApi,
    VolumeBar, VolumeSeriesApi,
};
use signal_chart_wasm::domain::errors::{ChartError, ChartResult};
use signal_chart_wasm::domain::market_data::{PricePoint, SignalMarker};

/// Everything the in-memory backend saw, in call order where it matters.
#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub created: Vec<SurfaceConfig>,
    pub removed: u32,
    pub live: u32,
    pub candles: Vec<PricePoint>,
    pub volume: Vec<VolumeBar>,
    pub markers: Vec<SignalMarker>,
    pub candle_pushes: u32,
    pub volume_pushes: u32,
    pub marker_pushes: u32,
    pub fits: u32,
    pub widths: Vec<u32>,
    /// Calls that reached a handle after its surface was removed
    pub stale_calls: u32,
    pub calls: Vec<&'static str>,
}

type Listener = Rc<RefCell<Box<dyn FnMut()>>>;

#[derive(Clone, Default)]
pub struct Listeners {
    next_id: Rc<Cell<u64>>,
    entries: Rc<RefCell<Vec<(u64, Listener)>>>,
}

impl Listeners {
    pub fn active(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Fire every registered resize listener once.
    pub fn dispatch_resize(&self) {
        let listeners: Vec<Listener> = self.entries.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            (*listener.borrow_mut())();
        }
    }
}

/// Unregisters its listener on drop
pub struct ListenerGuard {
    id: u64,
    entries: Weak<RefCell<Vec<(u64, Listener)>>>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(entries) = self.entries.upgrade() {
            entries.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Backend that records pushes instead of drawing.
#[derive(Clone, Default)]
pub struct MockBackend {
    pub log: Rc<RefCell<SurfaceLog>>,
    /// `None` means the container is not in the document.
    pub container_width: Rc<Cell<Option<u32>>>,
    pub listeners: Listeners,
    pub fail_next_create: Rc<Cell<bool>>,
    /// The next candle push is rejected.
    pub fail_next_push: Rc<Cell<bool>>,
}

impl MockBackend {
    pub fn with_width(width: u32) -> Self {
        let backend = Self::default();
        backend.container_width.set(Some(width));
        backend
    }
}

struct Handle {
    log: Rc<RefCell<SurfaceLog>>,
    alive: Rc<Cell<bool>>,
    fail_push: Rc<Cell<bool>>,
}

impl Handle {
    fn record(&self, call: &'static str, f: impl FnOnce(&mut SurfaceLog)) {
        let mut log = self.log.borrow_mut();
        if !self.alive.get() {
            log.stale_calls += 1;
            return;
        }
        log.calls.push(call);
        f(&mut *log);
    }
}

pub struct MockSurface(Handle);
pub struct MockCandles(Handle);
pub struct MockVolume(Handle);
pub struct MockTimeAxis(Handle);

impl ChartSurface for MockSurface {
    fn apply_width(&mut self, width: u32) -> ChartResult<()> {
        self.0.record("width", |log| log.widths.push(width));
        Ok(())
    }

    fn remove(&mut self) {
        if self.0.alive.replace(false) {
            let mut log = self.0.log.borrow_mut();
            log.removed += 1;
            log.live -= 1;
        }
    }
}

impl CandleSeriesApi for MockCandles {
    fn set_data(&mut self, points: &[PricePoint]) -> ChartResult<()> {
        if self.0.fail_push.replace(false) {
            return Err(ChartError::DataPush("series rejected the payload".to_string()));
        }
        self.0.record("candles", |log| {
            log.candles = points.to_vec();
            log.candle_pushes += 1;
        });
        Ok(())
    }

    fn set_markers(&mut self, markers: &[SignalMarker]) -> ChartResult<()> {
        self.0.record("markers", |log| {
            log.markers = markers.to_vec();
            log.marker_pushes += 1;
        });
        Ok(())
    }
}

impl VolumeSeriesApi for MockVolume {
    fn set_data(&mut self, bars: &[VolumeBar]) -> ChartResult<()> {
        self.0.record("volume", |log| {
            log.volume = bars.to_vec();
            log.volume_pushes += 1;
        });
        Ok(())
    }
}

impl TimeAxisApi for MockTimeAxis {
    fn fit_content(&mut self) -> ChartResult<()> {
        self.0.record("fit", |log| log.fits += 1);
        Ok(())
    }
}

impl ChartBackend for MockBackend {
    type Surface = MockSurface;
    type Candles = MockCandles;
    type Volume = MockVolume;
    type TimeAxis = MockTimeAxis;
    type ResizeWatch = ListenerGuard;

    fn create_surface(&mut self, config: &SurfaceConfig) -> ChartResult<Option<SurfaceHandles<Self>>> {
        if self.fail_next_create.replace(false) {
            return Err(ChartError::SurfaceCreation("backend refused".to_string()));
        }
        if self.container_width.get().is_none() {
            return Ok(None);
        }

        {
            let mut log = self.log.borrow_mut();
            log.created.push(*config);
            log.live += 1;
            // Новая поверхность создаётся пустой
            log.candles.clear();
            log.volume.clear();
            log.markers.clear();
        }

        let alive = Rc::new(Cell::new(true));
        let handle = || Handle {
            log: self.log.clone(),
            alive: alive.clone(),
            fail_push: self.fail_next_push.clone(),
        };
        Ok(Some(SurfaceHandles {
            surface: MockSurface(handle()),
            candles: MockCandles(handle()),
            volume: config.show_volume.then(|| MockVolume(handle())),
            time_axis: MockTimeAxis(handle()),
        }))
    }

    fn container_width(&self) -> Option<u32> {
        self.container_width.get()
    }

    fn watch_resize(&mut self, on_resize: Box<dyn FnMut()>) -> ListenerGuard {
        let id = self.listeners.next_id.get();
        self.listeners.next_id.set(id + 1);
        self.listeners.entries.borrow_mut().push((id, Rc::new(RefCell::new(on_resize))));
        ListenerGuard { id, entries: Rc::downgrade(&self.listeners.entries) }
    }
}

struct Task {
    id: u64,
    due: u64,
    run: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Clock {
    now: u64,
    next_id: u64,
    tasks: Vec<Task>,
}

/// Virtual-time scheduler: nothing runs until [`ManualScheduler::advance`].
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<Clock>>,
}

pub struct ManualTimer {
    id: u64,
    clock: Weak<RefCell<Clock>>,
}

impl Drop for ManualTimer {
    fn drop(&mut self) {
        if let Some(clock) = self.clock.upgrade() {
            clock.borrow_mut().tasks.retain(|t| t.id != self.id);
        }
    }
}

impl TimerScheduler for ManualScheduler {
    type Handle = ManualTimer;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> ManualTimer {
        let mut clock = self.clock.borrow_mut();
        let id = clock.next_id;
        clock.next_id += 1;
        let due = clock.now + delay_ms as u64;
        clock.tasks.push(Task { id, due, run: task });
        ManualTimer { id, clock: Rc::downgrade(&self.clock) }
    }
}

impl ManualScheduler {
    pub fn now(&self) -> u64 {
        self.clock.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.clock.borrow().tasks.len()
    }

    /// Move the clock forward, running due tasks in deadline order.
    pub fn advance(&self, ms: u64) {
        let target = self.clock.borrow().now + ms;
        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                let due_index = clock
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(i, _)| i);
                due_index.map(|i| {
                    let task = clock.tasks.remove(i);
                    clock.now = task.due;
                    task.run
                })
            };
            match next {
                Some(run) => run(),
                None => break,
            }
        }
        self.clock.borrow_mut().now = target;
    }
}

pub type TestChart = Rc<RefCell<ChartController<MockBackend, ManualScheduler>>>;

pub struct Harness {
    pub chart: TestChart,
    pub backend: MockBackend,
    pub clock: ManualScheduler,
}

impl Harness {
    pub fn new(config: SurfaceConfig) -> Self {
        Self::with_backend(MockBackend::with_width(800), config)
    }

    pub fn with_backend(backend: MockBackend, config: SurfaceConfig) -> Self {
        let clock = ManualScheduler::default();
        let settings = ChartSettings { config, ..ChartSettings::default() };
        let chart = ChartController::new(backend.clone(), clock.clone(), settings);
        Self { chart, backend, clock }
    }

    /// Mount-time sequence of the component: structural trigger, then data trigger.
    pub fn mount(&self, prices: Vec<PricePoint>, markers: Vec<SignalMarker>) {
        let config = self.chart.borrow().config();
        self.chart.borrow_mut().reconfigure(config).unwrap();
        self.chart.borrow_mut().update_data(prices, markers).unwrap();
    }

    pub fn log(&self) -> std::cell::Ref<'_, SurfaceLog> {
        self.backend.log.borrow()
    }
}

pub fn bar(time: u64, open: f64, close: f64) -> PricePoint {
    PricePoint::new(time, open, open.max(close) + 1.0, open.min(close) - 1.0, close, 1_000 + time)
}

/// `n` daily bars starting at 2024-01-01, alternating up and down.
pub fn series(n: usize) -> Vec<PricePoint> {
    (0..n as u64)
        .map(|i| {
            let open = 100.0 + i as f64;
            let close = if i % 2 == 0 { open + 2.0 } else { open - 2.0 };
            bar(1_704_067_200 + i * 86_400, open, close)
        })
        .collect()
}
