//! Canvas 2D implementation of the chart surface ports.
//!
//! One `<canvas>` is appended to the container per surface. The series and
//! time-axis handles share the scene behind an `Rc<RefCell<_>>` and redraw the
//! whole canvas after every change.

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement};

use crate::domain::{
    chart::{
        BarDirection, CandleSeriesApi, ChartBackend, ChartSurface, ChartTheme, SurfaceConfig,
        SurfaceHandles, TimeAxisApi, VolumeBar, VolumeSeriesApi,
    },
    errors::{ChartError, ChartResult},
    logging::LogComponent,
    market_data::{MarkerPosition, MarkerShape, PricePoint, SignalMarker},
};
use crate::event_utils::{EventOptions, WindowEventListenerHandle, window_event_listener_with_options};
use crate::time_utils::format_time_label;
use crate::{log_debug, log_trace};

const PRICE_SCALE_WIDTH: f64 = 64.0;
const TIME_AXIS_HEIGHT: f64 = 22.0;
const PANE_PADDING: f64 = 8.0;
const BODY_RATIO: f64 = 0.7;
const MARKER_SIZE: f64 = 6.0;
const MARKER_OFFSET: f64 = 10.0;
const MIN_LABEL_SPACING: f64 = 80.0;
const GRID_LINES: usize = 4;

/// Геометрия одного кадра в CSS-пикселях
struct Layout {
    plot_width: f64,
    price_top: f64,
    price_bottom: f64,
    volume_top: f64,
    volume_bottom: f64,
    axis_top: f64,
}

impl Layout {
    fn new(width: u32, config: &SurfaceConfig) -> Self {
        let (price_height, volume_height) = config.pane_heights();
        let axis_top = (config.height as f64 - TIME_AXIS_HEIGHT).max(0.0);
        let price_bottom = if volume_height > 0.0 { price_height - PANE_PADDING } else { axis_top - PANE_PADDING };
        Self {
            plot_width: (width as f64 - PRICE_SCALE_WIDTH).max(0.0),
            price_top: PANE_PADDING,
            price_bottom: price_bottom.max(PANE_PADDING),
            volume_top: price_height,
            volume_bottom: axis_top,
            axis_top,
        }
    }
}

/// Диапазон цен, отображаемый на ценовую панель
struct PriceScale {
    min: f64,
    max: f64,
    top: f64,
    bottom: f64,
}

impl PriceScale {
    fn new(points: &[PricePoint], top: f64, bottom: f64) -> Self {
        let (mut min, mut max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.low), hi.max(p.high)));
        let pad = ((max - min) * 0.05).max(max.abs() * 0.001).max(f64::EPSILON);
        min -= pad;
        max += pad;
        Self { min, max, top, bottom }
    }

    fn y(&self, price: f64) -> f64 {
        self.bottom - (price - self.min) / (self.max - self.min) * (self.bottom - self.top)
    }
}

/// Размер backing store в физических пикселях
pub fn backing_size(css_px: u32, pixel_ratio: f64) -> u32 {
    (css_px as f64 * pixel_ratio).round().max(0.0) as u32
}

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(1.0)
}

struct Scene {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    /// CSS-пиксели; рисуем в них, масштаб задаёт `pixel_ratio`
    width: u32,
    pixel_ratio: f64,
    config: SurfaceConfig,
    theme: ChartTheme,
    candles: Vec<PricePoint>,
    volume: Vec<VolumeBar>,
    markers: Vec<SignalMarker>,
    /// Видимый диапазон индексов `[start, end)`
    visible: (usize, usize),
    removed: bool,
}

impl Scene {
    fn visible_candles(&self) -> &[PricePoint] {
        let end = self.visible.1.min(self.candles.len());
        let start = self.visible.0.min(end);
        &self.candles[start..end]
    }

    /// Физический размер канваса = CSS-размер * devicePixelRatio.
    fn resize_backing(&self) -> ChartResult<()> {
        self.canvas.set_width(backing_size(self.width, self.pixel_ratio));
        self.canvas.set_height(backing_size(self.config.height, self.pixel_ratio));
        let style = self.canvas.style();
        style.set_property("width", &format!("{}px", self.width))?;
        style.set_property("height", &format!("{}px", self.config.height))?;
        Ok(())
    }

    /// Перерисовка после замены данных серии
    fn redraw_after_push(&self) -> ChartResult<()> {
        self.draw().map_err(|e| ChartError::DataPush(e.to_string()))
    }

    fn set_fill(&self, color: &str) {
        self.context.set_fill_style(&JsValue::from_str(color));
    }

    fn set_stroke(&self, color: &str) {
        self.context.set_stroke_style(&JsValue::from_str(color));
    }

    fn draw(&self) -> ChartResult<()> {
        if self.removed {
            return Ok(());
        }
        let width = self.width as f64;
        let height = self.config.height as f64;

        self.context.set_transform(self.pixel_ratio, 0.0, 0.0, self.pixel_ratio, 0.0, 0.0)?;
        self.context.clear_rect(0.0, 0.0, width, height);
        self.set_fill(&self.theme.background);
        self.context.fill_rect(0.0, 0.0, width, height);

        let visible = self.visible_candles();
        if visible.is_empty() {
            return Ok(());
        }

        let layout = Layout::new(self.width, &self.config);
        let scale = PriceScale::new(visible, layout.price_top, layout.price_bottom);
        let spacing = layout.plot_width / visible.len() as f64;

        self.draw_grid(&layout, &scale)?;
        self.draw_candles(visible, &scale, spacing);
        if self.config.show_volume {
            self.draw_volume(&layout, spacing);
        }
        self.draw_markers(visible, &scale, spacing)?;
        self.draw_time_axis(visible, &layout, spacing)?;
        Ok(())
    }

    fn draw_grid(&self, layout: &Layout, scale: &PriceScale) -> ChartResult<()> {
        self.context.set_line_width(1.0);
        self.set_stroke(&self.theme.grid_color);
        self.context.set_font("11px sans-serif");
        self.context.set_text_align("left");

        for step in 0..=GRID_LINES {
            let price = scale.min + (scale.max - scale.min) * step as f64 / GRID_LINES as f64;
            let y = scale.y(price).round() + 0.5;
            self.context.begin_path();
            self.context.move_to(0.0, y);
            self.context.line_to(layout.plot_width, y);
            self.context.stroke();

            self.set_fill(&self.theme.text_color);
            self.context.fill_text(&format!("{:.2}", price), layout.plot_width + 6.0, y + 4.0)?;
        }
        Ok(())
    }

    fn draw_candles(&self, visible: &[PricePoint], scale: &PriceScale, spacing: f64) {
        let body_width = (spacing * BODY_RATIO).max(1.0);

        for (i, point) in visible.iter().enumerate() {
            let color = self.theme.candle_color(BarDirection::of(point));
            let x = (i as f64 + 0.5) * spacing;

            self.set_stroke(color);
            self.context.begin_path();
            self.context.move_to(x, scale.y(point.high));
            self.context.line_to(x, scale.y(point.low));
            self.context.stroke();

            let open_y = scale.y(point.open);
            let close_y = scale.y(point.close);
            let body_top = open_y.min(close_y);
            let body_height = (open_y - close_y).abs().max(1.0);
            self.set_fill(color);
            self.context.fill_rect(x - body_width / 2.0, body_top, body_width, body_height);
        }
    }

    fn draw_volume(&self, layout: &Layout, spacing: f64) {
        let end = self.visible.1.min(self.volume.len());
        let start = self.visible.0.min(end);
        let bars = &self.volume[start..end];
        let max_volume = bars.iter().map(|b| b.value).fold(0.0, f64::max);
        if max_volume <= 0.0 {
            return;
        }

        let pane_height = (layout.volume_bottom - layout.volume_top).max(0.0);
        let bar_width = (spacing * BODY_RATIO).max(1.0);
        for (i, bar) in bars.iter().enumerate() {
            let h = bar.value / max_volume * pane_height;
            let x = (i as f64 + 0.5) * spacing;
            self.set_fill(&bar.color);
            self.context.fill_rect(x - bar_width / 2.0, layout.volume_bottom - h, bar_width, h);
        }
    }

    fn draw_markers(&self, visible: &[PricePoint], scale: &PriceScale, spacing: f64) -> ChartResult<()> {
        self.context.set_font("11px sans-serif");
        self.context.set_text_align("center");

        for marker in &self.markers {
            let Ok(index) = visible.binary_search_by_key(&marker.time, |p| p.time) else {
                continue;
            };
            let point = &visible[index];
            let x = (index as f64 + 0.5) * spacing;
            let (y, text_y) = match marker.position {
                MarkerPosition::AboveBar => {
                    let y = scale.y(point.high) - MARKER_OFFSET;
                    (y, y - MARKER_SIZE - 4.0)
                }
                MarkerPosition::BelowBar => {
                    let y = scale.y(point.low) + MARKER_OFFSET;
                    (y, y + MARKER_SIZE + 12.0)
                }
                MarkerPosition::InBar => {
                    let y = scale.y((point.open + point.close) / 2.0);
                    (y, y - MARKER_SIZE - 4.0)
                }
            };

            self.set_fill(&marker.color);
            self.context.begin_path();
            match marker.shape {
                MarkerShape::ArrowUp => {
                    self.context.move_to(x, y - MARKER_SIZE);
                    self.context.line_to(x + MARKER_SIZE, y + MARKER_SIZE);
                    self.context.line_to(x - MARKER_SIZE, y + MARKER_SIZE);
                    self.context.close_path();
                }
                MarkerShape::ArrowDown => {
                    self.context.move_to(x, y + MARKER_SIZE);
                    self.context.line_to(x + MARKER_SIZE, y - MARKER_SIZE);
                    self.context.line_to(x - MARKER_SIZE, y - MARKER_SIZE);
                    self.context.close_path();
                }
                MarkerShape::Circle => {
                    self.context.arc(x, y, MARKER_SIZE, 0.0, 2.0 * PI)?;
                }
                MarkerShape::Square => {
                    self.context.rect(x - MARKER_SIZE, y - MARKER_SIZE, 2.0 * MARKER_SIZE, 2.0 * MARKER_SIZE);
                }
            }
            self.context.fill();

            if !marker.text.is_empty() {
                self.context.fill_text(&marker.text, x, text_y)?;
            }
        }
        Ok(())
    }

    fn draw_time_axis(&self, visible: &[PricePoint], layout: &Layout, spacing: f64) -> ChartResult<()> {
        let (Some(first), Some(last)) = (visible.first(), visible.last()) else {
            return Ok(());
        };
        let span = last.time.saturating_sub(first.time);
        let every = ((MIN_LABEL_SPACING / spacing.max(f64::EPSILON)).ceil() as usize).max(1);

        self.set_fill(&self.theme.text_color);
        self.context.set_font("11px sans-serif");
        self.context.set_text_align("center");
        for (i, point) in visible.iter().enumerate().step_by(every) {
            let x = (i as f64 + 0.5) * spacing;
            self.context.fill_text(&format_time_label(point.time, span), x, layout.axis_top + 15.0)?;
        }
        Ok(())
    }
}

type SharedScene = Rc<RefCell<Scene>>;

pub struct CanvasSurface {
    scene: SharedScene,
}

impl ChartSurface for CanvasSurface {
    fn apply_width(&mut self, width: u32) -> ChartResult<()> {
        let mut scene = self.scene.borrow_mut();
        let pixel_ratio = device_pixel_ratio();
        if scene.removed || (scene.width == width && scene.pixel_ratio == pixel_ratio) {
            return Ok(());
        }
        scene.width = width;
        scene.pixel_ratio = pixel_ratio;
        scene.resize_backing()?;
        log_trace!(LogComponent::Infrastructure("CanvasSurface"), "reflow to {}px", width);
        scene.draw()
    }

    fn remove(&mut self) {
        let mut scene = self.scene.borrow_mut();
        if scene.removed {
            return;
        }
        scene.removed = true;
        scene.candles.clear();
        scene.volume.clear();
        scene.markers.clear();
        scene.canvas.remove();
    }
}

pub struct CanvasCandleSeries {
    scene: SharedScene,
}

impl CandleSeriesApi for CanvasCandleSeries {
    fn set_data(&mut self, points: &[PricePoint]) -> ChartResult<()> {
        let mut scene = self.scene.borrow_mut();
        scene.candles = points.to_vec();
        let len = scene.candles.len();
        scene.visible = (0, len);
        scene.redraw_after_push()
    }

    fn set_markers(&mut self, markers: &[SignalMarker]) -> ChartResult<()> {
        let mut scene = self.scene.borrow_mut();
        scene.markers = markers.to_vec();
        scene.redraw_after_push()
    }
}

pub struct CanvasVolumeSeries {
    scene: SharedScene,
}

impl VolumeSeriesApi for CanvasVolumeSeries {
    fn set_data(&mut self, bars: &[VolumeBar]) -> ChartResult<()> {
        let mut scene = self.scene.borrow_mut();
        scene.volume = bars.to_vec();
        scene.redraw_after_push()
    }
}

pub struct CanvasTimeAxis {
    scene: SharedScene,
}

impl TimeAxisApi for CanvasTimeAxis {
    fn fit_content(&mut self) -> ChartResult<()> {
        let mut scene = self.scene.borrow_mut();
        let len = scene.candles.len();
        scene.visible = (0, len);
        scene.draw()
    }
}

/// Builds canvas surfaces inside a host container.
pub struct CanvasBackend {
    container: Box<dyn Fn() -> Option<HtmlElement>>,
    theme: ChartTheme,
}

impl CanvasBackend {
    /// `container` is asked for the element each time; returning `None` means
    /// "not mounted".
    pub fn new(container: impl Fn() -> Option<HtmlElement> + 'static, theme: ChartTheme) -> Self {
        Self { container: Box::new(container), theme }
    }

    /// Look the container up by DOM id on every use.
    pub fn for_element_id(id: impl Into<String>, theme: ChartTheme) -> Self {
        let id = id.into();
        Self::new(
            move || {
                web_sys::window()?
                    .document()?
                    .get_element_by_id(&id)?
                    .dyn_into::<HtmlElement>()
                    .ok()
            },
            theme,
        )
    }

    fn resolve_container(&self) -> Option<HtmlElement> {
        (self.container)().filter(|el| el.is_connected())
    }
}

impl ChartBackend for CanvasBackend {
    type Surface = CanvasSurface;
    type Candles = CanvasCandleSeries;
    type Volume = CanvasVolumeSeries;
    type TimeAxis = CanvasTimeAxis;
    type ResizeWatch = WindowEventListenerHandle;

    fn create_surface(&mut self, config: &SurfaceConfig) -> ChartResult<Option<SurfaceHandles<Self>>> {
        let Some(container) = self.resolve_container() else {
            return Ok(None);
        };
        let document = container
            .owner_document()
            .ok_or_else(|| ChartError::Browser("container has no owner document".to_string()))?;

        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ChartError::SurfaceCreation("created element is not a canvas".to_string()))?;

        // Нулевая ширина берётся как есть, следующий resize её исправит.
        let width = container.client_width().max(0) as u32;
        canvas.style().set_property("display", "block")?;
        container.append_child(&canvas)?;

        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| ChartError::SurfaceCreation("2D context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ChartError::SurfaceCreation("failed to cast to 2D context".to_string()))?;

        let pixel_ratio = device_pixel_ratio();
        log_debug!(
            LogComponent::Infrastructure("CanvasBackend"),
            "🎨 canvas {}x{} attached (dpr {})",
            width,
            config.height,
            pixel_ratio
        );

        let scene = Rc::new(RefCell::new(Scene {
            canvas,
            context,
            width,
            pixel_ratio,
            config: *config,
            theme: self.theme.clone(),
            candles: Vec::new(),
            volume: Vec::new(),
            markers: Vec::new(),
            visible: (0, 0),
            removed: false,
        }));
        {
            let scene = scene.borrow();
            scene.resize_backing()?;
            scene.draw()?;
        }

        Ok(Some(SurfaceHandles {
            surface: CanvasSurface { scene: scene.clone() },
            candles: CanvasCandleSeries { scene: scene.clone() },
            volume: config.show_volume.then(|| CanvasVolumeSeries { scene: scene.clone() }),
            time_axis: CanvasTimeAxis { scene },
        }))
    }

    fn container_width(&self) -> Option<u32> {
        self.resolve_container().map(|el| el.client_width().max(0) as u32)
    }

    fn watch_resize(&mut self, mut on_resize: Box<dyn FnMut()>) -> WindowEventListenerHandle {
        window_event_listener_with_options(leptos::ev::resize, &EventOptions::default(), move |_| {
            on_resize()
        })
    }
}
