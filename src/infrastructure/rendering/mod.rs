pub mod canvas_surface;

pub use canvas_surface::{
    CanvasBackend, CanvasCandleSeries, CanvasSurface, CanvasTimeAxis, CanvasVolumeSeries,
};
