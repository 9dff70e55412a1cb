//! Market data consumed by the chart: price points, signal markers, timeframes.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
