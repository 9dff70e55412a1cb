//! Browser adapters for the domain ports.

pub mod rendering;
pub mod services;
pub mod timers;

pub use rendering::CanvasBackend;
pub use services::{BrowserTimeProvider, ConsoleLogger};
pub use timers::GlooScheduler;
