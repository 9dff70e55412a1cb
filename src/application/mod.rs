pub mod chart_controller;
pub mod data_sync;
pub mod debounce;
pub mod surface_manager;
pub mod viewport;

pub use chart_controller::*;
pub use data_sync::*;
pub use debounce::*;
pub use surface_manager::*;
pub use viewport::*;
