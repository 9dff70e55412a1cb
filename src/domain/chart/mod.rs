//! Chart surface: structural configuration, derived visuals and backend ports.

pub mod surface;
pub mod value_objects;

pub use surface::*;
pub use value_objects::*;
