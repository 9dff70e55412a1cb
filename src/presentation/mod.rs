//! Entry points for hosts: the Leptos component lives in `crate::app`, plain JS
//! pages use [`wasm_api::SignalChart`].

pub mod wasm_api;

pub use wasm_api::SignalChart;
