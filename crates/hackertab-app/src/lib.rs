//! Hackertab Application
//!
//! The browser shell that binds widget chrome to the new-tab page, and the
//! native inspector for persisted state.

pub mod inspect;

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use dom::{DomElement, DomTray};

#[cfg(target_arch = "wasm32")]
pub use web::run_wasm;
