//! Hackertab Core Library
//!
//! Platform-agnostic widget chrome for the hackertab new-tab dashboard.

pub mod config;
pub mod debounce;
pub mod geometry;
pub mod storage;
pub mod widget;

#[cfg(test)]
mod testing;

pub use config::{ChromeConfig, WidgetConfig};
pub use debounce::Debouncer;
pub use storage::{ChromeStore, KeyValueStore, MemoryStore, PersistWrite, StorageError, StorageResult};
pub use widget::{
    Capability, ChromeError, ChromeMode, ChromeResult, ElementHandle, LegacyWidgetState, MinimizedTray,
    MoveKey, PersistedWidgetState, SizePreset, SizePresets, WidgetHandles, WidgetManager, WidgetState,
};
