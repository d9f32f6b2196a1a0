//! Widget chrome: the drag handle, minimize, resize and lock controls every
//! dashboard widget shares, plus the state they persist.
//!
//! Widget content stays with the widget. This module only owns where a
//! widget sits, how big it is, and whether it is minimized or locked.

mod handles;
mod manager;
mod presets;
mod state;

pub use handles::{Capability, ElementHandle, MinimizedTray, WidgetHandles};
pub use manager::{ChromeError, ChromeResult, MoveKey, WidgetManager};
pub use presets::{SizePreset, SizePresets};
pub use state::{ChromeMode, LegacyWidgetState, PersistedWidgetState, WidgetState};
