//! Chrome configuration.

use crate::debounce::DEFAULT_RESIZE_DEBOUNCE_MS;
use crate::widget::SizePresets;
use kurbo::Point;
use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Duration;

/// Prefix of the persistence key for a widget's chrome state.
pub const WIDGET_KEY_PREFIX: &str = "widget:";

/// Key prefix used by older builds of the extension. Read-only.
pub const LEGACY_KEY_PREFIX: &str = "widget_";

/// Manager-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChromeConfig {
    /// Prefix prepended to the widget id to form its persistence key.
    pub key_prefix: String,
    /// Arrow-key step in pixels.
    pub base_step: f64,
    /// Arrow-key step with Shift held.
    pub accelerated_step: f64,
    /// Settle time for viewport resize bursts.
    pub resize_debounce_ms: u64,
    /// Tier a fresh widget starts at.
    pub default_tier: usize,
    /// Presets for widgets that don't bring their own.
    pub presets: SizePresets,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            key_prefix: WIDGET_KEY_PREFIX.to_string(),
            base_step: 1.0,
            accelerated_step: 10.0,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            default_tier: 1,
            presets: SizePresets::default(),
        }
    }
}

impl ChromeConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

/// Per-widget registration options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetConfig {
    /// Overrides [`ChromeConfig::presets`] for this widget.
    pub presets: Option<SizePresets>,
    /// Position used when nothing is persisted.
    pub default_position: Point,
    /// Overrides [`ChromeConfig::default_tier`] for this widget.
    pub default_tier: Option<usize>,
}

impl WidgetConfig {
    pub fn with_presets(mut self, presets: SizePresets) -> Self {
        self.presets = Some(presets);
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.default_position = position;
        self
    }

    pub fn with_tier(mut self, tier: usize) -> Self {
        self.default_tier = Some(tier);
        self
    }
}
