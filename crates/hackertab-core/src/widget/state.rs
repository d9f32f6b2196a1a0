//! Widget chrome state definitions.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Live chrome state of one registered widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetState {
    /// Stable id, unique within the session.
    pub id: String,
    /// Top-left offset within the viewport.
    pub position: Point,
    /// Index into the widget's size presets.
    pub size_tier: usize,
    /// Body hidden, tray proxy shown.
    pub minimized: bool,
    /// Drag and keyboard-move disabled.
    pub locked: bool,
}

impl WidgetState {
    /// Fresh state for a widget that has nothing persisted.
    pub fn new(id: impl Into<String>, position: Point, size_tier: usize) -> Self {
        Self {
            id: id.into(),
            position,
            size_tier,
            minimized: false,
            locked: false,
        }
    }

    /// Whether pointer drags and arrow keys may move this widget.
    pub fn is_movable(&self) -> bool {
        !self.locked && !self.minimized
    }

    /// Snapshot of the persisted fields.
    pub fn persisted(&self) -> PersistedWidgetState {
        PersistedWidgetState {
            position: self.position,
            size_tier: self.size_tier,
            minimized: self.minimized,
            locked: self.locked,
        }
    }
}

/// Interaction mode of a widget. Lock is an orthogonal flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromeMode {
    #[default]
    Normal,
    Dragging,
    Minimized,
}

/// The persisted form of a widget's chrome, stored as JSON under
/// `widget:{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedWidgetState {
    pub position: Point,
    pub size_tier: usize,
    pub minimized: bool,
    pub locked: bool,
}

impl Default for PersistedWidgetState {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            size_tier: 1,
            minimized: false,
            locked: false,
        }
    }
}

impl PersistedWidgetState {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Size tiers of the older four-step list (Small, Normal, Large, Huge) as
/// indices into the default presets.
const LEGACY_TIERS: [usize; 4] = [0, 1, 3, 4];

/// State written by older builds of the extension under `widget_{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyWidgetState {
    pub position: Point,
    pub current_size: Option<usize>,
    pub is_minimized: bool,
    pub is_locked: bool,
}

impl Default for LegacyWidgetState {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            current_size: None,
            is_minimized: false,
            is_locked: false,
        }
    }
}

impl LegacyWidgetState {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convert to the current layout.
    ///
    /// Tiers beyond the old list stay out of range so restore falls back to
    /// the default tier.
    pub fn into_persisted(self) -> PersistedWidgetState {
        let size_tier = match self.current_size {
            Some(tier) => LEGACY_TIERS.get(tier).copied().unwrap_or(usize::MAX),
            None => PersistedWidgetState::default().size_tier,
        };
        PersistedWidgetState {
            position: self.position,
            size_tier,
            minimized: self.is_minimized,
            locked: self.is_locked,
        }
    }
}
