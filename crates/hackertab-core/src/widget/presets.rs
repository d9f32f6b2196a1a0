//! Named size presets a widget cycles through.

use kurbo::Size;
use serde::{Deserialize, Serialize};

/// One size tier: a display name, pixel dimensions and the CSS class that
/// carries any tier-specific styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizePreset {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub class_name: String,
}

impl SizePreset {
    pub fn new(name: impl Into<String>, width: f64, height: f64, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            class_name: class_name.into(),
        }
    }

    /// Pixel dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Title shown on the resize control.
    pub fn title(&self) -> String {
        format!("Size: {}", self.name)
    }
}

/// Ordered list of size tiers for one widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizePresets(Vec<SizePreset>);

impl SizePresets {
    pub fn new(presets: Vec<SizePreset>) -> Self {
        Self(presets)
    }

    /// Number of tiers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Preset for a tier, if the tier is valid.
    pub fn get(&self, tier: usize) -> Option<&SizePreset> {
        self.0.get(tier)
    }

    /// Tier after `tier`, wrapping to the first.
    pub fn next_tier(&self, tier: usize) -> usize {
        if self.0.is_empty() {
            return 0;
        }
        (tier + 1) % self.0.len()
    }

    /// Clamp a tier to the last valid index.
    pub fn clamp_tier(&self, tier: usize) -> usize {
        tier.min(self.0.len().saturating_sub(1))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SizePreset> {
        self.0.iter()
    }
}

impl Default for SizePresets {
    fn default() -> Self {
        Self(vec![
            SizePreset::new("Small", 240.0, 180.0, "size-small"),
            SizePreset::new("Normal", 320.0, 240.0, "size-normal"),
            SizePreset::new("Medium", 360.0, 280.0, "size-medium"),
            SizePreset::new("Large", 400.0, 320.0, "size-large"),
            SizePreset::new("Huge", 480.0, 400.0, "size-huge"),
        ])
    }
}
