//! Viewport containment math.

use kurbo::{Point, Size};

/// Largest position a widget of `extent` may occupy inside `viewport`.
///
/// When the widget is larger than the viewport on an axis the bound is 0,
/// pinning the widget to the top-left edge on that axis.
pub fn max_position(extent: Size, viewport: Size) -> Point {
    Point::new(
        (viewport.width - extent.width).max(0.0),
        (viewport.height - extent.height).max(0.0),
    )
}

/// Clamp a widget position so the widget stays fully inside the viewport.
pub fn clamp_position(position: Point, extent: Size, viewport: Size) -> Point {
    let max = max_position(extent, viewport);
    Point::new(
        clamp_axis(position.x, max.x),
        clamp_axis(position.y, max.y),
    )
}

/// Check whether a position already satisfies containment.
pub fn is_contained(position: Point, extent: Size, viewport: Size) -> bool {
    clamp_position(position, extent, viewport) == position
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    // NaN from a corrupt restore collapses to the origin
    if value.is_nan() {
        return 0.0;
    }
    value.min(max).max(0.0)
}

/// Format a pixel value for a CSS length property.
pub fn px(value: f64) -> String {
    format!("{}px", value)
}
