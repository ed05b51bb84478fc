use crate::geometry::types::{OffsetRect, PixelSize, Point, Rect, Size};

pub const MIN_WIDTH: u32 = 25;
pub const MIN_HEIGHT: u32 = 25;
pub const MAX_WIDTH: u32 = 800;
pub const MAX_HEIGHT: u32 = 600;

/// Placeholder size used while content is being measured.
pub const MIN_SIZE: PixelSize = PixelSize {
    width: MIN_WIDTH,
    height: MIN_HEIGHT,
};

/// Clamp a requested content size to the popup limits, in whole pixels.
///
/// NaN falls back to the minimum; infinities saturate at the bounds.
pub fn clamp_size(size: Size) -> PixelSize {
    PixelSize {
        width: clamp_dimension(size.width, MIN_WIDTH, MAX_WIDTH),
        height: clamp_dimension(size.height, MIN_HEIGHT, MAX_HEIGHT),
    }
}

fn clamp_dimension(value: f64, min: u32, max: u32) -> u32 {
    if value.is_nan() {
        return min;
    }
    value.floor().clamp(f64::from(min), f64::from(max)) as u32
}

/// Screen origin of the popup: anchor origin plus trigger offset, floored.
pub fn popup_origin(anchor_bounds: Rect, offset: OffsetRect) -> Point {
    Point {
        x: (f64::from(anchor_bounds.x) + offset.x).floor() as i32,
        y: (f64::from(anchor_bounds.y) + offset.y).floor() as i32,
    }
}
