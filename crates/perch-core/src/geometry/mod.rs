//! Screen geometry for popup placement and sizing.

pub mod operations;
pub mod types;

pub use operations::{
    MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_SIZE, MIN_WIDTH, clamp_size, popup_origin,
};
pub use types::{OffsetRect, PixelSize, Point, Rect, Size};
