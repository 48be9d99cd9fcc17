//! Default sizes and styles (page pixels unless noted)

use crate::types::{BLACK, Color, GREY};

/// Page height when none is given on the command line
pub const PAGE_HEIGHT: f64 = 850.0;
/// Page width / height, close to 1/√2 (ISO 216 portrait)
pub const PAGE_ASPECT: f64 = 0.7070707;

pub const WALL_WIDTH: f64 = 1.0;
pub const WALL_COLOR: Color = BLACK;

pub const DOOR_LEAF_WIDTH: f64 = 1.0;
pub const DOOR_SWING_WIDTH: f64 = 0.5;
pub const DOOR_SWING_COLOR: Color = GREY;

pub const DIMENSION_WIDTH: f64 = 0.5;
pub const DIMENSION_COLOR: Color = GREY;
pub const DIMENSION_TEXT_SIZE: f64 = 10.0;
pub const DIMENSION_TEXT_COLOR: Color = BLACK;
/// Clearance between a dimension label and its measurement line
pub const DIMENSION_GAP: f64 = 2.0;

pub const AREA_TEXT_SIZE: f64 = 16.0;
pub const AREA_TEXT_COLOR: Color = BLACK;

pub const TEXT_SIZE: f64 = 12.0;
pub const TEXT_COLOR: Color = BLACK;
pub const LINE_WIDTH: f64 = 1.0;
pub const LINE_COLOR: Color = BLACK;

/// Page width for a page height, truncated to whole pixels
pub fn page_width(height: f64) -> f64 {
    (height * PAGE_ASPECT).floor()
}
