use std::time::Duration;

use crate::{
    foundation::core::Point,
    scenario::model::{LayoutSide, MoveSpeed},
};

/// Stage width that layout pixel offsets are authored against.
pub const REFERENCE_WIDTH: f64 = 1920.0;

const ON_SCREEN_Y: f64 = 0.5;
const BOTTOM_EDGE_Y: f64 = 1.5;

/// Normalized (0..1) stage position of a layout side, shifted by an authored pixel offset.
///
/// `None` means the layout keeps the model where it is.
pub fn side_position(side: LayoutSide, offset_x: f64) -> Option<Point> {
    let (x, y) = match side {
        LayoutSide::Left => (0.3, ON_SCREEN_Y),
        LayoutSide::Center => (0.5, ON_SCREEN_Y),
        LayoutSide::Right => (0.7, ON_SCREEN_Y),
        LayoutSide::LeftEdge => (-0.2, ON_SCREEN_Y),
        LayoutSide::RightEdge => (1.2, ON_SCREEN_Y),
        LayoutSide::BottomLeftEdge => (0.3, BOTTOM_EDGE_Y),
        LayoutSide::BottomEdge => (0.5, BOTTOM_EDGE_Y),
        LayoutSide::BottomRightEdge => (0.7, BOTTOM_EDGE_Y),
        LayoutSide::None | LayoutSide::Other(_) => return None,
    };
    let offset = if offset_x.is_finite() {
        offset_x / REFERENCE_WIDTH
    } else {
        0.0
    };
    Some(Point::new(x + offset, y))
}

pub fn move_duration(speed: MoveSpeed) -> Duration {
    match speed {
        MoveSpeed::Fast => Duration::from_millis(150),
        MoveSpeed::Slow => Duration::from_millis(600),
        MoveSpeed::Normal | MoveSpeed::Other(_) => Duration::from_millis(300),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/position.rs"]
mod tests;
