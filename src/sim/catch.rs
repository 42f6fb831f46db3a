//! Catch and bottom-edge tests
//!
//! A catch is axis-aligned proximity, not sprite overlap: the object is
//! caught when its origin is within `CATCH_RANGE` of the catcher's origin on
//! both axes. This matches the generous hitbox the game was tuned around.

use glam::Vec2;

use crate::consts::CATCH_RANGE;

/// True if an object at `obj` is close enough to the catcher to be caught
#[inline]
pub fn is_caught(obj: Vec2, catcher: Vec2) -> bool {
    (obj.x - catcher.x).abs() < CATCH_RANGE && (obj.y - catcher.y).abs() < CATCH_RANGE
}

/// True if an object at `obj` has fallen past the bottom edge
#[inline]
pub fn past_bottom(obj: Vec2, field_height: f32) -> bool {
    obj.y > field_height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_inside_box() {
        let catcher = Vec2::new(100.0, 500.0);
        assert!(is_caught(Vec2::new(120.0, 480.0), catcher));
        assert!(is_caught(Vec2::new(60.0, 540.0), catcher));
    }

    #[test]
    fn test_catch_threshold_is_exclusive() {
        let catcher = Vec2::new(100.0, 500.0);
        // Exactly CATCH_RANGE away on one axis: not a catch
        assert!(!is_caught(Vec2::new(150.0, 500.0), catcher));
        assert!(!is_caught(Vec2::new(100.0, 550.0), catcher));
        // Just inside
        assert!(is_caught(Vec2::new(149.9, 500.0), catcher));
    }

    #[test]
    fn test_both_axes_must_be_close() {
        let catcher = Vec2::new(100.0, 500.0);
        // Right x, wrong y
        assert!(!is_caught(Vec2::new(100.0, 300.0), catcher));
        // Right y, wrong x
        assert!(!is_caught(Vec2::new(300.0, 500.0), catcher));
    }

    #[test]
    fn test_past_bottom_is_strict() {
        assert!(!past_bottom(Vec2::new(0.0, 800.0), 800.0));
        assert!(past_bottom(Vec2::new(0.0, 800.1), 800.0));
    }
}
