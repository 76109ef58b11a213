//! Canvas-space geometry

use serde::{Deserialize, Serialize};

/// Pixel size of the drawable surface.
///
/// Canvas space has its origin at the top-left corner with y increasing
/// downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero or negative
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Map a normalized origin onto this canvas
    pub fn point_at(&self, origin: Origin) -> (f64, f64) {
        (self.width * origin.x, self.height * origin.y)
    }

    /// Convert a top-left-origin y coordinate to a bottom-left-origin one
    pub fn flip_y(&self, y: f64) -> f64 {
        self.height - y
    }
}

/// Normalized launch point: (0, 0) is the top-left corner, (1, 1) the bottom-right
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
}

impl Origin {
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::CENTER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_at_origin() {
        let canvas = CanvasSize::new(1920.0, 1080.0);
        assert_eq!(canvas.point_at(Origin::CENTER), (960.0, 540.0));
        assert_eq!(canvas.point_at(Origin::new(0.0, 1.0)), (0.0, 1080.0));
    }

    #[test]
    fn test_flip_y() {
        let canvas = CanvasSize::new(100.0, 50.0);
        assert_eq!(canvas.flip_y(0.0), 50.0);
        assert_eq!(canvas.flip_y(50.0), 0.0);
    }

    #[test]
    fn test_empty_canvas() {
        assert!(CanvasSize::default().is_empty());
        assert!(!CanvasSize::new(1.0, 1.0).is_empty());
    }
}
