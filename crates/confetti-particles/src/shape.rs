//! Confetti shapes and their payloads

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// 2D affine matrix `[a, b, c, d, e, f]`, applied as
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`
pub type ShapeMatrix = [f64; 6];

/// Shared raster image used by bitmap confetti.
///
/// Equality is identity: two handles are equal when they point at the same
/// image allocation.
#[derive(Clone)]
pub struct BitmapHandle(pub Arc<RgbaImage>);

impl BitmapHandle {
    pub fn new(image: RgbaImage) -> Self {
        Self(Arc::new(image))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.0
    }
}

impl PartialEq for BitmapHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for BitmapHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitmapHandle({}x{})", self.0.width(), self.0.height())
    }
}

/// Shape of one confetti piece.
///
/// Named primitives deserialize from plain strings (`"square"`); payload
/// variants from tables (`{ text = { text = "x", scalar = 2.0 } }`). Bitmaps
/// can only be built in code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfettiShape {
    Square,
    Circle,
    Star,
    Path {
        data: String,
        #[serde(default)]
        matrix: Option<ShapeMatrix>,
    },
    #[serde(skip)]
    Bitmap {
        image: BitmapHandle,
        matrix: Option<ShapeMatrix>,
    },
    Text {
        text: String,
        #[serde(default)]
        scalar: Option<f64>,
        #[serde(default, alias = "fontFamily")]
        font_family: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },
}

impl ConfettiShape {
    /// Stable lowercase name, used in logs and draw streams
    pub fn kind(&self) -> &'static str {
        match self {
            ConfettiShape::Square => "square",
            ConfettiShape::Circle => "circle",
            ConfettiShape::Star => "star",
            ConfettiShape::Path { .. } => "path",
            ConfettiShape::Bitmap { .. } => "bitmap",
            ConfettiShape::Text { .. } => "text",
        }
    }

    pub fn matrix(&self) -> Option<&ShapeMatrix> {
        match self {
            ConfettiShape::Path { matrix, .. } | ConfettiShape::Bitmap { matrix, .. } => {
                matrix.as_ref()
            }
            _ => None,
        }
    }
}

/// Build a path-based shape from SVG-style path data
pub fn shape_from_path(data: impl Into<String>, matrix: Option<ShapeMatrix>) -> ConfettiShape {
    ConfettiShape::Path {
        data: data.into(),
        matrix,
    }
}

/// Build a text shape (typically a single emoji)
pub fn shape_from_text(
    text: impl Into<String>,
    scalar: Option<f64>,
    font_family: Option<String>,
    color: Option<String>,
) -> ConfettiShape {
    ConfettiShape::Text {
        text: text.into(),
        scalar,
        font_family,
        color,
    }
}

/// Build a bitmap shape from an already decoded image
pub fn shape_from_bitmap(image: RgbaImage, matrix: Option<ShapeMatrix>) -> ConfettiShape {
    ConfettiShape::Bitmap {
        image: BitmapHandle::new(image),
        matrix,
    }
}

/// Outline of a five-spike star centred on the origin, starting at the top
pub fn star_points(outer_radius: f64, inner_radius: f64) -> Vec<(f64, f64)> {
    const SPIKES: usize = 5;
    let step = PI / SPIKES as f64;
    let mut rot = PI / 2.0 * 3.0;
    let mut points = Vec::with_capacity(SPIKES * 2);

    for _ in 0..SPIKES {
        points.push((rot.cos() * outer_radius, rot.sin() * outer_radius));
        rot += step;
        points.push((rot.cos() * inner_radius, rot.sin() * inner_radius));
        rot += step;
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Shapes {
        shapes: Vec<ConfettiShape>,
    }

    #[test]
    fn named_shapes_from_toml() {
        let parsed: Shapes = toml::from_str(r#"shapes = ["square", "circle", "star"]"#).unwrap();
        assert_eq!(
            parsed.shapes,
            vec![ConfettiShape::Square, ConfettiShape::Circle, ConfettiShape::Star]
        );
    }

    #[test]
    fn payload_shapes_from_toml() {
        let parsed: Shapes = toml::from_str(
            r#"shapes = [
                { text = { text = "heart", scalar = 2 } },
                { path = { data = "M0 0 L10 0 L5 10z", matrix = [1, 0, 0, 1, -5, -5] } },
            ]"#,
        )
        .unwrap();
        assert_eq!(
            parsed.shapes[0],
            shape_from_text("heart", Some(2.0), None, None)
        );
        assert_eq!(
            parsed.shapes[1].matrix(),
            Some(&[1.0, 0.0, 0.0, 1.0, -5.0, -5.0])
        );
    }

    #[test]
    fn bitmap_equality_is_identity() {
        let image = RgbaImage::new(2, 2);
        let a = shape_from_bitmap(image.clone(), None);
        let b = shape_from_bitmap(image, None);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.kind(), "bitmap");
    }

    #[test]
    fn star_has_ten_points() {
        let points = star_points(8.0, 4.0);
        assert_eq!(points.len(), 10);
        // first point is straight up
        assert!(points[0].0.abs() < 1e-9);
        assert!((points[0].1 + 8.0).abs() < 1e-9);
    }
}
