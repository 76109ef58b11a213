//! Software bitmap backend built on the `image` crate

use crate::command::DrawCommand;
use crate::renderer::Renderer;
use crate::RenderError;
use confetti_core::{CanvasSize, Rgb};
use confetti_particles::{star_points, ConfettiShape, Particle};
use glam::{Affine2, Vec2};
use image::{Rgba, RgbaImage};
use std::path::Path;
use tracing::{debug, warn};

/// Called with the finished bitmap on every `present`
pub type FrameSink = Box<dyn FnMut(u64, &RgbaImage)>;

/// Rasterizes each frame into an RGBA bitmap.
///
/// Bitmap rows run top to bottom, so canvas coordinates map to pixels
/// directly. Pieces are drawn around their wobble point, turned by their
/// rotation and faded by their opacity.
pub struct RasterRenderer {
    frame: RgbaImage,
    frames_presented: u64,
    sink: Option<FrameSink>,
}

impl RasterRenderer {
    pub fn new(canvas: CanvasSize) -> Self {
        let (width, height) = pixel_size(canvas);
        Self {
            frame: RgbaImage::new(width, height),
            frames_presented: 0,
            sink: None,
        }
    }

    /// Hand every presented frame to `sink` (e.g. to export PNG sequences)
    pub fn with_frame_sink(mut self, sink: impl FnMut(u64, &RgbaImage) + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Encode the current bitmap as PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        save_png(&self.frame, path.as_ref())
    }

    fn ensure_size(&mut self, canvas: CanvasSize) {
        let (width, height) = pixel_size(canvas);
        if self.frame.width() != width || self.frame.height() != height {
            debug!(width, height, "resizing raster surface");
            self.frame = RgbaImage::new(width, height);
        }
    }

    fn fill_shape(&mut self, cmd: &DrawCommand) {
        let placement = Affine2::from_translation(Vec2::new(cmd.x as f32, cmd.y as f32))
            * Affine2::from_angle(cmd.rotation as f32);
        let color = cmd.color;
        let alpha = cmd.opacity as f32;

        match &cmd.shape {
            ConfettiShape::Square => {
                let half = Vec2::new(cmd.width as f32, cmd.height as f32) * 0.5;
                self.fill_local(placement, half, color, alpha, |p| {
                    p.x.abs() <= half.x && p.y.abs() <= half.y
                });
            }
            ConfettiShape::Circle => {
                // width/height are already flattened; they serve as the radii
                let radii = Vec2::new(cmd.width as f32, cmd.height as f32);
                if radii.x <= f32::EPSILON || radii.y <= f32::EPSILON {
                    return;
                }
                self.fill_local(placement, radii, color, alpha, |p| {
                    (p.x / radii.x).powi(2) + (p.y / radii.y).powi(2) <= 1.0
                });
            }
            ConfettiShape::Star => {
                let outer = 8.0 * cmd.scalar;
                let polygon: Vec<Vec2> = star_points(outer, 4.0 * cmd.scalar)
                    .into_iter()
                    .map(|(x, y)| Vec2::new(x as f32, y as f32))
                    .collect();
                let half = Vec2::splat(outer as f32);
                self.fill_local(placement, half, color, alpha, |p| point_in_polygon(p, &polygon));
            }
            ConfettiShape::Bitmap { image, matrix } => {
                let image = image.image();
                let local = matrix.map_or(Affine2::IDENTITY, affine_from_matrix);
                let size = Vec2::new(image.width() as f32, image.height() as f32);
                let half = size * 0.5;
                let transform = placement * local;
                self.blit(transform, half, image, alpha);
            }
            // path and text glyphs have no vector/font stack here; draw the
            // square stand-in, tinted by the text color override if any
            ConfettiShape::Path { matrix, .. } => {
                let local = matrix.map_or(Affine2::IDENTITY, affine_from_matrix);
                let half = Vec2::new(cmd.width as f32, cmd.height as f32) * 0.5;
                self.fill_local(placement * local, half, color, alpha, |p| {
                    p.x.abs() <= half.x && p.y.abs() <= half.y
                });
            }
            ConfettiShape::Text { color: text_color, scalar, .. } => {
                let tint = text_color
                    .as_deref()
                    .map(confetti_core::hex_to_rgb)
                    .unwrap_or(color);
                let side = (10.0 * cmd.scalar * scalar.unwrap_or(1.0)) as f32;
                let half = Vec2::splat(side * 0.5);
                self.fill_local(placement, half, tint, alpha, |p| {
                    p.x.abs() <= half.x && p.y.abs() <= half.y
                });
            }
        }
    }

    /// Fill every pixel whose centre, mapped back into shape space, passes
    /// `inside`. `extent` bounds the shape in local space.
    fn fill_local(
        &mut self,
        transform: Affine2,
        extent: Vec2,
        color: Rgb,
        alpha: f32,
        inside: impl Fn(Vec2) -> bool,
    ) {
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(transform, extent) else {
            return;
        };
        let inverse = transform.inverse();
        for py in y0..y1 {
            for px in x0..x1 {
                let local = inverse.transform_point2(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
                if inside(local) {
                    blend(self.frame.get_pixel_mut(px, py), [color.r, color.g, color.b], alpha);
                }
            }
        }
    }

    fn blit(&mut self, transform: Affine2, half: Vec2, image: &RgbaImage, alpha: f32) {
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(transform, half) else {
            return;
        };
        let inverse = transform.inverse();
        for py in y0..y1 {
            for px in x0..x1 {
                let local = inverse.transform_point2(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
                let sx = (local.x + half.x).floor();
                let sy = (local.y + half.y).floor();
                if sx < 0.0 || sy < 0.0 || sx >= image.width() as f32 || sy >= image.height() as f32 {
                    continue;
                }
                let src = image.get_pixel(sx as u32, sy as u32);
                let src_alpha = alpha * src[3] as f32 / 255.0;
                blend(self.frame.get_pixel_mut(px, py), [src[0], src[1], src[2]], src_alpha);
            }
        }
    }

    /// Clipped pixel rectangle covering the transformed local box
    fn pixel_bounds(&self, transform: Affine2, extent: Vec2) -> Option<(u32, u32, u32, u32)> {
        let corners = [
            Vec2::new(-extent.x, -extent.y),
            Vec2::new(extent.x, -extent.y),
            Vec2::new(extent.x, extent.y),
            Vec2::new(-extent.x, extent.y),
        ]
        .map(|c| transform.transform_point2(c));

        let min = corners.iter().fold(Vec2::splat(f32::MAX), |a, c| a.min(*c));
        let max = corners.iter().fold(Vec2::splat(f32::MIN), |a, c| a.max(*c));
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(self.frame.width());
        let y1 = (max.y.ceil().max(0.0) as u32).min(self.frame.height());
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }
}

impl Renderer for RasterRenderer {
    fn clear(&mut self) {
        for pixel in self.frame.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn draw_particle(&mut self, particle: &Particle, canvas: CanvasSize) {
        self.ensure_size(canvas);
        if particle.opacity() <= 0.0 {
            return;
        }
        self.fill_shape(&DrawCommand::from_particle(particle));
    }

    fn present(&mut self) {
        self.frames_presented += 1;
        if let Some(sink) = self.sink.as_mut() {
            sink(self.frames_presented, &self.frame);
        } else if self.frame.width() == 0 || self.frame.height() == 0 {
            warn!("presenting an empty raster surface");
        }
    }

    fn name(&self) -> &str {
        "raster"
    }
}

/// Write a frame as PNG; the format follows the file extension
pub fn save_png(frame: &RgbaImage, path: &Path) -> Result<(), RenderError> {
    frame.save(path).map_err(|e| RenderError::Encode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn pixel_size(canvas: CanvasSize) -> (u32, u32) {
    (
        canvas.width.max(0.0).round() as u32,
        canvas.height.max(0.0).round() as u32,
    )
}

fn affine_from_matrix(m: [f64; 6]) -> Affine2 {
    Affine2::from_cols_array(&m.map(|v| v as f32))
}

/// Source-over blend of a straight-alpha color onto `dst`
fn blend(dst: &mut Rgba<u8>, src: [u8; 3], alpha: f32) {
    let a = alpha.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = a + dst_a * (1.0 - a);
    for i in 0..3 {
        let s = src[i] as f32 / 255.0;
        let d = dst[i] as f32 / 255.0;
        let c = (s * a + d * dst_a * (1.0 - a)) / out_a;
        dst[i] = (c * 255.0).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use confetti_particles::{shape_from_bitmap, shape_from_path, ParticleRng, PartialOptions};
    use std::cell::Cell;
    use std::rc::Rc;

    fn square_at(x: f64, y: f64, shape: ConfettiShape) -> Particle {
        let options = PartialOptions::new()
            .particle_count(1)
            .colors(["#ff0000"])
            .shapes(vec![shape])
            .start_velocity(0.0)
            .gravity(0.0)
            .flat(true)
            .resolve();
        let mut rng = ParticleRng::new(3);
        let mut p = confetti_particles::spawn(&options, CanvasSize::new(64.0, 64.0), &mut rng).remove(0);
        p.advance(&mut rng);
        // place the wobble point explicitly and give it a known footprint
        p.wobble_x = x;
        p.wobble_y = y;
        p.x = x - 10.0;
        p.y = y - 10.0;
        p
    }

    #[test]
    fn clear_makes_frame_transparent() {
        let mut renderer = RasterRenderer::new(CanvasSize::new(8.0, 8.0));
        renderer.frame.put_pixel(1, 1, Rgba([9, 9, 9, 255]));
        renderer.clear();
        assert!(renderer.frame().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn square_is_drawn_at_wobble_point() {
        let canvas = CanvasSize::new(64.0, 64.0);
        let mut renderer = RasterRenderer::new(canvas);
        let p = square_at(32.0, 32.0, ConfettiShape::Square);
        assert!(p.width() > 1.0 && p.height() > 1.0);

        renderer.clear();
        renderer.draw_particle(&p, canvas);
        renderer.present();

        let center = renderer.frame().get_pixel(32, 32);
        assert_eq!(center[0], 255);
        assert!(center[3] > 0);
        assert_eq!(renderer.frame().get_pixel(0, 0)[3], 0);
        assert_eq!(renderer.frames_presented(), 1);
    }

    #[test]
    fn offscreen_particles_are_clipped() {
        let canvas = CanvasSize::new(16.0, 16.0);
        let mut renderer = RasterRenderer::new(canvas);
        let p = square_at(-500.0, 900.0, ConfettiShape::Star);
        renderer.clear();
        renderer.draw_particle(&p, canvas);
        assert!(renderer.frame().pixels().all(|px| px[3] == 0));
    }

    #[test]
    fn surface_follows_canvas_size() {
        let mut renderer = RasterRenderer::new(CanvasSize::new(4.0, 4.0));
        let p = square_at(2.0, 2.0, ConfettiShape::Circle);
        renderer.draw_particle(&p, CanvasSize::new(10.0, 6.0));
        assert_eq!(renderer.frame().dimensions(), (10, 6));
    }

    #[test]
    fn bitmap_is_blitted() {
        let canvas = CanvasSize::new(32.0, 32.0);
        let mut renderer = RasterRenderer::new(canvas);
        let image = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        let mut p = square_at(16.0, 16.0, shape_from_bitmap(image, None));
        p.wobble = 0.0;
        renderer.clear();
        renderer.draw_particle(&p, canvas);
        assert_eq!(renderer.frame().get_pixel(16, 16)[2], 255);
    }

    #[test]
    fn path_shape_follows_its_matrix() {
        let canvas = CanvasSize::new(64.0, 64.0);
        let mut renderer = RasterRenderer::new(canvas);
        // shift the stand-in 20px right of the wobble point
        let shape = shape_from_path("M0 0 L1 0 L1 1z", Some([1.0, 0.0, 0.0, 1.0, 20.0, 0.0]));
        let p = square_at(20.0, 32.0, shape);
        renderer.clear();
        renderer.draw_particle(&p, canvas);
        assert!(renderer.frame().get_pixel(40, 32)[3] > 0);
        assert_eq!(renderer.frame().get_pixel(20, 32)[3], 0);
    }

    #[test]
    fn frame_sink_sees_every_present() {
        let seen = Rc::new(Cell::new(0u64));
        let seen_in_sink = Rc::clone(&seen);
        let mut renderer = RasterRenderer::new(CanvasSize::new(2.0, 2.0))
            .with_frame_sink(move |index, _| seen_in_sink.set(index));
        renderer.present();
        renderer.present();
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn save_png_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let renderer = RasterRenderer::new(CanvasSize::new(3.0, 3.0));
        renderer.save_png(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn save_png_reports_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        let err = RasterRenderer::new(CanvasSize::new(2.0, 2.0))
            .save_png(&path)
            .unwrap_err();
        assert!(err.to_string().contains("frame.png"));
        let err: confetti_core::ConfettiError = err.into();
        assert!(matches!(err, confetti_core::ConfettiError::RenderError(_)));
    }

    #[test]
    fn blend_over_transparent_keeps_color() {
        let mut px = Rgba([0, 0, 0, 0]);
        blend(&mut px, [200, 100, 50], 0.5);
        assert_eq!(px, Rgba([200, 100, 50, 128]));
    }

    #[test]
    fn star_contains_center() {
        let polygon: Vec<Vec2> = star_points(8.0, 4.0)
            .into_iter()
            .map(|(x, y)| Vec2::new(x as f32, y as f32))
            .collect();
        assert!(point_in_polygon(Vec2::ZERO, &polygon));
        assert!(!point_in_polygon(Vec2::new(7.5, 7.5), &polygon));
    }
}
