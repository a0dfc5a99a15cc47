//! Replays a drawing history onto a raster surface
//!
//! The same replay is used for live feedback at display resolution and for
//! the export pass, where every coordinate is rescaled to the output image.

use crate::error::AnnotatorError;
use crate::stroke::{DrawingHistory, Stroke, StrokeColor, StrokePoint};
use image::RgbImage;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Transform};

/// Offset of the second point that makes a single-point stroke visible
pub const SINGLE_POINT_NUDGE: f32 = 0.1;

/// Minimal 2D drawing surface the renderer needs
pub trait RasterSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Clears the whole surface to transparent
    fn clear(&mut self);

    /// Strokes connected segments through `path` with round caps and joins
    fn stroke_polyline(&mut self, path: &[(f32, f32)], color: StrokeColor, width: f32);
}

/// Factors from recording resolution to target resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayScale {
    pub x: f32,
    pub y: f32,
}

impl ReplayScale {
    pub const IDENTITY: ReplayScale = ReplayScale { x: 1.0, y: 1.0 };

    /// Scale from a recorded canvas size to an export size.
    ///
    /// An unsized recording canvas replays unscaled.
    pub fn between(recorded: (u32, u32), target: (u32, u32)) -> Self {
        if recorded.0 == 0 || recorded.1 == 0 {
            return Self::IDENTITY;
        }
        Self {
            x: target.0 as f32 / recorded.0 as f32,
            y: target.1 as f32 / recorded.1 as f32,
        }
    }

    /// Line widths follow the smaller axis so non-uniform scaling stays readable
    pub fn line_width(&self, size: f32) -> f32 {
        size * self.x.min(self.y)
    }
}

/// Clears `surface` and replays `history` at recording resolution
pub fn render<S: RasterSurface + ?Sized>(surface: &mut S, history: &DrawingHistory) {
    surface.clear();
    draw_history(surface, history, ReplayScale::IDENTITY);
}

/// Draws `history` on top of the current surface contents
pub fn draw_history<S: RasterSurface + ?Sized>(
    surface: &mut S,
    history: &DrawingHistory,
    scale: ReplayScale,
) {
    for stroke in history.strokes() {
        draw_stroke(surface, stroke, scale);
    }
}

fn draw_stroke<S: RasterSurface + ?Sized>(surface: &mut S, stroke: &Stroke, scale: ReplayScale) {
    draw_points(surface, stroke.points(), scale);
}

/// Draws one point list as a stroke; color and width come from the first point.
///
/// Used directly for the stroke still in progress.
pub fn draw_points<S: RasterSurface + ?Sized>(
    surface: &mut S,
    points: &[StrokePoint],
    scale: ReplayScale,
) {
    let Some(first) = points.first() else {
        return;
    };
    let mut path: Vec<(f32, f32)> = points
        .iter()
        .map(|p| (p.x * scale.x, p.y * scale.y))
        .collect();

    // Zero-length paths rasterize to nothing
    if points.len() == 1 {
        let (x, y) = path[0];
        path.push((x + SINGLE_POINT_NUDGE, y + SINGLE_POINT_NUDGE));
    }

    surface.stroke_polyline(&path, first.color, scale.line_width(first.size));
}

/// tiny-skia backed raster surface
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl std::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl PixmapSurface {
    /// Transparent surface of the given size
    pub fn new(width: u32, height: u32) -> Result<Self, AnnotatorError> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            AnnotatorError::Raster(format!("Invalid surface size {}x{}", width, height))
        })?;
        Ok(Self { pixmap })
    }

    /// Surface initialised with an opaque RGB image
    pub fn from_rgb(img: &RgbImage) -> Result<Self, AnnotatorError> {
        let (width, height) = img.dimensions();
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for pixel in img.pixels() {
            data.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 255]);
        }

        let size = tiny_skia::IntSize::from_wh(width, height).ok_or_else(|| {
            AnnotatorError::Raster(format!("Invalid surface size {}x{}", width, height))
        })?;
        let pixmap = Pixmap::from_vec(data, size)
            .ok_or_else(|| AnnotatorError::Raster("Pixel buffer size mismatch".to_string()))?;
        Ok(Self { pixmap })
    }

    /// Raw premultiplied RGBA bytes
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Drops alpha; only meaningful for surfaces built on an opaque image
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut out = RgbImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = image::Rgb([c.red(), c.green(), c.blue()]);
        }
        out
    }
}

impl RasterSurface for PixmapSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn stroke_polyline(&mut self, path: &[(f32, f32)], color: StrokeColor, width: f32) {
        let Some(&(x0, y0)) = path.first() else {
            return;
        };

        let mut pb = PathBuilder::new();
        pb.move_to(x0, y0);
        for &(x, y) in &path[1..] {
            pb.line_to(x, y);
        }
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, 255);
        paint.anti_alias = true;

        let stroke = tiny_skia::Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::CanvasPoint;
    use crate::stroke::StrokeRecorder;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum DrawOp {
        Clear,
        Stroke {
            path: Vec<(f32, f32)>,
            color: StrokeColor,
            width: f32,
        },
    }

    /// Records draw calls instead of rasterizing them
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSurface {
        pub ops: Vec<DrawOp>,
    }

    impl RasterSurface for RecordingSurface {
        fn width(&self) -> u32 {
            100
        }

        fn height(&self) -> u32 {
            100
        }

        fn clear(&mut self) {
            self.ops.push(DrawOp::Clear);
        }

        fn stroke_polyline(&mut self, path: &[(f32, f32)], color: StrokeColor, width: f32) {
            self.ops.push(DrawOp::Stroke {
                path: path.to_vec(),
                color,
                width,
            });
        }
    }

    pub(crate) fn history_of(strokes: &[&[(f32, f32)]], color: StrokeColor, size: f32) -> DrawingHistory {
        let mut recorder = StrokeRecorder::new();
        for points in strokes {
            let (x, y) = points[0];
            recorder.begin_stroke(CanvasPoint::new(x, y), color, size);
            for &(x, y) in &points[1..] {
                recorder.extend_stroke(CanvasPoint::new(x, y));
            }
            recorder.commit_stroke();
        }
        recorder.history().clone()
    }

    #[test]
    fn test_empty_history_only_clears() {
        let mut surface = RecordingSurface::default();
        render(&mut surface, &DrawingHistory::new());
        assert_eq!(surface.ops, vec![DrawOp::Clear]);
    }

    #[test]
    fn test_rescaled_replay() {
        let history = history_of(&[&[(10.0, 10.0), (20.0, 20.0)]], StrokeColor::RED, 4.0);
        let mut surface = RecordingSurface::default();
        draw_history(&mut surface, &history, ReplayScale::between((100, 50), (200, 100)));

        assert_eq!(
            surface.ops,
            vec![DrawOp::Stroke {
                path: vec![(20.0, 20.0), (40.0, 40.0)],
                color: StrokeColor::RED,
                width: 8.0,
            }]
        );
    }

    #[test]
    fn test_non_uniform_scale_uses_smaller_axis_for_width() {
        let history = history_of(&[&[(10.0, 10.0), (20.0, 10.0)]], StrokeColor::BLACK, 5.0);
        let mut surface = RecordingSurface::default();
        draw_history(&mut surface, &history, ReplayScale { x: 3.0, y: 0.5 });

        match &surface.ops[0] {
            DrawOp::Stroke { path, width, .. } => {
                assert_eq!(path, &vec![(30.0, 5.0), (60.0, 5.0)]);
                assert_eq!(*width, 2.5);
            }
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_single_point_is_nudged() {
        let history = history_of(&[&[(7.0, 9.0)]], StrokeColor::RED, 4.0);
        let mut surface = RecordingSurface::default();
        render(&mut surface, &history);

        match &surface.ops[1] {
            DrawOp::Stroke { path, .. } => {
                assert_eq!(path.len(), 2);
                assert_eq!(path[0], (7.0, 9.0));
                assert!((path[1].0 - 7.1).abs() < 1e-5);
                assert!((path[1].1 - 9.1).abs() < 1e-5);
            }
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_strokes_replay_in_commit_order() {
        let history = history_of(
            &[&[(1.0, 1.0), (2.0, 2.0)], &[(5.0, 5.0), (6.0, 6.0)]],
            StrokeColor::RED,
            1.0,
        );
        let mut surface = RecordingSurface::default();
        render(&mut surface, &history);
        let firsts: Vec<f32> = surface
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Stroke { path, .. } => Some(path[0].0),
                DrawOp::Clear => None,
            })
            .collect();
        assert_eq!(firsts, vec![1.0, 5.0]);
    }

    #[test]
    fn test_pixmap_render_is_idempotent() {
        let history = history_of(
            &[&[(5.0, 5.0), (40.0, 30.0), (60.0, 10.0)], &[(20.0, 50.0)]],
            StrokeColor::RED,
            6.0,
        );
        let mut surface = PixmapSurface::new(64, 64).unwrap();
        render(&mut surface, &history);
        let first = surface.data().to_vec();
        render(&mut surface, &history);
        assert_eq!(first, surface.data());
        assert!(first.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_single_point_leaves_a_mark() {
        let history = history_of(&[&[(32.0, 32.0)]], StrokeColor::BLACK, 8.0);
        let mut surface = PixmapSurface::new(64, 64).unwrap();
        render(&mut surface, &history);
        let idx = (32 * 64 + 32) * 4;
        assert!(surface.data()[idx + 3] > 0);
    }

    #[test]
    fn test_stroke_on_opaque_image() {
        let img = RgbImage::from_pixel(32, 32, image::Rgb([255, 255, 255]));
        let mut surface = PixmapSurface::from_rgb(&img).unwrap();
        let history = history_of(&[&[(0.0, 16.0), (32.0, 16.0)]], StrokeColor::RED, 4.0);
        draw_history(&mut surface, &history, ReplayScale::IDENTITY);

        let out = surface.to_rgb_image();
        assert_eq!(out.get_pixel(16, 16).0, [255, 0, 0]);
        assert_eq!(out.get_pixel(16, 2).0, [255, 255, 255]);
    }
}
