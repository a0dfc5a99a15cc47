//! Per-dialog editing session
//!
//! An [`EditorSession`] is created when the upload form opens and torn down
//! when it closes. It owns everything the drawing handlers touch, so pointer
//! handlers receive it explicitly instead of reaching into shared state.

use crate::compress::{compress, CompressionConfig, CompressionResult, EncoderBackend};
use crate::error::AnnotatorError;
use crate::geometry::{fit_to_container, map_pointer, CanvasGeometry, DisplayRect, PointerEvent};
use crate::preview::{PreviewStore, PreviewUrl};
use crate::render::{draw_points, render, RasterSurface, ReplayScale};
use crate::source::SourceImage;
use crate::stroke::{Brush, DrawingHistory, StrokeColor, StrokeRecorder};

/// Everything needed to produce the upload payload
#[derive(Debug, Clone)]
pub struct AnnotatedPhoto {
    pub source: SourceImage,
    pub history: DrawingHistory,
    /// Backing-store size the strokes were recorded at
    pub recorded_canvas: (u32, u32),
}

impl AnnotatedPhoto {
    pub async fn compress<B: EncoderBackend + ?Sized>(
        &self,
        config: &CompressionConfig,
        backend: &B,
    ) -> Result<CompressionResult, AnnotatorError> {
        compress(
            &self.source,
            &self.history,
            self.recorded_canvas,
            config,
            backend,
        )
        .await
    }
}

#[derive(Debug)]
pub struct EditorSession {
    previews: PreviewStore,
    geometry: CanvasGeometry,
    brush: Brush,
    recorder: StrokeRecorder,
    source: Option<SourceImage>,
    preview: Option<PreviewUrl>,
}

impl EditorSession {
    pub fn open(previews: PreviewStore) -> Self {
        Self {
            previews,
            geometry: CanvasGeometry::default(),
            brush: Brush::default(),
            recorder: StrokeRecorder::new(),
            source: None,
            preview: None,
        }
    }

    /// Replaces the current image. Drawing state and the old preview are dropped.
    pub fn select_image(&mut self, source: SourceImage) -> &PreviewUrl {
        self.release_preview();
        self.recorder.reset();
        self.geometry = CanvasGeometry::default();

        let url = self.previews.create(&source);
        self.source = Some(source);
        self.preview.insert(url)
    }

    /// Validates and selects a picked blob
    pub fn select_blob(
        &mut self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<&PreviewUrl, AnnotatorError> {
        let source = SourceImage::new(file_name, mime_type, bytes)?;
        Ok(self.select_image(source))
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewUrl> {
        self.preview.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.source.is_some()
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    /// Takes effect from the next stroke on
    pub fn set_brush(&mut self, color: StrokeColor, size: f32) {
        self.brush = Brush { color, size };
    }

    pub fn geometry(&self) -> &CanvasGeometry {
        &self.geometry
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.geometry.raster_width, self.geometry.raster_height)
    }

    /// Sizes the backing store to the image aspect ratio within the container
    pub fn fit_canvas_to_image(
        &mut self,
        container_width: u32,
        container_height: u32,
    ) -> Result<(u32, u32), AnnotatorError> {
        let Some(source) = &self.source else {
            return Ok((0, 0));
        };
        let (w, h) = source.dimensions()?;
        let (raster_width, raster_height) =
            fit_to_container(w, h, container_width, container_height);
        self.geometry.raster_width = raster_width;
        self.geometry.raster_height = raster_height;
        log::debug!(
            "Canvas sized to {}x{} for {}x{} image",
            raster_width,
            raster_height,
            w,
            h
        );
        Ok((raster_width, raster_height))
    }

    /// Updates where the canvas currently sits on screen
    pub fn set_display_rect(&mut self, rect: DisplayRect) {
        self.geometry.rect = rect;
    }

    /// Starts a stroke; ignored until the canvas has been sized
    pub fn pointer_down(&mut self, event: &PointerEvent) -> bool {
        if !self.geometry.is_ready() {
            return false;
        }
        let Some(point) = map_pointer(event, &self.geometry) else {
            return false;
        };
        self.recorder
            .begin_stroke(point, self.brush.color, self.brush.size);
        true
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) -> bool {
        if !self.recorder.is_drawing() || !self.geometry.is_ready() {
            return false;
        }
        let Some(point) = map_pointer(event, &self.geometry) else {
            return false;
        };
        self.recorder.extend_stroke(point);
        true
    }

    /// Ends the gesture; true when a stroke was committed
    pub fn pointer_up(&mut self) -> bool {
        self.recorder.commit_stroke()
    }

    pub fn undo(&mut self) -> bool {
        self.recorder.undo()
    }

    pub fn clear_drawing(&mut self) {
        self.recorder.clear();
    }

    pub fn can_undo(&self) -> bool {
        self.recorder.can_undo()
    }

    pub fn history(&self) -> &DrawingHistory {
        self.recorder.history()
    }

    /// Live feedback: committed strokes plus the one in progress
    pub fn render_display<S: RasterSurface + ?Sized>(&self, surface: &mut S) {
        render(surface, self.recorder.history());
        if self.recorder.is_drawing() {
            draw_points(surface, self.recorder.current(), ReplayScale::IDENTITY);
        }
    }

    /// Snapshot for the compression engine, `None` without an image
    pub fn annotated_photo(&self) -> Option<AnnotatedPhoto> {
        let source = self.source.clone()?;
        Some(AnnotatedPhoto {
            source,
            history: self.recorder.history().clone(),
            recorded_canvas: self.canvas_size(),
        })
    }

    /// Back to the empty form: image, preview and drawing are dropped
    pub fn reset(&mut self) {
        self.release_preview();
        self.source = None;
        self.recorder.reset();
        self.geometry = CanvasGeometry::default();
    }

    pub fn close(mut self) {
        self.reset();
    }

    fn release_preview(&mut self) {
        if let Some(url) = self.preview.take() {
            self.previews.revoke(&url);
        }
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.release_preview();
    }
}
