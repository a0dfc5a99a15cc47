//! # Photo Annotator
//!
//! Freehand annotation of photos with size-bounded re-encoding for upload.
//!
//! This crate provides:
//! - Pointer to canvas coordinate mapping across display scaling
//! - Stroke recording with an undoable drawing history
//! - Deterministic replay of the history onto a raster surface (tiny-skia)
//! - An adaptive compression loop that trades quality, then size, for a byte budget
//! - Preview reference tracking and an explicit per-dialog editing session
//!
//! ## Separation of Concerns
//!
//! Nothing here talks to a server. The caller takes the
//! [`CompressionResult`] payload and sends it wherever it needs to go.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use photo_annotator::{EditorSession, PreviewStore, PointerEvent, CompressionConfig, ImageCrateEncoder};
//!
//! let mut session = EditorSession::open(PreviewStore::new());
//! session.select_blob("lot.jpg", "image/jpeg", bytes)?;
//! session.fit_canvas_to_image(800, 600)?;
//! session.set_display_rect(rect);
//!
//! session.pointer_down(&PointerEvent::mouse(120.0, 80.0));
//! session.pointer_move(&PointerEvent::mouse(160.0, 95.0));
//! session.pointer_up();
//!
//! let result = session
//!     .annotated_photo()
//!     .unwrap()
//!     .compress(&CompressionConfig::default(), &ImageCrateEncoder)
//!     .await?;
//! ```

pub mod compress;
pub mod error;
pub mod geometry;
pub mod preview;
pub mod render;
pub mod session;
pub mod source;
pub mod stroke;

pub use compress::{
    compress, compress_decoded, target_dimensions, CompressionConfig, CompressionResult,
    EncoderBackend, ImageCrateEncoder, OutputFormat,
};
pub use error::AnnotatorError;
pub use geometry::{map_pointer, CanvasGeometry, CanvasPoint, DisplayRect, PointerEvent};
pub use preview::{PreviewStore, PreviewUrl};
pub use render::{draw_history, render, PixmapSurface, RasterSurface, ReplayScale};
pub use session::{AnnotatedPhoto, EditorSession};
pub use source::SourceImage;
pub use stroke::{Brush, DrawingHistory, Stroke, StrokeColor, StrokePoint, StrokeRecorder};
