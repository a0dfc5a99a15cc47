//! Pointer to canvas coordinate mapping
//!
//! A canvas has two sizes: the backing store (its raster resolution) and the
//! rectangle it occupies on screen. Pointer events arrive in screen space and
//! have to be scaled into backing-store pixels before they can be recorded.

/// On-screen rectangle occupied by the canvas element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Displayed rectangle plus backing-store resolution of a canvas
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasGeometry {
    pub rect: DisplayRect,
    pub raster_width: u32,
    pub raster_height: u32,
}

impl CanvasGeometry {
    pub fn new(rect: DisplayRect, raster_width: u32, raster_height: u32) -> Self {
        Self {
            rect,
            raster_width,
            raster_height,
        }
    }

    /// False until both the backing store and the displayed rect have a size
    pub fn is_ready(&self) -> bool {
        self.raster_width > 0
            && self.raster_height > 0
            && self.rect.width > 0.0
            && self.rect.height > 0.0
    }

    /// Backing-store pixels per displayed pixel, per axis
    pub fn scale(&self) -> (f32, f32) {
        (
            self.raster_width as f32 / self.rect.width,
            self.raster_height as f32 / self.rect.height,
        )
    }
}

/// A point in the canvas backing-store pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
}

impl CanvasPoint {
    pub const ORIGIN: CanvasPoint = CanvasPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Raw interaction event in client (viewport) coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Mouse { client_x: f32, client_y: f32 },
    /// Contact points of a touch event; only the first one draws
    Touch { touches: Vec<(f32, f32)> },
}

impl PointerEvent {
    pub fn mouse(client_x: f32, client_y: f32) -> Self {
        PointerEvent::Mouse { client_x, client_y }
    }

    pub fn touch(client_x: f32, client_y: f32) -> Self {
        PointerEvent::Touch {
            touches: vec![(client_x, client_y)],
        }
    }

    fn client_position(&self) -> Option<(f32, f32)> {
        match self {
            PointerEvent::Mouse { client_x, client_y } => Some((*client_x, *client_y)),
            PointerEvent::Touch { touches } => touches.first().copied(),
        }
    }
}

/// Maps an event into backing-store pixels.
///
/// Returns `None` for a touch event without contact points. An unsized canvas
/// yields [`CanvasPoint::ORIGIN`]; check [`CanvasGeometry::is_ready`] before
/// recording anything.
pub fn map_pointer(event: &PointerEvent, geometry: &CanvasGeometry) -> Option<CanvasPoint> {
    let (client_x, client_y) = event.client_position()?;

    if !geometry.is_ready() {
        return Some(CanvasPoint::ORIGIN);
    }

    let (scale_x, scale_y) = geometry.scale();
    Some(CanvasPoint {
        x: (client_x - geometry.rect.left) * scale_x,
        y: (client_y - geometry.rect.top) * scale_y,
    })
}

/// Fits a backing store with the image's aspect ratio inside a container.
///
/// Images smaller than the container keep their size.
pub fn fit_to_container(
    image_width: u32,
    image_height: u32,
    container_width: u32,
    container_height: u32,
) -> (u32, u32) {
    if image_width == 0 || image_height == 0 || container_width == 0 || container_height == 0 {
        return (0, 0);
    }

    let ratio = (container_width as f32 / image_width as f32)
        .min(container_height as f32 / image_height as f32)
        .min(1.0);

    (
        ((image_width as f32 * ratio).round() as u32).max(1),
        ((image_height as f32 * ratio).round() as u32).max(1),
    )
}
