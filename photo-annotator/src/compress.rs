//! Size-bounded re-encoding of an annotated photo
//!
//! The source image is scaled into the configured bounds, flattened onto
//! white, overlaid with the drawing history at export resolution and then
//! encoded with decreasing quality until the estimated payload size fits the
//! budget. When even the minimum quality is far over budget the image is
//! shrunk once more as a last resort.

use crate::error::AnnotatorError;
use crate::render::{draw_history, PixmapSurface, ReplayScale};
use crate::source::SourceImage;
use crate::stroke::DrawingHistory;
use base64::Engine;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Quality decrement per iteration
pub const QUALITY_STEP: f32 = 0.1;
/// Decoded bytes per base64 character
pub const BASE64_RATIO: f64 = 0.75;
/// Over-budget factor at minimum quality that triggers the final downscale
pub const FALLBACK_TRIGGER: f64 = 1.5;
/// Dimension factor of the final downscale
pub const FALLBACK_SCALE: f32 = 0.7;

const QUALITY_EPSILON: f32 = 1e-4;

/// Search space of the compression loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub max_width: u32,
    pub max_height: u32,
    /// Starting quality in `0.0..=1.0`
    pub target_quality: f32,
    pub max_size_kb: f64,
    pub min_quality: f32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_width: 1280,
            max_height: 1280,
            target_quality: 0.8,
            max_size_kb: 500.0,
            min_quality: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    WebP,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::WebP => "webp",
            OutputFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::WebP => "image/webp",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Encoder used by the compression loop
pub trait EncoderBackend {
    /// Whether `format` can be encoded lossily with a quality setting
    fn supports_lossy(&self, format: OutputFormat) -> bool;

    fn encode(
        &self,
        img: &RgbImage,
        format: OutputFormat,
        quality: f32,
    ) -> Result<Vec<u8>, AnnotatorError>;
}

/// Encoder built on the `image` crate.
///
/// Its WebP encoder is lossless only, so lossy output is always JPEG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateEncoder;

impl EncoderBackend for ImageCrateEncoder {
    fn supports_lossy(&self, format: OutputFormat) -> bool {
        matches!(format, OutputFormat::Jpeg)
    }

    fn encode(
        &self,
        img: &RgbImage,
        format: OutputFormat,
        quality: f32,
    ) -> Result<Vec<u8>, AnnotatorError> {
        let mut buffer = Cursor::new(Vec::new());
        match format {
            OutputFormat::Jpeg => {
                let mut encoder =
                    JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));
                encoder
                    .encode_image(img)
                    .map_err(|e| AnnotatorError::Encode(format!("JPEG: {}", e)))?;
            }
            OutputFormat::WebP => {
                img.write_to(&mut buffer, ImageFormat::WebP)
                    .map_err(|e| AnnotatorError::Encode(format!("WebP: {}", e)))?;
            }
        }
        Ok(buffer.into_inner())
    }
}

fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Outcome of one compression run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionResult {
    /// Base64 encoded image bytes
    pub payload: String,
    pub format: OutputFormat,
    pub size_kb: f64,
    pub quality: f32,
    pub width: u32,
    pub height: u32,
    /// Number of quality reductions performed
    pub quality_steps: u32,
    /// Whether the final 70% downscale was applied
    pub downscaled: bool,
}

impl CompressionResult {
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }
}

/// Prefers lossy WebP, falling back to JPEG
pub fn choose_format<B: EncoderBackend + ?Sized>(backend: &B) -> OutputFormat {
    [OutputFormat::WebP, OutputFormat::Jpeg]
        .into_iter()
        .find(|f| backend.supports_lossy(*f))
        .unwrap_or(OutputFormat::Jpeg)
}

/// Scales `(width, height)` uniformly into the configured bounds
pub fn target_dimensions(width: u32, height: u32, config: &CompressionConfig) -> (u32, u32) {
    if width > config.max_width || height > config.max_height {
        let ratio = (config.max_width as f64 / width as f64)
            .min(config.max_height as f64 / height as f64);
        (
            ((width as f64 * ratio).round() as u32).max(1),
            ((height as f64 * ratio).round() as u32).max(1),
        )
    } else {
        (width, height)
    }
}

/// Approximate decoded size in KB of a base64 string of `encoded_len` chars
pub fn estimate_size_kb(encoded_len: usize) -> f64 {
    encoded_len as f64 * BASE64_RATIO / 1024.0
}

/// Rasterizes the source at `dims` on white and overlays the strokes
fn compose(
    source: &DynamicImage,
    dims: (u32, u32),
    history: &DrawingHistory,
    recorded: (u32, u32),
) -> Result<RgbImage, AnnotatorError> {
    let rgba = source.to_rgba8();
    let resized = if rgba.dimensions() == dims {
        rgba
    } else {
        image::imageops::resize(&rgba, dims.0, dims.1, FilterType::Lanczos3)
    };

    let mut flat = RgbImage::new(dims.0, dims.1);
    for (dst, src) in flat.pixels_mut().zip(resized.pixels()) {
        let [r, g, b, a] = src.0;
        let alpha = a as u32;
        let over_white = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        *dst = image::Rgb([over_white(r), over_white(g), over_white(b)]);
    }

    if history.is_empty() {
        return Ok(flat);
    }

    let mut surface = PixmapSurface::from_rgb(&flat)?;
    draw_history(&mut surface, history, ReplayScale::between(recorded, dims));
    Ok(surface.to_rgb_image())
}

fn encode_base64<B: EncoderBackend + ?Sized>(
    backend: &B,
    img: &RgbImage,
    format: OutputFormat,
    quality: f32,
) -> Result<String, AnnotatorError> {
    let bytes = backend.encode(img, format, quality)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// Runs the compression loop on an already decoded image.
///
/// `recorded` is the canvas size the strokes were drawn at.
pub fn compress_decoded<B: EncoderBackend + ?Sized>(
    source: &DynamicImage,
    history: &DrawingHistory,
    recorded: (u32, u32),
    config: &CompressionConfig,
    backend: &B,
) -> Result<CompressionResult, AnnotatorError> {
    let format = choose_format(backend);
    let (mut width, mut height) = target_dimensions(source.width(), source.height(), config);
    log::debug!(
        "Compressing {}x{} -> {}x{} as {:?}",
        source.width(),
        source.height(),
        width,
        height,
        format
    );

    let composed = compose(source, (width, height), history, recorded)?;

    let mut quality = config.target_quality.max(config.min_quality);
    let mut payload = encode_base64(backend, &composed, format, quality)?;
    let mut size_kb = estimate_size_kb(payload.len());
    let mut quality_steps = 0;

    while size_kb > config.max_size_kb && quality > config.min_quality + QUALITY_EPSILON {
        quality = (quality - QUALITY_STEP).max(config.min_quality);
        payload = encode_base64(backend, &composed, format, quality)?;
        size_kb = estimate_size_kb(payload.len());
        quality_steps += 1;
        log::debug!("Quality {:.2} -> {:.1} KB", quality, size_kb);
    }

    let mut downscaled = false;
    if size_kb > config.max_size_kb * FALLBACK_TRIGGER {
        width = ((width as f32 * FALLBACK_SCALE).round() as u32).max(1);
        height = ((height as f32 * FALLBACK_SCALE).round() as u32).max(1);
        log::debug!(
            "Still {:.1} KB at minimum quality, downscaling to {}x{}",
            size_kb,
            width,
            height
        );

        let smaller = compose(source, (width, height), history, recorded)?;
        quality = config.min_quality;
        payload = encode_base64(backend, &smaller, format, quality)?;
        size_kb = estimate_size_kb(payload.len());
        downscaled = true;
    }

    log::debug!(
        "Compressed to {:.1} KB at quality {:.2} ({}x{})",
        size_kb,
        quality,
        width,
        height
    );

    Ok(CompressionResult {
        payload,
        format,
        size_kb,
        quality,
        width,
        height,
        quality_steps,
        downscaled,
    })
}

/// Decodes `source` and compresses it together with `history`
pub async fn compress<B: EncoderBackend + ?Sized>(
    source: &SourceImage,
    history: &DrawingHistory,
    recorded: (u32, u32),
    config: &CompressionConfig,
    backend: &B,
) -> Result<CompressionResult, AnnotatorError> {
    let decoded = source.decode().await?;
    compress_decoded(&decoded, history, recorded, config, backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::history_of;
    use crate::stroke::StrokeColor;
    use image::{Rgba, RgbaImage};

    /// Produces `width * height * bytes_per_pixel * quality` bytes
    struct SizedEncoder {
        bytes_per_pixel: f32,
        webp: bool,
    }

    impl EncoderBackend for SizedEncoder {
        fn supports_lossy(&self, format: OutputFormat) -> bool {
            self.webp || format == OutputFormat::Jpeg
        }

        fn encode(
            &self,
            img: &RgbImage,
            _format: OutputFormat,
            quality: f32,
        ) -> Result<Vec<u8>, AnnotatorError> {
            let len = (img.width() * img.height()) as f32 * self.bytes_per_pixel * quality;
            Ok(vec![0u8; len as usize])
        }
    }

    fn flat_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, image::Rgb([90, 120, 150])))
    }

    fn noisy_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
            let v = x.wrapping_mul(2_654_435_761).wrapping_add(y.wrapping_mul(40_503)) ^ (x * y);
            image::Rgb([(v >> 3) as u8, (v >> 11) as u8, (v >> 19) as u8])
        }))
    }

    fn config(max_size_kb: f64) -> CompressionConfig {
        CompressionConfig {
            max_width: 1280,
            max_height: 1280,
            target_quality: 0.8,
            max_size_kb,
            min_quality: 0.3,
        }
    }

    #[test]
    fn test_target_dimensions() {
        let cfg = CompressionConfig::default();
        assert_eq!(target_dimensions(2000, 1000, &cfg), (1280, 640));
        assert_eq!(target_dimensions(1000, 3000, &cfg), (427, 1280));
        assert_eq!(target_dimensions(800, 600, &cfg), (800, 600));
        assert_eq!(target_dimensions(1280, 1280, &cfg), (1280, 1280));
    }

    #[test]
    fn test_wide_source_is_bounded_end_to_end() {
        let encoder = SizedEncoder {
            bytes_per_pixel: 0.1,
            webp: false,
        };
        let history = history_of(&[&[(100.0, 100.0), (400.0, 250.0)]], StrokeColor::RED, 4.0);
        let result = compress_decoded(
            &flat_image(2000, 1000),
            &history,
            (1000, 500),
            &CompressionConfig::default(),
            &encoder,
        )
        .unwrap();
        assert_eq!((result.width, result.height), (1280, 640));
        assert!(!result.downscaled);
        assert_eq!(result.quality_steps, 0);
        assert_eq!(result.format, OutputFormat::Jpeg);
        assert!(result.size_kb <= CompressionConfig::default().max_size_kb);
    }

    #[test]
    fn test_estimate_size() {
        assert_eq!(estimate_size_kb(0), 0.0);
        assert_eq!(estimate_size_kb(4096), 3.0);
    }

    #[test]
    fn test_format_preference() {
        let webp = SizedEncoder {
            bytes_per_pixel: 1.0,
            webp: true,
        };
        assert_eq!(choose_format(&webp), OutputFormat::WebP);
        assert_eq!(choose_format(&ImageCrateEncoder), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
    }

    #[test]
    fn test_under_budget_keeps_target_quality() {
        let encoder = SizedEncoder {
            bytes_per_pixel: 1.0,
            webp: false,
        };
        let result = compress_decoded(
            &flat_image(100, 100),
            &DrawingHistory::new(),
            (100, 100),
            &config(500.0),
            &encoder,
        )
        .unwrap();
        assert_eq!(result.quality_steps, 0);
        assert_eq!(result.quality, 0.8);
        assert!(!result.downscaled);
        assert_eq!((result.width, result.height), (100, 100));
    }

    #[test]
    fn test_linear_quality_search() {
        // 100k bytes per unit quality, ~97.7 KB * q
        let encoder = SizedEncoder {
            bytes_per_pixel: 10.0,
            webp: true,
        };
        let result = compress_decoded(
            &flat_image(100, 100),
            &DrawingHistory::new(),
            (100, 100),
            &config(50.0),
            &encoder,
        )
        .unwrap();
        assert_eq!(result.quality_steps, 3);
        assert!((result.quality - 0.5).abs() < 1e-4);
        assert!(result.size_kb <= 50.0);
        assert_eq!(result.format, OutputFormat::WebP);
        assert!(!result.downscaled);
    }

    #[test]
    fn test_quality_never_below_minimum() {
        let encoder = SizedEncoder {
            bytes_per_pixel: 10.0,
            webp: false,
        };
        let result = compress_decoded(
            &flat_image(100, 100),
            &DrawingHistory::new(),
            (100, 100),
            &config(25.0),
            &encoder,
        )
        .unwrap();
        // Bottoms out at 0.3 (~29 KB), within 1.5x of budget: no downscale
        assert!(result.quality >= 0.3);
        assert!((result.quality - 0.3).abs() < 1e-4);
        assert_eq!(result.quality_steps, 5);
        assert!(!result.downscaled);
    }

    #[test]
    fn test_final_downscale() {
        let encoder = SizedEncoder {
            bytes_per_pixel: 10.0,
            webp: false,
        };
        let result = compress_decoded(
            &flat_image(100, 100),
            &DrawingHistory::new(),
            (100, 100),
            &config(10.0),
            &encoder,
        )
        .unwrap();
        assert!(result.downscaled);
        assert_eq!((result.width, result.height), (70, 70));
        assert!((result.quality - 0.3).abs() < 1e-4);
        // 70 * 70 * 10 * 0.3 bytes
        assert!((result.size_kb - 14.35).abs() < 0.1);
    }

    #[test]
    fn test_larger_budget_never_needs_more_steps() {
        let encoder = SizedEncoder {
            bytes_per_pixel: 10.0,
            webp: false,
        };
        let img = flat_image(100, 100);
        let mut previous = u32::MAX;
        for budget in [5.0, 20.0, 40.0, 60.0, 80.0, 200.0] {
            let result =
                compress_decoded(&img, &DrawingHistory::new(), (100, 100), &config(budget), &encoder)
                    .unwrap();
            assert!(result.quality_steps <= previous);
            previous = result.quality_steps;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_transparent_source_becomes_white() {
        let clear = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0])));
        let composed = compose(&clear, (8, 8), &DrawingHistory::new(), (8, 8)).unwrap();
        assert!(composed.pixels().all(|p| p.0 == [255, 255, 255]));

        let half = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 128])));
        let composed = compose(&half, (2, 2), &DrawingHistory::new(), (2, 2)).unwrap();
        assert_eq!(composed.get_pixel(0, 0).0, [127, 127, 127]);
    }

    #[test]
    fn test_strokes_rescaled_onto_export() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            200,
            100,
            image::Rgb([255, 255, 255]),
        ));
        // Recorded on a 100x50 canvas, exported at 200x100
        let history = history_of(&[&[(0.0, 25.0), (100.0, 25.0)]], StrokeColor::RED, 4.0);
        let composed = compose(&source, (200, 100), &history, (100, 50)).unwrap();

        assert_eq!(composed.get_pixel(100, 50).0, [255, 0, 0]);
        assert_eq!(composed.get_pixel(100, 47).0, [255, 0, 0]);
        assert_eq!(composed.get_pixel(100, 40).0, [255, 255, 255]);
    }

    #[test]
    fn test_real_jpeg_encoding_respects_bounds() {
        let cfg = CompressionConfig {
            max_width: 128,
            max_height: 128,
            target_quality: 0.9,
            max_size_kb: 2.0,
            min_quality: 0.3,
        };
        let result = compress_decoded(
            &noisy_image(256, 128),
            &DrawingHistory::new(),
            (256, 128),
            &cfg,
            &ImageCrateEncoder,
        )
        .unwrap();

        assert_eq!(result.format, OutputFormat::Jpeg);
        assert!(result.quality >= cfg.min_quality);
        assert!(result.width >= (128.0 * FALLBACK_SCALE) as u32 - 1);
        assert!(result.height >= (64.0 * FALLBACK_SCALE) as u32 - 1);

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&result.payload)
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (result.width, result.height));
    }

    #[tokio::test]
    async fn test_compress_from_source_image() {
        let mut png = Cursor::new(Vec::new());
        RgbImage::from_pixel(300, 150, image::Rgb([0, 0, 255]))
            .write_to(&mut png, ImageFormat::Png)
            .unwrap();
        let source = SourceImage::new("photo.png", "image/png", png.into_inner()).unwrap();

        let cfg = CompressionConfig {
            max_width: 150,
            max_height: 150,
            ..CompressionConfig::default()
        };
        let result = compress(&source, &DrawingHistory::new(), (300, 150), &cfg, &ImageCrateEncoder)
            .await
            .unwrap();
        assert_eq!((result.width, result.height), (150, 75));
        assert_eq!(result.extension(), "jpg");
    }

    #[tokio::test]
    async fn test_compress_undecodable_source_fails() {
        let source = SourceImage::new("x.jpg", "image/jpeg", vec![0xFF, 0xD8, 0x00]).unwrap();
        let err = compress(
            &source,
            &DrawingHistory::new(),
            (0, 0),
            &CompressionConfig::default(),
            &ImageCrateEncoder,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AnnotatorError::Decode(_)));
    }
}
