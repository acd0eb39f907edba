//! Production image backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode | `image::ImageReader` with content sniffing |
//! | Square | `imageops::overlay` on white, `imageops::replace` on a transparent canvas |
//! | Shrink | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder::new_lossless` |
//! | Encode → other | `DynamicImage::save_with_format` |
//! | Animated GIF | `gifsicle` executable, located with `which` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{shrink_dimensions, square_canvas};
use super::gifsicle;
use super::params::{AnimationParams, ConvertParams, ShrinkSpec};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Backend using the `image` crate for rasters and `gifsicle` for animations.
pub struct RustBackend {
    gifsicle: Option<PathBuf>,
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            gifsicle: which::which(gifsicle::TOOL).ok(),
        }
    }

    /// Whether the animation optimizer was found.
    pub fn has_gifsicle(&self) -> bool {
        self.gifsicle.is_some()
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn processing(path: &Path, what: &str, e: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("Failed to {what} {}: {e}", path.display()))
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| processing(path, "decode", e))
}

/// Flatten onto opaque white, then centre on a transparent square.
fn make_square(img: &DynamicImage) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    let mut flattened = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut flattened, &img.to_rgba8(), 0, 0);

    let (side, x, y) = square_canvas((w, h));
    let mut canvas = RgbaImage::new(side, side);
    imageops::replace(&mut canvas, &flattened, i64::from(x), i64::from(y));
    DynamicImage::ImageRgba8(canvas)
}

fn apply_shrink(img: DynamicImage, spec: ShrinkSpec) -> DynamicImage {
    let img = if spec.make_square { make_square(&img) } else { img };
    let (w, h) = shrink_dimensions((img.width(), img.height()), spec.max_dimension);
    if (w, h) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(w, h, FilterType::Lanczos3)
    }
}

/// Encode losslessly where the format allows it.
fn save_image(img: &DynamicImage, path: &Path, format: ImageFormat) -> Result<(), BackendError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match format {
        ImageFormat::WebP => {
            let writer = std::io::BufWriter::new(std::fs::File::create(path)?);
            let encoder = image::codecs::webp::WebPEncoder::new_lossless(writer);
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_with_encoder(encoder)
                .map_err(|e| processing(path, "encode", e))
        }
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .save_with_format(path, format)
            .map_err(|e| processing(path, "encode", e)),
        other => img
            .save_with_format(path, other)
            .map_err(|e| processing(path, "encode", e)),
    }
}

impl ImageBackend for RustBackend {
    fn convert(&self, params: &ConvertParams) -> Result<Dimensions, BackendError> {
        let img = load_image(&params.source)?;
        let img = match params.shrink {
            Some(spec) => apply_shrink(img, spec),
            None => img,
        };
        save_image(&img, &params.output, params.format)?;
        Ok(Dimensions {
            width: img.width(),
            height: img.height(),
        })
    }

    fn optimize_animation(&self, params: &AnimationParams) -> Result<(), BackendError> {
        let program = self
            .gifsicle
            .as_deref()
            .ok_or(BackendError::ToolMissing {
                tool: gifsicle::TOOL,
            })?;
        gifsicle::run(program, params)
    }
}
