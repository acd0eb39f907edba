//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between asset planning (which decides what each asset becomes)
//! and the [`backend`](super::backend) (which does the pixel work), so a mock
//! backend can stand in during tests.
//!
//! ## Types
//!
//! - [`ShrinkSpec`]: optional squaring plus the bounding dimension.
//! - [`ConvertParams`]: raster conversion: source, output, target format, shrink.
//! - [`AnimationParams`]: animated GIF optimization: source, output, optimizer tuning.

use image::ImageFormat;
use std::path::PathBuf;

/// Size normalization applied before saving a converted raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShrinkSpec {
    /// Largest allowed width or height, in pixels.
    pub max_dimension: u32,
    /// Centre the image on a transparent square canvas first.
    pub make_square: bool,
}

/// Parameters for a raster conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub format: ImageFormat,
    /// `None` keeps the original pixel dimensions.
    pub shrink: Option<ShrinkSpec>,
}

/// Parameters for the animated-image optimizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub optimize: bool,
    /// Reduce the palette to this many colors.
    pub colors: Option<u32>,
    /// Extra arguments passed to the optimizer verbatim.
    pub options: Vec<String>,
}
