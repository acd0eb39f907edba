//! Image processing.
//!
//! | Operation | Implementation |
//! |---|---|
//! | **Convert** | `image` decode → optional square → Lanczos3 shrink → lossless encode |
//! | **Optimize animation** | `gifsicle` subprocess |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod gifsicle;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{shrink_dimensions, square_canvas};
pub use params::{AnimationParams, ConvertParams, ShrinkSpec};
pub use rust_backend::RustBackend;
