//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations asset execution
//! needs: raster conversion and animated-image optimization.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pixel work through the
//! `image` crate, animation optimization through the `gifsicle` executable.

use super::params::{AnimationParams, ConvertParams};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("{tool} not found on PATH")]
    ToolMissing { tool: &'static str },
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: String,
        stderr: String,
    },
}

/// Pixel size of a written image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Implementations must be `Sync`: plan entries run on rayon workers.
pub trait ImageBackend: Sync {
    /// Decode, optionally square and shrink, then encode to the target format.
    fn convert(&self, params: &ConvertParams) -> Result<Dimensions, BackendError>;

    /// Losslessly optimize an animated image.
    fn optimize_animation(&self, params: &AnimationParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::ShrinkSpec;
    use image::ImageFormat;
    use std::path::Path;
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// Sources whose operation fails.
        pub failing: Vec<PathBuf>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Convert {
            source: String,
            output: String,
            format: ImageFormat,
            shrink: Option<ShrinkSpec>,
        },
        Optimize {
            source: String,
            output: String,
            colors: Option<u32>,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(sources: Vec<PathBuf>) -> Self {
            Self {
                operations: Mutex::new(Vec::new()),
                failing: sources,
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn check(&self, source: &Path) -> Result<(), BackendError> {
            if self.failing.iter().any(|p| p == source) {
                return Err(BackendError::ProcessingFailed(format!(
                    "mock failure for {}",
                    source.display()
                )));
            }
            Ok(())
        }
    }

    impl ImageBackend for MockBackend {
        fn convert(&self, params: &ConvertParams) -> Result<Dimensions, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Convert {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                format: params.format,
                shrink: params.shrink,
            });
            self.check(&params.source)?;
            Ok(Dimensions {
                width: 1,
                height: 1,
            })
        }

        fn optimize_animation(&self, params: &AnimationParams) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Optimize {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                colors: params.colors,
            });
            self.check(&params.source)
        }
    }

    #[test]
    fn mock_records_convert() {
        let backend = MockBackend::new();
        backend
            .convert(&ConvertParams {
                source: "/src/a.png".into(),
                output: "/out/a.webp".into(),
                format: ImageFormat::WebP,
                shrink: None,
            })
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Convert { source, format: ImageFormat::WebP, .. } if source == "/src/a.png"
        ));
    }

    #[test]
    fn mock_fails_configured_source() {
        let backend = MockBackend::failing_on(vec!["/src/bad.gif".into()]);
        let err = backend
            .optimize_animation(&AnimationParams {
                source: "/src/bad.gif".into(),
                output: "/out/bad.optimized.gif".into(),
                optimize: true,
                colors: Some(64),
                options: vec![],
            })
            .unwrap_err();
        assert!(err.to_string().contains("bad.gif"));
        assert_eq!(backend.get_operations().len(), 1);
    }
}
