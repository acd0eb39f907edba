//! Image asset planning, execution, and reference rewriting.
//!
//! Assets are the files a target copies to its output directory. When the
//! target sets `convert_images`, each candidate is classified by extension:
//!
//! | Kind | Extensions | Plan |
//! |---|---|---|
//! | Animated | `.gif` | `gifsicle` → `<stem>.optimized.gif` |
//! | Raster | `.png .bmp .webp .jpg .jfif .pjpeg .pjp .jpeg .tiff .tif .ico .tga .ppm .pnm` | convert to the configured format, optionally square and shrink |
//! | Other | everything else | copied unchanged |
//!
//! Planning touches no pixels: it walks the copy list, decides what each
//! asset becomes, and records `original → converted` in a
//! [`ReplacementMapBuilder`]. The builder is frozen into an
//! [`AssetReplacementMap`] before anything is rendered, and documents consult
//! the frozen map to rewrite `![alt](img/a.png)` and `src="img/a.png"`.
//!
//! Execution runs the plan on the rayon pool. A failed asset does not stop
//! the others; each result is reported separately.

use crate::config::{ImagesConfig, TargetConfig};
use crate::imaging::{
    AnimationParams, BackendError, ConvertParams, Dimensions, ImageBackend, ShrinkSpec,
};
use crate::naming::relative_path;
use image::ImageFormat;
use rayon::prelude::*;
use regex::{NoExpand, Regex};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

const ANIMATED_EXTENSIONS: &[&str] = &["gif"];

const RASTER_EXTENSIONS: &[&str] = &[
    "png", "bmp", "webp", "jpg", "jfif", "pjpeg", "pjp", "jpeg", "tiff", "tif", "ico", "tga",
    "ppm", "pnm",
];

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("cannot list {}: {}", .path.display(), .message)]
    Walk { path: PathBuf, message: String },
    #[error("{} is planned twice (already converted by another target)", .original.display())]
    DuplicateReplacement { original: PathBuf },
    #[error("failed to copy {}: {}", .path.display(), .source)]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A conversion that failed. Fatal to this asset only.
#[derive(Error, Debug)]
#[error("failed to convert {}: {}", .asset.display(), .source)]
pub struct AssetConversionError {
    pub asset: PathBuf,
    #[source]
    pub source: BackendError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Animated,
    Raster,
    Other,
}

/// Classify a path by extension (case-insensitive).
pub fn classify(path: &Path) -> AssetKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return AssetKind::Other;
    };
    let ext = ext.to_ascii_lowercase();
    if ANIMATED_EXTENSIONS.contains(&ext.as_str()) {
        AssetKind::Animated
    } else if RASTER_EXTENSIONS.contains(&ext.as_str()) {
        AssetKind::Raster
    } else {
        AssetKind::Other
    }
}

// ============================================================================
// Replacement map
// ============================================================================

/// Collects `original → converted` pairs while planning.
#[derive(Debug, Default)]
pub struct ReplacementMapBuilder {
    map: BTreeMap<PathBuf, PathBuf>,
}

impl ReplacementMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a replacement. Each original may be written once.
    pub fn insert(&mut self, original: PathBuf, converted: PathBuf) -> Result<(), AssetError> {
        if self.map.contains_key(&original) {
            return Err(AssetError::DuplicateReplacement { original });
        }
        self.map.insert(original, converted);
        Ok(())
    }

    pub fn freeze(self) -> AssetReplacementMap {
        AssetReplacementMap(Arc::new(self.map))
    }
}

/// Immutable snapshot of planned replacements, cheap to clone across workers.
#[derive(Debug, Clone, Default)]
pub struct AssetReplacementMap(Arc<BTreeMap<PathBuf, PathBuf>>);

impl AssetReplacementMap {
    pub fn get(&self, original: &Path) -> Option<&Path> {
        self.0.get(original).map(PathBuf::as_path)
    }

    pub fn contains(&self, original: &Path) -> bool {
        self.0.contains_key(original)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.0.iter().map(|(k, v)| (k.as_path(), v.as_path()))
    }

    /// Rewrite asset references in markdown or HTML.
    ///
    /// Original paths are written relative to `source_dir`, converted paths
    /// relative to `output_dir`.
    pub fn rewrite(&self, text: &str, source_dir: &Path, output_dir: &Path) -> String {
        let mut out = text.to_string();
        for (original, converted) in self.iter() {
            let original_rel = relative_path(source_dir, original);
            let converted_rel = relative_path(output_dir, converted);
            if original_rel == converted_rel || !out.contains(&original_rel) {
                continue;
            }
            let escaped = regex::escape(&original_rel);

            if let Ok(image) = Regex::new(&format!(r"!\[([^\]]*)\]\({escaped}\)")) {
                let replacement = format!("![${{1}}]({})", converted_rel.replace('$', "$$"));
                out = image.replace_all(&out, replacement.as_str()).into_owned();
            }
            if let Ok(src) = Regex::new(&format!(r#"src\s*=\s*"{escaped}""#)) {
                let replacement = format!("src=\"{converted_rel}\"");
                out = src.replace_all(&out, NoExpand(&replacement)).into_owned();
            }
        }
        out
    }
}

// ============================================================================
// Planning
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum AssetAction {
    Convert(ConvertParams),
    Optimize(AnimationParams),
}

/// One asset to process.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntry {
    pub target: String,
    pub action: AssetAction,
}

impl PlanEntry {
    pub fn source(&self) -> &Path {
        match &self.action {
            AssetAction::Convert(p) => &p.source,
            AssetAction::Optimize(p) => &p.source,
        }
    }

    pub fn output(&self) -> &Path {
        match &self.action {
            AssetAction::Convert(p) => &p.output,
            AssetAction::Optimize(p) => &p.output,
        }
    }
}

/// Plan entries plus the frozen replacement map.
#[derive(Debug, Clone, Default)]
pub struct AssetPlan {
    pub entries: Vec<PlanEntry>,
    pub replacements: AssetReplacementMap,
}

/// One target's inputs to planning.
#[derive(Debug, Clone, Copy)]
pub struct TargetAssets<'a> {
    pub config: &'a TargetConfig,
    pub source_dir: &'a Path,
    pub output_dir: &'a Path,
}

/// Expand a target's copy list into files (directories walked recursively).
pub fn candidates(source_dir: &Path, copy: &[String]) -> Result<Vec<PathBuf>, AssetError> {
    let mut files = Vec::new();
    for entry in copy {
        let root = source_dir.join(entry);
        for item in WalkDir::new(&root).sort_by_file_name() {
            let item = item.map_err(|e| AssetError::Walk {
                path: root.clone(),
                message: e.to_string(),
            })?;
            if item.file_type().is_file() {
                files.push(item.into_path());
            }
        }
    }
    Ok(files)
}

/// Decide what a single asset becomes. `None` means copy unchanged.
pub fn plan_asset(
    asset: &Path,
    target: &TargetAssets<'_>,
    images: &ImagesConfig,
    format: ImageFormat,
) -> Option<AssetAction> {
    let rel = relative_path(target.source_dir, asset);
    let output = target.output_dir.join(&rel);

    match classify(asset) {
        AssetKind::Animated if !images.disable_animation_optimization => {
            let gif = &target.config.gif;
            let name = format!("{}.optimized.gif", crate::naming::file_stem(asset));
            Some(AssetAction::Optimize(AnimationParams {
                source: asset.to_path_buf(),
                output: output.with_file_name(name),
                optimize: gif.optimize,
                colors: gif.colors,
                options: gif.options.clone(),
            }))
        }
        AssetKind::Raster if !images.disable_conversion => {
            let overrides = target.config.assets.get(&rel).cloned().unwrap_or_default();
            let shrink = (target.config.shrink_images && !overrides.dont_shrink).then(|| {
                ShrinkSpec {
                    max_dimension: overrides.max_dimension.unwrap_or(images.max_dimension),
                    make_square: overrides.make_square,
                }
            });
            Some(AssetAction::Convert(ConvertParams {
                source: asset.to_path_buf(),
                output: output.with_extension(images.extension()),
                format,
                shrink,
            }))
        }
        _ => None,
    }
}

/// Plan every target's assets and freeze the replacement map.
pub fn plan(
    targets: &[TargetAssets<'_>],
    images: &ImagesConfig,
    format: ImageFormat,
) -> Result<AssetPlan, AssetError> {
    let mut builder = ReplacementMapBuilder::new();
    let mut entries = Vec::new();

    for target in targets.iter().filter(|t| t.config.convert_images) {
        for asset in candidates(target.source_dir, &target.config.copy)? {
            let Some(action) = plan_asset(&asset, target, images, format) else {
                continue;
            };
            let entry = PlanEntry {
                target: target.config.name.clone(),
                action,
            };
            debug!(
                "{}: planned {} → {}",
                entry.target,
                entry.source().display(),
                entry.output().display()
            );
            builder.insert(asset, entry.output().to_path_buf())?;
            entries.push(entry);
        }
    }

    Ok(AssetPlan {
        entries,
        replacements: builder.freeze(),
    })
}

// ============================================================================
// Execution
// ============================================================================

/// A successfully processed asset.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedAsset {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Written size, for raster conversions.
    pub dimensions: Option<Dimensions>,
}

fn run_entry(
    backend: &impl ImageBackend,
    entry: &PlanEntry,
) -> Result<ProcessedAsset, AssetConversionError> {
    let fail = |source| AssetConversionError {
        asset: entry.source().to_path_buf(),
        source,
    };
    let dimensions = match &entry.action {
        AssetAction::Convert(params) => Some(backend.convert(params).map_err(fail)?),
        AssetAction::Optimize(params) => {
            backend.optimize_animation(params).map_err(fail)?;
            None
        }
    };
    Ok(ProcessedAsset {
        source: entry.source().to_path_buf(),
        output: entry.output().to_path_buf(),
        dimensions,
    })
}

/// Run all plan entries in parallel. Results keep plan order.
pub fn execute(
    backend: &impl ImageBackend,
    entries: &[PlanEntry],
) -> Vec<Result<ProcessedAsset, AssetConversionError>> {
    entries
        .par_iter()
        .map(|entry| run_entry(backend, entry))
        .collect()
}

/// Copy a target's assets, skipping those the plan converts.
pub fn copy_assets(
    target: &TargetAssets<'_>,
    replacements: &AssetReplacementMap,
) -> Result<Vec<PathBuf>, AssetError> {
    let mut copied = Vec::new();
    for asset in candidates(target.source_dir, &target.config.copy)? {
        if replacements.contains(&asset) {
            continue;
        }
        let dest = target
            .output_dir
            .join(relative_path(target.source_dir, &asset));
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AssetError::Copy {
                path: dest.clone(),
                source,
            })?;
        }
        std::fs::copy(&asset, &dest).map_err(|source| AssetError::Copy {
            path: asset.clone(),
            source,
        })?;
        copied.push(dest);
    }
    Ok(copied)
}
