//! End-to-end builds of the fixture site.

use quire::config::load_config;
use quire::imaging::{AnimationParams, BackendError, ConvertParams, Dimensions, ImageBackend};
use quire::pipeline::{self, STYLESHEET_FILE};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Records conversions and writes nothing.
#[derive(Default)]
struct Recorder {
    converted: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl ImageBackend for Recorder {
    fn convert(&self, params: &ConvertParams) -> Result<Dimensions, BackendError> {
        self.converted
            .lock()
            .unwrap()
            .push((params.source.clone(), params.output.clone()));
        Ok(Dimensions {
            width: 1,
            height: 1,
        })
    }

    fn optimize_animation(&self, _params: &AnimationParams) -> Result<(), BackendError> {
        Ok(())
    }
}

fn copy_dir(src: &Path, dst: &Path) {
    for entry in walkdir::WalkDir::new(src) {
        let entry = entry.unwrap();
        let target = dst.join(entry.path().strip_prefix(src).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

fn fixture_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    copy_dir(
        &Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content"),
        tmp.path(),
    );
    let cover = tmp.path().join("blog/img/cover.png");
    fs::create_dir_all(cover.parent().unwrap()).unwrap();
    image::RgbImage::from_pixel(1024, 256, image::Rgb([10, 120, 200]))
        .save(&cover)
        .unwrap();
    tmp
}

#[test]
fn fixture_site_builds_completely() {
    let content = fixture_site();
    let out = TempDir::new().unwrap();
    let config = load_config(content.path()).unwrap();

    let report = pipeline::build(&config, content.path(), out.path())
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(report.targets.len(), 4);
    assert_eq!(report.stylesheet.as_deref(), Some(STYLESHEET_FILE));
    assert!(out.path().join(STYLESHEET_FILE).exists());

    for page in [
        "home/index.html",
        "blog/first-post.html",
        "blog/second-post.html",
        "blog/index.html",
        "blog/rss.xml",
        "rust-series/intro.html",
        "rust-series/wrap-up.html",
        "rust-series/index.html",
        "about/index.html",
        "about/contact.html",
    ] {
        assert!(out.path().join(page).exists(), "missing {page}");
    }
}

#[test]
fn converted_image_is_shrunk_and_referenced() {
    let content = fixture_site();
    let out = TempDir::new().unwrap();
    let config = load_config(content.path()).unwrap();

    let report = pipeline::build(&config, content.path(), out.path()).unwrap();
    assert!(report.is_complete());

    let webp = out.path().join("blog/img/cover.webp");
    let (width, height) = image::image_dimensions(&webp).unwrap();
    assert_eq!((width, height), (512, 128));

    let post = fs::read_to_string(out.path().join("blog/second-post.html")).unwrap();
    assert!(post.contains(r#"src="img/cover.webp""#));
}

#[test]
fn home_index_pulls_in_used_target() {
    let content = fixture_site();
    let out = TempDir::new().unwrap();
    let config = load_config(content.path()).unwrap();

    pipeline::build(&config, content.path(), out.path()).unwrap();

    let home = fs::read_to_string(out.path().join("home/index.html")).unwrap();
    assert!(home.contains(r#"href="../blog/first-post.html""#));
    assert!(home.contains("Welcome"));
}

#[test]
fn rebuild_into_same_output_is_stable() {
    let content = fixture_site();
    let out = TempDir::new().unwrap();
    let config = load_config(content.path()).unwrap();

    pipeline::build(&config, content.path(), out.path()).unwrap();
    let first = fs::read_to_string(out.path().join("rust-series/setup.html")).unwrap();
    pipeline::build(&config, content.path(), out.path()).unwrap();
    let second = fs::read_to_string(out.path().join("rust-series/setup.html")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn recording_backend_sees_planned_conversions_only() {
    let content = fixture_site();
    let out = TempDir::new().unwrap();
    let config = load_config(content.path()).unwrap();
    let recorder = Recorder::default();

    let report =
        pipeline::build_with_backend(&recorder, &config, content.path(), out.path()).unwrap();
    assert!(report.is_complete());

    let converted = recorder.converted.lock().unwrap();
    assert_eq!(converted.len(), 1);
    assert!(converted[0].0.ends_with("blog/img/cover.png"));
    assert_eq!(converted[0].1, out.path().join("blog/img/cover.webp"));
    assert!(out.path().join("blog/files/notes.txt").exists());
}
