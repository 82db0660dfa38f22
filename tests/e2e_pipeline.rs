// thumbview - tests/e2e_pipeline.rs
//
// End-to-end tests for discovery, viewport-driven rendering and export.
//
// These tests exercise the real filesystem, real walkdir traversal, real
// image decoding on worker threads and real PNG encoding. Fixture images
// are generated into a temporary directory at test time.

use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use thumbview::app::pipeline::{PipelineConfig, ThumbnailPipeline};
use thumbview::app::renderer::ImageRenderer;
use thumbview::core::discovery::{discover_images, DiscoveryConfig};
use thumbview::core::list::ThumbnailList;
use thumbview::core::viewport::Viewport;
use thumbview::platform::fs::save_thumbnail;

const WAIT: Duration = Duration::from_secs(30);
const GOOD_IMAGES: usize = 30;

// =============================================================================
// Helpers
// =============================================================================

/// `img_1.png` .. `img_30.png` of varying sizes, one corrupt `zz_broken.png`
/// (sorted last) and a non-image file that discovery must skip.
fn gallery() -> TempDir {
    let dir = TempDir::new().expect("tmpdir");
    for n in 1..=GOOD_IMAGES {
        let width = 40 + (n as u32) * 7;
        let height = 30 + (n as u32) * 3;
        RgbImage::from_pixel(width, height, Rgb([n as u8, 100, 200]))
            .save(dir.path().join(format!("img_{n}.png")))
            .expect("save fixture");
    }
    std::fs::write(dir.path().join("zz_broken.png"), b"not really a png").expect("write");
    std::fs::write(dir.path().join("notes.txt"), b"ignored").expect("write");
    dir
}

fn load_list(root: &Path) -> ThumbnailList {
    let (images, warnings) =
        discover_images(root, &DiscoveryConfig::default()).expect("discovery");
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    ThumbnailList::from_paths(images.into_iter().map(|image| image.path))
}

fn pipeline(threads: usize, size: u32) -> ThumbnailPipeline {
    ThumbnailPipeline::new(
        PipelineConfig {
            max_threads: threads,
            retry_failed: false,
        },
        Arc::new(ImageRenderer::new(size)),
    )
}

/// Page a viewport from top to bottom, draining each page.
fn render_all(pipeline: &mut ThumbnailPipeline, list: &mut ThumbnailList, visible: usize) {
    let mut viewport = Viewport::new(visible, list.len());
    loop {
        pipeline.notify_view_changed(&viewport, list);
        assert!(pipeline.drain(list, WAIT), "page did not finish");
        if !viewport.page_down() {
            break;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

/// Discovery lists only images, in natural name order.
#[test]
fn e2e_discovery_orders_images_naturally() {
    let dir = gallery();
    let list = load_list(dir.path());

    assert_eq!(list.len(), GOOD_IMAGES + 1);
    assert_eq!(list.get(0).unwrap().name(), "img_1.png");
    assert_eq!(list.get(1).unwrap().name(), "img_2.png");
    assert_eq!(list.get(9).unwrap().name(), "img_10.png");
    assert_eq!(list.get(GOOD_IMAGES).unwrap().name(), "zz_broken.png");
}

/// The first screen renders the visible rows plus the look-ahead margin,
/// and nothing further down.
#[test]
fn e2e_first_page_renders_visible_rows_and_margin() {
    let dir = gallery();
    let mut list = load_list(dir.path());
    let mut pipeline = pipeline(3, 32);

    let viewport = Viewport::new(10, list.len());
    let report = pipeline.notify_view_changed(&viewport, &mut list);
    // Visible [0, 9], margin 4: rows 0..=13.
    assert_eq!(report.pushed, 14);
    assert!(pipeline.drain(&mut list, WAIT));

    assert_eq!(list.rendered_count(), 14);
    assert!(list.get(13).unwrap().thumbnail().is_some());
    assert!(list.get(14).unwrap().thumbnail().is_none());
    assert!(!list.get(14).unwrap().requested());
}

/// Scrolling through the whole list renders every decodable image exactly
/// once; the corrupt file stays blank and is not requested again.
#[test]
fn e2e_full_scroll_renders_all_and_leaves_corrupt_row_blank() {
    let dir = gallery();
    let mut list = load_list(dir.path());
    let mut pipeline = pipeline(4, 48);

    render_all(&mut pipeline, &mut list, 7);

    assert_eq!(list.rendered_count(), GOOD_IMAGES);
    let stats = pipeline.stats();
    assert_eq!(stats.rendered, GOOD_IMAGES);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.requested, GOOD_IMAGES + 1);

    let broken = list.get(GOOD_IMAGES).unwrap();
    assert!(broken.thumbnail().is_none());
    assert!(broken.requested());

    for row in list.iter().take(GOOD_IMAGES) {
        let thumb = row.thumbnail().expect("thumbnail");
        assert!(thumb.width <= 48 && thumb.height <= 48, "{}: {thumb:?}", row.name());
    }

    // Scrolling back to the top requests nothing new.
    let report = pipeline.notify_view_changed(&Viewport::new(7, list.len()), &mut list);
    assert_eq!(report.pushed, 0);
    assert!(pipeline.is_idle());
}

/// Opening an image file lists its whole directory.
#[test]
fn e2e_image_file_root_lists_directory() {
    let dir = gallery();
    let (images, _) = discover_images(&dir.path().join("img_5.png"), &DiscoveryConfig::default())
        .expect("discovery");
    assert_eq!(images.len(), GOOD_IMAGES + 1);
}

/// Rendered thumbnails can be written out and decoded again.
#[test]
fn e2e_export_writes_one_png_per_thumbnail() {
    let dir = gallery();
    let out = TempDir::new().expect("out dir");
    let mut list = load_list(dir.path());
    let mut pipeline = pipeline(2, 24);

    render_all(&mut pipeline, &mut list, 12);

    let mut written: Vec<PathBuf> = Vec::new();
    for row in list.iter() {
        if let Some(thumb) = row.thumbnail() {
            written.push(save_thumbnail(out.path(), row.path(), thumb).expect("export"));
        }
    }

    assert_eq!(written.len(), GOOD_IMAGES);
    assert!(!out.path().join("zz_broken.png").exists());
    let first = image::open(out.path().join("img_1.png")).expect("decode export");
    assert!(first.width() <= 24 && first.height() <= 24);
}
