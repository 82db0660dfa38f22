// thumbview - app/renderer.rs
//
// Renderer backed by the `image` crate: decode the file, fit it into a
// square box without upscaling, convert to RGBA8.
//
// Runs on worker threads; holds no mutable state.

use crate::core::model::{Renderer, Thumbnail};
use crate::util::constants;
use crate::util::error::RenderError;
use std::path::Path;

/// Decodes image files into thumbnails no larger than `size` x `size`.
#[derive(Debug, Clone, Copy)]
pub struct ImageRenderer {
    size: u32,
}

impl ImageRenderer {
    /// `size` is clamped to the supported thumbnail range.
    pub fn new(size: u32) -> Self {
        Self {
            size: size.clamp(constants::MIN_THUMBNAIL_SIZE, constants::MAX_THUMBNAIL_SIZE),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

impl Default for ImageRenderer {
    fn default() -> Self {
        Self::new(constants::DEFAULT_THUMBNAIL_SIZE)
    }
}

impl Renderer for ImageRenderer {
    fn render(&self, path: &Path) -> Result<Thumbnail, RenderError> {
        if image::ImageFormat::from_path(path).is_err() {
            return Err(RenderError::Unsupported {
                path: path.to_path_buf(),
            });
        }

        let img = image::open(path).map_err(|source| RenderError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        if img.width() == 0 || img.height() == 0 {
            return Err(RenderError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        let fitted = if img.width() <= self.size && img.height() <= self.size {
            img
        } else {
            img.thumbnail(self.size, self.size)
        };

        let rgba = fitted.into_rgba8();
        Ok(Thumbnail {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, Rgb([200, 10, 10]))
            .save(&path)
            .expect("save png");
        path
    }

    #[test]
    fn test_large_image_is_fitted_preserving_aspect() {
        let dir = TempDir::new().expect("tmpdir");
        let path = write_png(dir.path(), "wide.png", 400, 200);

        let thumb = ImageRenderer::new(100).render(&path).expect("render");
        assert_eq!((thumb.width, thumb.height), (100, 50));
        assert_eq!(thumb.rgba.len(), 100 * 50 * 4);
        assert_eq!(&thumb.rgba[..4], &[200, 10, 10, 255]);
    }

    #[test]
    fn test_small_image_is_not_upscaled() {
        let dir = TempDir::new().expect("tmpdir");
        let path = write_png(dir.path(), "small.png", 20, 30);

        let thumb = ImageRenderer::new(128).render(&path).expect("render");
        assert_eq!((thumb.width, thumb.height), (20, 30));
    }

    #[test]
    fn test_corrupt_file_is_a_decode_error() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").expect("write");

        let err = ImageRenderer::default().render(&path).unwrap_err();
        assert!(matches!(err, RenderError::Decode { .. }), "got {err:?}");
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let err = ImageRenderer::default()
            .render(Path::new("notes.txt"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Unsupported { .. }));
    }

    #[test]
    fn test_size_is_clamped() {
        assert_eq!(ImageRenderer::new(1).size(), constants::MIN_THUMBNAIL_SIZE);
        assert_eq!(ImageRenderer::new(1 << 20).size(), constants::MAX_THUMBNAIL_SIZE);
    }
}
