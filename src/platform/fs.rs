// thumbview - platform/fs.rs
//
// Writing rendered thumbnails to disk as PNG files.

use crate::core::model::Thumbnail;
use crate::util::constants;
use crate::util::error::ExportError;
use std::path::{Path, PathBuf};

/// Destination for the thumbnail of `source`: `<dir>/<file stem>.png`.
pub fn thumbnail_path(dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "thumbnail".to_string());
    dir.join(format!("{stem}.{}", constants::THUMBNAIL_EXPORT_EXTENSION))
}

/// Encode `thumbnail` as PNG under `dir`, creating the directory if needed.
///
/// Returns the path written. An existing file with the same name is
/// overwritten.
pub fn save_thumbnail(
    dir: &Path,
    source: &Path,
    thumbnail: &Thumbnail,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|e| ExportError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let target = thumbnail_path(dir, source);
    let buffer = image::RgbaImage::from_raw(
        thumbnail.width,
        thumbnail.height,
        thumbnail.rgba.clone(),
    )
    .ok_or_else(|| ExportError::InvalidBuffer {
        path: source.to_path_buf(),
    })?;

    buffer
        .save_with_format(&target, image::ImageFormat::Png)
        .map_err(|e| ExportError::Encode {
            path: target.clone(),
            source: e,
        })?;

    tracing::debug!(
        source = %source.display(),
        target = %target.display(),
        "Thumbnail written"
    );
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_thumbnail_path_uses_stem() {
        let path = thumbnail_path(Path::new("/out"), Path::new("/in/page 01.jpeg"));
        assert_eq!(path, PathBuf::from("/out/page 01.png"));
    }

    #[test]
    fn test_save_thumbnail_round_trips_pixels() {
        let dir = TempDir::new().expect("tmpdir");
        let out = dir.path().join("nested").join("thumbs");
        let thumb = Thumbnail::from_rgba(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255])
            .expect("valid buffer");

        let written = save_thumbnail(&out, Path::new("cover.jpg"), &thumb).expect("save");
        assert_eq!(written, out.join("cover.png"));

        let reloaded = image::open(&written).expect("reopen").into_rgba8();
        assert_eq!(reloaded.dimensions(), (2, 1));
        assert_eq!(reloaded.into_raw(), thumb.rgba);
    }

    #[test]
    fn test_save_thumbnail_rejects_mismatched_buffer() {
        let dir = TempDir::new().expect("tmpdir");
        let bogus = Thumbnail {
            width: 4,
            height: 4,
            rgba: vec![0; 3],
        };
        let err = save_thumbnail(dir.path(), Path::new("x.png"), &bogus).unwrap_err();
        assert!(matches!(err, ExportError::InvalidBuffer { .. }));
    }
}
