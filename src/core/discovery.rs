// thumbview - core/discovery.rs
//
// Lists the image files of a directory in display order.
//
// Uses `walkdir` for traversal and `glob` patterns (case-insensitive) for
// the image filter. Reads only file metadata, never contents.
//
// Per-file errors are non-fatal and collected as warnings. Only an invalid
// root is an error.

use crate::util::constants;
use crate::util::error::DiscoveryError;
use chrono::{DateTime, Utc};
use glob::{MatchOptions, Pattern};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

// =============================================================================
// Types
// =============================================================================

/// An image file found during discovery.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredImage {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Which attribute images are ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// File name, with digit runs compared numerically ("p2" < "p10").
    #[default]
    Name,
    /// Last-modified time, most recent first.
    Modified,
    /// File size, smallest first.
    Size,
    /// Whatever order the filesystem returned.
    None,
}

/// Configuration for a discovery operation.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth (1 = the directory itself).
    pub max_depth: usize,

    /// Maximum number of images to return.
    pub max_files: usize,

    /// Glob patterns a file name must match (case-insensitive).
    pub include_patterns: Vec<String>,

    pub sort_by: SortKey,

    /// Reverse the order produced by `sort_by`.
    pub reverse: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            sort_by: SortKey::Name,
            reverse: false,
        }
    }
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover image files under `root`.
///
/// If `root` is itself an image file, its parent directory is listed, so
/// opening one picture shows its siblings.
///
/// Returns the images in display order plus non-fatal warnings.
pub fn discover_images(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<(Vec<DiscoveredImage>, Vec<String>), DiscoveryError> {
    let root = resolve_root(root, config)?;

    let max_files = config.max_files.min(constants::ABSOLUTE_MAX_FILES);
    let max_depth = config.max_depth.clamp(1, constants::ABSOLUTE_MAX_DEPTH);
    let include = compile_patterns(&config.include_patterns);

    tracing::debug!(
        root = %root.display(),
        max_depth,
        max_files,
        sort = ?config.sort_by,
        reverse = config.reverse,
        "Discovery starting"
    );

    let mut images = Vec::new();
    let mut warnings = Vec::new();

    let walker = walkdir::WalkDir::new(&root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true);

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(DiscoveryError::Traversal {
                    path: root.clone(),
                    source: e,
                });
            }
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            warnings.push(format!(
                "Skipping '{}': non-UTF-8 filename",
                entry.path().display()
            ));
            continue;
        };

        if !matches_any(file_name, &include) {
            tracing::trace!(file = file_name, "Not an image");
            continue;
        }

        if images.len() >= max_files {
            warnings.push(format!(
                "Stopped listing after {max_files} images; remaining files are not shown"
            ));
            break;
        }

        let (size, modified) = match entry.metadata() {
            Ok(m) => (m.len(), m.modified().ok().map(DateTime::<Utc>::from)),
            Err(e) => {
                let msg = format!("Cannot read metadata for '{}': {e}", entry.path().display());
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                (0, None)
            }
        };

        images.push(DiscoveredImage {
            path: entry.into_path(),
            size,
            modified,
        });
    }

    sort_images(&mut images, config.sort_by, config.reverse);

    tracing::info!(
        root = %root.display(),
        images = images.len(),
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok((images, warnings))
}

fn resolve_root(root: &Path, config: &DiscoveryConfig) -> Result<PathBuf, DiscoveryError> {
    let metadata = std::fs::metadata(root).map_err(|_| DiscoveryError::RootNotFound {
        path: root.to_path_buf(),
    })?;

    if metadata.is_dir() {
        return Ok(root.to_path_buf());
    }

    let include = compile_patterns(&config.include_patterns);
    let is_image = root
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| matches_any(n, &include));

    match root.parent() {
        Some(parent) if is_image => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            Ok(parent.to_path_buf())
        }
        _ => Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        }),
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Sort discovered images in place.
pub fn sort_images(images: &mut [DiscoveredImage], key: SortKey, reverse: bool) {
    match key {
        SortKey::Name => {
            images.sort_by(|a, b| natural_cmp(&file_name(&a.path), &file_name(&b.path)))
        }
        // Most recently modified first; files without a readable mtime last.
        SortKey::Modified => images.sort_by(|a, b| b.modified.cmp(&a.modified)),
        SortKey::Size => images.sort_by_key(|img| img.size),
        SortKey::None => {}
    }
    if reverse {
        images.reverse();
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare two names the way a person would: case-insensitively, with runs
/// of ASCII digits compared by numeric value.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let l = take_digits(&mut left);
                let r = take_digits(&mut right);
                let l_trimmed = l.trim_start_matches('0');
                let r_trimmed = r.trim_start_matches('0');
                let ord = l_trimmed
                    .len()
                    .cmp(&r_trimmed.len())
                    .then_with(|| l_trimmed.cmp(r_trimmed));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

// =============================================================================
// Pattern helpers
// =============================================================================

fn compile_patterns(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pat) => Some(pat),
            Err(e) => {
                tracing::warn!(pattern = %p, error = %e, "Invalid include pattern skipped");
                None
            }
        })
        .collect()
}

fn matches_any(file_name: &str, patterns: &[Pattern]) -> bool {
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::default()
    };
    patterns.iter().any(|p| p.matches_with(file_name, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(images: &[DiscoveredImage]) -> Vec<String> {
        images.iter().map(|i| file_name(&i.path)).collect()
    }

    #[test]
    fn test_natural_cmp_orders_digit_runs_numerically() {
        let mut list = vec!["page10.png", "Page2.png", "page1.png", "page02b.png"];
        list.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(list, vec!["page1.png", "Page2.png", "page02b.png", "page10.png"]);
    }

    #[test]
    fn test_discovers_only_images_case_insensitively() {
        let dir = TempDir::new().expect("tmpdir");
        fs::write(dir.path().join("a.PNG"), b"x").expect("write");
        fs::write(dir.path().join("b.jpg"), b"x").expect("write");
        fs::write(dir.path().join("notes.txt"), b"x").expect("write");
        fs::create_dir(dir.path().join("sub")).expect("mkdir");
        fs::write(dir.path().join("sub").join("c.png"), b"x").expect("write");

        let (images, warnings) =
            discover_images(dir.path(), &DiscoveryConfig::default()).expect("discover");
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(names(&images), vec!["a.PNG", "b.jpg"]);

        let recursive = DiscoveryConfig {
            max_depth: 2,
            ..DiscoveryConfig::default()
        };
        let (images, _) = discover_images(dir.path(), &recursive).expect("discover");
        assert_eq!(images.len(), 3);
    }

    #[test]
    fn test_size_sort_and_reverse() {
        let dir = TempDir::new().expect("tmpdir");
        fs::write(dir.path().join("big.png"), vec![0u8; 300]).expect("write");
        fs::write(dir.path().join("small.png"), vec![0u8; 10]).expect("write");
        fs::write(dir.path().join("mid.png"), vec![0u8; 100]).expect("write");

        let config = DiscoveryConfig {
            sort_by: SortKey::Size,
            ..DiscoveryConfig::default()
        };
        let (images, _) = discover_images(dir.path(), &config).expect("discover");
        assert_eq!(names(&images), vec!["small.png", "mid.png", "big.png"]);

        let config = DiscoveryConfig {
            sort_by: SortKey::Size,
            reverse: true,
            ..DiscoveryConfig::default()
        };
        let (images, _) = discover_images(dir.path(), &config).expect("discover");
        assert_eq!(names(&images), vec!["big.png", "mid.png", "small.png"]);
    }

    #[test]
    fn test_max_files_truncates_with_warning() {
        let dir = TempDir::new().expect("tmpdir");
        for n in 0..5 {
            fs::write(dir.path().join(format!("{n}.png")), b"x").expect("write");
        }
        let config = DiscoveryConfig {
            max_files: 3,
            ..DiscoveryConfig::default()
        };
        let (images, warnings) = discover_images(dir.path(), &config).expect("discover");
        assert_eq!(images.len(), 3);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_image_file_root_lists_its_directory() {
        let dir = TempDir::new().expect("tmpdir");
        let picked = dir.path().join("b.png");
        fs::write(dir.path().join("a.png"), b"x").expect("write");
        fs::write(&picked, b"x").expect("write");

        let (images, _) = discover_images(&picked, &DiscoveryConfig::default()).expect("discover");
        assert_eq!(names(&images), vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_invalid_roots_are_errors() {
        let dir = TempDir::new().expect("tmpdir");
        let missing = dir.path().join("missing");
        assert!(matches!(
            discover_images(&missing, &DiscoveryConfig::default()),
            Err(DiscoveryError::RootNotFound { .. })
        ));

        let text = dir.path().join("notes.txt");
        fs::write(&text, b"x").expect("write");
        assert!(matches!(
            discover_images(&text, &DiscoveryConfig::default()),
            Err(DiscoveryError::NotADirectory { .. })
        ));
    }
}
