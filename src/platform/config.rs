// thumbview - platform/config.rs
//
// Platform-specific directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::discovery::SortKey;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for thumbview configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/thumbview/ or %APPDATA%\thumbview\config\)
    pub config_dir: PathBuf,

    /// Full path of the default config file.
    pub config_file: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        let config_dir = match ProjectDirs::from("", "", constants::APP_ID) {
            Some(dirs) => dirs.config_dir().to_path_buf(),
            None => {
                tracing::warn!("Could not determine platform directories, using current directory");
                PathBuf::from(".")
            }
        };
        let config_file = config_dir.join(constants::CONFIG_FILE_NAME);

        tracing::debug!(
            config = %config_dir.display(),
            file = %config_file.display(),
            "Platform paths resolved"
        );

        Self {
            config_dir,
            config_file,
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[thumbnails]` section.
    pub thumbnails: ThumbnailsSection,
    /// `[discovery]` section.
    pub discovery: DiscoverySection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[thumbnails]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ThumbnailsSection {
    /// Maximum concurrently running render workers.
    pub max_threads: Option<usize>,
    /// Bounding box edge in pixels.
    pub size: Option<u32>,
    /// Re-request thumbnails whose render failed.
    pub retry_failed: Option<bool>,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// Maximum directory recursion depth.
    pub max_depth: Option<usize>,
    /// Maximum images listed per directory.
    pub max_files: Option<usize>,
    /// "name", "modified", "size" or "none".
    pub sort: Option<String>,
    /// Reverse the sort order.
    pub reverse: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Thumbnails --
    pub max_threads: usize,
    pub thumbnail_size: u32,
    pub retry_failed: bool,

    // -- Discovery --
    pub max_depth: usize,
    pub max_files: usize,
    pub sort_by: SortKey,
    pub reverse: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_threads: constants::DEFAULT_MAX_THREADS,
            thumbnail_size: constants::DEFAULT_THUMBNAIL_SIZE,
            retry_failed: false,
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            sort_by: SortKey::Name,
            reverse: false,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate the config file at `path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults plus a warning: the application still
/// starts but the user is told why their settings were ignored.
pub fn load_config(path: &Path) -> (AppConfig, Vec<String>) {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match read_raw(path) {
        Ok(raw) => {
            tracing::info!(path = %path.display(), "Loaded config file");
            validate(raw)
        }
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

fn read_raw(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate each field against named constants, accumulating all problems.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Thumbnails: max_threads --
    if let Some(threads) = raw.thumbnails.max_threads {
        if (constants::MIN_MAX_THREADS..=constants::ABSOLUTE_MAX_THREADS).contains(&threads) {
            config.max_threads = threads;
        } else {
            warnings.push(out_of_range(
                "thumbnails.max_threads",
                threads,
                constants::MIN_MAX_THREADS,
                constants::ABSOLUTE_MAX_THREADS,
                constants::DEFAULT_MAX_THREADS,
            ));
        }
    }

    // -- Thumbnails: size --
    if let Some(size) = raw.thumbnails.size {
        if (constants::MIN_THUMBNAIL_SIZE..=constants::MAX_THUMBNAIL_SIZE).contains(&size) {
            config.thumbnail_size = size;
        } else {
            warnings.push(out_of_range(
                "thumbnails.size",
                size,
                constants::MIN_THUMBNAIL_SIZE,
                constants::MAX_THUMBNAIL_SIZE,
                constants::DEFAULT_THUMBNAIL_SIZE,
            ));
        }
    }

    if let Some(retry) = raw.thumbnails.retry_failed {
        config.retry_failed = retry;
    }

    // -- Discovery: max_depth --
    if let Some(depth) = raw.discovery.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            warnings.push(out_of_range(
                "discovery.max_depth",
                depth,
                1,
                constants::ABSOLUTE_MAX_DEPTH,
                constants::DEFAULT_MAX_DEPTH,
            ));
        }
    }

    // -- Discovery: max_files --
    if let Some(files) = raw.discovery.max_files {
        if (constants::MIN_MAX_FILES..=constants::ABSOLUTE_MAX_FILES).contains(&files) {
            config.max_files = files;
        } else {
            warnings.push(out_of_range(
                "discovery.max_files",
                files,
                constants::MIN_MAX_FILES,
                constants::ABSOLUTE_MAX_FILES,
                constants::DEFAULT_MAX_FILES,
            ));
        }
    }

    // -- Discovery: sort --
    if let Some(ref sort) = raw.discovery.sort {
        match sort.to_lowercase().as_str() {
            "name" => config.sort_by = SortKey::Name,
            "modified" => config.sort_by = SortKey::Modified,
            "size" => config.sort_by = SortKey::Size,
            "none" => config.sort_by = SortKey::None,
            other => warnings.push(format!(
                "[discovery] sort = \"{other}\" is not recognised. \
                 Expected \"name\", \"modified\", \"size\" or \"none\". Using default (name)."
            )),
        }
    }

    if let Some(reverse) = raw.discovery.reverse {
        config.reverse = reverse;
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(PathBuf::from(file));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

fn out_of_range<T: std::fmt::Display>(field: &str, value: T, min: T, max: T, default: T) -> String {
    let err = ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: format!("{min}-{max}"),
    };
    format!("{err}. Using default ({default}).")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(toml_text: &str) -> (AppConfig, Vec<String>) {
        validate(toml::from_str(toml_text).expect("valid toml"))
    }

    #[test]
    fn test_missing_file_gives_defaults_without_warnings() {
        let dir = TempDir::new().expect("tmpdir");
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (config, warnings) = parse(
            r#"
            [thumbnails]
            max_threads = 6
            size = 256
            retry_failed = true

            [discovery]
            max_depth = 3
            sort = "Size"
            reverse = true

            [logging]
            level = "DEBUG"
            file = "/tmp/thumbview.log"
            "#,
        );
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.max_threads, 6);
        assert_eq!(config.thumbnail_size, 256);
        assert!(config.retry_failed);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.sort_by, SortKey::Size);
        assert!(config.reverse);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/thumbview.log")));
    }

    #[test]
    fn test_out_of_range_threads_falls_back_with_warning() {
        let (config, warnings) = parse("[thumbnails]\nmax_threads = 0\nsize = 4\n");
        assert_eq!(config.max_threads, constants::DEFAULT_MAX_THREADS);
        assert_eq!(config.thumbnail_size, constants::DEFAULT_THUMBNAIL_SIZE);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("thumbnails.max_threads"));
    }

    #[test]
    fn test_unknown_sort_and_level_warn() {
        let (config, warnings) = parse("[discovery]\nsort = \"colour\"\n[logging]\nlevel = \"loud\"\n");
        assert_eq!(config.sort_by, SortKey::Name);
        assert!(config.log_level.is_none());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (_, warnings) = parse("[thumbnails]\nshiny = true\n[future]\nx = 1\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unparseable_file_gives_defaults_and_warning() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[thumbnails\nmax_threads = ").expect("write");

        let (config, warnings) = load_config(&path);
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Config parse error"));
    }
}
