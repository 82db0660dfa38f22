// thumbview - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors keep their source so the full causal chain reaches the log.
//
// Two conditions that look like failures are deliberately NOT errors:
//   - a row that disappeared before its render finished is reported as
//     `DispatchOutcome::Gone` (core::model);
//   - an empty work queue is `WorkQueue::try_pop() == None`, the normal
//     termination signal for a worker.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all thumbview operations.
#[derive(Debug)]
pub enum ThumbViewError {
    /// Image discovery failed.
    Discovery(DiscoveryError),

    /// A thumbnail could not be rendered.
    Render(RenderError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Writing a thumbnail to disk failed.
    Export(ExportError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for ThumbViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Render(e) => write!(f, "Render error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ThumbViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Render(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Render errors
// ---------------------------------------------------------------------------

/// Failure to produce a thumbnail for a single file.
///
/// Always non-fatal: the worker logs it, hands a "no result" outcome to the
/// dispatcher and moves on to the next queued item.
#[derive(Debug)]
pub enum RenderError {
    /// The file could not be opened or decoded.
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    /// The decoded image has a zero width or height.
    EmptyImage { path: PathBuf },

    /// The file is not in a format the renderer handles.
    Unsupported { path: PathBuf },
}

impl RenderError {
    /// Path of the file that failed to render.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Decode { path, .. } | Self::EmptyImage { path } | Self::Unsupported { path } => {
                path
            }
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { path, source } => {
                write!(f, "Cannot decode '{}': {source}", path.display())
            }
            Self::EmptyImage { path } => {
                write!(f, "Image '{}' has no pixels", path.display())
            }
            Self::Unsupported { path } => {
                write!(f, "'{}' is not a supported image format", path.display())
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RenderError> for ThumbViewError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to listing the images of a directory.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The root path does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The root path is not a directory.
    NotADirectory { path: PathBuf },

    /// Walkdir traversal error on the root itself.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Path '{}' is not a directory", path.display())
            }
            Self::Traversal { path, source } => {
                write!(f, "Error traversing '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Traversal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for ThumbViewError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for ThumbViewError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing thumbnails to disk.
#[derive(Debug)]
pub enum ExportError {
    /// The thumbnail's pixel buffer does not match its dimensions.
    InvalidBuffer { path: PathBuf },

    /// PNG encoding failed.
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    /// I/O error creating the output location.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBuffer { path } => write!(
                f,
                "Thumbnail for '{}' has a pixel buffer that does not match its size",
                path.display()
            ),
            Self::Encode { path, source } => {
                write!(f, "Cannot encode '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExportError> for ThumbViewError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for thumbview results.
pub type Result<T> = std::result::Result<T, ThumbViewError>;
