// thumbview - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Every bound the pipeline enforces is declared here so it can be audited
// in one place.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "thumbview";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "thumbview";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Worker pool limits
// =============================================================================

/// Default maximum number of concurrently alive thumbnail workers.
///
/// Rendering is dominated by decode I/O and CPU; three workers keep a
/// scrolling view responsive on typical desktop hardware without starving
/// the interactive thread.
pub const DEFAULT_MAX_THREADS: usize = 3;

/// Minimum user-configurable worker count (the pool must make progress).
pub const MIN_MAX_THREADS: usize = 1;

/// Hard upper bound on worker count (prevents configuration mistakes from
/// spawning hundreds of decoder threads).
pub const ABSOLUTE_MAX_THREADS: usize = 32;

// =============================================================================
// Thumbnail geometry
// =============================================================================

/// Default bounding box edge (pixels) a thumbnail is fitted into.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 128;

/// Minimum user-configurable thumbnail edge (pixels).
pub const MIN_THUMBNAIL_SIZE: u32 = 16;

/// Maximum user-configurable thumbnail edge (pixels).
pub const MAX_THUMBNAIL_SIZE: u32 = 1_024;

// =============================================================================
// Dispatcher budgets
// =============================================================================

/// Maximum number of render outcomes applied to the row model per call to
/// `Dispatcher::process`.  Remaining outcomes stay in the channel and are
/// applied on the next frame, so a burst of finished renders never stalls
/// the display thread.
pub const MAX_RESULTS_PER_FRAME: usize = 64;

/// How long the headless driver waits for the next render outcome before
/// re-checking whether the pipeline went idle (ms).
pub const RESULT_WAIT_INTERVAL_MS: u64 = 50;

// =============================================================================
// Default visible area (headless driver)
// =============================================================================

/// Default number of rows the simulated viewport shows at once.
pub const DEFAULT_VISIBLE_ROWS: usize = 12;

/// Hard upper bound on the simulated viewport height.
pub const MAX_VISIBLE_ROWS: usize = 10_000;

// =============================================================================
// Discovery limits
// =============================================================================

/// Default directory recursion depth.  1 lists only the directory itself,
/// which is how an image browser opens a folder.
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// Hard upper bound on max depth (prevents unbounded traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Minimum sensible value for the max-files limit.
pub const MIN_MAX_FILES: usize = 1;

/// Default maximum number of images listed from one directory.
pub const DEFAULT_MAX_FILES: usize = 10_000;

/// Hard upper bound on max files.
pub const ABSOLUTE_MAX_FILES: usize = 100_000;

/// Glob patterns for image discovery: the formats the renderer decodes.
/// Matched case-insensitively against file names.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &[
    "*.jpg", "*.jpeg", "*.png", "*.gif", "*.bmp", "*.webp", "*.tif", "*.tiff",
];

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Extension used for exported thumbnails.
pub const THUMBNAIL_EXPORT_EXTENSION: &str = "png";

// =============================================================================
// Headless driver
// =============================================================================

/// Longest the driver waits for one page of thumbnails before moving on (s).
pub const PAGE_DRAIN_TIMEOUT_SECS: u64 = 300;
