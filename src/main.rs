// thumbview - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Image discovery
// 4. Paging a viewport through the list while the pipeline renders
// 5. Optional thumbnail export and the run summary

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thumbview::app::pipeline::{PipelineConfig, PipelineStats, ThumbnailPipeline};
use thumbview::app::renderer::ImageRenderer;
use thumbview::core::discovery::{self, DiscoveryConfig, SortKey};
use thumbview::core::list::ThumbnailList;
use thumbview::core::viewport::Viewport;
use thumbview::platform::config::{self, AppConfig, PlatformPaths};
use thumbview::platform::fs;
use thumbview::util::{constants, error, logging};

/// Ordering of the listed images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortArg {
    Name,
    Modified,
    Size,
    None,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortKey::Name,
            SortArg::Modified => SortKey::Modified,
            SortArg::Size => SortKey::Size,
            SortArg::None => SortKey::None,
        }
    }
}

/// thumbview - viewport-driven thumbnail generation.
///
/// Lists the images of a directory and renders their thumbnails on a small
/// pool of background workers, one screenful at a time, the way a scrolling
/// image browser would.
#[derive(Parser, Debug)]
#[command(name = "thumbview", version, about)]
struct Cli {
    /// Directory (or image file, whose directory is used) to list.
    path: Option<PathBuf>,

    /// Config file to read instead of the platform default.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum concurrent render workers.
    #[arg(short = 't', long = "threads", value_name = "N")]
    threads: Option<usize>,

    /// Thumbnail bounding box edge in pixels.
    #[arg(short = 's', long = "size", value_name = "PX")]
    size: Option<u32>,

    /// Rows visible at once in the simulated view.
    #[arg(long = "visible-rows", value_name = "N", default_value_t = constants::DEFAULT_VISIBLE_ROWS)]
    visible_rows: usize,

    /// Sort order of the list.
    #[arg(long = "sort", value_enum)]
    sort: Option<SortArg>,

    /// Reverse the sort order.
    #[arg(short = 'r', long = "reverse")]
    reverse: bool,

    /// Write every thumbnail as PNG into this directory.
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print the run summary as JSON.
    #[arg(long = "json")]
    json: bool,

    /// Ask again for thumbnails whose render failed.
    #[arg(long = "retry-failed")]
    retry_failed: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// What one run did, printed on exit.
#[derive(Debug, Serialize)]
struct RunSummary {
    root: PathBuf,
    rows: usize,
    rendered: usize,
    failed: usize,
    exported: usize,
    threads: usize,
    thumbnail_size: u32,
    started_at: DateTime<Utc>,
    duration_ms: u128,
    pipeline: PipelineStats,
}

fn main() {
    let cli = Cli::parse();

    let platform_paths = PlatformPaths::resolve();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform_paths.config_file.clone());
    let (app_config, config_warnings) = config::load_config(&config_path);

    logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "thumbview starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    match run(&cli, &app_config) {
        Ok(summary) => print_summary(&summary, cli.json),
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, app_config: &AppConfig) -> error::Result<RunSummary> {
    let started_at = Utc::now();
    let clock = Instant::now();
    let root = cli.path.clone().unwrap_or_else(|| PathBuf::from("."));

    // CLI flags override config values.
    let discovery_config = DiscoveryConfig {
        max_depth: app_config.max_depth,
        max_files: app_config.max_files,
        sort_by: cli.sort.map(SortKey::from).unwrap_or(app_config.sort_by),
        reverse: cli.reverse || app_config.reverse,
        ..DiscoveryConfig::default()
    };
    let (images, discovery_warnings) = discovery::discover_images(&root, &discovery_config)?;
    for warning in &discovery_warnings {
        tracing::warn!(warning = %warning, "Discovery warning");
    }

    let mut list = ThumbnailList::from_paths(images.into_iter().map(|image| image.path));
    let renderer = ImageRenderer::new(cli.size.unwrap_or(app_config.thumbnail_size));
    let thumbnail_size = renderer.size();
    let mut pipeline = ThumbnailPipeline::new(
        PipelineConfig {
            max_threads: cli.threads.unwrap_or(app_config.max_threads),
            retry_failed: cli.retry_failed || app_config.retry_failed,
        },
        Arc::new(renderer),
    );

    let visible_rows = cli.visible_rows.clamp(1, constants::MAX_VISIBLE_ROWS);
    let mut viewport = Viewport::new(visible_rows, list.len());
    let page_timeout = Duration::from_secs(constants::PAGE_DRAIN_TIMEOUT_SECS);

    loop {
        let report = pipeline.notify_view_changed(&viewport, &mut list);
        tracing::debug!(
            first = viewport.first(),
            pushed = report.pushed,
            skipped = report.already_requested,
            "Page scanned"
        );
        if !pipeline.drain(&mut list, page_timeout) {
            tracing::warn!(
                first = viewport.first(),
                outstanding = pipeline.outstanding(),
                "Page did not finish in time; continuing"
            );
        }
        if !viewport.page_down() {
            break;
        }
    }
    // Anything still in flight after a timeout is abandoned.
    pipeline.stop();

    let mut exported = 0;
    if let Some(ref dir) = cli.output {
        for row in list.iter() {
            if let Some(thumbnail) = row.thumbnail() {
                fs::save_thumbnail(dir, row.path(), thumbnail)?;
                exported += 1;
            }
        }
        tracing::info!(dir = %dir.display(), exported, "Thumbnails exported");
    }

    let stats = pipeline.stats();
    let summary = RunSummary {
        root,
        rows: list.len(),
        rendered: list.rendered_count(),
        failed: stats.failed,
        exported,
        threads: pipeline.max_threads(),
        thumbnail_size,
        started_at,
        duration_ms: clock.elapsed().as_millis(),
        pipeline: stats,
    };

    tracing::info!(
        rows = summary.rows,
        rendered = summary.rendered,
        failed = summary.failed,
        duration_ms = summary.duration_ms,
        "Run complete"
    );
    Ok(summary)
}

fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("Error: cannot serialise summary: {e}"),
        }
        return;
    }

    println!("{}", summary.root.display());
    println!(
        "  {} images, {} thumbnails, {} failed",
        summary.rows, summary.rendered, summary.failed
    );
    if summary.exported > 0 {
        println!("  {} written", summary.exported);
    }
    println!(
        "  {} threads, {}px, {:.2}s (started {})",
        summary.threads,
        summary.thumbnail_size,
        summary.duration_ms as f64 / 1000.0,
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}
