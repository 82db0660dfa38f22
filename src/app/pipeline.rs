// thumbview - app/pipeline.rs
//
// Public face of the thumbnail pipeline, owned by the display thread.
//
// Wiring:
//   ViewportScanner -> WorkQueue -> WorkerPool -> Renderer
//                                        |
//                                   ResultSink  ~~mpsc~~>  Dispatcher -> RowModel
//
// The pipeline holds no reference to the row model. The caller passes
// `&mut model` to `notify_view_changed` and `process_results`, both of which
// run on the display thread, so the model never crosses a thread boundary.

use crate::app::dispatch::{self, Dispatcher, Waker};
use crate::app::pool::WorkerPool;
use crate::core::model::{DispatchSummary, Renderer, RowModel, VisibleRange};
use crate::core::queue::WorkQueue;
use crate::core::scanner::{ScanReport, ViewportScanner};
use crate::util::constants;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Settings read once when the pipeline is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum concurrently alive workers.
    pub max_threads: usize,
    /// Clear `requested` on a failed render so the next scan retries it.
    pub retry_failed: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_threads: constants::DEFAULT_MAX_THREADS,
            retry_failed: false,
        }
    }
}

/// Running totals since the pipeline was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Items pushed by viewport scans.
    pub requested: usize,
    /// Thumbnails stored on rows.
    pub rendered: usize,
    /// Renders that produced no thumbnail.
    pub failed: usize,
    /// Outcomes dropped because the row was gone or already had a bitmap.
    pub discarded: usize,
    /// Queued items dropped by `clear_pending`.
    pub cancelled: usize,
}

/// Viewport-driven thumbnail generation.
#[derive(Debug)]
pub struct ThumbnailPipeline {
    queue: Arc<WorkQueue>,
    pool: WorkerPool,
    dispatcher: Dispatcher,
    scanner: ViewportScanner,
    outstanding: usize,
    stats: PipelineStats,
    /// Set by `stop`; while set, per-frame processing does not restart
    /// workers.
    paused: bool,
}

impl ThumbnailPipeline {
    pub fn new(config: PipelineConfig, renderer: Arc<dyn Renderer>) -> Self {
        Self::build(config, renderer, None)
    }

    /// Like `new`, with a callback run on a worker thread whenever a result
    /// is ready, e.g. to request a repaint of the view.
    pub fn with_waker(config: PipelineConfig, renderer: Arc<dyn Renderer>, waker: Waker) -> Self {
        Self::build(config, renderer, Some(waker))
    }

    fn build(config: PipelineConfig, renderer: Arc<dyn Renderer>, waker: Option<Waker>) -> Self {
        let max_threads = config
            .max_threads
            .clamp(constants::MIN_MAX_THREADS, constants::ABSOLUTE_MAX_THREADS);
        let queue = Arc::new(WorkQueue::new());
        let (sink, dispatcher) = dispatch::channel(config.retry_failed, waker);
        let pool = WorkerPool::new(Arc::clone(&queue), renderer, sink, max_threads);

        tracing::info!(
            max_threads,
            retry_failed = config.retry_failed,
            "Thumbnail pipeline created"
        );

        Self {
            queue,
            pool,
            dispatcher,
            scanner: ViewportScanner::new(),
            outstanding: 0,
            stats: PipelineStats::default(),
            paused: false,
        }
    }

    /// Call on every redraw or scroll: queue thumbnails for the visible rows
    /// and their margins, and start workers while anything is queued.
    ///
    /// Also ends a pause started by `stop`, even when the scan finds nothing
    /// new to queue.
    pub fn notify_view_changed<V, M>(&mut self, view: &V, model: &mut M) -> ScanReport
    where
        V: VisibleRange + ?Sized,
        M: RowModel + ?Sized,
    {
        let report = self.scanner.scan(view, model, &self.queue);
        if report.pushed > 0 {
            self.outstanding += report.pushed;
            self.stats.requested += report.pushed;
        }
        self.paused = false;
        self.resume_workers();
        report
    }

    /// Pause all workers, waiting for each to finish its current render.
    /// Queued items are kept and resume on the next `notify_view_changed`
    /// or `drain`.
    pub fn stop(&mut self) {
        self.pool.request_stop();
        self.paused = true;
    }

    /// Stop the workers and drop every queued item.
    ///
    /// Rows whose request was dropped get their `requested` flag cleared so
    /// a later scan asks for them again. Use before bulk changes to the model
    /// such as loading a different directory. Returns the number dropped.
    pub fn clear_pending<M: RowModel + ?Sized>(&mut self, model: &mut M) -> usize {
        self.pool.request_stop();

        let mut dropped = 0;
        while let Some(item) = self.queue.try_pop() {
            if let Some(row) = model.resolve(item.key()) {
                model.set_requested(row, false);
            }
            dropped += 1;
        }

        self.outstanding = self.outstanding.saturating_sub(dropped);
        self.stats.cancelled += dropped;
        if dropped > 0 {
            tracing::debug!(dropped, "Pending thumbnail requests cleared");
        }
        dropped
    }

    /// Apply finished renders to `model` without blocking.
    ///
    /// Unless paused, also replaces workers that exited while items were
    /// still queued (a worker that found the queue empty just before a scan
    /// pushed more).
    pub fn process_results<M: RowModel + ?Sized>(&mut self, model: &mut M) -> DispatchSummary {
        if !self.paused {
            self.resume_workers();
        }
        let summary = self.dispatcher.process(model);
        self.account(summary);
        summary
    }

    /// Wait up to `timeout` for a finished render, then apply all that are
    /// ready.
    pub fn process_results_timeout<M: RowModel + ?Sized>(
        &mut self,
        model: &mut M,
        timeout: Duration,
    ) -> DispatchSummary {
        if !self.paused {
            self.resume_workers();
        }
        let summary = self.dispatcher.process_timeout(model, timeout);
        self.account(summary);
        summary
    }

    /// Block until every queued request has been rendered and applied, or
    /// `timeout` elapses. Returns true if the pipeline went idle.
    ///
    /// Ends a pause: workers are restarted if items are still queued.
    pub fn drain<M: RowModel + ?Sized>(&mut self, model: &mut M, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        let step = Duration::from_millis(constants::RESULT_WAIT_INTERVAL_MS);
        self.paused = false;
        while !self.is_idle() {
            let now = std::time::Instant::now();
            if now >= deadline {
                tracing::warn!(
                    outstanding = self.outstanding,
                    "Timed out waiting for thumbnails"
                );
                return false;
            }
            self.process_results_timeout(model, step.min(deadline - now));
        }
        true
    }

    /// Requests queued or rendering whose outcome has not been applied yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn is_idle(&self) -> bool {
        self.outstanding == 0
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn alive_workers(&self) -> usize {
        self.pool.alive_count()
    }

    pub fn max_threads(&self) -> usize {
        self.pool.max_threads()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Top the pool up to `max_threads` while work is queued. Finished
    /// workers are reaped first, so one that exited on an empty queue is
    /// replaced.
    fn resume_workers(&mut self) {
        if !self.queue.is_empty() {
            self.pool.ensure_running();
        }
    }

    fn account(&mut self, summary: DispatchSummary) {
        self.outstanding = self.outstanding.saturating_sub(summary.total());
        self.stats.rendered += summary.applied;
        self.stats.failed += summary.failed;
        self.stats.discarded += summary.gone + summary.already_set;
    }
}
