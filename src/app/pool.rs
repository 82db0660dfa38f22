// thumbview - app/pool.rs
//
// Bounded, burst-driven pool of thumbnail workers.
//
// Architecture:
//   - Workers are spawned lazily by `ensure_running`, only up to
//     `max_threads` alive at once, and exit as soon as the queue is empty.
//     Between bursts of scrolling no threads exist at all.
//   - An `Arc<AtomicBool>` stop flag is checked before every pop, so
//     `request_stop` waits for at most one in-flight render per worker.
//   - `request_stop` is a pause: it joins every worker, then clears the flag
//     so the next `ensure_running` picks up whatever is still queued.
//   - Workers never touch the row model. Each render, successful or not,
//     becomes one `RenderOutcome` handed to the `ResultSink`.
//   - A failing or panicking render is logged and reported as "no
//     thumbnail"; the worker carries on with the next item.

use crate::app::dispatch::ResultSink;
use crate::core::model::{RenderOutcome, Renderer, WorkItem};
use crate::core::queue::WorkQueue;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Capped set of background render workers sharing one `WorkQueue`.
pub struct WorkerPool {
    queue: Arc<WorkQueue>,
    renderer: Arc<dyn Renderer>,
    sink: ResultSink,
    max_threads: usize,
    stop: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
    /// Monotonic id for thread names.
    spawned_total: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Create an idle pool. No thread is started until `ensure_running`.
    ///
    /// `max_threads` is clamped to at least 1.
    pub fn new(
        queue: Arc<WorkQueue>,
        renderer: Arc<dyn Renderer>,
        sink: ResultSink,
        max_threads: usize,
    ) -> Self {
        Self {
            queue,
            renderer,
            sink,
            max_threads: max_threads.max(1),
            stop: Arc::new(AtomicBool::new(false)),
            workers: Vec::new(),
            spawned_total: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// Spawn workers until `max_threads` are alive. Returns how many were
    /// started. Call after every push to the queue.
    pub fn ensure_running(&mut self) -> usize {
        self.reap_finished();

        let shortfall = self.max_threads.saturating_sub(self.workers.len());
        let mut started = 0;

        for _ in 0..shortfall {
            let id = self.spawned_total.fetch_add(1, Ordering::SeqCst);
            let queue = Arc::clone(&self.queue);
            let renderer = Arc::clone(&self.renderer);
            let sink = self.sink.clone();
            let stop = Arc::clone(&self.stop);

            let spawn_result = thread::Builder::new()
                .name(format!("thumb-worker-{id}"))
                .spawn(move || run_worker(id, &queue, renderer.as_ref(), &sink, &stop));

            match spawn_result {
                Ok(handle) => {
                    self.workers.push(handle);
                    started += 1;
                }
                Err(e) => {
                    // Out of threads: the workers that are running still
                    // drain the queue, so degrade instead of failing.
                    tracing::error!(error = %e, "Failed to spawn thumbnail worker");
                    break;
                }
            }
        }

        if started > 0 {
            tracing::debug!(
                started,
                alive = self.workers.len(),
                max = self.max_threads,
                queued = self.queue.len(),
                "Thumbnail workers started"
            );
        }
        started
    }

    /// Stop all workers and wait for them to exit.
    ///
    /// Items still in the queue are kept; a later `ensure_running` resumes
    /// them. Blocks for at most one render per worker.
    pub fn request_stop(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        self.stop.store(true, Ordering::SeqCst);
        let count = self.workers.len();
        for handle in self.workers.drain(..) {
            join_worker(handle);
        }
        self.stop.store(false, Ordering::SeqCst);

        tracing::debug!(
            joined = count,
            still_queued = self.queue.len(),
            "Thumbnail workers stopped"
        );
    }

    /// Number of worker threads that have not finished yet.
    pub fn alive_count(&self) -> usize {
        self.workers.iter().filter(|h| !h.is_finished()).count()
    }

    /// Join workers whose loop has already ended so their slots can be
    /// reused.
    fn reap_finished(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) =
            self.workers.drain(..).partition(|h| h.is_finished());
        self.workers = running;
        for handle in finished {
            join_worker(handle);
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.request_stop();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("max_threads", &self.max_threads)
            .field("workers", &self.workers.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}

fn join_worker(handle: JoinHandle<()>) {
    let name = handle.thread().name().unwrap_or("thumb-worker").to_string();
    if handle.join().is_err() {
        tracing::error!(worker = %name, "Thumbnail worker panicked");
    }
}

/// Worker loop: pop, render, hand off, until the queue is empty or a stop
/// is requested.
fn run_worker(
    id: usize,
    queue: &WorkQueue,
    renderer: &dyn Renderer,
    sink: &ResultSink,
    stop: &AtomicBool,
) {
    let mut rendered = 0usize;
    let mut failed = 0usize;

    loop {
        if stop.load(Ordering::SeqCst) {
            tracing::debug!(worker = id, "Stop requested; worker exiting");
            break;
        }

        let Some(item) = queue.try_pop() else {
            break;
        };

        let outcome = render_item(renderer, item);
        if outcome.thumbnail.is_some() {
            rendered += 1;
        } else {
            failed += 1;
        }
        sink.submit(outcome);
    }

    tracing::debug!(worker = id, rendered, failed, "Thumbnail worker finished");
}

fn render_item(renderer: &dyn Renderer, item: WorkItem) -> RenderOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| renderer.render(item.file_path())));
    let thumbnail = match result {
        Ok(Ok(thumb)) => {
            tracing::trace!(
                row = %item.key(),
                width = thumb.width,
                height = thumb.height,
                "Thumbnail rendered"
            );
            Some(thumb)
        }
        Ok(Err(e)) => {
            tracing::warn!(row = %item.key(), error = %e, "Thumbnail render failed");
            None
        }
        Err(_) => {
            tracing::error!(
                row = %item.key(),
                path = %item.file_path().display(),
                "Renderer panicked"
            );
            None
        }
    };

    RenderOutcome {
        key: item.key(),
        path: item.file_path().to_path_buf(),
        thumbnail,
    }
}
