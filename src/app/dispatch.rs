// thumbview - app/dispatch.rs
//
// The rendezvous between worker threads and the display thread.
//
// Architecture:
//   - Workers hold a `ResultSink` and submit one `RenderOutcome` per item,
//     fire-and-forget: the send never blocks and a closed channel is ignored.
//   - The display thread owns the `Dispatcher` and drains the channel each
//     frame (same pattern as a progress channel polled by a UI loop), applying
//     outcomes to the row model. This is the ONLY place row thumbnails are
//     written.
//   - An optional waker is called after every submission so an event loop can
//     schedule a repaint instead of polling.
//
// A row that disappeared while its render was in flight resolves to "gone"
// and the outcome is dropped. That is a normal race, not an error.

use crate::core::model::{
    DispatchOutcome, DispatchSummary, RenderOutcome, RowKey, RowModel, Thumbnail,
};
use crate::util::constants::MAX_RESULTS_PER_FRAME;
use std::fmt;
use std::sync::{mpsc, Arc};
use std::time::Duration;

/// Callback invoked from a worker thread after each submitted outcome.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Create a connected sink/dispatcher pair.
///
/// `retry_failed` controls what happens to a row whose render failed: when
/// false it stays requested and is never rendered again; when true its
/// `requested` flag is cleared so the next viewport scan asks again.
pub fn channel(retry_failed: bool, waker: Option<Waker>) -> (ResultSink, Dispatcher) {
    let (tx, rx) = mpsc::channel();
    (
        ResultSink { tx, waker },
        Dispatcher {
            rx,
            retry_failed,
            budget: MAX_RESULTS_PER_FRAME,
        },
    )
}

// =============================================================================
// Worker side
// =============================================================================

/// Sending half, cloned into every worker.
#[derive(Clone)]
pub struct ResultSink {
    tx: mpsc::Sender<RenderOutcome>,
    waker: Option<Waker>,
}

impl ResultSink {
    /// Hand an outcome to the display thread without waiting for it to be
    /// applied.
    pub fn submit(&self, outcome: RenderOutcome) {
        if self.tx.send(outcome).is_err() {
            // Dispatcher dropped (view closed); nothing left to update.
            tracing::trace!("Dispatcher closed; render outcome dropped");
            return;
        }
        if let Some(wake) = &self.waker {
            wake();
        }
    }
}

impl fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSink")
            .field("has_waker", &self.waker.is_some())
            .finish()
    }
}

// =============================================================================
// Display-thread side
// =============================================================================

/// Receiving half, owned by the display thread.
#[derive(Debug)]
pub struct Dispatcher {
    rx: mpsc::Receiver<RenderOutcome>,
    retry_failed: bool,
    budget: usize,
}

impl Dispatcher {
    /// Override how many outcomes one `process` call may apply.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget.max(1);
        self
    }

    /// Apply pending outcomes without blocking, at most the per-frame budget.
    pub fn process<M: RowModel + ?Sized>(&self, model: &mut M) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        while summary.total() < self.budget {
            match self.rx.try_recv() {
                Ok(outcome) => summary.record(self.apply(model, outcome)),
                Err(_) => break,
            }
        }
        summary
    }

    /// Wait up to `timeout` for the first outcome, then drain like `process`.
    ///
    /// For headless drivers and tests that have no event loop to wake.
    pub fn process_timeout<M: RowModel + ?Sized>(
        &self,
        model: &mut M,
        timeout: Duration,
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        if let Ok(outcome) = self.rx.recv_timeout(timeout) {
            summary.record(self.apply(model, outcome));
            summary.merge(self.process(model));
        }
        summary
    }

    fn apply<M: RowModel + ?Sized>(&self, model: &mut M, outcome: RenderOutcome) -> DispatchOutcome {
        let result = on_render_complete(model, outcome.key, outcome.thumbnail, self.retry_failed);
        if result == DispatchOutcome::Failed {
            tracing::debug!(
                row = %outcome.key,
                path = %outcome.path.display(),
                retry = self.retry_failed,
                "Row left without thumbnail"
            );
        }
        result
    }
}

/// Apply one finished render to the model.
///
/// Must run on the thread that owns `model`. The `requested` flag stays set
/// after success, and after failure unless `retry_failed` is true.
pub fn on_render_complete<M: RowModel + ?Sized>(
    model: &mut M,
    key: RowKey,
    thumbnail: Option<Thumbnail>,
    retry_failed: bool,
) -> DispatchOutcome {
    let Some(row) = model.resolve(key) else {
        tracing::trace!(row = %key, "Row removed before its thumbnail arrived");
        return DispatchOutcome::Gone;
    };

    match thumbnail {
        Some(_) if model.has_bitmap(row) => DispatchOutcome::AlreadySet,
        Some(thumb) => {
            model.set_bitmap(row, thumb);
            DispatchOutcome::Applied
        }
        None => {
            if retry_failed {
                model.set_requested(row, false);
            }
            DispatchOutcome::Failed
        }
    }
}
