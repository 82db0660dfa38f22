// thumbview - core/queue.rs
//
// Shared FIFO of pending thumbnail requests.
//
// Producers: the viewport scanner on the display thread.
// Consumers: N worker threads, which pop without ever blocking and exit
// when the queue is empty.
//
// Priority is expressed purely by push order; the queue itself is a plain
// FIFO. The lock is held only for the push/pop itself, never across a render.

use crate::core::model::WorkItem;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Thread-safe FIFO of `WorkItem`s.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<WorkItem>>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item. Never fails.
    pub fn push(&self, item: WorkItem) {
        self.lock().push_back(item);
    }

    /// Remove and return the oldest item, or `None` if the queue is empty.
    pub fn try_pop(&self) -> Option<WorkItem> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every pending item. Returns how many were discarded.
    pub fn clear(&self) -> usize {
        let mut items = self.lock();
        let dropped = items.len();
        items.clear();
        dropped
    }

    // A worker that panicked mid-push cannot leave a VecDeque half-written,
    // so the data behind a poisoned lock is still valid.
    fn lock(&self) -> MutexGuard<'_, VecDeque<WorkItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::RowKey;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn item(n: u64) -> WorkItem {
        WorkItem::new(RowKey(n), PathBuf::from(format!("{n}.png")))
    }

    #[test]
    fn test_pop_on_empty_queue_returns_none() {
        let queue = WorkQueue::new();
        assert!(queue.try_pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fifo_order_is_preserved() {
        let queue = WorkQueue::new();
        for n in [3, 1, 2] {
            queue.push(item(n));
        }
        assert_eq!(queue.len(), 3);
        let order: Vec<u64> = std::iter::from_fn(|| queue.try_pop())
            .map(|i| i.key().0)
            .collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn test_clear_reports_dropped_count() {
        let queue = WorkQueue::new();
        queue.push(item(1));
        queue.push(item(2));
        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
        assert_eq!(queue.clear(), 0);
    }

    /// Every pushed item must be popped by exactly one consumer, with
    /// producers and consumers racing.
    #[test]
    fn test_concurrent_pops_never_duplicate_or_lose_items() {
        const ITEMS: u64 = 5_000;
        const CONSUMERS: usize = 8;

        let queue = Arc::new(WorkQueue::new());
        for n in 0..ITEMS / 2 {
            queue.push(item(n));
        }

        let producer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                for n in ITEMS / 2..ITEMS {
                    queue.push(item(n));
                }
            })
        };

        let consumers: Vec<_> = (0..CONSUMERS)
            .map(|_| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    let mut seen = Vec::new();
                    let mut idle_spins = 0;
                    // Keep polling for a while after running dry so late
                    // pushes from the producer are still collected.
                    while idle_spins < 1_000 {
                        match queue.try_pop() {
                            Some(i) => {
                                seen.push(i.key().0);
                                idle_spins = 0;
                            }
                            None => {
                                idle_spins += 1;
                                std::thread::yield_now();
                            }
                        }
                    }
                    seen
                })
            })
            .collect();

        producer.join().expect("producer");
        let mut all: Vec<u64> = consumers
            .into_iter()
            .flat_map(|h| h.join().expect("consumer"))
            .collect();
        // Anything the consumers gave up on is still in the queue.
        all.extend(std::iter::from_fn(|| queue.try_pop()).map(|i| i.key().0));

        let unique: HashSet<u64> = all.iter().copied().collect();
        assert_eq!(all.len() as u64, ITEMS, "an item was duplicated or lost");
        assert_eq!(unique.len() as u64, ITEMS);
    }
}
