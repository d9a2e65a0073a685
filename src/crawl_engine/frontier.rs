//! Bounded FIFO work queue shared by all crawl workers.
//!
//! Enqueue never blocks: when the queue is full the overflow policy discards the
//! oldest half of the queued tasks, keeping the survivors in arrival order. The
//! same policy is applied by a periodic sweep once the queue passes a high-water
//! mark.
//!
//! The frontier also knows how many dequeued tasks are still being processed.
//! An empty queue with nothing in progress means the crawl has run out of work.

use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

use super::crawl_types::UrlTask;

/// What happened to a task handed to [`Frontier::enqueue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    /// The queue was full; this many of the oldest tasks were discarded first
    QueuedAfterOverflow { dropped: usize },
    /// The frontier is closed and accepts no more work
    Rejected,
}

struct FrontierState {
    queue: VecDeque<UrlTask>,
    in_progress: usize,
    closed: bool,
}

/// Bounded multi-producer/multi-consumer FIFO of [`UrlTask`]s
pub struct Frontier {
    state: Mutex<FrontierState>,
    capacity: usize,
    notify: Notify,
    dropped: AtomicUsize,
    peak_len: AtomicUsize,
}

impl Frontier {
    /// Create a frontier holding at most `capacity` tasks (minimum 2)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            state: Mutex::new(FrontierState {
                queue: VecDeque::with_capacity(capacity.min(4096)),
                in_progress: 0,
                closed: false,
            }),
            capacity,
            notify: Notify::new(),
            dropped: AtomicUsize::new(0),
            peak_len: AtomicUsize::new(0),
        }
    }

    /// Append a task. On a full queue the overflow policy runs first.
    pub fn enqueue(&self, task: UrlTask) -> EnqueueOutcome {
        let outcome = {
            let mut state = self.state.lock();
            if state.closed {
                return EnqueueOutcome::Rejected;
            }

            let dropped = if state.queue.len() >= self.capacity {
                self.shed_locked(&mut state.queue)
            } else {
                0
            };

            state.queue.push_back(task);
            self.peak_len.fetch_max(state.queue.len(), Ordering::Relaxed);

            if dropped == 0 {
                EnqueueOutcome::Queued
            } else {
                EnqueueOutcome::QueuedAfterOverflow { dropped }
            }
        };

        self.notify.notify_one();
        outcome
    }

    /// Apply the overflow policy now: discard the oldest `floor(len / 2)` tasks.
    ///
    /// Returns the number of discarded tasks.
    pub fn shed_oldest_half(&self) -> usize {
        let mut state = self.state.lock();
        self.shed_locked(&mut state.queue)
    }

    /// Periodic sweep: shed the oldest half if at least `high_water` tasks are queued
    pub fn sweep(&self, high_water: usize) -> usize {
        let mut state = self.state.lock();
        if state.queue.is_empty() || state.queue.len() < high_water {
            return 0;
        }
        self.shed_locked(&mut state.queue)
    }

    fn shed_locked(&self, queue: &mut VecDeque<UrlTask>) -> usize {
        let before = queue.len();
        let drop_count = before / 2;
        if drop_count == 0 {
            return 0;
        }

        queue.drain(..drop_count);
        self.dropped.fetch_add(drop_count, Ordering::Relaxed);
        warn!(
            target: "vidcrawl::frontier",
            "Frontier overflow: discarded {drop_count} oldest of {before} queued URLs (capacity {})",
            self.capacity
        );
        drop_count
    }

    /// Wait for the next task.
    ///
    /// Returns `None` once the frontier is closed, or once it is exhausted: the queue
    /// is empty and no claimed task is still in progress. The returned claim counts
    /// as in progress until it is dropped, so children must be enqueued before then.
    pub async fn next(&self) -> Option<ClaimedTask<'_>> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if state.closed {
                    return None;
                }
                if let Some(task) = state.queue.pop_front() {
                    state.in_progress += 1;
                    return Some(ClaimedTask {
                        frontier: self,
                        task,
                    });
                }
                if state.in_progress == 0 {
                    state.closed = true;
                    drop(state);
                    debug!(target: "vidcrawl::frontier", "Frontier exhausted");
                    self.notify.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    fn complete(&self) {
        let exhausted = {
            let mut state = self.state.lock();
            state.in_progress = state.in_progress.saturating_sub(1);
            state.in_progress == 0 && state.queue.is_empty()
        };

        if exhausted {
            // Idle workers must wake up to observe exhaustion
            self.notify.notify_waiters();
        }
    }

    /// Stop handing out work and wake every waiting worker.
    ///
    /// Queued tasks are discarded; later enqueues are rejected. Returns the number
    /// of tasks that were still queued.
    pub fn close(&self) -> usize {
        let abandoned = {
            let mut state = self.state.lock();
            state.closed = true;
            let abandoned = state.queue.len();
            state.queue.clear();
            abandoned
        };
        self.notify.notify_waiters();
        abandoned
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().queue.is_empty()
    }

    /// Tasks handed out and not yet finished
    #[must_use]
    pub fn in_progress(&self) -> usize {
        self.state.lock().in_progress
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total tasks discarded by the overflow policy
    #[must_use]
    pub fn dropped_total(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn peak_len(&self) -> usize {
        self.peak_len.load(Ordering::Relaxed)
    }

    /// Snapshot of queued URLs in FIFO order
    #[must_use]
    pub fn queued_urls(&self) -> Vec<String> {
        self.state
            .lock()
            .queue
            .iter()
            .map(|task| task.url.clone())
            .collect()
    }
}

/// A task taken from the frontier. Marks the task finished when dropped.
pub struct ClaimedTask<'a> {
    frontier: &'a Frontier,
    task: UrlTask,
}

impl ClaimedTask<'_> {
    #[must_use]
    pub fn task(&self) -> &UrlTask {
        &self.task
    }
}

impl std::ops::Deref for ClaimedTask<'_> {
    type Target = UrlTask;

    fn deref(&self) -> &UrlTask {
        &self.task
    }
}

impl Drop for ClaimedTask<'_> {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}
