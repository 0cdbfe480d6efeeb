//! Bounded work queue shared by the worker pool
//!
//! The frontier is a FIFO of crawl targets with three jobs:
//! - Hand work to idle workers (`pop`)
//! - Apply backpressure to producers once it holds `capacity` items (`push`)
//! - Track outstanding work so the driver knows when the crawl has drained

use crate::url::CrawlTarget;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::pin::pin;
use tokio::sync::Notify;

/// Mutable frontier state, guarded by a single lock
#[derive(Debug, Default)]
struct FrontierState {
    items: VecDeque<CrawlTarget>,
    /// Producers currently waiting for room
    blocked_producers: usize,
    /// Items pushed but not yet marked done
    outstanding: usize,
    closed: bool,
}

/// Bounded multi-producer, multi-consumer crawl queue
///
/// Producers block while the queue is full, with one exception: a producer
/// is admitted past capacity when every other drainer is already blocked in
/// `push`. Workers are both the only producers of discovered links and the
/// only consumers, so without that exception a full queue could park the
/// whole pool.
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    capacity: usize,
    /// Number of workers that drain the queue
    drainers: usize,
    not_empty: Notify,
    not_full: Notify,
    idle: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `capacity` - Items held before producers block (at least 1)
    /// * `drainers` - Number of workers popping from this frontier (at least 1)
    pub fn new(capacity: usize, drainers: usize) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            capacity: capacity.max(1),
            drainers: drainers.max(1),
            not_empty: Notify::new(),
            not_full: Notify::new(),
            idle: Notify::new(),
        }
    }

    /// Appends a target, waiting for room if the frontier is full
    ///
    /// Every accepted push adds one unit of outstanding work, which the
    /// consumer releases through `task_done`.
    ///
    /// # Returns
    ///
    /// * `true` - The target was queued
    /// * `false` - The frontier is closed; the target was dropped
    pub async fn push(&self, target: CrawlTarget) -> bool {
        let mut waiting = false;

        loop {
            let mut room = pin!(self.not_full.notified());
            room.as_mut().enable();

            {
                let mut state = self.state.lock();
                if waiting {
                    state.blocked_producers -= 1;
                    waiting = false;
                }

                if state.closed {
                    return false;
                }

                let has_room = state.items.len() < self.capacity;
                let last_drainer = state.blocked_producers + 1 >= self.drainers;
                if has_room || last_drainer {
                    if !has_room {
                        tracing::debug!(
                            "Frontier over capacity ({} items), admitting {} to keep workers draining",
                            state.items.len(),
                            target
                        );
                    }
                    state.items.push_back(target);
                    state.outstanding += 1;
                    drop(state);
                    self.not_empty.notify_one();
                    return true;
                }

                state.blocked_producers += 1;
                waiting = true;
            }

            tracing::trace!("Frontier full, waiting to queue {}", target);
            room.await;
        }
    }

    /// Removes the oldest target, waiting while the frontier is empty
    ///
    /// # Returns
    ///
    /// * `Some(CrawlTarget)` - The next target to handle
    /// * `None` - The frontier has been closed
    pub async fn pop(&self) -> Option<CrawlTarget> {
        loop {
            let mut ready = pin!(self.not_empty.notified());
            ready.as_mut().enable();

            {
                let mut state = self.state.lock();
                if state.closed {
                    return None;
                }

                if let Some(target) = state.items.pop_front() {
                    let more = !state.items.is_empty();
                    drop(state);
                    self.not_full.notify_one();
                    if more {
                        // Pass the wakeup on so queued items never wait behind one consumer
                        self.not_empty.notify_one();
                    }
                    return Some(target);
                }
            }

            ready.await;
        }
    }

    /// Marks one popped target as fully handled
    ///
    /// Call this only after any follow-up work the target produced has been
    /// pushed, otherwise the frontier may report itself idle too early.
    pub fn task_done(&self) {
        let mut state = self.state.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
        if state.outstanding == 0 {
            drop(state);
            self.idle.notify_waiters();
        }
    }

    /// Returns a guard that calls `task_done` when dropped
    pub fn task_guard(&self) -> TaskGuard<'_> {
        TaskGuard { frontier: self }
    }

    /// Waits until no pushed work remains outstanding
    pub async fn wait_idle(&self) {
        loop {
            let mut idle = pin!(self.idle.notified());
            idle.as_mut().enable();

            if self.state.lock().outstanding == 0 {
                return;
            }

            idle.await;
        }
    }

    /// Closes the frontier
    ///
    /// Pending and future `pop` calls return `None`; pushes are dropped.
    pub fn close(&self) {
        {
            let mut state = self.state.lock();
            state.closed = true;
        }
        self.not_empty.notify_waiters();
        self.not_full.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Returns the number of queued targets
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of pushed targets not yet marked done
    pub fn outstanding(&self) -> usize {
        self.state.lock().outstanding
    }
}

/// Marks a popped target as done when dropped
#[derive(Debug)]
pub struct TaskGuard<'a> {
    frontier: &'a Frontier,
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        self.frontier.task_done();
    }
}
