//! Sliding-window rate limiter shared by all workers
//!
//! The limiter remembers when each admitted request was dispatched and admits
//! a new one only while fewer than the configured number fall inside the
//! trailing window. Unlike fixed buckets this never lets a burst at the end of
//! one bucket and the start of the next exceed the ceiling.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Decision returned by the rate limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request may be dispatched now; a slot has been consumed
    Proceed,
    /// No slot is free; ask again after this long
    RetryAfter(Duration),
}

/// Global sliding-window rate limiter
///
/// One instance is shared by every worker so the ceiling applies to the crawl
/// as a whole. Timestamps are kept oldest-first: appended at the back, pruned
/// from the front.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    /// Admissions allowed per window; zero means unlimited
    max_requests: usize,
    window: Duration,
    dispatched: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    /// Creates a limiter admitting `max_requests` per `window`
    ///
    /// A `max_requests` of zero or less disables limiting entirely.
    pub fn new(max_requests: i64, window: Duration) -> Self {
        let max_requests = usize::try_from(max_requests).unwrap_or(0);

        Self {
            max_requests,
            window,
            dispatched: Mutex::new(VecDeque::with_capacity(max_requests.min(1024))),
        }
    }

    /// Returns true if every request is admitted immediately
    pub fn is_unlimited(&self) -> bool {
        self.max_requests == 0
    }

    /// Returns the admissions allowed per window
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Asks to dispatch one request now
    pub fn admit(&self) -> Admission {
        if self.is_unlimited() {
            return Admission::Proceed;
        }

        let mut dispatched = self.dispatched.lock();
        let now = Instant::now();
        self.admit_locked(&mut dispatched, now)
    }

    /// Asks to dispatch one request at a given instant
    ///
    /// Instants earlier than the newest recorded dispatch are treated as that
    /// dispatch's instant, keeping the window in chronological order.
    pub fn admit_at(&self, now: Instant) -> Admission {
        if self.is_unlimited() {
            return Admission::Proceed;
        }

        let mut dispatched = self.dispatched.lock();
        let now = match dispatched.back() {
            Some(&newest) if newest > now => newest,
            _ => now,
        };
        self.admit_locked(&mut dispatched, now)
    }

    /// Waits until a slot is free, then consumes it
    pub async fn until_ready(&self) {
        loop {
            match self.admit() {
                Admission::Proceed => return,
                Admission::RetryAfter(wait) => tokio::time::sleep(wait).await,
            }
        }
    }

    /// Returns the number of dispatches currently inside the window
    pub fn in_window(&self) -> usize {
        let mut dispatched = self.dispatched.lock();
        self.prune(&mut dispatched, Instant::now());
        dispatched.len()
    }

    fn admit_locked(&self, dispatched: &mut VecDeque<Instant>, now: Instant) -> Admission {
        self.prune(dispatched, now);

        if dispatched.len() < self.max_requests {
            dispatched.push_back(now);
            return Admission::Proceed;
        }

        match dispatched.front() {
            Some(&oldest) => {
                Admission::RetryAfter(self.window.saturating_sub(now.duration_since(oldest)))
            }
            None => Admission::RetryAfter(self.window),
        }
    }

    /// Drops dispatches that have left the window
    fn prune(&self, dispatched: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = dispatched.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                dispatched.pop_front();
            } else {
                break;
            }
        }
    }
}
