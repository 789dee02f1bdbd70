//! Trailing-edge debounce for rebuild+broadcast cycles.
//!
//! [`Debouncer`] is a single-slot deferred task: scheduling while a task is
//! pending cancels it and starts a new delay window from `now`. It owns no
//! timer; the caller passes the current time in and asks whether the slot
//! is due, so the same code runs under the tokio clock and under a manual
//! clock in tests.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of "now" for scheduling decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Reads the tokio runtime clock, which honours `tokio::time::pause`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeClock;

impl Clock for RuntimeClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Arc::new(Mutex::new(Instant::now())) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
    restarts: u64,
    fired: u64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None, restarts: 0, fired: 0 }
    }

    /// Arms the slot for `now + delay`. Returns true if a pending task was
    /// cancelled in the process.
    pub fn schedule(&mut self, now: Instant) -> bool {
        let cancelled = self.deadline.is_some();
        if cancelled {
            self.restarts += 1;
        }
        self.deadline = Some(now + self.delay);
        cancelled
    }

    /// Consumes the pending task if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                self.fired += 1;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Pending tasks that were cancelled by a later schedule.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }
}
