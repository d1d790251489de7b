//! Timer primitives for the refresh lifecycle
//!
//! Both types are plain deadline state machines. The scheduler loop turns
//! a deadline into a future with `tokio::time::sleep_until`, guarded by
//! the running/pending flag, so suspension never cancels unrelated work.

use std::time::Duration;

use tokio::time::Instant;

/// Restartable countdown that paces background refreshes.
///
/// `stop` suspends ticking without losing the period; `reset` pushes the
/// next deadline a full period out from now.
#[derive(Debug)]
pub struct RefreshTimer {
    period: Duration,
    deadline: Instant,
    running: bool,
}

impl RefreshTimer {
    /// Create a stopped timer with the given period
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: Instant::now(),
            running: false,
        }
    }

    /// Start ticking, with the first deadline one period from now
    pub fn start(&mut self) {
        self.running = true;
        self.reset();
    }

    /// Suspend ticking until the next `start`
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Push the next deadline one period out from now
    pub fn reset(&mut self) {
        self.deadline = Instant::now() + self.period;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Deadline of the next tick. Only meaningful while running.
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Trailing-edge debouncer.
///
/// Every `trigger` re-arms the deadline a full quiet window out, so a
/// burst of triggers collapses into a single firing once the burst stops.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm, or re-arm, the deadline one quiet window from now
    pub fn trigger(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Disarm without firing
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Consume the armed deadline. Returns whether one was pending.
    pub fn fire(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Deadline of the pending firing, if armed
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
