use std::time::{Duration, Instant};

/// Trailing window used to coalesce bursts of document changes.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(500);

/// Single-slot rescan timer.
///
/// Every change notification re-arms the slot; when the window elapses with no
/// further notifications, `take_due` reports exactly one rescan. While a scan
/// is in flight no second scan is started: notifications only re-arm the slot,
/// so they collapse into the next window instead of queuing.
#[derive(Debug, Clone)]
pub struct RescanScheduler {
    window: Duration,
    deadline: Option<Instant>,
    in_flight: bool,
}

impl RescanScheduler {
    pub fn new(window: Duration) -> Self {
        RescanScheduler {
            window,
            deadline: None,
            in_flight: false,
        }
    }

    /// Record a change notification at `now`.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// A rescan is armed and waiting for its window to elapse
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// True once the armed window has elapsed and no scan is running.
    /// Marks the scan in flight; call `finish` when it completes.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.in_flight {
            return false;
        }
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                self.in_flight = true;
                true
            }
            _ => false,
        }
    }

    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    /// Time left before the armed window elapses, for sizing event-loop waits
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

impl Default for RescanScheduler {
    fn default() -> Self {
        RescanScheduler::new(DEFAULT_WINDOW)
    }
}
