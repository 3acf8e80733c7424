#![forbid(unsafe_code)]

//! Rebuild coalescing for content-changed notifications.
//!
//! The host page can emit dozens of mutation notifications while it renders
//! a single update. Rebuilding the grid for each one would be wasted work:
//! only the state at the next rendering frame matters. The scheduler keeps
//! one pending flag; the first request after a frame asks the host to
//! schedule a frame callback, every later request in the same frame is
//! absorbed.
//!
//! # Usage
//!
//! ```ignore
//! if scheduler.request() == FrameRequest::Schedule {
//!     host.request_animation_frame(on_frame);
//! }
//! // ... later, inside the frame callback:
//! if scheduler.take_pending() {
//!     rebuild();
//! }
//! ```
//!
//! # Invariants
//!
//! 1. At most one frame callback is outstanding at any time.
//! 2. At most one rebuild runs per frame, whatever the burst size.
//! 3. A pending rebuild is never cancelled; later requests reuse it.

/// What the host must do after a [`RebuildScheduler::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// No rebuild was pending: schedule a frame callback.
    Schedule,
    /// A rebuild is already pending for the next frame: do nothing.
    Coalesced,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Total requests received.
    pub requests: u64,
    /// Requests absorbed by an already pending rebuild.
    pub coalesced: u64,
    /// Pending rebuilds handed out to a frame.
    pub runs: u64,
}

/// Single-flag debounce.
#[derive(Debug, Clone, Default)]
pub struct RebuildScheduler {
    pending: bool,
    stats: SchedulerStats,
}

impl RebuildScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a rebuild at the next frame.
    pub fn request(&mut self) -> FrameRequest {
        self.stats.requests += 1;
        if self.pending {
            self.stats.coalesced += 1;
            return FrameRequest::Coalesced;
        }
        self.pending = true;
        FrameRequest::Schedule
    }

    /// Consume the pending flag. Returns `true` if a rebuild should run.
    pub fn take_pending(&mut self) -> bool {
        let pending = std::mem::take(&mut self.pending);
        if pending {
            self.stats.runs += 1;
        }
        pending
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    #[must_use]
    pub const fn stats(&self) -> SchedulerStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scheduler_has_nothing_pending() {
        let mut s = RebuildScheduler::new();
        assert!(!s.is_pending());
        assert!(!s.take_pending());
    }

    #[test]
    fn first_request_schedules() {
        let mut s = RebuildScheduler::new();
        assert_eq!(s.request(), FrameRequest::Schedule);
        assert!(s.is_pending());
    }

    #[test]
    fn burst_coalesces_to_one_run() {
        let mut s = RebuildScheduler::new();
        let scheduled = (0..50)
            .filter(|_| s.request() == FrameRequest::Schedule)
            .count();
        assert_eq!(scheduled, 1);
        assert!(s.take_pending());
        assert!(!s.take_pending());
        assert_eq!(
            s.stats(),
            SchedulerStats {
                requests: 50,
                coalesced: 49,
                runs: 1,
            }
        );
    }

    #[test]
    fn request_after_frame_schedules_again() {
        let mut s = RebuildScheduler::new();
        s.request();
        s.take_pending();
        assert_eq!(s.request(), FrameRequest::Schedule);
    }
}
