use crate::config::TimestepMode;
use serde::Serialize;
use std::time::Duration;

/// Global simulation clock. Owned by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Clock {
    current: Duration,
    run_start: Duration,
    mode: TimestepMode,
    timeout: Duration,
}

impl Clock {
    pub fn new(mode: TimestepMode, timeout: Duration) -> Self {
        Self {
            current: Duration::ZERO,
            run_start: Duration::ZERO,
            mode,
            timeout,
        }
    }

    /// Get current simulation time
    pub fn current_time(&self) -> Duration {
        self.current
    }

    pub fn mode(&self) -> TimestepMode {
        self.mode
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Largest step the clock will take. The fixed step in fixed mode.
    pub fn step_max(&self) -> Duration {
        match self.mode {
            TimestepMode::Fixed { step } => step,
            TimestepMode::Adaptive { max, .. } => max,
        }
    }

    /// Only meaningful in adaptive mode.
    pub fn step_min(&self) -> Option<Duration> {
        match self.mode {
            TimestepMode::Fixed { .. } => None,
            TimestepMode::Adaptive { min, .. } => Some(min),
        }
    }

    /// Time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.current.saturating_sub(self.run_start)
    }

    /// Absolute time at which the run times out.
    pub fn deadline(&self) -> Duration {
        self.run_start + self.timeout
    }

    /// Whether the run window has been used up.
    pub fn timed_out(&self) -> bool {
        self.elapsed() >= self.timeout
    }

    /// Step size for the next tick given the nearest pending device deadline.
    ///
    /// Fixed mode always returns the configured step. Adaptive mode lands on
    /// the deadline when it falls within `[min, max]`, takes `max` when it is
    /// further out, and snaps to it directly when it is closer than `min`.
    ///
    /// In fixed mode a device is polled on the first tick at or after its
    /// deadline, so its effective polling period is its interval rounded up
    /// to a multiple of the step. A 3 ms device on a 2 ms step is polled every
    /// 4 ms. Use adaptive mode when device periods must be exact.
    pub fn next_step(&self, nearest_deadline: Option<Duration>) -> Duration {
        match self.mode {
            TimestepMode::Fixed { step } => step,
            TimestepMode::Adaptive { max, .. } => match nearest_deadline {
                Some(deadline) => {
                    let gap = deadline.saturating_sub(self.current);
                    if gap.is_zero() {
                        max
                    } else {
                        gap.min(max)
                    }
                }
                None => max,
            },
        }
    }

    /// Time the next tick lands on. Never past the run deadline.
    pub fn next_event_time(&self, nearest_deadline: Option<Duration>) -> Duration {
        (self.current + self.next_step(nearest_deadline)).min(self.deadline())
    }

    /// Move the clock forward. Never moves it back.
    pub fn advance_to(&mut self, time: Duration) {
        debug_assert!(
            time >= self.current,
            "Clock asked to move backward from {:?} to {:?}",
            self.current,
            time
        );
        self.current = self.current.max(time);
    }
}
