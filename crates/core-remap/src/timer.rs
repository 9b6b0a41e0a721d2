//! Cancellable flush deadline.
//!
//! The engine never sleeps. Arming a timer records a deadline; the host loop
//! asks for the earliest deadline, sleeps until it, and polls. A timer armed
//! with no duration (buffering timeout disabled) waits until the next key.

use std::time::{Duration, Instant};

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TimerState {
    #[default]
    Disarmed,
    Armed {
        deadline: Option<Instant>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct FlushTimer {
    state: TimerState,
}

impl FlushTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (replacing any previous deadline). Returns the new deadline.
    pub fn arm(&mut self, now: Instant, after: Option<Duration>) -> Option<Instant> {
        let deadline = after.map(|d| now + d);
        if self.is_armed() {
            trace!(target: "remap.timer", "timer_rearmed");
        }
        self.state = TimerState::Armed { deadline };
        trace!(target: "remap.timer", ?deadline, "timer_armed");
        deadline
    }

    /// Disarm. Returns whether the timer was armed.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.is_armed();
        if was_armed {
            trace!(target: "remap.timer", "timer_cancelled");
        }
        self.state = TimerState::Disarmed;
        was_armed
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, TimerState::Armed { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            TimerState::Armed { deadline } => deadline,
            TimerState::Disarmed => None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|d| d <= now)
    }

    /// Disarm and report `true` when the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.state = TimerState::Disarmed;
        trace!(target: "remap.timer", "timer_fired");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn arm_then_fire_after_deadline() {
        let t0 = Instant::now();
        let mut timer = FlushTimer::new();
        assert_eq!(timer.arm(t0, Some(100 * MS)), Some(t0 + 100 * MS));
        assert!(!timer.fire_if_due(t0 + 99 * MS));
        assert!(timer.is_armed());
        assert!(timer.fire_if_due(t0 + 100 * MS));
        assert!(!timer.is_armed());
        assert!(!timer.fire_if_due(t0 + 200 * MS), "fires once");
    }

    #[test]
    fn rearm_replaces_deadline() {
        let t0 = Instant::now();
        let mut timer = FlushTimer::new();
        timer.arm(t0, Some(100 * MS));
        timer.arm(t0 + 50 * MS, Some(100 * MS));
        assert_eq!(timer.deadline(), Some(t0 + 150 * MS));
        assert!(!timer.fire_if_due(t0 + 120 * MS));
    }

    #[test]
    fn cancel_prevents_firing() {
        let t0 = Instant::now();
        let mut timer = FlushTimer::new();
        timer.arm(t0, Some(10 * MS));
        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert!(!timer.fire_if_due(t0 + 20 * MS));
    }

    #[test]
    fn armed_without_duration_never_fires() {
        let t0 = Instant::now();
        let mut timer = FlushTimer::new();
        assert_eq!(timer.arm(t0, None), None);
        assert!(timer.is_armed());
        assert!(!timer.fire_if_due(t0 + Duration::from_secs(3600)));
    }
}
