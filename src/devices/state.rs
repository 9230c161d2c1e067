use crate::config::Bounds;
use serde::Serialize;
use std::time::Duration;

/// Physical state of a single actuator at `time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActuatorState {
    /// Accumulated angle. Not wrapped.
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub time: Duration,
}

impl ActuatorState {
    pub fn at_rest(time: Duration) -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            acceleration: 0.0,
            time,
        }
    }
}

/// Valid simulation window of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeBounds {
    pub start: Duration,
    pub horizon: Duration,
}

impl TimeBounds {
    pub fn contains(&self, time: Duration) -> bool {
        time >= self.start && time <= self.horizon
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateBounds {
    pub acceleration: Bounds,
    pub velocity: Bounds,
    pub position: Bounds,
    pub time: TimeBounds,
}

impl StateBounds {
    pub fn contains(&self, state: &ActuatorState) -> bool {
        self.acceleration.contains(state.acceleration)
            && self.velocity.contains(state.velocity)
            && self.position.contains(state.position)
            && self.time.contains(state.time)
    }
}
