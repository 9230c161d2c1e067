pub mod accelerometer;
pub mod gyroscope;
pub mod reaction_wheel;
pub mod state;

pub use accelerometer::Accelerometer;
pub use gyroscope::Gyroscope;
pub use reaction_wheel::ReactionWheel;
pub use state::{ActuatorState, StateBounds, TimeBounds};

use crate::body::SatelliteBody;
use crate::config::SensorKind;
use crate::error::SimError;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub kind: SensorKind,
    pub time: Duration,
    pub value: Vector3<f64>,
}

/// Control input for an actuator. Held until the next command replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActuatorCommand {
    /// Angular acceleration, rad/s².
    Acceleration(f64),
    /// Motor torque, N·m.
    Torque(f64),
}

/// A device that observes the body and produces a reading. Holds no physical state.
pub trait Sensor {
    fn polling_interval(&self) -> Duration;
    fn position(&self) -> &Vector3<f64>;
    fn sample(&self, at: Duration, body: &SatelliteBody) -> Reading;
}

/// A device with physical state that is advanced in time under saturation limits.
pub trait Actuator {
    fn polling_interval(&self) -> Duration;
    fn position(&self) -> &Vector3<f64>;
    fn get_state(&self) -> &ActuatorState;
    fn bounds(&self) -> &StateBounds;

    /// Whether `integrate(at, ..)` would be accepted. Leaves the actuator untouched.
    fn validate_step(&self, at: Duration) -> Result<(), SimError>;

    /// Advance the actuator to `at`, applying `command` first if one is given.
    fn integrate(&mut self, at: Duration, command: Option<ActuatorCommand>) -> Result<ActuatorState, SimError>;

    /// Stored angular momentum in the body frame.
    fn angular_momentum(&self) -> Vector3<f64>;

    /// Torque the actuator is currently applying to its own rotor, in the body frame.
    /// The body feels the opposite.
    fn torque(&self) -> Vector3<f64>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SensorDevice {
    Gyroscope(Gyroscope),
    Accelerometer(Accelerometer),
}

impl SensorDevice {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorDevice::Gyroscope(_) => SensorKind::Gyroscope,
            SensorDevice::Accelerometer(_) => SensorKind::Accelerometer,
        }
    }
}

impl Sensor for SensorDevice {
    fn polling_interval(&self) -> Duration {
        match self {
            SensorDevice::Gyroscope(s) => s.polling_interval(),
            SensorDevice::Accelerometer(s) => s.polling_interval(),
        }
    }

    fn position(&self) -> &Vector3<f64> {
        match self {
            SensorDevice::Gyroscope(s) => s.position(),
            SensorDevice::Accelerometer(s) => s.position(),
        }
    }

    fn sample(&self, at: Duration, body: &SatelliteBody) -> Reading {
        match self {
            SensorDevice::Gyroscope(s) => s.sample(at, body),
            SensorDevice::Accelerometer(s) => s.sample(at, body),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorDevice {
    ReactionWheel(ReactionWheel),
}

impl Actuator for ActuatorDevice {
    fn polling_interval(&self) -> Duration {
        match self {
            ActuatorDevice::ReactionWheel(a) => a.polling_interval(),
        }
    }

    fn position(&self) -> &Vector3<f64> {
        match self {
            ActuatorDevice::ReactionWheel(a) => a.position(),
        }
    }

    fn get_state(&self) -> &ActuatorState {
        match self {
            ActuatorDevice::ReactionWheel(a) => a.get_state(),
        }
    }

    fn bounds(&self) -> &StateBounds {
        match self {
            ActuatorDevice::ReactionWheel(a) => a.bounds(),
        }
    }

    fn validate_step(&self, at: Duration) -> Result<(), SimError> {
        match self {
            ActuatorDevice::ReactionWheel(a) => a.validate_step(at),
        }
    }

    fn integrate(&mut self, at: Duration, command: Option<ActuatorCommand>) -> Result<ActuatorState, SimError> {
        match self {
            ActuatorDevice::ReactionWheel(a) => a.integrate(at, command),
        }
    }

    fn angular_momentum(&self) -> Vector3<f64> {
        match self {
            ActuatorDevice::ReactionWheel(a) => a.angular_momentum(),
        }
    }

    fn torque(&self) -> Vector3<f64> {
        match self {
            ActuatorDevice::ReactionWheel(a) => a.torque(),
        }
    }
}
