use std::time::Duration;
use thiserror::Error;

/// Failures raised while loading or validating a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Device {device}: polling interval must be greater than zero")]
    InvalidPollingInterval { device: String },

    #[error("Device {device}: {field} bounds are inverted (min {min} > max {max})")]
    InvertedBounds {
        device: String,
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Device {device}: acceleration bounds [{min}, {max}] must contain zero")]
    AccelerationBoundsExcludeZero { device: String, min: f64, max: f64 },

    #[error("Device {device}: initial {field} {value} is outside [{min}, {max}]")]
    InitialValueOutOfBounds {
        device: String,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Device {device}: moment of inertia must be positive, got {value}")]
    NonPositiveInertia { device: String, value: f64 },

    #[error("Device {device}: axis of rotation must be non-zero")]
    ZeroAxis { device: String },

    #[error("Satellite moment of inertia matrix is singular")]
    SingularInertia,

    #[error("Invalid timestep configuration: {0}")]
    InvalidTimestep(&'static str),

    #[error("Timeout must be greater than zero")]
    InvalidTimeout,

    #[error("{field} must be a finite, non-negative number of milliseconds, got {value}")]
    InvalidMilliseconds { field: &'static str, value: f64 },
}

/// Failures raised while a simulation run is in progress.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Time moved backward: state at {from:?}, asked to integrate to {to:?}")]
    TimeReversal { from: Duration, to: Duration },

    #[error("Integration to {at:?} is past the device horizon of {horizon:?}")]
    BeyondHorizon { at: Duration, horizon: Duration },

    #[error("Actuator {device} is only valid until {horizon:?}, before the run deadline of {deadline:?}")]
    HorizonBeforeDeadline {
        device: String,
        horizon: Duration,
        deadline: Duration,
    },

    #[error("Simulation has not been started")]
    NotStarted,

    #[error("No actuator named {0} is part of this run")]
    UnknownActuator(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
