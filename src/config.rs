//! Immutable simulation configuration.
//!
//! A [`SimConfig`] is built once from a JSON document and then handed by
//! reference to the device factory and the scheduler. Nothing in it changes
//! for the lifetime of a run.
//!
//! The document has a `Satellite` section, named `Actuators` and `Sensors`
//! maps whose entries carry a `type` tag, and top-level timestep scalars:
//!
//! ```json
//! {
//!   "Satellite": { "Moment": [[10,0,0],[0,10,0],[0,0,10]], "Position": [0,0,0], "Velocity": [0,0,0] },
//!   "Sensors": { "gyro": { "type": "Gyroscope", "PollingTime": 10, "Position": [0,0,0] } },
//!   "Actuators": {},
//!   "VariableTimestep": false,
//!   "TimeStep": 1,
//!   "Timeout": 1000
//! }
//! ```

use crate::error::ConfigError;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const NANOS_PER_MILLI: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorKind {
    Gyroscope,
    Accelerometer,
}

/// Closed numeric range used for actuator saturation limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range that never clamps.
    pub fn unbounded() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSpec {
    pub kind: SensorKind,
    pub polling_interval: Duration,
    pub position: Vector3<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactionWheelSpec {
    pub polling_interval: Duration,
    pub position: Vector3<f64>,
    /// Unit vector, normalized at load.
    pub axis: Vector3<f64>,
    pub moment_of_inertia: f64,
    pub velocity_bounds: Bounds,
    pub acceleration_bounds: Bounds,
    pub initial_velocity: f64,
    pub initial_acceleration: f64,
}

/// One variant per actuator kind the factory knows how to build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ActuatorSpec {
    ReactionWheel(ReactionWheelSpec),
}

impl ActuatorSpec {
    pub fn polling_interval(&self) -> Duration {
        match self {
            ActuatorSpec::ReactionWheel(spec) => spec.polling_interval,
        }
    }

    pub fn position(&self) -> &Vector3<f64> {
        match self {
            ActuatorSpec::ReactionWheel(spec) => &spec.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatelliteSpec {
    pub moment_of_inertia: Matrix3<f64>,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimestepMode {
    Fixed { step: Duration },
    Adaptive { min: Duration, max: Duration },
}

impl TimestepMode {
    pub fn is_variable(&self) -> bool {
        matches!(self, TimestepMode::Adaptive { .. })
    }
}

/// Targets for the external control loop. Carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerTargets {
    pub desired_position: Vector3<f64>,
    /// Degrees per second.
    pub allowed_jitter: f64,
    /// Degrees.
    pub required_accuracy: f64,
    pub hold_time: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimConfig {
    sensors: BTreeMap<String, SensorSpec>,
    actuators: BTreeMap<String, ActuatorSpec>,
    satellite: SatelliteSpec,
    timestep: TimestepMode,
    timeout: Duration,
    controller: Option<ControllerTargets>,
}

assert_impl_all!(SimConfig: Send, Sync, Clone);

impl SimConfig {
    /// Read and validate a configuration document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read_document(path.as_ref())?)
    }

    /// Parse and validate a configuration document held in memory.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawDocument = serde_json::from_str(text)?;
        raw.validate()
    }

    /// Validate an already-parsed document, e.g. one built with `serde_json::json!`.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let raw: RawDocument = serde_json::from_value(value)?;
        raw.validate()
    }

    /// Replace the controller targets with those in a separate exit criteria document.
    pub fn load_exit_criteria(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = read_document(path.as_ref())?;
        self.with_exit_criteria_json(&text)
    }

    /// Same as [`SimConfig::load_exit_criteria`], from text.
    pub fn with_exit_criteria_json(mut self, text: &str) -> Result<Self, ConfigError> {
        let raw: RawControllerTargets = serde_json::from_str(text)?;
        self.controller = Some(raw.validate()?);
        Ok(self)
    }

    /// Look up a sensor by name. `None` means it is not configured.
    pub fn sensor_spec(&self, name: &str) -> Option<&SensorSpec> {
        self.sensors.get(name)
    }

    /// Look up an actuator by name. `None` means it is not configured.
    pub fn actuator_spec(&self, name: &str) -> Option<&ActuatorSpec> {
        self.actuators.get(name)
    }

    /// All sensors, ordered by name.
    pub fn sensor_specs(&self) -> &BTreeMap<String, SensorSpec> {
        &self.sensors
    }

    /// All actuators, ordered by name.
    pub fn actuator_specs(&self) -> &BTreeMap<String, ActuatorSpec> {
        &self.actuators
    }

    pub fn satellite(&self) -> &SatelliteSpec {
        &self.satellite
    }

    /// Body inertia tensor.
    pub fn satellite_moment(&self) -> &Matrix3<f64> {
        &self.satellite.moment_of_inertia
    }

    pub fn satellite_position(&self) -> &Vector3<f64> {
        &self.satellite.position
    }

    /// Initial body angular rate.
    pub fn satellite_velocity(&self) -> &Vector3<f64> {
        &self.satellite.velocity
    }

    /// Step mode with its step size or step bounds.
    pub fn timestep(&self) -> TimestepMode {
        self.timestep
    }

    pub fn uses_variable_timestep(&self) -> bool {
        self.timestep.is_variable()
    }

    /// Length of the run window.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Targets passed through to the control loop. The simulator itself ignores them.
    pub fn controller_targets(&self) -> Option<&ControllerTargets> {
        self.controller.as_ref()
    }
}

fn read_document(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn millis(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidMilliseconds { field, value });
    }
    Ok(Duration::from_nanos((value * NANOS_PER_MILLI).round() as u64))
}

fn positive_millis(device: &str, value: f64) -> Result<Duration, ConfigError> {
    let interval = millis("PollingTime", value)?;
    if interval.is_zero() {
        return Err(ConfigError::InvalidPollingInterval {
            device: device.to_string(),
        });
    }
    Ok(interval)
}

fn ordered_bounds(device: &str, field: &'static str, min: f64, max: f64) -> Result<Bounds, ConfigError> {
    if min > max || min.is_nan() || max.is_nan() {
        return Err(ConfigError::InvertedBounds {
            device: device.to_string(),
            field,
            min,
            max,
        });
    }
    Ok(Bounds::new(min, max))
}

fn initial_within(device: &str, field: &'static str, value: f64, bounds: Bounds) -> Result<(), ConfigError> {
    if bounds.contains(value) {
        Ok(())
    } else {
        Err(ConfigError::InitialValueOutOfBounds {
            device: device.to_string(),
            field,
            value,
            min: bounds.min,
            max: bounds.max,
        })
    }
}

// Wire shapes of the configuration document. Field names follow the document keys.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawDocument {
    satellite: RawSatellite,
    #[serde(default)]
    actuators: BTreeMap<String, RawActuator>,
    #[serde(default)]
    sensors: BTreeMap<String, RawSensor>,
    #[serde(default)]
    variable_timestep: bool,
    time_step: Option<f64>,
    time_step_max: Option<f64>,
    time_step_min: Option<f64>,
    timeout: f64,
    controller: Option<RawControllerTargets>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSatellite {
    moment: [[f64; 3]; 3],
    position: [f64; 3],
    velocity: [f64; 3],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawSensor {
    Gyroscope(RawSensorFields),
    Accelerometer(RawSensorFields),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSensorFields {
    polling_time: f64,
    position: [f64; 3],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawActuator {
    ReactionWheel(RawReactionWheel),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawReactionWheel {
    moment: f64,
    max_ang_vel: f64,
    max_ang_accel: f64,
    min_ang_vel: f64,
    min_ang_accel: f64,
    polling_time: f64,
    position: [f64; 3],
    axis_of_rotation: [f64; 3],
    #[serde(default)]
    velocity: f64,
    #[serde(default)]
    acceleration: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawControllerTargets {
    desired_position: [f64; 3],
    allowed_jitter: f64,
    required_accuracy: f64,
    hold_time: f64,
}

impl RawDocument {
    fn validate(self) -> Result<SimConfig, ConfigError> {
        let satellite = self.satellite.validate()?;

        let sensors = self
            .sensors
            .into_iter()
            .map(|(name, raw)| {
                let spec = raw.validate(&name)?;
                Ok((name, spec))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        let actuators = self
            .actuators
            .into_iter()
            .map(|(name, raw)| {
                let spec = raw.validate(&name)?;
                Ok((name, spec))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        let timestep = if self.variable_timestep {
            let min = self
                .time_step_min
                .ok_or(ConfigError::InvalidTimestep("TimeStepMin is required when VariableTimestep is set"))?;
            let max = self
                .time_step_max
                .ok_or(ConfigError::InvalidTimestep("TimeStepMax is required when VariableTimestep is set"))?;
            let min = millis("TimeStepMin", min)?;
            let max = millis("TimeStepMax", max)?;
            if min.is_zero() {
                return Err(ConfigError::InvalidTimestep("TimeStepMin must be greater than zero"));
            }
            if min > max {
                return Err(ConfigError::InvalidTimestep("TimeStepMin exceeds TimeStepMax"));
            }
            TimestepMode::Adaptive { min, max }
        } else {
            let step = self
                .time_step
                .ok_or(ConfigError::InvalidTimestep("TimeStep is required for a fixed timestep"))?;
            let step = millis("TimeStep", step)?;
            if step.is_zero() {
                return Err(ConfigError::InvalidTimestep("TimeStep must be greater than zero"));
            }
            TimestepMode::Fixed { step }
        };

        let timeout = millis("Timeout", self.timeout)?;
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }

        let controller = self.controller.map(RawControllerTargets::validate).transpose()?;

        Ok(SimConfig {
            sensors,
            actuators,
            satellite,
            timestep,
            timeout,
            controller,
        })
    }
}

impl RawSatellite {
    fn validate(self) -> Result<SatelliteSpec, ConfigError> {
        let rows = self.moment;
        let moment_of_inertia = Matrix3::from_fn(|r, c| rows[r][c]);
        if moment_of_inertia.try_inverse().is_none() {
            return Err(ConfigError::SingularInertia);
        }
        Ok(SatelliteSpec {
            moment_of_inertia,
            position: Vector3::from(self.position),
            velocity: Vector3::from(self.velocity),
        })
    }
}

impl RawSensor {
    fn validate(self, name: &str) -> Result<SensorSpec, ConfigError> {
        let (kind, fields) = match self {
            RawSensor::Gyroscope(fields) => (SensorKind::Gyroscope, fields),
            RawSensor::Accelerometer(fields) => (SensorKind::Accelerometer, fields),
        };
        Ok(SensorSpec {
            kind,
            polling_interval: positive_millis(name, fields.polling_time)?,
            position: Vector3::from(fields.position),
        })
    }
}

impl RawActuator {
    fn validate(self, name: &str) -> Result<ActuatorSpec, ConfigError> {
        match self {
            RawActuator::ReactionWheel(raw) => raw.validate(name).map(ActuatorSpec::ReactionWheel),
        }
    }
}

impl RawReactionWheel {
    fn validate(self, name: &str) -> Result<ReactionWheelSpec, ConfigError> {
        if self.moment.is_nan() || self.moment <= 0.0 {
            return Err(ConfigError::NonPositiveInertia {
                device: name.to_string(),
                value: self.moment,
            });
        }

        let axis = Vector3::from(self.axis_of_rotation);
        let axis = axis.try_normalize(f64::EPSILON).ok_or_else(|| ConfigError::ZeroAxis {
            device: name.to_string(),
        })?;

        let velocity_bounds = ordered_bounds(name, "velocity", self.min_ang_vel, self.max_ang_vel)?;
        let acceleration_bounds = ordered_bounds(name, "acceleration", self.min_ang_accel, self.max_ang_accel)?;
        if !acceleration_bounds.contains(0.0) {
            return Err(ConfigError::AccelerationBoundsExcludeZero {
                device: name.to_string(),
                min: acceleration_bounds.min,
                max: acceleration_bounds.max,
            });
        }
        initial_within(name, "velocity", self.velocity, velocity_bounds)?;
        initial_within(name, "acceleration", self.acceleration, acceleration_bounds)?;

        Ok(ReactionWheelSpec {
            polling_interval: positive_millis(name, self.polling_time)?,
            position: Vector3::from(self.position),
            axis,
            moment_of_inertia: self.moment,
            velocity_bounds,
            acceleration_bounds,
            initial_velocity: self.velocity,
            initial_acceleration: self.acceleration,
        })
    }
}

impl RawControllerTargets {
    fn validate(self) -> Result<ControllerTargets, ConfigError> {
        Ok(ControllerTargets {
            desired_position: Vector3::from(self.desired_position),
            allowed_jitter: self.allowed_jitter,
            required_accuracy: self.required_accuracy,
            hold_time: millis("HoldTime", self.hold_time)?,
        })
    }
}
