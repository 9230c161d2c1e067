use crate::config::{ActuatorSpec, Bounds, ReactionWheelSpec, SensorKind, SensorSpec, SimConfig};
use crate::devices::{
    Accelerometer, ActuatorDevice, ActuatorState, Gyroscope, ReactionWheel, SensorDevice, StateBounds, TimeBounds,
};
use std::time::Duration;

/// Builds live devices from the specs registered in a [`SimConfig`].
///
/// A name with no registered spec yields `None`. Supporting a new device kind
/// means one new spec variant and one new match arm here.
#[derive(Debug, Clone, Copy)]
pub struct DeviceFactory<'a> {
    config: &'a SimConfig,
}

impl<'a> DeviceFactory<'a> {
    pub fn new(config: &'a SimConfig) -> Self {
        Self { config }
    }

    pub fn create_sensor(&self, name: &str) -> Option<SensorDevice> {
        self.config.sensor_spec(name).map(build_sensor)
    }

    pub fn create_actuator(&self, name: &str) -> Option<ActuatorDevice> {
        let horizon = self.config.timeout();
        self.config
            .actuator_spec(name)
            .map(|spec| build_actuator(spec, horizon))
    }

    /// Every configured sensor, in name order.
    pub fn create_all_sensors(&self) -> Vec<(String, SensorDevice)> {
        self.config
            .sensor_specs()
            .iter()
            .map(|(name, spec)| (name.clone(), build_sensor(spec)))
            .collect()
    }

    /// Every configured actuator, in name order.
    pub fn create_all_actuators(&self) -> Vec<(String, ActuatorDevice)> {
        let horizon = self.config.timeout();
        self.config
            .actuator_specs()
            .iter()
            .map(|(name, spec)| (name.clone(), build_actuator(spec, horizon)))
            .collect()
    }
}

fn build_sensor(spec: &SensorSpec) -> SensorDevice {
    match spec.kind {
        SensorKind::Gyroscope => SensorDevice::Gyroscope(Gyroscope::new(spec.polling_interval, spec.position)),
        SensorKind::Accelerometer => {
            SensorDevice::Accelerometer(Accelerometer::new(spec.polling_interval, spec.position))
        }
    }
}

fn build_actuator(spec: &ActuatorSpec, horizon: Duration) -> ActuatorDevice {
    match spec {
        ActuatorSpec::ReactionWheel(wheel) => ActuatorDevice::ReactionWheel(build_reaction_wheel(wheel, horizon)),
    }
}

fn build_reaction_wheel(spec: &ReactionWheelSpec, horizon: Duration) -> ReactionWheel {
    let bounds = StateBounds {
        acceleration: spec.acceleration_bounds,
        velocity: spec.velocity_bounds,
        // Wheel angle is an unbounded accumulator.
        position: Bounds::unbounded(),
        time: TimeBounds {
            start: Duration::ZERO,
            horizon,
        },
    };
    let initial = ActuatorState {
        position: 0.0,
        velocity: spec.initial_velocity,
        acceleration: spec.initial_acceleration,
        time: Duration::ZERO,
    };

    ReactionWheel::new(
        spec.polling_interval,
        spec.position,
        spec.axis,
        spec.moment_of_inertia,
        bounds,
        initial,
    )
}
