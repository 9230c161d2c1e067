use crate::config::SatelliteSpec;
use crate::error::ConfigError;
use nalgebra::{Matrix3, Vector3};
use serde::Serialize;

/// Rigid-body state of the satellite shared by every device placement.
///
/// Inertia and position are fixed for a run. The angular rate changes only
/// through [`SatelliteBody::exchange_momentum`], which the scheduler calls
/// once per tick after all actuators for that tick have integrated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatelliteBody {
    moment_of_inertia: Matrix3<f64>,
    #[serde(skip)]
    inverse_inertia: Matrix3<f64>,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    acceleration: Vector3<f64>,
}

impl SatelliteBody {
    pub fn new(
        moment_of_inertia: Matrix3<f64>,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
    ) -> Result<Self, ConfigError> {
        let inverse_inertia = moment_of_inertia
            .try_inverse()
            .ok_or(ConfigError::SingularInertia)?;
        Ok(Self {
            moment_of_inertia,
            inverse_inertia,
            position,
            velocity,
            acceleration: Vector3::zeros(),
        })
    }

    pub fn from_config(spec: &SatelliteSpec) -> Result<Self, ConfigError> {
        Self::new(spec.moment_of_inertia, spec.position, spec.velocity)
    }

    /// Body inertia tensor, kg·m².
    pub fn moment_of_inertia(&self) -> &Matrix3<f64> {
        &self.moment_of_inertia
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    /// Body angular rate.
    pub fn velocity(&self) -> &Vector3<f64> {
        &self.velocity
    }

    /// Angular acceleration from the wheel torques held at the most recent tick.
    pub fn acceleration(&self) -> &Vector3<f64> {
        &self.acceleration
    }

    /// `I · ω`, excluding anything stored in the wheels.
    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.moment_of_inertia * self.velocity
    }

    /// Apply the net change in wheel angular momentum for one tick.
    ///
    /// Total momentum is conserved, so the body picks up the opposite of
    /// whatever the wheels gained: `Δω = −I⁻¹ · Δh`. `wheel_torque` is the
    /// sum of the torques every wheel is holding, polled this tick or not,
    /// and sets the body's angular acceleration to `−I⁻¹ · τ`.
    pub fn exchange_momentum(&mut self, wheel_momentum_delta: &Vector3<f64>, wheel_torque: &Vector3<f64>) {
        self.velocity -= self.inverse_inertia * wheel_momentum_delta;
        self.acceleration = -(self.inverse_inertia * wheel_torque);
    }
}
