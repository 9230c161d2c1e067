use super::{Actuator, ActuatorCommand, ActuatorState, StateBounds};
use crate::error::SimError;
use nalgebra::Vector3;
use std::time::Duration;
use tracing::debug;

/// Flywheel spinning about a fixed body axis.
///
/// Each integration step clamps the commanded acceleration, integrates and
/// clamps the wheel rate, and then integrates the wheel angle with the
/// realized rate. When the rate saturates, the reported acceleration is the
/// one that actually took the wheel to the limit, never the commanded one.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionWheel {
    polling_interval: Duration,
    position: Vector3<f64>,
    axis: Vector3<f64>,
    moment_of_inertia: f64,
    bounds: StateBounds,
    state: ActuatorState,
    commanded_acceleration: f64,
    saturated: bool,
}

impl ReactionWheel {
    pub fn new(
        polling_interval: Duration,
        position: Vector3<f64>,
        axis: Vector3<f64>,
        moment_of_inertia: f64,
        bounds: StateBounds,
        initial: ActuatorState,
    ) -> Self {
        Self {
            polling_interval,
            position,
            axis,
            moment_of_inertia,
            bounds,
            state: initial,
            commanded_acceleration: initial.acceleration,
            saturated: false,
        }
    }

    pub fn axis(&self) -> &Vector3<f64> {
        &self.axis
    }

    pub fn moment_of_inertia(&self) -> f64 {
        self.moment_of_inertia
    }

    /// Acceleration input currently held, before clamping.
    pub fn commanded_acceleration(&self) -> f64 {
        self.commanded_acceleration
    }

    /// Whether the last step hit the rate limit.
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    fn apply_command(&mut self, command: ActuatorCommand) {
        self.commanded_acceleration = match command {
            ActuatorCommand::Acceleration(alpha) => alpha,
            ActuatorCommand::Torque(torque) => torque / self.moment_of_inertia,
        };
    }
}

impl Actuator for ReactionWheel {
    fn polling_interval(&self) -> Duration {
        self.polling_interval
    }

    fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    fn get_state(&self) -> &ActuatorState {
        &self.state
    }

    fn bounds(&self) -> &StateBounds {
        &self.bounds
    }

    fn validate_step(&self, at: Duration) -> Result<(), SimError> {
        if at < self.state.time {
            return Err(SimError::TimeReversal {
                from: self.state.time,
                to: at,
            });
        }
        if at > self.bounds.time.horizon {
            return Err(SimError::BeyondHorizon {
                at,
                horizon: self.bounds.time.horizon,
            });
        }
        Ok(())
    }

    fn integrate(&mut self, at: Duration, command: Option<ActuatorCommand>) -> Result<ActuatorState, SimError> {
        self.validate_step(at)?;
        let dt = at - self.state.time;

        if let Some(command) = command {
            self.apply_command(command);
        }

        let dt_s = dt.as_secs_f64();
        let previous = self.state;

        let mut acceleration = self.bounds.acceleration.clamp(self.commanded_acceleration);
        let candidate_velocity = previous.velocity + acceleration * dt_s;
        let velocity = self.bounds.velocity.clamp(candidate_velocity);

        self.saturated = !self.bounds.velocity.contains(candidate_velocity);
        if self.saturated && dt_s > 0.0 {
            acceleration = self
                .bounds
                .acceleration
                .clamp((velocity - previous.velocity) / dt_s);
            debug!(
                commanded = self.commanded_acceleration,
                realized = acceleration,
                velocity,
                "reaction wheel saturated"
            );
        }

        let position = self.bounds.position.clamp(previous.position + velocity * dt_s);

        self.state = ActuatorState {
            position,
            velocity,
            acceleration,
            time: at,
        };

        debug_assert!(
            self.bounds.contains(&self.state),
            "Reaction wheel state {:?} escaped its bounds {:?}",
            self.state,
            self.bounds
        );

        Ok(self.state)
    }

    fn angular_momentum(&self) -> Vector3<f64> {
        self.axis * (self.moment_of_inertia * self.state.velocity)
    }

    // Realized acceleration is held between polls.
    fn torque(&self) -> Vector3<f64> {
        self.axis * (self.moment_of_inertia * self.state.acceleration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Bounds;
    use crate::devices::TimeBounds;

    fn wheel(max_vel: f64, max_accel: f64) -> ReactionWheel {
        ReactionWheel::new(
            Duration::from_millis(1),
            Vector3::zeros(),
            Vector3::new(0.0, 0.0, 1.0),
            0.5,
            StateBounds {
                acceleration: Bounds::new(-max_accel, max_accel),
                velocity: Bounds::new(-max_vel, max_vel),
                position: Bounds::unbounded(),
                time: TimeBounds {
                    start: Duration::ZERO,
                    horizon: Duration::from_secs(10),
                },
            },
            ActuatorState::at_rest(Duration::ZERO),
        )
    }

    #[test]
    fn test_unsaturated_step() {
        let mut wheel = wheel(1000.0, 100.0);
        let state = wheel
            .integrate(Duration::from_millis(500), Some(ActuatorCommand::Acceleration(10.0)))
            .unwrap();

        assert_eq!(state.acceleration, 10.0);
        assert_eq!(state.velocity, 5.0);
        assert_eq!(state.position, 2.5);
        assert_eq!(state.time, Duration::from_millis(500));
        assert!(!wheel.is_saturated());
    }

    #[test]
    fn test_acceleration_clamped() {
        let mut wheel = wheel(1000.0, 100.0);
        let state = wheel
            .integrate(Duration::from_secs(1), Some(ActuatorCommand::Acceleration(5000.0)))
            .unwrap();
        assert_eq!(state.acceleration, 100.0);
        assert_eq!(state.velocity, 100.0);
    }

    #[test]
    fn test_velocity_clamp_reduces_realized_acceleration() {
        let mut wheel = wheel(50.0, 100.0);
        let state = wheel
            .integrate(Duration::from_secs(1), Some(ActuatorCommand::Acceleration(100.0)))
            .unwrap();

        assert_eq!(state.velocity, 50.0);
        assert_eq!(state.acceleration, 50.0);
        assert!(wheel.is_saturated());

        // Holding at the limit realizes no further acceleration.
        let state = wheel.integrate(Duration::from_secs(2), None).unwrap();
        assert_eq!(state.velocity, 50.0);
        assert_eq!(state.acceleration, 0.0);
        assert_eq!(state.position, 100.0);
    }

    #[test]
    fn test_command_is_held() {
        let mut wheel = wheel(1000.0, 100.0);
        wheel
            .integrate(Duration::from_secs(1), Some(ActuatorCommand::Acceleration(-4.0)))
            .unwrap();
        let state = wheel.integrate(Duration::from_secs(2), None).unwrap();
        assert_eq!(state.velocity, -8.0);
        assert_eq!(wheel.commanded_acceleration(), -4.0);
    }

    #[test]
    fn test_torque_divided_by_inertia() {
        let mut wheel = wheel(1000.0, 100.0);
        let state = wheel
            .integrate(Duration::from_secs(1), Some(ActuatorCommand::Torque(2.0)))
            .unwrap();
        assert_eq!(state.acceleration, 4.0);
    }

    #[test]
    fn test_time_reversal_rejected() {
        let mut wheel = wheel(1000.0, 100.0);
        wheel.integrate(Duration::from_millis(20), None).unwrap();
        let result = wheel.integrate(Duration::from_millis(10), None);
        assert!(matches!(result, Err(SimError::TimeReversal { .. })));
        assert_eq!(wheel.get_state().time, Duration::from_millis(20));
    }

    #[test]
    fn test_integration_past_horizon_rejected() {
        let mut wheel = wheel(1000.0, 100.0);
        let result = wheel.integrate(Duration::from_secs(11), None);
        assert!(matches!(result, Err(SimError::BeyondHorizon { .. })));
    }

    #[test]
    fn test_angular_momentum_along_axis() {
        let mut wheel = wheel(1000.0, 100.0);
        wheel
            .integrate(Duration::from_secs(1), Some(ActuatorCommand::Acceleration(8.0)))
            .unwrap();
        assert_eq!(wheel.angular_momentum(), Vector3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_torque_follows_realized_acceleration() {
        let mut wheel = wheel(50.0, 100.0);
        wheel
            .integrate(Duration::from_millis(100), Some(ActuatorCommand::Acceleration(20.0)))
            .unwrap();
        assert_eq!(wheel.torque(), Vector3::new(0.0, 0.0, 10.0));

        // Pinned at the rate limit, the rotor stops taking torque.
        wheel.integrate(Duration::from_secs(5), None).unwrap();
        assert!(wheel.is_saturated());
        wheel.integrate(Duration::from_secs(6), None).unwrap();
        assert_eq!(wheel.torque(), Vector3::zeros());
    }

    #[test]
    fn test_validate_step_leaves_state_untouched() {
        let wheel = wheel(1000.0, 100.0);
        assert!(wheel.validate_step(Duration::from_secs(10)).is_ok());
        assert!(matches!(
            wheel.validate_step(Duration::from_secs(11)),
            Err(SimError::BeyondHorizon { .. })
        ));
        assert_eq!(wheel.get_state().time, Duration::ZERO);
    }
}
