use super::{Reading, Sensor};
use crate::body::SatelliteBody;
use crate::config::SensorKind;
use nalgebra::Vector3;
use std::time::Duration;

/// Accelerometer mounted at `position` relative to the body's center of mass.
///
/// On a rotating rigid body the mount point sees a tangential term from the
/// angular acceleration and a centripetal term from the angular rate:
/// `a = α × r + ω × (ω × r)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Accelerometer {
    polling_interval: Duration,
    position: Vector3<f64>,
}

impl Accelerometer {
    pub fn new(polling_interval: Duration, position: Vector3<f64>) -> Self {
        Self {
            polling_interval,
            position,
        }
    }
}

impl Sensor for Accelerometer {
    fn polling_interval(&self) -> Duration {
        self.polling_interval
    }

    fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    fn sample(&self, at: Duration, body: &SatelliteBody) -> Reading {
        let r = &self.position;
        let omega = body.velocity();
        let alpha = body.acceleration();
        let tangential = alpha.cross(r);
        let centripetal = omega.cross(&omega.cross(r));

        Reading {
            kind: SensorKind::Accelerometer,
            time: at,
            value: tangential + centripetal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    fn spinning_body(rate: Vector3<f64>) -> SatelliteBody {
        SatelliteBody::new(Matrix3::identity(), Vector3::zeros(), rate).unwrap()
    }

    #[test]
    fn test_centripetal_points_inward() {
        let body = spinning_body(Vector3::new(0.0, 0.0, 2.0));
        let accel = Accelerometer::new(Duration::from_millis(5), Vector3::new(0.5, 0.0, 0.0));

        let reading = accel.sample(Duration::from_millis(5), &body);
        assert_eq!(reading.kind, SensorKind::Accelerometer);
        // ω² r toward the spin axis
        assert!((reading.value - Vector3::new(-2.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_at_center_of_mass_reads_zero() {
        let body = spinning_body(Vector3::new(1.0, 2.0, 3.0));
        let accel = Accelerometer::new(Duration::from_millis(5), Vector3::zeros());
        assert_eq!(accel.sample(Duration::ZERO, &body).value, Vector3::zeros());
    }

    #[test]
    fn test_tangential_from_angular_acceleration() {
        let mut body = spinning_body(Vector3::zeros());
        // Wheel gains +z momentum over 1 s, body spins up about -z at 1 rad/s².
        body.exchange_momentum(&Vector3::new(0.0, 0.0, 1.0), &Vector3::new(0.0, 0.0, 1.0));

        let accel = Accelerometer::new(Duration::from_millis(5), Vector3::new(1.0, 0.0, 0.0));
        let value = accel.sample(Duration::from_secs(1), &body).value;

        // α × r = (0,0,-1) × (1,0,0) = (0,-1,0); ω × (ω × r) = (-1,0,0)
        assert!((value - Vector3::new(-1.0, -1.0, 0.0)).norm() < 1e-12);
    }
}
