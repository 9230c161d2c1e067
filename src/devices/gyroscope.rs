use super::{Reading, Sensor};
use crate::body::SatelliteBody;
use crate::config::SensorKind;
use nalgebra::Vector3;
use std::time::Duration;

/// Rate gyroscope. Reports the body angular rate, which is the same at every
/// point of a rigid body, so placement does not affect the reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Gyroscope {
    polling_interval: Duration,
    position: Vector3<f64>,
}

impl Gyroscope {
    pub fn new(polling_interval: Duration, position: Vector3<f64>) -> Self {
        Self {
            polling_interval,
            position,
        }
    }
}

impl Sensor for Gyroscope {
    fn polling_interval(&self) -> Duration {
        self.polling_interval
    }

    fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    fn sample(&self, at: Duration, body: &SatelliteBody) -> Reading {
        Reading {
            kind: SensorKind::Gyroscope,
            time: at,
            value: *body.velocity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    #[test]
    fn test_reads_body_rate() {
        let body = SatelliteBody::new(
            Matrix3::identity(),
            Vector3::zeros(),
            Vector3::new(0.1, -0.2, 0.3),
        )
        .unwrap();
        let gyro = Gyroscope::new(Duration::from_millis(10), Vector3::new(1.0, 0.0, 0.0));

        let reading = gyro.sample(Duration::from_millis(20), &body);
        assert_eq!(reading.kind, SensorKind::Gyroscope);
        assert_eq!(reading.time, Duration::from_millis(20));
        assert_eq!(reading.value, Vector3::new(0.1, -0.2, 0.3));
    }
}
