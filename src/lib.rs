//! # ADCS Sensor and Actuator Simulator
//!
//! A deterministic, time-stepped simulation of the sensors and actuators of a
//! satellite attitude determination and control system, for developing and
//! validating control algorithms without flight hardware.
//!
//! ## Features
//!
//! - **Declarative devices**: gyroscopes, accelerometers, and reaction wheels built from a JSON document
//! - **Per-device polling**: every device keeps its own schedule against one global clock
//! - **Fixed or adaptive timestep**: adaptive steps land on device deadlines within `[min, max]`
//! - **Hardware saturation**: actuator rate and acceleration are clamped during integration
//! - **Replayable**: no wall-clock reads, so identical inputs give identical event streams
//!
//! ## Quick Start
//!
//! ```rust
//! use adcs_sim::{ControlDecision, RunOutcome, Scheduler, SimConfig, TickReport, SatelliteBody};
//!
//! let config = SimConfig::from_json_str(r#"{
//!     "Satellite": {
//!         "Moment": [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
//!         "Position": [0, 0, 0],
//!         "Velocity": [0, 0, 0.01]
//!     },
//!     "Sensors": { "gyro": { "type": "Gyroscope", "PollingTime": 10, "Position": [0, 0, 0] } },
//!     "TimeStep": 1,
//!     "Timeout": 100
//! }"#).unwrap();
//!
//! let mut scheduler = Scheduler::new(&config).unwrap();
//! let mut controller = |report: &TickReport, _body: &SatelliteBody| {
//!     if report.events.is_empty() {
//!         ControlDecision::none()
//!     } else {
//!         ControlDecision::none().objective_reached()
//!     }
//! };
//!
//! let summary = scheduler.run(&mut controller).unwrap();
//! assert_eq!(summary.outcome, RunOutcome::Stopped);
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - Validated, immutable device and run configuration
//! - [`factory`] - Maps configuration entries to live devices
//! - [`devices`] - Sensor and actuator models
//! - [`body`] - Satellite rigid-body state and momentum exchange
//! - [`clock`] - Global simulation clock and step selection
//! - [`scheduler`] - Run state machine and per-tick polling
//! - [`controller`] - Seam for the external control loop
//! - [`events`] - Emitted event stream

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod body;
pub mod clock;
pub mod config;
pub mod controller;
pub mod devices;
pub mod error;
pub mod events;
pub mod factory;
pub mod scheduler;

// Re-export main public types for convenience
pub use body::SatelliteBody;
pub use config::{ActuatorSpec, SensorKind, SensorSpec, SimConfig, TimestepMode};
pub use controller::{ControlDecision, Controller};
pub use devices::{Actuator, ActuatorCommand, ActuatorState, Sensor};
pub use error::{ConfigError, SimError};
pub use events::{EventLog, SimEvent};
pub use factory::DeviceFactory;
pub use scheduler::{RunOutcome, RunState, Scheduler, TickReport};
