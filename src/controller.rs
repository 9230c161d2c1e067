//! Seam between the simulation core and an external control loop.
//!
//! The scheduler hands the controller each tick's report at the tick
//! boundary. Whatever commands come back are queued and consumed at the start
//! of each actuator's next integration, never mid-step.

use crate::body::SatelliteBody;
use crate::devices::ActuatorCommand;
use crate::scheduler::TickReport;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlDecision {
    pub commands: Vec<(String, ActuatorCommand)>,
    pub objective_reached: bool,
}

impl ControlDecision {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn command(mut self, actuator: impl Into<String>, command: ActuatorCommand) -> Self {
        self.commands.push((actuator.into(), command));
        self
    }

    pub fn objective_reached(mut self) -> Self {
        self.objective_reached = true;
        self
    }
}

pub trait Controller {
    fn update(&mut self, report: &TickReport, body: &SatelliteBody) -> ControlDecision;
}

impl<F> Controller for F
where
    F: FnMut(&TickReport, &SatelliteBody) -> ControlDecision,
{
    fn update(&mut self, report: &TickReport, body: &SatelliteBody) -> ControlDecision {
        self(report, body)
    }
}

/// Issues no commands and never declares the objective reached.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passive;

impl Controller for Passive {
    fn update(&mut self, _report: &TickReport, _body: &SatelliteBody) -> ControlDecision {
        ControlDecision::none()
    }
}
