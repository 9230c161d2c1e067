//! Discrete-event stepper that drives every device off one global clock.
//!
//! Each tick picks the next event time from the clock (and, in adaptive mode,
//! the nearest device deadline), integrates every actuator that is due, folds
//! the wheels' momentum change into the body once, then samples every due
//! sensor against the updated body. Nothing here reads the wall clock, so
//! identical configurations and command sequences replay identically.

use crate::body::SatelliteBody;
use crate::clock::Clock;
use crate::config::SimConfig;
use crate::controller::Controller;
use crate::devices::{Actuator, ActuatorCommand, ActuatorDevice, ActuatorState, Sensor, SensorDevice};
use crate::error::SimError;
use crate::events::{EventKind, EventLog, SimEvent};
use crate::factory::DeviceFactory;
use nalgebra::Vector3;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Running,
    TimedOut,
    Stopped,
}

impl RunState {
    /// `TimedOut` and `Stopped` are terminal.
    pub fn is_finished(self) -> bool {
        matches!(self, RunState::TimedOut | RunState::Stopped)
    }
}

/// How a run ended. Timing out is a normal result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// The controller declared its objective met, or a stop was requested.
    Stopped,
    /// The objective was not reached within the configured window.
    TimedOut,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub sensor_samples: u64,
    pub actuator_updates: u64,
    pub commands_applied: u64,
}

/// Everything that happened in one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub time: Duration,
    pub step: Duration,
    pub state: RunState,
    pub events: Vec<SimEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub end_time: Duration,
    pub stats: SchedulerStats,
}

#[derive(Debug)]
struct SensorSlot {
    name: String,
    device: SensorDevice,
    last_poll: Duration,
}

#[derive(Debug)]
struct ActuatorSlot {
    name: String,
    device: ActuatorDevice,
    last_poll: Duration,
    pending: Option<ActuatorCommand>,
}

fn is_due(now: Duration, last_poll: Duration, interval: Duration) -> bool {
    now.saturating_sub(last_poll) >= interval
}

#[derive(Debug)]
pub struct Scheduler {
    clock: Clock,
    body: SatelliteBody,
    sensors: Vec<SensorSlot>,
    actuators: Vec<ActuatorSlot>,
    state: RunState,
    stop_requested: bool,
    log: EventLog,
    stats: SchedulerStats,
}

impl Scheduler {
    /// A scheduler with every device the configuration names.
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        let mut scheduler = Self::without_devices(config)?;
        let factory = DeviceFactory::new(config);
        for (name, device) in factory.create_all_actuators() {
            scheduler.add_actuator(name, device)?;
        }
        for (name, device) in factory.create_all_sensors() {
            scheduler.add_sensor(name, device);
        }
        Ok(scheduler)
    }

    /// A scheduler with the body and clock from `config` but no devices.
    pub fn without_devices(config: &SimConfig) -> Result<Self, SimError> {
        Ok(Self {
            clock: Clock::new(config.timestep(), config.timeout()),
            body: SatelliteBody::from_config(config.satellite())?,
            sensors: Vec::new(),
            actuators: Vec::new(),
            state: RunState::Idle,
            stop_requested: false,
            log: EventLog::new(),
            stats: SchedulerStats::default(),
        })
    }

    /// Register a sensor. Its first sample falls one polling interval from now.
    pub fn add_sensor(&mut self, name: impl Into<String>, device: SensorDevice) {
        self.sensors.push(SensorSlot {
            name: name.into(),
            device,
            last_poll: self.clock.current_time(),
        });
    }

    /// Register an actuator. It must stay valid until the run deadline, so a
    /// device whose time horizon ends earlier is rejected.
    pub fn add_actuator(&mut self, name: impl Into<String>, device: ActuatorDevice) -> Result<(), SimError> {
        let name = name.into();
        let horizon = device.bounds().time.horizon;
        let deadline = self.clock.deadline();
        if horizon < deadline {
            warn!(actuator = %name, ?horizon, ?deadline, "actuator rejected, horizon ends before the run");
            return Err(SimError::HorizonBeforeDeadline {
                device: name,
                horizon,
                deadline,
            });
        }

        let last_poll = device.get_state().time.max(self.clock.current_time());
        self.actuators.push(ActuatorSlot {
            name,
            device,
            last_poll,
            pending: None,
        });
        Ok(())
    }

    /// Move from `Idle` to `Running`. Ignored once a run has begun.
    pub fn start(&mut self) {
        match self.state {
            RunState::Idle => {
                self.state = RunState::Running;
                info!(
                    sensors = self.sensors.len(),
                    actuators = self.actuators.len(),
                    timeout = ?self.clock.timeout(),
                    mode = ?self.clock.mode(),
                    "simulation started"
                );
            }
            other => warn!(state = ?other, "start ignored, run already began"),
        }
    }

    /// Takes effect at the next tick boundary.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// Queue a command for the named actuator's next integration. A newer
    /// command replaces one that has not been consumed yet.
    pub fn command(&mut self, actuator: &str, command: ActuatorCommand) -> Result<(), SimError> {
        match self.actuators.iter_mut().find(|slot| slot.name == actuator) {
            Some(slot) => {
                slot.pending = Some(command);
                Ok(())
            }
            None => {
                warn!(actuator, "command rejected, no such actuator in this run");
                Err(SimError::UnknownActuator(actuator.to_string()))
            }
        }
    }

    /// Earliest time any device is next due.
    fn nearest_deadline(&self) -> Option<Duration> {
        let sensors = self
            .sensors
            .iter()
            .map(|slot| slot.last_poll + slot.device.polling_interval());
        let actuators = self
            .actuators
            .iter()
            .map(|slot| slot.last_poll + slot.device.polling_interval());
        sensors.chain(actuators).min()
    }

    /// Advance to the next event time and poll every device that is due.
    pub fn tick(&mut self) -> Result<TickReport, SimError> {
        match self.state {
            RunState::Idle => return Err(SimError::NotStarted),
            RunState::TimedOut | RunState::Stopped => return Ok(self.empty_report(Duration::ZERO)),
            RunState::Running => {}
        }

        if self.stop_requested {
            self.state = RunState::Stopped;
            info!(time = ?self.clock.current_time(), "simulation stopped");
            return Ok(self.empty_report(Duration::ZERO));
        }

        let previous = self.clock.current_time();
        let next = self.clock.next_event_time(self.nearest_deadline());

        // Nothing moves unless every due actuator can take the step.
        for slot in &self.actuators {
            if is_due(next, slot.last_poll, slot.device.polling_interval()) {
                if let Err(error) = slot.device.validate_step(next) {
                    warn!(actuator = %slot.name, time = ?next, %error, "tick refused");
                    return Err(error);
                }
            }
        }

        self.clock.advance_to(next);
        let now = self.clock.current_time();
        let first_event = self.log.len();

        self.integrate_actuators(now)?;
        self.sample_sensors(now);
        self.stats.ticks += 1;

        if self.clock.timed_out() {
            self.state = RunState::TimedOut;
            info!(time = ?now, "simulation timed out, objective not reached");
        }

        Ok(TickReport {
            time: now,
            step: now - previous,
            state: self.state,
            events: self.log.events()[first_event..].to_vec(),
        })
    }

    /// Integrate every due actuator, then hand the body the summed momentum
    /// change and the torque every actuator is holding, due or not.
    fn integrate_actuators(&mut self, now: Duration) -> Result<(), SimError> {
        let mut momentum_delta = Vector3::zeros();

        for slot in &mut self.actuators {
            if !is_due(now, slot.last_poll, slot.device.polling_interval()) {
                continue;
            }

            let before = slot.device.angular_momentum();
            let command = slot.pending.take();
            if command.is_some() {
                self.stats.commands_applied += 1;
            }

            let state = slot.device.integrate(now, command)?;
            momentum_delta += slot.device.angular_momentum() - before;

            slot.last_poll = now;
            self.stats.actuator_updates += 1;
            debug!(
                actuator = %slot.name,
                time = ?now,
                velocity = state.velocity,
                acceleration = state.acceleration,
                "actuator integrated"
            );
            self.log.record(now, &slot.name, EventKind::ActuatorUpdate(state));
        }

        let torque = self
            .actuators
            .iter()
            .fold(Vector3::zeros(), |sum, slot| sum + slot.device.torque());
        self.body.exchange_momentum(&momentum_delta, &torque);
        Ok(())
    }

    fn sample_sensors(&mut self, now: Duration) {
        for slot in &mut self.sensors {
            if !is_due(now, slot.last_poll, slot.device.polling_interval()) {
                continue;
            }

            let reading = slot.device.sample(now, &self.body);
            slot.last_poll = now;
            self.stats.sensor_samples += 1;
            debug!(sensor = %slot.name, time = ?now, value = ?reading.value, "sensor sampled");
            self.log.record(now, &slot.name, EventKind::SensorReading(reading));
        }
    }

    fn empty_report(&self, step: Duration) -> TickReport {
        TickReport {
            time: self.clock.current_time(),
            step,
            state: self.state,
            events: Vec::new(),
        }
    }

    /// Run to completion, consulting `controller` at every tick boundary.
    pub fn run<C: Controller + ?Sized>(&mut self, controller: &mut C) -> Result<RunSummary, SimError> {
        if self.state == RunState::Idle {
            self.start();
        }

        while !self.state.is_finished() {
            let report = self.tick()?;
            if report.state.is_finished() {
                break;
            }

            let decision = controller.update(&report, &self.body);
            for (actuator, command) in decision.commands {
                self.command(&actuator, command)?;
            }
            if decision.objective_reached {
                info!(time = ?report.time, "controller reports objective reached");
                self.request_stop();
            }
        }

        Ok(self.summary())
    }

    /// Outcome so far. A run that has not finished reports `Stopped`.
    pub fn summary(&self) -> RunSummary {
        let outcome = match self.state {
            RunState::TimedOut => RunOutcome::TimedOut,
            _ => RunOutcome::Stopped,
        };
        RunSummary {
            outcome,
            end_time: self.clock.current_time(),
            stats: self.stats,
        }
    }

    /// Current run state.
    pub fn get_state(&self) -> RunState {
        self.state
    }

    /// Get the simulation clock
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Simulated time since the run started.
    pub fn current_time(&self) -> Duration {
        self.clock.current_time()
    }

    /// Satellite body as of the end of the last tick.
    pub fn body(&self) -> &SatelliteBody {
        &self.body
    }

    /// Every event emitted so far.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Consume the scheduler, keeping only its event log.
    pub fn into_log(self) -> EventLog {
        self.log
    }

    /// Get scheduler statistics
    pub fn get_stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Sensor names in registration order.
    pub fn sensor_names(&self) -> impl Iterator<Item = &str> {
        self.sensors.iter().map(|slot| slot.name.as_str())
    }

    /// Actuator names in registration order.
    pub fn actuator_names(&self) -> impl Iterator<Item = &str> {
        self.actuators.iter().map(|slot| slot.name.as_str())
    }

    /// State of the named actuator, or `None` if it is not part of this run.
    pub fn actuator_state(&self, name: &str) -> Option<&ActuatorState> {
        self.actuators
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.device.get_state())
    }

    /// Look up an actuator by name.
    pub fn actuator(&self, name: &str) -> Option<&ActuatorDevice> {
        self.actuators
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| &slot.device)
    }
}
