use crate::devices::{ActuatorState, Reading};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventKind {
    SensorReading(Reading),
    ActuatorUpdate(ActuatorState),
}

/// One device output, stamped with the simulation time it was produced at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimEvent {
    pub sequence: u64,
    pub time: Duration,
    pub device: String,
    pub kind: EventKind,
}

impl SimEvent {
    pub fn reading(&self) -> Option<&Reading> {
        match &self.kind {
            EventKind::SensorReading(reading) => Some(reading),
            EventKind::ActuatorUpdate(_) => None,
        }
    }

    pub fn actuator_state(&self) -> Option<&ActuatorState> {
        match &self.kind {
            EventKind::ActuatorUpdate(state) => Some(state),
            EventKind::SensorReading(_) => None,
        }
    }
}

/// Ordered record of every event emitted during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventLog {
    events: Vec<SimEvent>,
    next_sequence: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp a sequence number on the event and append it.
    pub fn record(&mut self, time: Duration, device: &str, kind: EventKind) -> &SimEvent {
        let event = SimEvent {
            sequence: self.next_sequence,
            time,
            device: device.to_string(),
            kind,
        };
        self.next_sequence += 1;
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Events emitted at or after `sequence`.
    pub fn since(&self, sequence: u64) -> &[SimEvent] {
        let start = self.events.partition_point(|e| e.sequence < sequence);
        &self.events[start..]
    }

    pub fn for_device<'a>(&'a self, device: &'a str) -> impl Iterator<Item = &'a SimEvent> + 'a {
        self.events.iter().filter(move |e| e.device == device)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// One JSON object per line, in emission order.
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }
}
