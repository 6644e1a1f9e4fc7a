//! Shared mock adapters for integration tests — no production code
//! depends on these.

use std::cell::Cell;

use ato_station::ports::{AlarmKind, AlarmSink, Dispenser, DispenserStatus, Reading, Sensor};

pub struct MockSensor(Cell<Reading>);

impl MockSensor {
    pub fn new(reading: Reading) -> Self {
        Self(Cell::new(reading))
    }

    pub fn set(&self, reading: Reading) {
        self.0.set(reading);
    }
}

impl Sensor for MockSensor {
    fn reading(&self) -> Reading {
        self.0.get()
    }
}

#[derive(Default)]
pub struct MockDispenser {
    status: Option<DispenserStatus>,
    pub start_count: u32,
    pub stop_count: u32,
}

impl MockDispenser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dispensing(&self) -> bool {
        matches!(self.status, Some(DispenserStatus::Dispensing))
    }
}

impl Dispenser for MockDispenser {
    fn start(&mut self) {
        self.status = Some(DispenserStatus::Dispensing);
        self.start_count += 1;
    }

    fn stop(&mut self) {
        self.status = Some(DispenserStatus::NotDispensing);
        self.stop_count += 1;
    }

    fn status(&self) -> DispenserStatus {
        self.status.unwrap_or(DispenserStatus::NotDispensing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmEvent {
    Raised(AlarmKind),
    Cleared,
}

#[derive(Default)]
pub struct MockAlarmSink {
    pub events: Vec<AlarmEvent>,
}

impl MockAlarmSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise_count(&self, kind: AlarmKind) -> usize {
        self.events
            .iter()
            .filter(|e| **e == AlarmEvent::Raised(kind))
            .count()
    }

    pub fn clear_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| **e == AlarmEvent::Cleared)
            .count()
    }

    pub fn last(&self) -> Option<AlarmEvent> {
        self.events.last().copied()
    }
}

impl AlarmSink for MockAlarmSink {
    fn raise(&mut self, kind: AlarmKind) {
        self.events.push(AlarmEvent::Raised(kind));
    }

    fn clear(&mut self) {
        self.events.push(AlarmEvent::Cleared);
    }
}
