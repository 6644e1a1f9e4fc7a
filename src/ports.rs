//! Port traits — the hexagonal boundary between the station core and the
//! outside world.
//!
//! ```text
//!   Adapter (GPIO, flash, annunciator) ──▶ Port trait ──▶ Station (domain)
//! ```
//!
//! Driven adapters (sensors, the dispenser, settings storage, the alarm
//! annunciator) implement these traits. [`Station`](crate::station::Station)
//! consumes them via generics, so the domain core never touches hardware
//! directly and is fully testable with mock adapters.

use core::fmt;

// ───────────────────────────────────────────────────────────────
// Sensor port
// ───────────────────────────────────────────────────────────────

/// The two-valued reading of a liquid-level switch.
///
/// There is no intermediate or "unknown" value — a sensor that is not
/// wired is represented at the station level by leaving its slot
/// unattached, not by a third `Reading` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// Liquid is at or above the switch.
    Sensing,
    /// Liquid is below the switch.
    NotSensing,
}

impl Reading {
    pub fn is_sensing(self) -> bool {
        matches!(self, Self::Sensing)
    }
}

/// A liquid-level sensor. Debouncing and electrical polarity are the
/// sensor implementation's concern, not the station's.
pub trait Sensor {
    fn reading(&self) -> Reading;
}

// ───────────────────────────────────────────────────────────────
// Dispenser port
// ───────────────────────────────────────────────────────────────

/// Whether the dispenser is currently moving liquid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenserStatus {
    Dispensing,
    NotDispensing,
}

/// The pump or solenoid that moves liquid from reservoir to main tank.
///
/// `start` and `stop` MUST be idempotent, and `status` MUST reflect the
/// last successfully issued command — the station treats the dispenser
/// as the authoritative record of "is the pump on right now."
pub trait Dispenser {
    fn start(&mut self);
    fn stop(&mut self);
    fn status(&self) -> DispenserStatus;
}

// ───────────────────────────────────────────────────────────────
// Settings store port
// ───────────────────────────────────────────────────────────────

/// Persists and loads the station's two tunables.
///
/// Persistence media failure is surfaced as "defaults returned" from
/// `load`; the station does not distinguish a missing record from a
/// failed read.
pub trait SettingsStore {
    fn load(&mut self, defaults: crate::settings::Settings) -> crate::settings::Settings;
    fn save(&mut self, settings: crate::settings::Settings);
}

// ───────────────────────────────────────────────────────────────
// Alarm sink port
// ───────────────────────────────────────────────────────────────

/// Discriminates the two alarm-worthy station states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmKind {
    ReservoirLow,
    Invalid,
}

impl fmt::Display for AlarmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservoirLow => write!(f, "reservoir low"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}

/// Receives edge-triggered alarm events from the station.
///
/// The station emits `raise(kind)` on the transition *into* `kind`'s
/// state and `clear()` on any transition *out of* `ReservoirLow` or
/// `Invalid`. It never emits `raise` twice in a row for the same
/// condition without an intervening `clear`.
pub trait AlarmSink {
    fn raise(&mut self, kind: AlarmKind);
    fn clear(&mut self);
}
