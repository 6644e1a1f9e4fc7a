//! The tick's sensor snapshot and the derived predicates the transition
//! rules are built from.
//!
//! `Readings` is the station's "blackboard" for a single tick — captured
//! once at the top of [`Station::tick`](super::Station::tick) so every
//! rule in [`rules`](super::rules) sees a consistent view, even though
//! sensors could in principle change mid-evaluation.

use crate::ports::Reading;

/// A point-in-time snapshot of every sensor slot. `None` means the slot
/// has no sensor attached, distinct from an attached sensor reporting
/// either [`Reading`] value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Readings {
    pub main: Option<Reading>,
    pub reservoir_low: Option<Reading>,
    pub backup_high: Option<Reading>,
    pub backup_low: Option<Reading>,
}

impl Readings {
    pub fn main_attached(&self) -> bool {
        self.main.is_some()
    }

    /// `main_ok` ≡ main attached and sensing.
    pub fn main_ok(&self) -> bool {
        matches!(self.main, Some(Reading::Sensing))
    }

    /// `main` attached and reporting `NotSensing` — the primary demand
    /// signal for a dispense.
    pub fn main_not_sensing(&self) -> bool {
        matches!(self.main, Some(Reading::NotSensing))
    }

    pub fn reservoir_attached(&self) -> bool {
        self.reservoir_low.is_some()
    }

    /// `reservoir_low_present` ≡ attached ∧ `NotSensing`.
    pub fn reservoir_low_present(&self) -> bool {
        matches!(self.reservoir_low, Some(Reading::NotSensing))
    }

    /// `bhi_active` ≡ attached ∧ `Sensing` — the overflow witness has
    /// tripped.
    pub fn bhi_active(&self) -> bool {
        matches!(self.backup_high, Some(Reading::Sensing))
    }

    /// `blo_inactive` ≡ attached ∧ `NotSensing` — the dry-run witness
    /// reports water has fallen below the safe floor.
    pub fn blo_inactive(&self) -> bool {
        matches!(self.backup_low, Some(Reading::NotSensing))
    }

    /// Whether any physically impossible sensor combination is observed,
    /// or `main` is unattached (a missing primary sensor can never be
    /// evaluated safely, so it is folded into the same lockout gate).
    pub fn sanity_gate_trips(&self) -> bool {
        !self.main_attached() || self.bhi_active() || (self.main_ok() && self.blo_inactive())
    }

    /// Whether the reservoir should be treated as empty right now: the
    /// reservoir sensor directly reports it, or — when no reservoir
    /// sensor is attached — the main and backup-low witnesses agree the
    /// tank itself is dry.
    pub fn reservoir_guard_trips(&self) -> bool {
        if self.reservoir_attached() {
            self.reservoir_low_present()
        } else {
            self.main_not_sensing() && self.blo_inactive()
        }
    }

    /// Primary or backup-low demand for a dispense.
    pub fn demand_present(&self) -> bool {
        self.main_not_sensing() || self.blo_inactive()
    }
}
