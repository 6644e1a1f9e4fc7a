//! The station's transition table, expressed as one pure, ordered
//! decision function.
//!
//! Each non-sleeping, non-invalid tick is evaluated top to bottom; the
//! first rule that applies decides the next state and the dispenser
//! action. This mirrors the precedence the station's transition table
//! is specified in, rather than a per-state dispatch table, because the
//! sanity gate and the reservoir guard are cross-cutting: both apply
//! across more than one "current state."

use crate::clock;
use crate::settings::Settings;
use crate::station::context::Readings;
use crate::station::StationState;

/// A command for the dispenser the caller must issue before writing the
/// new state, per the station's fixed side-effect order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenserAction {
    None,
    Start,
    Stop,
}

/// The timers [`Station`](crate::station::Station) carries between
/// ticks; passed in by value since every field is a plain millisecond
/// timestamp.
#[derive(Debug, Clone, Copy)]
pub struct Timers {
    pub dispensing_start_ms: u32,
    pub last_dispense_end_ms: u32,
    pub sleep_start_ms: u32,
    pub sleep_period_ms: u32,
}

/// The result of evaluating one tick: the next state, the dispenser
/// command to apply first, and which timers (if any) the caller should
/// stamp with `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub next_state: StationState,
    pub dispenser_action: DispenserAction,
    pub set_dispensing_start: bool,
    pub set_last_dispense_end: bool,
}

impl Decision {
    fn remain(state: StationState) -> Self {
        Self {
            next_state: state,
            dispenser_action: DispenserAction::None,
            set_dispensing_start: false,
            set_last_dispense_end: false,
        }
    }
}

/// Evaluate one tick. Pure: no side effects, no I/O, and no dependency
/// on anything but its arguments, so it is exhaustively testable without
/// mocks.
pub fn evaluate(
    current: StationState,
    readings: &Readings,
    timers: Timers,
    settings: &Settings,
    now: u32,
) -> Decision {
    // Rule 1: a sleeping station ignores every sensor until it wakes.
    if current == StationState::Sleeping {
        return if clock::at_least(now, timers.sleep_start_ms, timers.sleep_period_ms) {
            Decision::remain(StationState::Sensing)
        } else {
            Decision::remain(StationState::Sleeping)
        };
    }

    // Rule 2: Invalid is a latch — only reset() escapes it.
    if current == StationState::Invalid {
        return Decision::remain(StationState::Invalid);
    }

    // Rule 3: the sanity gate overrides everything else in every
    // remaining state.
    if readings.sanity_gate_trips() {
        return Decision {
            next_state: StationState::Invalid,
            dispenser_action: DispenserAction::Stop,
            set_dispensing_start: false,
            set_last_dispense_end: false,
        };
    }

    // Rule 4: leaving ReservoirLow is decided before anything else, since
    // the reservoir guard below would otherwise immediately re-trip it.
    if current == StationState::ReservoirLow {
        return if readings.reservoir_guard_trips() {
            Decision::remain(StationState::ReservoirLow)
        } else {
            Decision::remain(StationState::Sensing)
        };
    }

    // Rule 5: the reservoir guard applies to Sensing and Dispensing
    // alike, ahead of either state's own rule.
    if readings.reservoir_guard_trips() {
        return Decision {
            next_state: StationState::ReservoirLow,
            dispenser_action: DispenserAction::Stop,
            set_dispensing_start: false,
            set_last_dispense_end: true,
        };
    }

    match current {
        StationState::Dispensing => {
            if readings.main_ok() {
                Decision {
                    next_state: StationState::Sensing,
                    dispenser_action: DispenserAction::Stop,
                    set_dispensing_start: false,
                    set_last_dispense_end: true,
                }
            } else if clock::at_least(
                now,
                timers.dispensing_start_ms,
                settings.max_dispensing_duration_ms,
            ) {
                Decision {
                    next_state: StationState::ReservoirLow,
                    dispenser_action: DispenserAction::Stop,
                    set_dispensing_start: false,
                    set_last_dispense_end: true,
                }
            } else {
                Decision::remain(StationState::Dispensing)
            }
        }
        StationState::Sensing => {
            let rested = clock::at_least(
                now,
                timers.last_dispense_end_ms,
                settings.min_dispensing_interval_ms,
            );
            if readings.demand_present() && rested {
                Decision {
                    next_state: StationState::Dispensing,
                    dispenser_action: DispenserAction::Start,
                    set_dispensing_start: true,
                    set_last_dispense_end: false,
                }
            } else {
                Decision::remain(StationState::Sensing)
            }
        }
        // Sleeping and Invalid are handled above; ReservoirLow is handled
        // by rule 4 before this match is reached.
        StationState::Sleeping | StationState::Invalid | StationState::ReservoirLow => {
            unreachable!("handled above")
        }
    }
}
