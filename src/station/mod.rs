//! The automatic top-off station: the domain core that owns the
//! dispenser, the persisted settings, and the current [`StationState`],
//! and exposes the command surface a host binary drives.
//!
//! Generic over its [`Dispenser`] and [`SettingsStore`] ports so the same
//! logic runs against real hardware or, in tests, against mocks —
//! sensors are borrowed as `&dyn Sensor` instead, since a station may
//! run with anywhere from one to all four attached.

pub mod context;
pub mod rules;

use core::fmt;

use log::{info, warn};

use crate::error::SettingsError;
use crate::ports::{AlarmKind, AlarmSink, Dispenser, Sensor, SettingsStore};
use crate::settings::Settings;
use context::Readings;
use rules::{evaluate, DispenserAction, Timers};

/// The station's current operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationState {
    /// Watching for demand; the dispenser is off.
    Sensing,
    /// Actively topping off.
    Dispensing,
    /// The reservoir is presumed empty; the dispenser is latched off
    /// until a refill is observed.
    ReservoirLow,
    /// A sensor combination that cannot occur under normal operation was
    /// observed (or `main` is unattached). The dispenser is latched off
    /// until [`Station::reset`].
    Invalid,
    /// Ignoring sensors for a configured duration.
    Sleeping,
}

impl fmt::Display for StationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sensing => "Sensing",
            Self::Dispensing => "Dispensing",
            Self::ReservoirLow => "ReservoirLow",
            Self::Invalid => "Invalid",
            Self::Sleeping => "Sleeping",
        };
        f.write_str(name)
    }
}

/// The control core for one ATO station.
///
/// `'a` is the lifetime of the borrowed sensor references; `D` and `St`
/// are the dispenser and settings-store ports, generic rather than
/// `dyn` so a host can monomorphize down to its concrete hardware types.
pub struct Station<'a, D, St> {
    dispenser: D,
    settings_store: St,
    main: Option<&'a dyn Sensor>,
    reservoir_low: Option<&'a dyn Sensor>,
    backup_high: Option<&'a dyn Sensor>,
    backup_low: Option<&'a dyn Sensor>,
    state: StationState,
    booted: bool,
    settings: Settings,
    dispensing_start_ms: u32,
    last_dispense_end_ms: u32,
    sleep_start_ms: u32,
    sleep_period_ms: u32,
}

impl<'a, D: Dispenser, St: SettingsStore> Station<'a, D, St> {
    /// Build a station with no sensors attached and the dispenser off.
    /// Call [`setup`](Self::setup) before the first [`tick`](Self::tick).
    pub fn new(dispenser: D, settings_store: St) -> Self {
        Self {
            dispenser,
            settings_store,
            main: None,
            reservoir_low: None,
            backup_high: None,
            backup_low: None,
            state: StationState::Invalid,
            booted: false,
            settings: Settings::default(),
            dispensing_start_ms: 0,
            last_dispense_end_ms: 0,
            sleep_start_ms: 0,
            sleep_period_ms: 0,
        }
    }

    pub fn attach_main(&mut self, sensor: &'a dyn Sensor) {
        self.main = Some(sensor);
    }

    pub fn attach_reservoir_low(&mut self, sensor: &'a dyn Sensor) {
        self.reservoir_low = Some(sensor);
    }

    pub fn attach_backup_high(&mut self, sensor: &'a dyn Sensor) {
        self.backup_high = Some(sensor);
    }

    pub fn attach_backup_low(&mut self, sensor: &'a dyn Sensor) {
        self.backup_low = Some(sensor);
    }

    pub fn state(&self) -> StationState {
        self.state
    }

    /// Read access to the dispenser — chiefly for tests asserting P1
    /// (`state == Dispensing` iff `Dispenser::status() == Dispensing`)
    /// against the real dispenser port rather than state alone.
    pub fn dispenser(&self) -> &D {
        &self.dispenser
    }

    /// Load persisted settings and enter the station's starting state
    /// for this boot. `main` being unattached trips the sanity gate
    /// immediately, landing in `Invalid` rather than `Sensing`.
    ///
    /// `last_dispense_end_ms` is anchored to `now_ms` minus the interval
    /// itself, so the very first dispense of a boot is never artificially
    /// delayed by a rest period measured from a dispense that never
    /// happened.
    pub fn setup(&mut self, now_ms: u32, alarm: &mut impl AlarmSink) {
        self.settings = self.settings_store.load(Settings::default());
        self.last_dispense_end_ms = now_ms.wrapping_sub(self.settings.min_dispensing_interval_ms);
        self.dispenser.stop();
        info!(
            "station: setup complete, max_dispensing_duration_ms={} min_dispensing_interval_ms={}",
            self.settings.max_dispensing_duration_ms, self.settings.min_dispensing_interval_ms
        );
        self.enter_sensing(now_ms, alarm);
    }

    /// Validate and adopt a new settings record, persisting it
    /// immediately. On validation failure the station keeps whatever
    /// settings were previously in force.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        if let Err(e) = settings.validate() {
            warn!("station: rejected settings ({e}), keeping previous settings in force");
            return Err(e);
        }
        self.settings = settings;
        self.settings_store.save(settings);
        info!("station: settings applied and persisted");
        Ok(())
    }

    /// Stop dispensing and ignore sensors for `minutes`. Legal from any
    /// state — including `ReservoirLow`/`Invalid` — so the transition is
    /// routed through [`write_state`](Self::write_state) like every other
    /// state change, rather than writing `self.state` directly, so an
    /// outstanding `raise()` is always paired with a `clear()` if the
    /// station was latched when `sleep` was called.
    pub fn sleep(&mut self, minutes: u16, now_ms: u32, alarm: &mut impl AlarmSink) {
        self.dispenser.stop();
        self.sleep_start_ms = now_ms;
        self.sleep_period_ms = u32::from(minutes) * 60_000;
        info!("station: sleeping for {minutes} minute(s)");
        self.write_state(StationState::Sleeping, alarm);
    }

    /// End a sleep early, re-evaluating sensors immediately. A no-op
    /// unless the station is currently `Sleeping`.
    pub fn wake(&mut self, now_ms: u32, alarm: &mut impl AlarmSink) {
        if self.state != StationState::Sleeping {
            return;
        }
        info!("station: waking");
        self.enter_sensing(now_ms, alarm);
    }

    /// Clear a latched `Invalid` condition and re-evaluate sensors
    /// immediately. A no-op unless the station is currently `Invalid`.
    pub fn reset(&mut self, now_ms: u32, alarm: &mut impl AlarmSink) {
        if self.state != StationState::Invalid {
            return;
        }
        info!("station: reset requested");
        self.enter_sensing(now_ms, alarm);
    }

    /// Advance the station by one control cycle.
    ///
    /// Side effects are applied in a fixed order: the dispenser command
    /// first, then the new state becomes observable, then any alarm
    /// edge event — so an observer can never see a state change before
    /// the dispenser has already been commanded to match it.
    pub fn tick(&mut self, now_ms: u32, alarm: &mut impl AlarmSink) {
        let readings = self.read_sensors();
        let timers = Timers {
            dispensing_start_ms: self.dispensing_start_ms,
            last_dispense_end_ms: self.last_dispense_end_ms,
            sleep_start_ms: self.sleep_start_ms,
            sleep_period_ms: self.sleep_period_ms,
        };
        let decision = evaluate(self.state, &readings, timers, &self.settings, now_ms);

        match decision.dispenser_action {
            DispenserAction::Start => self.dispenser.start(),
            DispenserAction::Stop => self.dispenser.stop(),
            DispenserAction::None => {}
        }
        if decision.set_dispensing_start {
            self.dispensing_start_ms = now_ms;
        }
        if decision.set_last_dispense_end {
            self.last_dispense_end_ms = now_ms;
        }

        self.write_state(decision.next_state, alarm);
    }

    fn read_sensors(&self) -> Readings {
        Readings {
            main: self.main.map(Sensor::reading),
            reservoir_low: self.reservoir_low.map(Sensor::reading),
            backup_high: self.backup_high.map(Sensor::reading),
            backup_low: self.backup_low.map(Sensor::reading),
        }
    }

    /// Shared path for every command that forces the station to
    /// re-evaluate sensors outside a tick: runs the same sanity gate and
    /// reservoir guard a tick would, in the same precedence, so a still-
    /// unattached `main` correctly lands in `Invalid` and a still-dry
    /// reservoir correctly lands in `ReservoirLow` rather than masking
    /// either fault behind a bare `Sensing`. The dispenser is always
    /// stopped first, since every outcome here is a non-`Dispensing`
    /// state.
    fn enter_sensing(&mut self, now_ms: u32, alarm: &mut impl AlarmSink) {
        let readings = self.read_sensors();
        let next = if readings.sanity_gate_trips() {
            StationState::Invalid
        } else if readings.reservoir_guard_trips() {
            StationState::ReservoirLow
        } else {
            StationState::Sensing
        };
        self.dispenser.stop();
        if next == StationState::ReservoirLow {
            self.last_dispense_end_ms = now_ms;
        }
        self.write_state(next, alarm);
    }

    /// Write the new state and fire the edge-triggered alarm events. A
    /// `clear` fires only when actually leaving `ReservoirLow`/`Invalid`;
    /// a `raise` fires only when actually entering one of them — never
    /// on every tick the station merely remains in one.
    fn write_state(&mut self, next: StationState, alarm: &mut impl AlarmSink) {
        let prev = self.booted.then_some(self.state);
        self.state = next;
        self.booted = true;

        match prev {
            Some(p) if p == next => {}
            Some(p) => {
                info!("station: {p} -> {next}");
                if matches!(p, StationState::ReservoirLow | StationState::Invalid) {
                    alarm.clear();
                }
                if let Some(kind) = alarm_kind_for(next) {
                    warn!("station: alarm raised ({kind})");
                    alarm.raise(kind);
                }
            }
            None => {
                info!("station: entering {next}");
                if let Some(kind) = alarm_kind_for(next) {
                    warn!("station: alarm raised ({kind})");
                    alarm.raise(kind);
                }
            }
        }
    }
}

fn alarm_kind_for(state: StationState) -> Option<AlarmKind> {
    match state {
        StationState::ReservoirLow => Some(AlarmKind::ReservoirLow),
        StationState::Invalid => Some(AlarmKind::Invalid),
        _ => None,
    }
}
