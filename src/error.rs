//! Unified error types for the ATO station core.
//!
//! Follows embedded best practice: one small `Copy` enum per fallible
//! boundary rather than a single stringly-typed error, so callers can
//! match exhaustively and the failure never needs an allocation.

use core::fmt;

/// Returned by [`Station::apply_settings`](crate::station::Station::apply_settings)
/// when a proposed [`Settings`](crate::settings::Settings) record fails
/// validation. The station leaves the previous settings in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    /// `max_dispensing_duration_ms` was zero — a dispense could never
    /// time out, leaving no bound on runaway pumping.
    ZeroMaxDuration,
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxDuration => {
                write!(f, "max_dispensing_duration_ms must be greater than zero")
            }
        }
    }
}
