//! Automatic top-off (ATO) aquarium station control core.
//!
//! The domain logic ([`station`]) is pure and hardware-free; it is
//! driven entirely through the port traits in [`ports`]. A host binary
//! wires real sensors, a dispenser, and persistent storage to those
//! ports and calls [`station::Station::tick`] on a fixed schedule.

#![deny(unused_must_use)]

pub mod clock;
pub mod error;
pub mod ports;
pub mod settings;
pub mod station;
