//! The station's two persisted tunables, and reference `SettingsStore`
//! implementations.
//!
//! [`Settings`] is the only state C3 persists; everything else the
//! station tracks (timers, attached sensors, current state) lives only
//! in memory and is rebuilt by [`setup`](crate::station::Station::setup)
//! on every boot.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::ports::SettingsStore;

/// Upper bound on a single continuous dispense, and the minimum elapsed
/// time between the end of one dispense and the start of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Hard timeout on one dispense (ms). Exceeding it without satisfying
    /// the main sensor means the reservoir is presumed empty.
    pub max_dispensing_duration_ms: u32,
    /// Minimum rest period between dispenses (ms).
    pub min_dispensing_interval_ms: u32,
}

impl Default for Settings {
    /// 10 minutes max dispense, 60 minutes between dispenses — the safe
    /// implementer-chosen defaults named in the data model.
    fn default() -> Self {
        Self {
            max_dispensing_duration_ms: 10 * 60 * 1000,
            min_dispensing_interval_ms: 60 * 60 * 1000,
        }
    }
}

impl Settings {
    /// Range-check a proposed settings record before it is adopted.
    ///
    /// `min_dispensing_interval_ms` has no lower bound to reject — zero is
    /// legal (it means "dispense again as soon as demand reappears").
    /// `max_dispensing_duration_ms` must be nonzero or a dispense could
    /// never time out.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_dispensing_duration_ms == 0 {
            return Err(SettingsError::ZeroMaxDuration);
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// In-memory store — the reference implementation used by tests and by
// any host that has no persistence requirement.
// ───────────────────────────────────────────────────────────────

/// A [`SettingsStore`] that never touches storage media. `load` returns
/// whatever was last `save`d, or `defaults` on first use.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    saved: Option<Settings>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self { saved: None }
    }

    /// Seed the store as if a prior `save` had already happened —
    /// useful in tests that want to start from a non-default record.
    pub fn seeded(settings: Settings) -> Self {
        Self {
            saved: Some(settings),
        }
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn load(&mut self, defaults: Settings) -> Settings {
        self.saved.unwrap_or(defaults)
    }

    fn save(&mut self, settings: Settings) {
        self.saved = Some(settings);
    }
}

// ───────────────────────────────────────────────────────────────
// Byte-oriented store — plumbing for a real flash/NVS backing, built on
// the same namespace+key key-value shape the teacher firmware uses for
// its storage port.
// ───────────────────────────────────────────────────────────────

/// Capacity of the fixed-size buffer backing one stored record — large
/// enough for the postcard encoding of [`Settings`] with headroom for a
/// future field or two, with no dependency on `alloc`.
const RECORD_CAP: usize = 32;

/// Minimal namespaced key-value port a real flash or NVS adapter would
/// implement. Kept separate from [`SettingsStore`] so the encoding
/// (postcard, below) is independent of the physical medium.
pub trait KeyValueStore {
    fn read(&self, namespace: &str, key: &str) -> Option<heapless::Vec<u8, RECORD_CAP>>;
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]);
}

const SETTINGS_NAMESPACE: &str = "ato";
const SETTINGS_KEY: &str = "settings";

/// A [`SettingsStore`] that encodes [`Settings`] with `postcard` and
/// layers the result over any [`KeyValueStore`]. Decode failure (a
/// corrupt or truncated record) is treated exactly like "no record
/// present" — `load` falls back to `defaults`, matching the storage
/// failure handling in the error design.
pub struct PostcardSettingsStore<K> {
    kv: K,
}

impl<K: KeyValueStore> PostcardSettingsStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }
}

impl<K: KeyValueStore> SettingsStore for PostcardSettingsStore<K> {
    fn load(&mut self, defaults: Settings) -> Settings {
        self.kv
            .read(SETTINGS_NAMESPACE, SETTINGS_KEY)
            .and_then(|bytes| postcard::from_bytes::<Settings>(&bytes).ok())
            .unwrap_or(defaults)
    }

    fn save(&mut self, settings: Settings) {
        let mut buf = [0u8; RECORD_CAP];
        if let Ok(encoded) = postcard::to_slice(&settings, &mut buf) {
            self.kv.write(SETTINGS_NAMESPACE, SETTINGS_KEY, encoded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemKv(HashMap<(String, String), Vec<u8>>);

    impl KeyValueStore for MemKv {
        fn read(&self, namespace: &str, key: &str) -> Option<heapless::Vec<u8, RECORD_CAP>> {
            self.0
                .get(&(namespace.to_string(), key.to_string()))
                .and_then(|v| heapless::Vec::from_slice(v).ok())
        }

        fn write(&mut self, namespace: &str, key: &str, data: &[u8]) {
            self.0
                .insert((namespace.to_string(), key.to_string()), data.to_vec());
        }
    }

    #[test]
    fn validate_rejects_zero_max_duration() {
        let s = Settings {
            max_dispensing_duration_ms: 0,
            min_dispensing_interval_ms: 1000,
        };
        assert_eq!(s.validate(), Err(SettingsError::ZeroMaxDuration));
    }

    #[test]
    fn validate_accepts_zero_min_interval() {
        let s = Settings {
            max_dispensing_duration_ms: 1,
            min_dispensing_interval_ms: 0,
        };
        assert_eq!(s.validate(), Ok(()));
    }

    #[test]
    fn in_memory_store_roundtrips() {
        let mut store = InMemorySettingsStore::new();
        let defaults = Settings::default();
        assert_eq!(store.load(defaults), defaults);

        let custom = Settings {
            max_dispensing_duration_ms: 42,
            min_dispensing_interval_ms: 7,
        };
        store.save(custom);
        assert_eq!(store.load(defaults), custom);
    }

    #[test]
    fn postcard_store_roundtrips_through_key_value_port() {
        let mut store = PostcardSettingsStore::new(MemKv::default());
        let custom = Settings {
            max_dispensing_duration_ms: 123_456,
            min_dispensing_interval_ms: 7_890,
        };
        store.save(custom);
        assert_eq!(store.load(Settings::default()), custom);
    }

    #[test]
    fn postcard_store_falls_back_to_defaults_on_missing_record() {
        let mut store = PostcardSettingsStore::new(MemKv::default());
        assert_eq!(store.load(Settings::default()), Settings::default());
    }

    #[test]
    fn postcard_store_falls_back_to_defaults_on_corrupt_record() {
        let mut kv = MemKv::default();
        kv.write(SETTINGS_NAMESPACE, SETTINGS_KEY, &[0xff, 0xff, 0xff]);
        let mut store = PostcardSettingsStore::new(kv);
        assert_eq!(store.load(Settings::default()), Settings::default());
    }
}
