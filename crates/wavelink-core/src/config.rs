use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Which debug messages the link layer emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum DebugLevel {
    /// No debug output.
    None = 0,
    /// Error-path messages only.
    Errors = 1,
    /// Per-frame tracing of everything the engine does.
    Full = 2,
}

impl DebugLevel {
    /// Maps a `command` value onto a level. Unknown values are rejected.
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(DebugLevel::None),
            1 => Some(DebugLevel::Errors),
            2 => Some(DebugLevel::Full),
            _ => None,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => DebugLevel::Errors,
            2 => DebugLevel::Full,
            _ => DebugLevel::None,
        }
    }
}

/// How the sender picks a backoff slot count after a busy channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotSelection {
    /// Uniform random draw on `[0, cw)`, the collision-avoiding default.
    Random,
    /// Always the maximum slot (`cw - 1`), for reproducible contention tests.
    MaxContention,
}

/// Initial configuration for a link layer.
#[derive(Clone, Debug)]
pub struct Config {
    /// Debug verbosity the link starts with.
    pub debug_level: DebugLevel,
    /// Backoff slot selection mode the link starts with.
    pub slot_selection: SlotSelection,
    /// Beacon interval in milliseconds; negative disables beacons.
    pub beacon_interval_ms: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug_level: DebugLevel::None,
            slot_selection: SlotSelection::Random,
            beacon_interval_ms: -1,
        }
    }
}

/// Runtime-mutable link settings, shared between the host-facing `command`
/// surface and the engine actors.
#[derive(Debug)]
pub struct Settings {
    debug_level: AtomicU8,
    random_slots: AtomicBool,
}

impl Settings {
    /// Builds the shared settings cell from an initial configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            debug_level: AtomicU8::new(config.debug_level as u8),
            random_slots: AtomicBool::new(config.slot_selection == SlotSelection::Random),
        }
    }

    /// Returns the current debug level.
    pub fn debug_level(&self) -> DebugLevel {
        DebugLevel::from_raw(self.debug_level.load(Ordering::Relaxed))
    }

    /// Updates the debug level.
    pub fn set_debug_level(&self, level: DebugLevel) {
        self.debug_level.store(level as u8, Ordering::Relaxed);
    }

    /// True when per-frame debug output is enabled.
    pub fn debug_full(&self) -> bool {
        self.debug_level() == DebugLevel::Full
    }

    /// True when error-path output is enabled.
    pub fn debug_errors(&self) -> bool {
        self.debug_level() != DebugLevel::None
    }

    /// Returns the current slot selection mode.
    pub fn slot_selection(&self) -> SlotSelection {
        if self.random_slots.load(Ordering::Relaxed) {
            SlotSelection::Random
        } else {
            SlotSelection::MaxContention
        }
    }

    /// Updates the slot selection mode.
    pub fn set_slot_selection(&self, mode: SlotSelection) {
        self.random_slots.store(mode == SlotSelection::Random, Ordering::Relaxed);
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
