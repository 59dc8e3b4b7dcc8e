//! Haptic patterns and their timing tables.
//!
//! Patterns are a closed enumeration, not free-form strings: platform
//! adapters consult the fixed millisecond tables instead of parsing names.

use serde::{Deserialize, Serialize};

/// Vibration pattern attached to a timeline action, fired at its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticPattern {
    #[default]
    Single,
    Double,
    Triple,
    Emergency,
}

impl HapticPattern {
    /// Vibration timing table in milliseconds, alternating on/off starting
    /// with an on segment.
    pub fn timings_ms(&self) -> &'static [u64] {
        match self {
            HapticPattern::Single => &[200],
            HapticPattern::Double => &[150, 100, 150],
            HapticPattern::Triple => &[120, 80, 120, 80, 120],
            HapticPattern::Emergency => &[400, 100, 400, 100, 400, 100, 400],
        }
    }

    /// Relative vibration amplitude, 0.0–1.0.
    pub fn amplitude(&self) -> f32 {
        match self {
            HapticPattern::Emergency => 1.0,
            _ => 0.8,
        }
    }

    /// Used by serde to omit the default pattern from share codes.
    pub fn is_default(&self) -> bool {
        *self == HapticPattern::Single
    }
}
