//! Announcement machinery: platform backend contract, haptic tables and
//! the per-session state machine.

pub mod backend;
pub mod haptics;
pub mod machine;

pub use backend::{AudioBackend, AudioCapabilities, ConsoleBackend, MockAudioBackend};
pub use haptics::HapticPattern;
pub use machine::{Announcement, Announcer, AudioMode, Phase, TickContext};
