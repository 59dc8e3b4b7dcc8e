//! claque - Synchronized crowd-cue engine
//!
//! Coordinates independent devices so each announces the same action at
//! the same wall-clock instant, using only a locally held timeline and the
//! device's own clock. Timelines travel as QR-sized share codes.

// Propagate errors; panics are for tests only.
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod announce;
#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod config;
pub mod defaults;
pub mod error;
pub mod event;
pub mod session;
pub mod timing;

// Core seams (backend trait + machine + codec)
pub use announce::backend::{AudioBackend, AudioCapabilities, ConsoleBackend, MockAudioBackend};
pub use announce::haptics::HapticPattern;
pub use announce::machine::{Announcement, Announcer, AudioMode, Phase, TickContext};
pub use codec::{CompressionStats, EventCodec, decode_event, encode_event};

// Data model
pub use event::{EmbeddedEvent, Event, TimelineAction};

// Session loop
pub use session::{Clock, PracticeClock, Session, SessionEvent, SessionHandle, SystemClock};

// Error handling
pub use error::{ClaqueError, Result};

// Config
pub use config::Config;
