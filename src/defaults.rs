//! Default configuration constants for claque.
//!
//! This module provides shared constants used across the timing engine,
//! announcement machine and codec to ensure consistency and eliminate
//! duplication.

/// Default "get ready" notice lead time in seconds.
///
/// Spoken this many seconds before an action triggers unless the action
/// carries its own `noticeSeconds` override.
pub const NOTICE_SECONDS: u32 = 5;

/// Default query window for upcoming actions, in seconds.
///
/// Also the full sweep of the circular display: an action entering the
/// window appears at the top and rotates back to the top as it triggers.
pub const TIME_WINDOW_SECONDS: u32 = 60;

/// Default countdown length in seconds when an event enables countdowns
/// without listing explicit per-action values. Synthesizes `[5, 4, 3, 2, 1]`.
pub const COUNTDOWN_SECONDS: u32 = 5;

/// Tolerance around the trigger instant, in seconds.
///
/// The trigger is a single point in continuous time; a 16 ms tick loop
/// would sail straight past an exact comparison. Anything within ±1 s of
/// the trigger counts as "now".
pub const TRIGGER_TOLERANCE_SECS: f64 = 1.0;

/// Seconds-until threshold below which an action is styled as imminent.
pub const IMMINENT_THRESHOLD_SECS: f64 = 5.0;

/// Cutoff below which a past action is stale and must not announce.
///
/// Prevents a burst of firings when the app resumes after the action
/// window already closed.
pub const STALE_CUTOFF_SECS: f64 = -2.0;

/// Padding added after the last action when an event has no explicit end
/// time, in seconds.
pub const END_TIME_PADDING_SECS: i64 = 300;

/// Reference tick interval for the session loop, in milliseconds (~60 Hz).
pub const TICK_INTERVAL_MS: u64 = 16;

/// Practice speed multiplier bounds. Live sessions force 1.0.
pub const MIN_SPEED_MULTIPLIER: f64 = 1.0;
pub const MAX_SPEED_MULTIPLIER: f64 = 5.0;

/// Speech rate for the "get ready" notice, relative to the platform voice.
pub const NOTICE_SPEECH_RATE: f32 = 1.0;

/// Speech rate for countdown numbers. Slightly brisk so consecutive
/// numbers finish inside their one-second slots.
pub const COUNTDOWN_SPEECH_RATE: f32 = 1.3;

/// Speech rate for the "Now!" trigger announcement.
pub const TRIGGER_SPEECH_RATE: f32 = 1.5;

/// Share-code length budget in characters.
///
/// A version-40 QR code at medium error correction holds ~2,300 characters
/// of this alphabet; staying under this keeps codes scannable on cheap
/// cameras. Regression-tested, not enforced at encode time.
pub const SHARE_CODE_BUDGET_CHARS: usize = 2000;
