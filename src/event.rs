//! Event and timeline data model.
//!
//! Two shapes exist for an event: [`Event`] is the in-memory form with all
//! defaults applied, [`EmbeddedEvent`] is the wire form embedded in share
//! codes, where every field equal to its default is omitted to keep the
//! payload inside the QR budget. Wire field names are camelCase for
//! compatibility with codes produced by earlier app generations.

use crate::announce::haptics::HapticPattern;
use crate::defaults;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

/// Display emphasis hint for an action. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStyle {
    Normal,
    Emphasis,
    Alert,
}

/// How the host UI lays out the upcoming-action display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualMode {
    #[default]
    Circular,
    List,
}

impl VisualMode {
    fn is_default(&self) -> bool {
        *self == VisualMode::Circular
    }
}

/// One cue on a timeline.
///
/// `time` is the absolute UTC instant the action triggers, immutable once
/// loaded. Timelines are unordered collections; consumers sort and filter
/// by time themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineAction {
    pub id: String,
    pub time: DateTime<Utc>,
    /// Human-readable text; doubles as the TTS fallback and the countdown
    /// prefix.
    pub action: String,
    /// Disables the announcement machine entirely for this action.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub audio_announce: bool,
    /// Override of the event-level notice lead time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice_seconds: Option<u32>,
    /// Explicit seconds-before-trigger at which to count down. Need not be
    /// sorted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_seconds: Option<Vec<u32>>,
    /// Whether spoken phrases include the action text.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub announce_action_name: bool,
    #[serde(default, skip_serializing_if = "HapticPattern::is_default")]
    pub haptic_pattern: HapticPattern,
    /// Pre-recorded cue id, looked up in `pack`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cue: Option<String>,
    /// Pool of cue ids; one is chosen at random per phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_cues: Option<Vec<String>>,
    /// Resource pack the cue ids belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack: Option<String>,
    /// Spoken when the pack cannot resolve a cue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_text: Option<String>,
    // Presentation hints carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ActionStyle>,
}

impl TimelineAction {
    /// New action with all optional behavior at defaults.
    pub fn new(id: impl Into<String>, time: DateTime<Utc>, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            time,
            action: action.into(),
            audio_announce: true,
            notice_seconds: None,
            countdown_seconds: None,
            announce_action_name: true,
            haptic_pattern: HapticPattern::default(),
            cue: None,
            random_cues: None,
            pack: None,
            fallback_text: None,
            color: None,
            icon: None,
            style: None,
        }
    }

    pub fn with_notice(mut self, seconds: u32) -> Self {
        self.notice_seconds = Some(seconds);
        self
    }

    pub fn with_countdown(mut self, seconds: impl Into<Vec<u32>>) -> Self {
        self.countdown_seconds = Some(seconds.into());
        self
    }

    pub fn with_cue(mut self, cue: impl Into<String>, pack: impl Into<String>) -> Self {
        self.cue = Some(cue.into());
        self.pack = Some(pack.into());
        self
    }

    pub fn with_haptic(mut self, pattern: HapticPattern) -> Self {
        self.haptic_pattern = pattern;
        self
    }
}

/// Event with timeline and metadata, defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub default_notice_seconds: u32,
    pub time_window_seconds: u32,
    pub visual_mode: VisualMode,
    /// Synthesize a countdown for actions without an explicit list.
    pub default_countdown: bool,
    pub default_countdown_seconds: u32,
    pub timeline: Vec<TimelineAction>,
}

impl Event {
    /// Expand a wire-form event, applying defaults and deriving the end
    /// time (last action plus five minutes) when absent.
    pub fn from_embedded(embedded: EmbeddedEvent) -> Self {
        let end_time = embedded
            .end_time
            .unwrap_or_else(|| derived_end_time(embedded.start_time, &embedded.timeline));
        Self {
            title: embedded.title,
            description: embedded.description,
            start_time: embedded.start_time,
            end_time,
            timezone: embedded.timezone,
            default_notice_seconds: embedded
                .default_notice_seconds
                .unwrap_or(defaults::NOTICE_SECONDS),
            time_window_seconds: embedded
                .time_window_seconds
                .unwrap_or(defaults::TIME_WINDOW_SECONDS),
            visual_mode: embedded.visual_mode.unwrap_or_default(),
            default_countdown: embedded.default_countdown.unwrap_or(false),
            default_countdown_seconds: embedded
                .default_countdown_seconds
                .unwrap_or(defaults::COUNTDOWN_SECONDS),
            timeline: embedded.timeline,
        }
    }

    /// Compact wire form: every field equal to its default is omitted so
    /// the encoded payload stays small.
    pub fn to_embedded(&self) -> EmbeddedEvent {
        let derived = derived_end_time(self.start_time, &self.timeline);
        EmbeddedEvent {
            title: self.title.clone(),
            description: self.description.clone(),
            start_time: self.start_time,
            end_time: (self.end_time != derived).then_some(self.end_time),
            timezone: self.timezone.clone(),
            default_notice_seconds: (self.default_notice_seconds != defaults::NOTICE_SECONDS)
                .then_some(self.default_notice_seconds),
            time_window_seconds: (self.time_window_seconds != defaults::TIME_WINDOW_SECONDS)
                .then_some(self.time_window_seconds),
            visual_mode: (!self.visual_mode.is_default()).then_some(self.visual_mode),
            default_countdown: self.default_countdown.then_some(true),
            default_countdown_seconds: (self.default_countdown_seconds
                != defaults::COUNTDOWN_SECONDS)
                .then_some(self.default_countdown_seconds),
            timeline: self.timeline.clone(),
        }
    }
}

fn derived_end_time(start_time: DateTime<Utc>, timeline: &[TimelineAction]) -> DateTime<Utc> {
    let last = timeline
        .iter()
        .map(|a| a.time)
        .max()
        .unwrap_or(start_time);
    last + Duration::seconds(defaults::END_TIME_PADDING_SECS)
}

/// Wire form of an event, as embedded in share codes.
///
/// Carries no server ids, participant data or status; optional fields are
/// omitted when equal to their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedEvent {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_notice_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_mode: Option<VisualMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_countdown: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_countdown_seconds: Option<u32>,
    #[serde(default)]
    pub timeline: Vec<TimelineAction>,
}
