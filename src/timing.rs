//! Pure time-indexed queries over a timeline.
//!
//! Everything here is a function of `(timeline, now)` with no mutable
//! state, so multiple sessions can query concurrently. Timestamps are
//! assumed well-formed: malformed data is rejected at decode time, never
//! here, which is why no query returns a `Result`.

use crate::defaults;
use crate::event::TimelineAction;
use chrono::{DateTime, FixedOffset, Utc};

/// UI styling bucket for an action relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Past,
    Upcoming,
    Imminent,
    Triggering,
}

/// Verdict for the timing-tap game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAccuracy {
    Perfect,
    Early,
    Late,
}

/// Signed seconds from `now` until the action triggers, sub-second
/// precision. Negative once the trigger instant has passed. This is the
/// quantity every announcement decision keys on.
pub fn seconds_until(action: &TimelineAction, now: DateTime<Utc>) -> f64 {
    let delta = action.time - now;
    delta
        .num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
        .unwrap_or_else(|| delta.num_milliseconds() as f64 / 1_000.0)
}

/// The action triggering right now, if any: first action within ±1 s of
/// `now`. The tolerance absorbs tick jitter so a 16 ms loop cannot miss
/// the single trigger instant.
///
/// When several actions fall inside the window the earliest wins, with the
/// lowest id as tie-break, so the result does not depend on storage order.
pub fn current_action<'a>(
    timeline: &'a [TimelineAction],
    now: DateTime<Utc>,
) -> Option<&'a TimelineAction> {
    timeline
        .iter()
        .filter(|a| seconds_until(a, now).abs() <= defaults::TRIGGER_TOLERANCE_SECS)
        .min_by(|a, b| (a.time, &a.id).cmp(&(b.time, &b.id)))
}

/// All actions with `time` in `[now, now + window_seconds]`, ascending by
/// time (lowest id first among equals). Both bounds inclusive; anything
/// already past is excluded. Drives both the display and the announcement
/// machine.
pub fn upcoming_actions<'a>(
    timeline: &'a [TimelineAction],
    now: DateTime<Utc>,
    window_seconds: u32,
) -> Vec<&'a TimelineAction> {
    actions_between(timeline, now, 0.0, window_seconds as f64)
}

/// Session-driver variant of [`upcoming_actions`] whose lower bound is
/// widened by the stale cutoff. An action leaves the plain query window at
/// the exact moment its trigger crossing happens; the machine still needs
/// to see it for a couple of seconds.
pub fn pending_actions<'a>(
    timeline: &'a [TimelineAction],
    now: DateTime<Utc>,
    window_seconds: u32,
) -> Vec<&'a TimelineAction> {
    actions_between(
        timeline,
        now,
        defaults::STALE_CUTOFF_SECS,
        window_seconds as f64,
    )
}

fn actions_between<'a>(
    timeline: &'a [TimelineAction],
    now: DateTime<Utc>,
    from_secs: f64,
    to_secs: f64,
) -> Vec<&'a TimelineAction> {
    let mut matches: Vec<&TimelineAction> = timeline
        .iter()
        .filter(|a| {
            let s = seconds_until(a, now);
            s >= from_secs && s <= to_secs
        })
        .collect();
    matches.sort_by(|a, b| (a.time, &a.id).cmp(&(b.time, &b.id)));
    matches
}

/// Position of an action on the circular display, in degrees `[0, 360)`.
///
/// Maps `(seconds_from_now + window) / window` onto a full circle so the
/// trigger point sits at the top (0°) and actions rotate toward it as time
/// passes. The formula is reproduced exactly for visual parity across
/// devices.
pub fn position_degrees(
    action: &TimelineAction,
    now: DateTime<Utc>,
    window_seconds: u32,
) -> f64 {
    let w = window_seconds as f64;
    let s = seconds_until(action, now);
    (((s + w) / w) * 360.0).rem_euclid(360.0)
}

/// Styling bucket: more than 5 s out is upcoming, 0–5 s imminent, the
/// second after the trigger is triggering, older is past.
pub fn action_status(action: &TimelineAction, now: DateTime<Utc>) -> ActionStatus {
    let s = seconds_until(action, now);
    if s > defaults::IMMINENT_THRESHOLD_SECS {
        ActionStatus::Upcoming
    } else if s > 0.0 {
        ActionStatus::Imminent
    } else if s >= -defaults::TRIGGER_TOLERANCE_SECS {
        ActionStatus::Triggering
    } else {
        ActionStatus::Past
    }
}

/// Score a user tap against the trigger instant.
pub fn tap_accuracy(
    action: &TimelineAction,
    tap_time: DateTime<Utc>,
    tolerance_seconds: f64,
) -> TapAccuracy {
    let offset = seconds_until(action, tap_time);
    if offset.abs() <= tolerance_seconds {
        TapAccuracy::Perfect
    } else if offset > 0.0 {
        // Tapped before the trigger instant.
        TapAccuracy::Early
    } else {
        TapAccuracy::Late
    }
}

/// Inclusive range check against the event window.
pub fn is_event_active(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    now >= start_time && now <= end_time
}

/// Display-only helper: render a UTC instant in a fixed local offset.
pub fn format_local(time: DateTime<Utc>, offset_minutes: i32) -> String {
    match FixedOffset::east_opt(offset_minutes * 60) {
        Some(offset) => time.with_timezone(&offset).format("%H:%M:%S").to_string(),
        None => time.format("%H:%M:%SZ").to_string(),
    }
}
