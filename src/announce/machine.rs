//! Announcement state machine.
//!
//! Consumes timing-engine output every tick and decides, with dedup and
//! fallback, what to actually speak, beep or vibrate. Three ordered phases
//! per action, each fired at most once:
//!
//! - notice ("Get ready to ...") a configurable number of seconds out
//! - countdown numbers
//! - trigger ("Now!")
//!
//! The driving clock can skip values (practice speed-up, dropped frames),
//! so phases fire on threshold *crossings*, never equality: phase P fires
//! when the previous tick's adjusted seconds was above the threshold and
//! the current one is at or below it. Skipped countdown numbers are
//! absorbed silently rather than spoken late.

use crate::announce::backend::AudioBackend;
use crate::defaults;
use crate::event::{Event, TimelineAction};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Announcement phase, the second half of a dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Notice,
    Countdown(u32),
    Trigger,
}

/// Output channel currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMode {
    /// Speech synthesis.
    Tts,
    /// Beep tones; speech unavailable.
    Tone,
    /// No audio output; announcements are bookkeeping only.
    VisualOnly,
}

/// Per-tick inputs that do not vary per action.
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    pub default_notice_seconds: u32,
    /// Practice speed factor, clamped to 1.0–5.0. Live sessions pass 1.0.
    pub speed_multiplier: f64,
    /// Synthesize `[d, d-1, .., 1]` for actions without an explicit list.
    pub default_countdown: bool,
    pub default_countdown_seconds: u32,
}

impl TickContext {
    pub fn from_event(event: &Event, speed_multiplier: f64) -> Self {
        Self {
            default_notice_seconds: event.default_notice_seconds,
            speed_multiplier,
            default_countdown: event.default_countdown,
            default_countdown_seconds: event.default_countdown_seconds,
        }
    }
}

impl Default for TickContext {
    fn default() -> Self {
        Self {
            default_notice_seconds: defaults::NOTICE_SECONDS,
            speed_multiplier: 1.0,
            default_countdown: false,
            default_countdown_seconds: defaults::COUNTDOWN_SECONDS,
        }
    }
}

/// What a tick actually fired, for the host UI and for tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    pub action_id: String,
    pub phase: Phase,
    /// Text handed to speech, if the resource pack did not take over and
    /// the phase produces text. Present even in muted/visual-only mode so
    /// the UI can render it.
    pub spoken: Option<String>,
}

enum CueOutcome {
    /// The resource pack played something; the text path is skipped.
    PackPlayed,
    Text(String),
}

/// Stateful per-session announcer.
///
/// Owns the platform backend and all dedup state. Scoped to one
/// coordination session: `start` clears state, `stop` halts without
/// forgetting (so a paused session can resume), `reset` forgets.
pub struct Announcer {
    backend: Box<dyn AudioBackend>,
    mode: AudioMode,
    muted: bool,
    active: bool,
    fired: HashSet<(String, Phase)>,
    last_adjusted: HashMap<String, f64>,
    countdown_spoken: HashSet<String>,
}

impl Announcer {
    /// Wrap a platform backend. Mode falls back from speech to tone to
    /// visual-only based on what the backend reports; an absent speech
    /// engine is a mode, not an error.
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        let caps = backend.capabilities();
        let mode = if caps.speech {
            AudioMode::Tts
        } else if caps.tone {
            AudioMode::Tone
        } else {
            AudioMode::VisualOnly
        };
        debug!(backend = backend.name(), ?mode, "announcer created");
        Self {
            backend,
            mode,
            muted: false,
            active: false,
            fired: HashSet::new(),
            last_adjusted: HashMap::new(),
            countdown_spoken: HashSet::new(),
        }
    }

    pub fn mode(&self) -> AudioMode {
        self.mode
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Begin a fresh session: clears all dedup state and activates.
    pub fn start(&mut self) {
        self.fired.clear();
        self.last_adjusted.clear();
        self.countdown_spoken.clear();
        self.active = true;
    }

    /// Re-activate after `stop` without clearing dedup state, for
    /// background/foreground transitions that restart the tick loop.
    pub fn resume(&mut self) {
        self.active = true;
    }

    /// Halt announcements, keeping dedup state for a later `resume`.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Halt and forget everything.
    pub fn reset(&mut self) {
        self.stop();
        self.fired.clear();
        self.last_adjusted.clear();
        self.countdown_spoken.clear();
    }

    /// Release the audio backend and force idle.
    pub fn shutdown(&mut self) {
        self.backend.release();
        self.active = false;
    }

    /// Evaluate one action for one tick. At most one externally visible
    /// side effect per call; returns what fired, if anything.
    ///
    /// `seconds_until` is real (unscaled) time to the trigger; the
    /// practice speed multiplier is applied here so spoken numbers stay
    /// meaningful at any speed.
    pub fn process(
        &mut self,
        action: &TimelineAction,
        seconds_until: f64,
        ctx: &TickContext,
    ) -> Option<Announcement> {
        if !self.active || !action.audio_announce {
            return None;
        }
        // Stale: the action's window closed before we saw it (app resume,
        // long pause). Never announce retroactively.
        if seconds_until < defaults::STALE_CUTOFF_SECS {
            return None;
        }

        let speed = ctx
            .speed_multiplier
            .clamp(defaults::MIN_SPEED_MULTIPLIER, defaults::MAX_SPEED_MULTIPLIER);
        let adjusted = seconds_until / speed;
        let notice_at = action.notice_seconds.unwrap_or(ctx.default_notice_seconds) as f64;
        let countdown = resolve_countdown(action, ctx);

        let prev = self.last_adjusted.get(&action.id).copied();
        // Crossing, not equality: fires even when whole seconds are
        // skipped in one tick. The very first tick for an action has no
        // prior value and falls back to exact equality.
        let crossed = |threshold: f64| match prev {
            Some(p) => p > threshold && adjusted <= threshold,
            None => adjusted == threshold,
        };

        trace!(
            action = %action.id,
            adjusted,
            ?prev,
            "announcer tick"
        );

        let announcement = if crossed(notice_at) && !self.has_fired(&action.id, Phase::Notice) {
            Some(self.fire_notice(action, speed))
        } else if crossed(0.0) && !self.has_fired(&action.id, Phase::Trigger) {
            Some(self.fire_trigger(action, &countdown, speed))
        } else {
            self.fire_lowest_crossed_countdown(action, &countdown, crossed, speed)
        };

        // The previous value is kept while phases are firing so one large
        // jump across several thresholds still fires the remaining phases
        // on the immediately following ticks.
        if announcement.is_none() {
            self.last_adjusted.insert(action.id.clone(), adjusted);
        }
        announcement
    }

    fn has_fired(&self, action_id: &str, phase: Phase) -> bool {
        self.fired.contains(&(action_id.to_string(), phase))
    }

    fn mark_fired(&mut self, action_id: &str, phase: Phase) {
        self.fired.insert((action_id.to_string(), phase));
    }

    fn fire_notice(&mut self, action: &TimelineAction, speed: f64) -> Announcement {
        self.mark_fired(&action.id, Phase::Notice);
        let spoken = match self.resolve_cue(action) {
            CueOutcome::PackPlayed => None,
            CueOutcome::Text(text) => {
                let phrase = if action.announce_action_name {
                    format!("Get ready to {text}")
                } else {
                    "Get ready".to_string()
                };
                self.say(&phrase, defaults::NOTICE_SPEECH_RATE * speed as f32);
                Some(phrase)
            }
        };
        debug!(action = %action.id, "notice fired");
        Announcement {
            action_id: action.id.clone(),
            phase: Phase::Notice,
            spoken,
        }
    }

    fn fire_trigger(
        &mut self,
        action: &TimelineAction,
        countdown: &[u32],
        speed: f64,
    ) -> Announcement {
        self.mark_fired(&action.id, Phase::Trigger);
        // A countdown number skipped over must never fire after the
        // trigger; absorb everything still pending.
        for &n in countdown {
            self.mark_fired(&action.id, Phase::Countdown(n));
        }
        self.backend.vibrate(action.haptic_pattern);
        let spoken = match self.resolve_cue(action) {
            CueOutcome::PackPlayed => None,
            CueOutcome::Text(_) => {
                let phrase = "Now!".to_string();
                self.say(&phrase, defaults::TRIGGER_SPEECH_RATE * speed as f32);
                Some(phrase)
            }
        };
        debug!(action = %action.id, "trigger fired");
        Announcement {
            action_id: action.id.clone(),
            phase: Phase::Trigger,
            spoken,
        }
    }

    fn fire_lowest_crossed_countdown(
        &mut self,
        action: &TimelineAction,
        countdown: &[u32],
        crossed: impl Fn(f64) -> bool,
        speed: f64,
    ) -> Option<Announcement> {
        let mut ascending: Vec<u32> = countdown.to_vec();
        ascending.sort_unstable();
        ascending.dedup();

        for &n in &ascending {
            if !crossed(n as f64) || self.has_fired(&action.id, Phase::Countdown(n)) {
                continue;
            }
            // Only the most imminent crossed number speaks; anything
            // larger was skipped over and stays silent.
            for &larger in ascending.iter().filter(|&&v| v >= n) {
                self.mark_fired(&action.id, Phase::Countdown(larger));
            }
            let first_spoken = self.countdown_spoken.insert(action.id.clone());
            let text = if first_spoken && action.announce_action_name {
                format!("{} in {}", action.action, n)
            } else {
                n.to_string()
            };
            let spoken = match self.resolve_cue(action) {
                CueOutcome::PackPlayed => None,
                CueOutcome::Text(_) => {
                    self.say(&text, defaults::COUNTDOWN_SPEECH_RATE * speed as f32);
                    Some(text)
                }
            };
            debug!(action = %action.id, n, "countdown fired");
            return Some(Announcement {
                action_id: action.id.clone(),
                phase: Phase::Countdown(n),
                spoken,
            });
        }
        None
    }

    /// Resource-pack fallback chain, identical for every phase: random
    /// cue pool, then the single cue, then fallback text, then the raw
    /// action text. A pack returning true ends the chain.
    fn resolve_cue(&mut self, action: &TimelineAction) -> CueOutcome {
        if let (Some(cues), Some(pack)) = (&action.random_cues, &action.pack)
            && !cues.is_empty()
        {
            use rand::seq::IndexedRandom;
            if let Some(cue) = cues.choose(&mut rand::rng())
                && self.backend.play_cue(cue, pack)
            {
                return CueOutcome::PackPlayed;
            }
        }
        if let (Some(cue), Some(pack)) = (&action.cue, &action.pack)
            && self.backend.play_cue(cue, pack)
        {
            return CueOutcome::PackPlayed;
        }
        let text = action
            .fallback_text
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| action.action.clone());
        CueOutcome::Text(text)
    }

    fn say(&mut self, text: &str, rate: f32) {
        if self.muted {
            return;
        }
        match self.mode {
            AudioMode::Tts => self.backend.speak(text, rate),
            AudioMode::Tone => self.backend.beep(),
            AudioMode::VisualOnly => {}
        }
    }
}

fn resolve_countdown(action: &TimelineAction, ctx: &TickContext) -> Vec<u32> {
    if let Some(explicit) = &action.countdown_seconds {
        explicit.clone()
    } else if ctx.default_countdown {
        let d = ctx.default_countdown_seconds.max(1);
        (1..=d).rev().collect()
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announce::backend::{BackendCall, MockAudioBackend};
    use crate::event::TimelineAction;
    use chrono::{TimeZone, Utc};

    fn test_action() -> TimelineAction {
        TimelineAction::new(
            "a1",
            Utc.timestamp_opt(1_735_689_605, 0).unwrap(),
            "raise sign",
        )
        .with_notice(5)
        .with_countdown([5, 4, 3, 2, 1])
    }

    fn announcer_with_mock() -> (Announcer, std::sync::Arc<std::sync::Mutex<Vec<BackendCall>>>) {
        let backend = MockAudioBackend::new();
        let calls = backend.calls();
        let mut announcer = Announcer::new(Box::new(backend));
        announcer.start();
        (announcer, calls)
    }

    /// Drive seconds_until from `from` down past `to` in fixed steps,
    /// collecting everything that fires.
    fn drive(
        announcer: &mut Announcer,
        action: &TimelineAction,
        from: f64,
        to: f64,
        step: f64,
        ctx: &TickContext,
    ) -> Vec<Announcement> {
        let mut fired = Vec::new();
        let mut s = from;
        while s >= to - 1e-9 {
            if let Some(a) = announcer.process(action, s, ctx) {
                fired.push(a);
            }
            s -= step;
        }
        fired
    }

    #[test]
    fn test_full_sequence_fine_steps() {
        let (mut announcer, _calls) = announcer_with_mock();
        let action = test_action();
        let fired = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &TickContext::default());

        let phases: Vec<Phase> = fired.iter().map(|a| a.phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Notice,
                Phase::Countdown(5),
                Phase::Countdown(4),
                Phase::Countdown(3),
                Phase::Countdown(2),
                Phase::Countdown(1),
                Phase::Trigger,
            ]
        );
        assert_eq!(fired[0].spoken.as_deref(), Some("Get ready to raise sign"));
        // First spoken countdown carries the action prefix, the rest are bare.
        assert_eq!(fired[1].spoken.as_deref(), Some("raise sign in 5"));
        assert_eq!(fired[2].spoken.as_deref(), Some("4"));
        assert_eq!(fired[5].spoken.as_deref(), Some("1"));
        assert_eq!(fired[6].spoken.as_deref(), Some("Now!"));
    }

    #[test]
    fn test_coarse_steps_skip_but_never_repeat_or_drop_trigger() {
        let (mut announcer, _calls) = announcer_with_mock();
        let action = test_action();
        let fired = drive(&mut announcer, &action, 6.0, -1.0, 1.7, &TickContext::default());

        let triggers = fired.iter().filter(|a| a.phase == Phase::Trigger).count();
        let notices = fired.iter().filter(|a| a.phase == Phase::Notice).count();
        assert_eq!(triggers, 1, "trigger must fire exactly once: {fired:?}");
        assert_eq!(notices, 1);

        // No phase fires twice.
        let mut seen = std::collections::HashSet::new();
        for a in &fired {
            assert!(seen.insert(a.phase), "repeated phase {:?}", a.phase);
        }
        // Skipped countdown numbers stay silent; fewer than five spoke.
        let countdowns = fired
            .iter()
            .filter(|a| matches!(a.phase, Phase::Countdown(_)))
            .count();
        assert!(countdowns < 5);
    }

    #[test]
    fn test_single_giant_jump_still_fires_trigger_after_notice() {
        let (mut announcer, _calls) = announcer_with_mock();
        let action = test_action();
        let ctx = TickContext::default();

        assert!(announcer.process(&action, 6.0, &ctx).is_none());
        // One tick jumps from before the notice to past the trigger.
        let first = announcer.process(&action, -0.5, &ctx).unwrap();
        assert_eq!(first.phase, Phase::Notice);
        // The crossing is still pending for the trigger on the next tick.
        let second = announcer.process(&action, -0.6, &ctx).unwrap();
        assert_eq!(second.phase, Phase::Trigger);
        // Countdowns were absorbed by the trigger; nothing fires late.
        assert!(announcer.process(&action, -0.7, &ctx).is_none());
    }

    #[test]
    fn test_rerun_is_deduped_until_reset() {
        let (mut announcer, _calls) = announcer_with_mock();
        let action = test_action();
        let ctx = TickContext::default();

        let first = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &ctx);
        assert_eq!(first.len(), 7);
        let rerun = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &ctx);
        assert!(rerun.is_empty(), "dedup must hold across reruns: {rerun:?}");

        announcer.start(); // fresh session clears dedup
        let fresh = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &ctx);
        assert_eq!(fresh.len(), 7);
    }

    #[test]
    fn test_stale_actions_never_announce() {
        let (mut announcer, calls) = announcer_with_mock();
        let action = test_action();
        assert!(announcer
            .process(&action, -3.0, &TickContext::default())
            .is_none());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_audio_announce_false_disables_everything() {
        let (mut announcer, calls) = announcer_with_mock();
        let mut action = test_action();
        action.audio_announce = false;
        let fired = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &TickContext::default());
        assert!(fired.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_inactive_announcer_is_a_no_op() {
        let backend = MockAudioBackend::new();
        let mut announcer = Announcer::new(Box::new(backend));
        // Never started.
        assert!(announcer
            .process(&test_action(), 5.0, &TickContext::default())
            .is_none());
    }

    #[test]
    fn test_speed_multiplier_rescales_thresholds() {
        let (mut announcer, _calls) = announcer_with_mock();
        let action = test_action();
        let ctx = TickContext {
            speed_multiplier: 2.0,
            ..TickContext::default()
        };
        // Real seconds run twice as fast; notice lands at 10 real seconds
        // out and spoken numbers stay 5..1.
        let fired = drive(&mut announcer, &action, 12.0, -2.0, 0.4, &ctx);
        let phases: Vec<Phase> = fired.iter().map(|a| a.phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Notice,
                Phase::Countdown(5),
                Phase::Countdown(4),
                Phase::Countdown(3),
                Phase::Countdown(2),
                Phase::Countdown(1),
                Phase::Trigger,
            ]
        );
        assert_eq!(fired[1].spoken.as_deref(), Some("raise sign in 5"));
    }

    #[test]
    fn test_default_countdown_synthesized_from_event() {
        let (mut announcer, _calls) = announcer_with_mock();
        let mut action = test_action();
        action.countdown_seconds = None;
        let ctx = TickContext {
            default_countdown: true,
            default_countdown_seconds: 3,
            ..TickContext::default()
        };
        let fired = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &ctx);
        let countdowns: Vec<Phase> = fired
            .iter()
            .filter(|a| matches!(a.phase, Phase::Countdown(_)))
            .map(|a| a.phase)
            .collect();
        assert_eq!(
            countdowns,
            vec![Phase::Countdown(3), Phase::Countdown(2), Phase::Countdown(1)]
        );
    }

    #[test]
    fn test_no_countdown_without_explicit_or_default() {
        let (mut announcer, _calls) = announcer_with_mock();
        let mut action = test_action();
        action.countdown_seconds = None;
        let fired = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &TickContext::default());
        let phases: Vec<Phase> = fired.iter().map(|a| a.phase).collect();
        assert_eq!(phases, vec![Phase::Notice, Phase::Trigger]);
    }

    #[test]
    fn test_resolved_pack_cue_skips_speech() {
        let backend = MockAudioBackend::new().with_cue_resolution();
        let calls = backend.calls();
        let mut announcer = Announcer::new(Box::new(backend));
        announcer.start();

        let action = test_action().with_cue("horn", "stadium");
        let fired = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &TickContext::default());

        assert_eq!(fired.len(), 7);
        assert!(fired.iter().all(|a| a.spoken.is_none()));
        let recorded = calls.lock().unwrap();
        assert!(recorded
            .iter()
            .all(|c| !matches!(c, BackendCall::Speak { .. })));
        assert!(recorded
            .iter()
            .any(|c| matches!(c, BackendCall::PlayCue { cue, pack } if cue == "horn" && pack == "stadium")));
    }

    #[test]
    fn test_random_cue_pool_picks_from_set() {
        let backend = MockAudioBackend::new().with_cue_resolution();
        let calls = backend.calls();
        let mut announcer = Announcer::new(Box::new(backend));
        announcer.start();

        let mut action = test_action();
        action.random_cues = Some(vec!["horn1".to_string(), "horn2".to_string()]);
        action.pack = Some("stadium".to_string());
        let fired = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &TickContext::default());
        assert!(!fired.is_empty());

        let recorded = calls.lock().unwrap();
        for call in recorded.iter() {
            if let BackendCall::PlayCue { cue, .. } = call {
                assert!(cue == "horn1" || cue == "horn2", "unexpected cue {cue}");
            }
        }
    }

    #[test]
    fn test_unresolved_cue_falls_back_to_text() {
        // Pack present but play_cue returns false.
        let (mut announcer, calls) = announcer_with_mock();
        let mut action = test_action().with_cue("horn", "stadium");
        action.fallback_text = Some("lift the banner".to_string());
        let fired = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &TickContext::default());

        assert_eq!(
            fired[0].spoken.as_deref(),
            Some("Get ready to lift the banner")
        );
        let recorded = calls.lock().unwrap();
        assert!(recorded
            .iter()
            .any(|c| matches!(c, BackendCall::Speak { .. })));
    }

    #[test]
    fn test_empty_fallback_text_uses_action_text() {
        let (mut announcer, _calls) = announcer_with_mock();
        let mut action = test_action();
        action.fallback_text = Some("   ".to_string());
        let fired = drive(&mut announcer, &action, 6.0, 4.0, 0.2, &TickContext::default());
        assert_eq!(fired[0].spoken.as_deref(), Some("Get ready to raise sign"));
    }

    #[test]
    fn test_announce_action_name_false_shortens_phrases() {
        let (mut announcer, _calls) = announcer_with_mock();
        let mut action = test_action();
        action.announce_action_name = false;
        let fired = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &TickContext::default());
        assert_eq!(fired[0].spoken.as_deref(), Some("Get ready"));
        assert_eq!(fired[1].spoken.as_deref(), Some("5"));
    }

    #[test]
    fn test_visual_only_mode_without_speech_or_tone() {
        let backend = MockAudioBackend::new().without_audio();
        let calls = backend.calls();
        let mut announcer = Announcer::new(Box::new(backend));
        announcer.start();
        assert_eq!(announcer.mode(), AudioMode::VisualOnly);

        let action = test_action();
        let fired = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &TickContext::default());
        // Bookkeeping and haptics continue; nothing is spoken.
        assert_eq!(fired.len(), 7);
        assert!(fired[0].spoken.is_some());
        let recorded = calls.lock().unwrap();
        assert!(recorded
            .iter()
            .all(|c| matches!(c, BackendCall::Vibrate(_) | BackendCall::PlayCue { .. })));
    }

    #[test]
    fn test_tone_mode_beeps_instead_of_speaking() {
        let backend = MockAudioBackend::new().without_speech();
        let calls = backend.calls();
        let mut announcer = Announcer::new(Box::new(backend));
        announcer.start();
        assert_eq!(announcer.mode(), AudioMode::Tone);

        let action = test_action();
        drive(&mut announcer, &action, 6.0, -1.0, 0.2, &TickContext::default());
        let recorded = calls.lock().unwrap();
        assert!(recorded.iter().any(|c| matches!(c, BackendCall::Beep)));
        assert!(recorded
            .iter()
            .all(|c| !matches!(c, BackendCall::Speak { .. })));
    }

    #[test]
    fn test_mute_suppresses_speech_but_not_dedup_or_haptics() {
        let (mut announcer, calls) = announcer_with_mock();
        announcer.set_muted(true);
        let action = test_action();
        let fired = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &TickContext::default());

        assert_eq!(fired.len(), 7);
        let recorded = calls.lock().unwrap();
        assert!(recorded
            .iter()
            .all(|c| !matches!(c, BackendCall::Speak { .. })));
        assert!(recorded
            .iter()
            .any(|c| matches!(c, BackendCall::Vibrate(_))));
    }

    #[test]
    fn test_trigger_vibrates_action_pattern() {
        use crate::announce::haptics::HapticPattern;
        let (mut announcer, calls) = announcer_with_mock();
        let action = test_action().with_haptic(HapticPattern::Triple);
        drive(&mut announcer, &action, 1.0, -1.0, 0.2, &TickContext::default());
        let recorded = calls.lock().unwrap();
        assert!(recorded
            .iter()
            .any(|c| *c == BackendCall::Vibrate(HapticPattern::Triple)));
    }

    #[test]
    fn test_stop_keeps_dedup_resume_continues() {
        let (mut announcer, _calls) = announcer_with_mock();
        let action = test_action();
        let ctx = TickContext::default();

        let first = drive(&mut announcer, &action, 6.0, 4.5, 0.2, &ctx);
        assert_eq!(first.len(), 2); // notice + countdown 5

        announcer.stop();
        assert!(announcer.process(&action, 4.0, &ctx).is_none());

        announcer.resume();
        let rest = drive(&mut announcer, &action, 4.4, -1.0, 0.2, &ctx);
        let phases: Vec<Phase> = rest.iter().map(|a| a.phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Countdown(4),
                Phase::Countdown(3),
                Phase::Countdown(2),
                Phase::Countdown(1),
                Phase::Trigger,
            ]
        );
    }

    #[test]
    fn test_unordered_countdown_list_is_normalized() {
        let (mut announcer, _calls) = announcer_with_mock();
        let action = TimelineAction::new(
            "a1",
            Utc.timestamp_opt(1_735_689_605, 0).unwrap(),
            "chant",
        )
        .with_notice(10)
        .with_countdown([1, 5, 3]);
        let fired = drive(&mut announcer, &action, 6.0, -1.0, 0.2, &TickContext::default());
        let countdowns: Vec<Phase> = fired
            .iter()
            .filter(|a| matches!(a.phase, Phase::Countdown(_)))
            .map(|a| a.phase)
            .collect();
        assert_eq!(
            countdowns,
            vec![Phase::Countdown(5), Phase::Countdown(3), Phase::Countdown(1)]
        );
    }
}
