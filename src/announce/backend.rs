//! Platform audio adapter contract.
//!
//! The announcement machine never talks to a speech synthesizer, vibration
//! motor or resource pack directly; it goes through [`AudioBackend`]. This
//! keeps the machine testable (mock backend) and lets each platform bring
//! its own adapter.

use crate::announce::haptics::HapticPattern;
use std::sync::{Arc, Mutex};

/// What a platform adapter can actually do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioCapabilities {
    /// Speech synthesis is available.
    pub speech: bool,
    /// A simple beep tone is available.
    pub tone: bool,
}

/// Thin platform adapter for audio and haptic output.
///
/// All calls are fire-and-forget: the machine never waits on playback
/// completion before the next tick.
pub trait AudioBackend: Send {
    /// Speak text at a relative rate (1.0 = platform default).
    fn speak(&mut self, text: &str, rate: f32);

    /// Run a vibration pattern.
    fn vibrate(&mut self, pattern: HapticPattern);

    /// Play a pre-recorded cue from a resource pack. Returns true if the
    /// pack actually played something; false falls back to speech.
    fn play_cue(&mut self, cue_id: &str, pack_id: &str) -> bool;

    /// Emit a short tone. Used in tone fallback mode when speech synthesis
    /// is unavailable.
    fn beep(&mut self) {}

    fn capabilities(&self) -> AudioCapabilities {
        AudioCapabilities {
            speech: true,
            tone: false,
        }
    }

    /// Release platform resources and halt any in-flight utterance.
    fn release(&mut self) {}

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "audio"
    }
}

/// One recorded backend call, for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Speak { text: String, rate: f32 },
    Vibrate(HapticPattern),
    PlayCue { cue: String, pack: String },
    Beep,
}

/// Mock backend for testing. Records every call; configurable pack
/// resolution and capabilities.
#[derive(Debug, Clone)]
pub struct MockAudioBackend {
    calls: Arc<Mutex<Vec<BackendCall>>>,
    cue_resolves: bool,
    capabilities: AudioCapabilities,
}

impl MockAudioBackend {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            cue_resolves: false,
            capabilities: AudioCapabilities {
                speech: true,
                tone: true,
            },
        }
    }

    /// Configure the mock so resource-pack cues resolve and play.
    pub fn with_cue_resolution(mut self) -> Self {
        self.cue_resolves = true;
        self
    }

    /// Configure the mock as a platform without speech synthesis.
    pub fn without_speech(mut self) -> Self {
        self.capabilities.speech = false;
        self
    }

    /// Configure the mock as a platform with no audio output at all.
    pub fn without_audio(mut self) -> Self {
        self.capabilities = AudioCapabilities {
            speech: false,
            tone: false,
        };
        self
    }

    /// Shared handle to the recorded calls; clone before boxing the mock.
    pub fn calls(&self) -> Arc<Mutex<Vec<BackendCall>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: BackendCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Default for MockAudioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for MockAudioBackend {
    fn speak(&mut self, text: &str, rate: f32) {
        self.record(BackendCall::Speak {
            text: text.to_string(),
            rate,
        });
    }

    fn vibrate(&mut self, pattern: HapticPattern) {
        self.record(BackendCall::Vibrate(pattern));
    }

    fn play_cue(&mut self, cue_id: &str, pack_id: &str) -> bool {
        self.record(BackendCall::PlayCue {
            cue: cue_id.to_string(),
            pack: pack_id.to_string(),
        });
        self.cue_resolves
    }

    fn beep(&mut self) {
        self.record(BackendCall::Beep);
    }

    fn capabilities(&self) -> AudioCapabilities {
        self.capabilities
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Console backend: prints announcements to stdout. Used by the CLI
/// simulator; has speech "available" in the sense that text is rendered.
#[derive(Debug, Default)]
pub struct ConsoleBackend;

impl AudioBackend for ConsoleBackend {
    fn speak(&mut self, text: &str, rate: f32) {
        println!("  [speak x{rate:.1}] {text}");
    }

    fn vibrate(&mut self, pattern: HapticPattern) {
        println!("  [vibrate] {:?} {:?}ms", pattern, pattern.timings_ms());
    }

    fn play_cue(&mut self, _cue_id: &str, _pack_id: &str) -> bool {
        // No packs on the console; always fall through to text.
        false
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls_in_order() {
        let mut backend = MockAudioBackend::new();
        let calls = backend.calls();

        backend.speak("Get ready", 1.0);
        backend.vibrate(HapticPattern::Double);
        assert!(!backend.play_cue("horn", "stadium"));

        let recorded = calls.lock().unwrap();
        assert_eq!(recorded.len(), 3);
        assert_eq!(
            recorded[0],
            BackendCall::Speak {
                text: "Get ready".to_string(),
                rate: 1.0
            }
        );
        assert_eq!(recorded[1], BackendCall::Vibrate(HapticPattern::Double));
    }

    #[test]
    fn test_mock_cue_resolution_configurable() {
        let mut backend = MockAudioBackend::new().with_cue_resolution();
        assert!(backend.play_cue("horn", "stadium"));
    }

    #[test]
    fn test_mock_capability_builders() {
        let silent = MockAudioBackend::new().without_speech();
        assert!(!silent.capabilities().speech);
        assert!(silent.capabilities().tone);

        let mute = MockAudioBackend::new().without_audio();
        assert!(!mute.capabilities().speech);
        assert!(!mute.capabilities().tone);
    }

    #[test]
    fn test_backend_trait_is_object_safe() {
        let mut backend: Box<dyn AudioBackend> = Box::new(MockAudioBackend::new());
        backend.speak("boxed", 1.0);
        assert_eq!(backend.name(), "mock");
    }
}
