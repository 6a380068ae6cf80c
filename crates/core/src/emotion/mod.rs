//! The decision engine: a fixed-threshold audio emotion rule and the
//! confidence-gated fusion of the audio and text signals.

use crate::features::AudioFeatures;
use serde::{Deserialize, Serialize};
use std::fmt;

// Reference decision-tree constants. Changing any of these changes the
// observable label for real recordings.
pub const SAD_ENERGY_MAX: f32 = 0.02;
pub const SAD_PITCH_MAX_HZ: f32 = 100.0;
pub const HAPPY_PITCH_MIN_HZ: f32 = 200.0;
pub const HAPPY_ENERGY_MIN: f32 = 0.05;
pub const ANGRY_ENERGY_MIN: f32 = 0.04;
pub const ANGRY_PITCH_MAX_HZ: f32 = 150.0;

/// Text confidence above which the text label wins outright.
pub const TEXT_CONFIDENCE_GATE: f32 = 0.7;
/// Minimum energy for the audio label to override uncertain text.
pub const AUDIO_TRUST_ENERGY_MIN: f32 = 0.03;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AudioEmotion {
    Sad,
    Happy,
    Angry,
    Neutral,
}

impl AudioEmotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sad => "sad",
            Self::Happy => "happy",
            Self::Angry => "angry",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for AudioEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FusionResult {
    pub audio_emotion: AudioEmotion,
    pub final_emotion: String,
}

/// Map features to a coarse emotion. First match wins; the rule order is
/// part of the contract. The spectral centroid is deliberately unused.
pub fn classify_audio_emotion(features: &AudioFeatures) -> AudioEmotion {
    if features.energy < SAD_ENERGY_MAX && features.pitch_hz < SAD_PITCH_MAX_HZ {
        AudioEmotion::Sad
    } else if features.pitch_hz > HAPPY_PITCH_MIN_HZ && features.energy > HAPPY_ENERGY_MIN {
        AudioEmotion::Happy
    } else if features.energy > ANGRY_ENERGY_MIN && features.pitch_hz < ANGRY_PITCH_MAX_HZ {
        AudioEmotion::Angry
    } else {
        AudioEmotion::Neutral
    }
}

/// Reconcile the audio-derived label with the text classifier's output.
///
/// A confident text label wins outright. Otherwise the audio label is
/// preferred only when the signal itself was strong enough to trust; weak
/// audio falls back to the text label even at low confidence. The final
/// label is always one of the two inputs, never a blend.
///
/// Callers must normalize blank text to `("neutral", 0.0)` first (see
/// `classify::resolve_text_emotion`), so `final_emotion` is never empty.
pub fn fuse(features: &AudioFeatures, text_label: &str, text_confidence: f32) -> FusionResult {
    let audio_emotion = classify_audio_emotion(features);

    let final_emotion = if text_confidence > TEXT_CONFIDENCE_GATE {
        text_label.to_owned()
    } else if features.energy > AUDIO_TRUST_ENERGY_MIN {
        audio_emotion.as_str().to_owned()
    } else {
        text_label.to_owned()
    };

    FusionResult {
        audio_emotion,
        final_emotion,
    }
}
