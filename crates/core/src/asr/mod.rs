mod null;
#[cfg(feature = "whisper-rs")]
mod whisper;

use crate::audio::AudioClip;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use null::NullTranscriber;
#[cfg(feature = "whisper-rs")]
pub use whisper::WhisperTranscriber;

/// Outcome of one transcription attempt. Unintelligible audio and backend
/// failure are kept apart so callers can tell them apart, but both read as
/// empty text and default into the same neutral-text fusion path.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum TranscriptOutcome {
    Text(String),
    NoSpeech,
    ServiceUnavailable(String),
}

impl TranscriptOutcome {
    /// Build from raw decoder output; blank text reads as no speech.
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Self::NoSpeech
        } else {
            Self::Text(text)
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Text(t) => t,
            Self::NoSpeech | Self::ServiceUnavailable(_) => "",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    pub outcome: TranscriptOutcome,
    pub audio_duration: Duration,
}

#[derive(thiserror::Error, Debug)]
pub enum AsrError {
    #[error("model load failed: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

pub trait Transcriber: Send + Sync {
    fn transcribe(&self, clip: AudioClip) -> BoxFuture<'_, Result<Transcript, AsrError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_reads_as_no_speech() {
        assert_eq!(
            TranscriptOutcome::from_text("  \n".to_owned()),
            TranscriptOutcome::NoSpeech
        );
        assert_eq!(
            TranscriptOutcome::from_text("hello".to_owned()),
            TranscriptOutcome::Text("hello".to_owned())
        );
    }

    #[test]
    fn failure_outcomes_read_as_empty_text() {
        assert_eq!(TranscriptOutcome::NoSpeech.text(), "");
        assert_eq!(
            TranscriptOutcome::ServiceUnavailable("down".to_owned()).text(),
            ""
        );
        assert_eq!(TranscriptOutcome::Text("hi".to_owned()).text(), "hi");
    }
}
