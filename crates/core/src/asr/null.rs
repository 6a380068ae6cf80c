use crate::asr::{AsrError, Transcriber, Transcript, TranscriptOutcome};
use crate::audio::AudioClip;
use futures::future::BoxFuture;
use futures::FutureExt;

/// Transcriber that hears nothing. Stands in when the crate is built
/// without the whisper backend and in tests; the pipeline then runs on the
/// acoustic signal alone.
#[derive(Clone, Debug, Default)]
pub struct NullTranscriber;

impl NullTranscriber {
    pub fn new() -> Self {
        Self
    }
}

impl Transcriber for NullTranscriber {
    fn transcribe(&self, clip: AudioClip) -> BoxFuture<'_, Result<Transcript, AsrError>> {
        async move {
            Ok(Transcript {
                outcome: TranscriptOutcome::NoSpeech,
                audio_duration: clip.duration(),
            })
        }
        .boxed()
    }
}
