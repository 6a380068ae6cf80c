use crate::asr::{AsrError, Transcriber, Transcript, TranscriptOutcome};
use crate::audio::{self, AudioClip};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Sample rate the whisper models are trained on.
pub const WHISPER_SAMPLE_RATE_HZ: u32 = 16_000;

/// Local whisper.cpp transcription. The model is loaded once at
/// construction and the handle shared; input at other sample rates is
/// resampled to 16 kHz before inference.
#[derive(Clone)]
pub struct WhisperTranscriber {
    ctx: Arc<WhisperContext>,
    language: String,
    n_threads: i32,
}

impl WhisperTranscriber {
    pub fn new(model_path: &Path, language: &str) -> Result<Self, AsrError> {
        Self::validate_model(model_path)?;

        info!(path = %model_path.display(), "loading whisper model");
        let path_str = model_path
            .to_str()
            .ok_or_else(|| AsrError::ModelLoad("model path is not valid UTF-8".to_owned()))?;
        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| AsrError::ModelLoad(e.to_string()))?;

        let n_threads = std::thread::available_parallelism()
            .map(|n| n.get().min(8) as i32)
            .unwrap_or(4);

        Ok(Self {
            ctx: Arc::new(ctx),
            language: language.to_owned(),
            n_threads,
        })
    }

    fn validate_model(path: &Path) -> Result<(), AsrError> {
        if !path.exists() {
            return Err(AsrError::ModelLoad(format!(
                "model file not found: {}",
                path.display()
            )));
        }
        let size_mb = std::fs::metadata(path)
            .map_err(|e| AsrError::ModelLoad(e.to_string()))?
            .len()
            / (1024 * 1024);
        // ggml-tiny is ~75 MB; anything far outside the known range is not
        // a whisper model.
        if !(30..=4000).contains(&size_mb) {
            return Err(AsrError::ModelLoad(format!(
                "model file size {size_mb} MB outside expected range for a ggml whisper model"
            )));
        }
        Ok(())
    }

    fn run_inference(&self, samples: &[f32]) -> Result<String, AsrError> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.n_threads);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        if self.language != "auto" {
            params.set_language(Some(&self.language));
        }

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| AsrError::Inference(e.to_string()))?;
        state
            .full(params, samples)
            .map_err(|e| AsrError::Inference(e.to_string()))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| AsrError::Inference(e.to_string()))?;

        let mut parts = Vec::new();
        for i in 0..num_segments {
            if let Ok(segment_text) = state.full_get_segment_text(i) {
                let trimmed = segment_text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_owned());
                }
            }
        }
        Ok(parts.join(" "))
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, clip: AudioClip) -> BoxFuture<'_, Result<Transcript, AsrError>> {
        async move {
            let audio_duration = clip.duration();
            let samples = if clip.sample_rate_hz == WHISPER_SAMPLE_RATE_HZ {
                clip.samples
            } else {
                audio::resample(&clip.samples, clip.sample_rate_hz, WHISPER_SAMPLE_RATE_HZ)
                    .map_err(|e| AsrError::Inference(e.to_string()))?
            };

            let started = std::time::Instant::now();
            let text = self.run_inference(&samples)?;
            debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                chars = text.len(),
                "transcription complete"
            );

            Ok(Transcript {
                outcome: TranscriptOutcome::from_text(text),
                audio_duration,
            })
        }
        .boxed()
    }
}
