use crate::asr::{Transcriber, TranscriptOutcome};
use crate::audio::AudioClip;
use crate::classify::{resolve_text_emotion, ClassifyError, TextEmotion, TextEmotionClassifier};
use crate::config::{AppConfig, TimeoutBudget};
use crate::emotion::{self, AudioEmotion};
use crate::features::{self, AudioFeatures, FeatureConfig, FeatureError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("feature extraction failed: {0}")]
    Feature(#[from] FeatureError),

    #[error("text classification failed: {0}")]
    Classify(#[from] ClassifyError),

    #[error("text classification timed out after {0:?}")]
    ClassifyTimeout(Duration),
}

#[derive(Clone, Debug, Default)]
pub struct PipelineConfig {
    pub timeout: TimeoutBudget,
    pub features: FeatureConfig,
}

impl PipelineConfig {
    pub fn from_app(app: &AppConfig) -> Self {
        Self {
            timeout: app.timeout,
            features: FeatureConfig::default(),
        }
    }
}

/// Everything one analysis produced, for display or JSON output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub features: AudioFeatures,
    pub transcript: TranscriptOutcome,
    pub text_emotion: TextEmotion,
    pub audio_emotion: AudioEmotion,
    pub final_emotion: String,
}

/// One-shot analysis engine. Both external collaborators are injected at
/// construction; nothing is shared between invocations.
pub struct AnalysisPipeline<T, C> {
    transcriber: T,
    classifier: C,
    config: PipelineConfig,
}

impl<T, C> AnalysisPipeline<T, C>
where
    T: Transcriber,
    C: TextEmotionClassifier,
{
    pub fn new(transcriber: T, classifier: C, config: PipelineConfig) -> Self {
        Self {
            transcriber,
            classifier,
            config,
        }
    }

    /// Run one full analysis: extract features, transcribe, classify the
    /// transcript, fuse. Feature extraction and classification failures
    /// abort the request; a transcription failure never does, it collapses
    /// into the empty-text path.
    pub async fn analyze(&self, clip: AudioClip) -> Result<AnalysisReport, PipelineError> {
        let features = features::extract_features(&clip, &self.config.features)?;
        debug!(
            pitch_hz = features.pitch_hz,
            energy = features.energy,
            centroid_hz = features.spectral_centroid_hz,
            "features extracted"
        );

        let budget = self.config.timeout.duration();
        let transcript =
            match tokio::time::timeout(budget, self.transcriber.transcribe(clip)).await {
                Ok(Ok(t)) => t.outcome,
                Ok(Err(e)) => {
                    warn!(error = %e, "transcription failed, proceeding without text");
                    TranscriptOutcome::ServiceUnavailable(e.to_string())
                }
                Err(_) => {
                    warn!(timeout_ms = self.config.timeout.target_ms, "transcription timed out");
                    TranscriptOutcome::ServiceUnavailable("timed out".to_owned())
                }
            };

        let text = transcript.text().to_owned();
        let text_emotion =
            match tokio::time::timeout(budget, resolve_text_emotion(&text, &self.classifier)).await
            {
                Ok(result) => result?,
                Err(_) => return Err(PipelineError::ClassifyTimeout(budget)),
            };

        let fusion = emotion::fuse(&features, &text_emotion.label, text_emotion.confidence);
        debug!(
            audio = %fusion.audio_emotion,
            text = %text_emotion.label,
            "final emotion: {}",
            fusion.final_emotion
        );

        Ok(AnalysisReport {
            features,
            transcript,
            text_emotion,
            audio_emotion: fusion.audio_emotion,
            final_emotion: fusion.final_emotion,
        })
    }

    /// Text-only mode: classify supplied text directly, no audio involved.
    pub async fn analyze_text(&self, text: &str) -> Result<TextEmotion, PipelineError> {
        let budget = self.config.timeout.duration();
        match tokio::time::timeout(budget, resolve_text_emotion(text, &self.classifier)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(PipelineError::ClassifyTimeout(budget)),
        }
    }
}
