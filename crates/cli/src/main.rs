#![deny(warnings)]

use anyhow::Context;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "whisper-rs")]
use speech_emotion_core::asr::WhisperTranscriber;
use speech_emotion_core::asr::{NullTranscriber, TranscriptOutcome};
use speech_emotion_core::audio::load_wav;
use speech_emotion_core::classify::{
    Classifier, LexiconClassifier, RemoteTextClassifier, TextEmotion,
};
use speech_emotion_core::config::{
    resolve_api_key, resolve_optional_string, resolve_string_with_default, AppConfig,
    ClassifierConfig, ConfigError, InputMode, StdEnv, TimeoutBudget, WhisperConfig,
    DEFAULT_CLASSIFIER_URL, DEFAULT_LANGUAGE, DEFAULT_TIMEOUT_MS, ENV_CLASSIFIER_API_KEY,
    ENV_CLASSIFIER_URL, ENV_WHISPER_MODEL,
};
use speech_emotion_core::pipeline::{AnalysisPipeline, AnalysisReport, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "speech-emotion")]
#[command(about = "Detect emotion from speech (acoustic features + transcription + text fusion)")]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .multiple(false)
        .args(["input", "text"])
))]
struct Args {
    /// WAV file to analyze
    #[arg(long)]
    input: Option<PathBuf>,

    /// Classify text directly, skipping the audio path
    #[arg(long)]
    text: Option<String>,

    /// Path to a ggml whisper model (required for audio input)
    #[arg(long)]
    model: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    #[arg(long)]
    classifier_url: Option<String>,

    #[arg(long)]
    classifier_api_key: Option<String>,

    /// Use the built-in keyword classifier instead of the hosted endpoint
    #[arg(long, default_value_t = false)]
    offline: bool,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Emit the full report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let env = StdEnv;
    let json = args.json;
    let cfg = build_config(args, &env)?;

    tracing::info!(timeout_ms = cfg.timeout.target_ms, "config loaded");

    match cfg.input.clone() {
        InputMode::WavFile(path) => run_audio(&cfg, &path, json).await,
        InputMode::Text(text) => run_text(&cfg, &text, json).await,
    }
}

async fn run_audio(cfg: &AppConfig, path: &PathBuf, json: bool) -> anyhow::Result<()> {
    let clip = load_wav(path).with_context(|| format!("failed to load {}", path.display()))?;
    tracing::info!(
        sample_rate_hz = clip.sample_rate_hz,
        duration_ms = clip.duration().as_millis() as u64,
        "audio loaded"
    );

    let report = analyze_clip(cfg, clip).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

#[cfg(feature = "whisper-rs")]
async fn analyze_clip(
    cfg: &AppConfig,
    clip: speech_emotion_core::audio::AudioClip,
) -> anyhow::Result<AnalysisReport> {
    let model = cfg
        .whisper
        .model_path
        .clone()
        .context("--model is required for audio input")?;
    let transcriber = WhisperTranscriber::new(&model, &cfg.whisper.language)?;
    let pipeline = AnalysisPipeline::new(
        transcriber,
        build_classifier(&cfg.classifier),
        PipelineConfig::from_app(cfg),
    );
    Ok(pipeline.analyze(clip).await?)
}

#[cfg(not(feature = "whisper-rs"))]
async fn analyze_clip(
    cfg: &AppConfig,
    clip: speech_emotion_core::audio::AudioClip,
) -> anyhow::Result<AnalysisReport> {
    tracing::warn!("built without the whisper backend; the transcript will be empty");
    let pipeline = AnalysisPipeline::new(
        NullTranscriber::new(),
        build_classifier(&cfg.classifier),
        PipelineConfig::from_app(cfg),
    );
    Ok(pipeline.analyze(clip).await?)
}

async fn run_text(cfg: &AppConfig, text: &str, json: bool) -> anyhow::Result<()> {
    let pipeline = AnalysisPipeline::new(
        NullTranscriber::new(),
        build_classifier(&cfg.classifier),
        PipelineConfig::from_app(cfg),
    );
    let emotion = pipeline.analyze_text(text).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&emotion)?);
    } else {
        print_text_emotion(&emotion);
    }
    Ok(())
}

fn build_classifier(cfg: &ClassifierConfig) -> Classifier {
    if cfg.offline {
        Classifier::new(Arc::new(LexiconClassifier::new()))
    } else {
        Classifier::new(Arc::new(RemoteTextClassifier::new(
            cfg.endpoint.clone(),
            cfg.api_key.as_ref().map(|k| k.expose().to_owned()),
        )))
    }
}

fn print_report(report: &AnalysisReport) {
    let text = match &report.transcript {
        TranscriptOutcome::Text(t) => t.as_str(),
        TranscriptOutcome::NoSpeech => "(no speech detected)",
        TranscriptOutcome::ServiceUnavailable(_) => "(transcription unavailable)",
    };
    println!("Recognized text: {text}");
    println!(
        "Text emotion:    {} (confidence {:.2})",
        report.text_emotion.label, report.text_emotion.confidence
    );
    println!("Audio emotion:   {}", report.audio_emotion);
    println!(
        "Features:        pitch {:.1} Hz, energy {:.4}, centroid {:.1} Hz",
        report.features.pitch_hz, report.features.energy, report.features.spectral_centroid_hz
    );
    println!("Final emotion:   {}", report.final_emotion);
}

fn print_text_emotion(emotion: &TextEmotion) {
    println!(
        "Text emotion: {} (confidence {:.2})",
        emotion.label, emotion.confidence
    );
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn build_config(args: Args, env: &impl speech_emotion_core::config::Env) -> anyhow::Result<AppConfig> {
    let input = match (args.input, args.text) {
        (Some(path), None) => InputMode::WavFile(path),
        (None, Some(text)) => InputMode::Text(text),
        _ => anyhow::bail!("exactly one of --input or --text must be provided"),
    };

    let endpoint = resolve_string_with_default(
        args.classifier_url,
        ENV_CLASSIFIER_URL,
        env,
        DEFAULT_CLASSIFIER_URL,
    );
    if endpoint.trim().is_empty() {
        return Err(ConfigError::EmptyEndpoint.into());
    }

    let model_path = resolve_optional_string(
        args.model.map(|p| p.display().to_string()),
        ENV_WHISPER_MODEL,
        env,
    )
    .map(PathBuf::from);

    let api_key = resolve_api_key(args.classifier_api_key, ENV_CLASSIFIER_API_KEY, env)?;
    let timeout = TimeoutBudget::new(args.timeout_ms)?;

    Ok(AppConfig {
        input,
        whisper: WhisperConfig {
            model_path,
            language: args.language,
        },
        classifier: ClassifierConfig {
            endpoint,
            api_key,
            offline: args.offline,
        },
        timeout,
    })
}
