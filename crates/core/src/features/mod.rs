//! Acoustic feature extraction: windowed RMS energy, YIN pitch, and
//! spectral centroid, each averaged to a single scalar per clip.

mod pitch;
mod spectrum;

use crate::audio::AudioClip;
use serde::{Deserialize, Serialize};

/// Three scalar descriptors of one waveform. Derived fresh per analysis;
/// `spectral_centroid_hz` is carried for diagnostics only and feeds no
/// decision rule.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AudioFeatures {
    pub pitch_hz: f32,
    pub energy: f32,
    pub spectral_centroid_hz: f32,
}

/// Framing and pitch-band parameters. The defaults mirror common speech
/// analysis settings: 2048-sample frames, 512-sample hop, and a 50-300 Hz
/// fundamental search band covering typical voices.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct FeatureConfig {
    pub frame_len: usize,
    pub hop_len: usize,
    pub pitch_fmin_hz: f32,
    pub pitch_fmax_hz: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            frame_len: 2048,
            hop_len: 512,
            pitch_fmin_hz: 50.0,
            pitch_fmax_hz: 300.0,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("clip too short: {samples} samples, need at least {needed}")]
    ClipTooShort { samples: usize, needed: usize },

    #[error("frame and hop lengths must be > 0")]
    InvalidFraming,

    #[error("pitch band {fmin_hz}-{fmax_hz} Hz is empty at {sample_rate_hz} Hz")]
    InvalidPitchBand {
        fmin_hz: f32,
        fmax_hz: f32,
        sample_rate_hz: u32,
    },
}

pub type Result<T> = std::result::Result<T, FeatureError>;

/// Extract the three descriptors from a mono clip. Pure and deterministic:
/// identical input always yields identical output.
pub fn extract_features(clip: &AudioClip, cfg: &FeatureConfig) -> Result<AudioFeatures> {
    if cfg.frame_len == 0 || cfg.hop_len == 0 {
        return Err(FeatureError::InvalidFraming);
    }
    if clip.samples.len() < cfg.frame_len {
        return Err(FeatureError::ClipTooShort {
            samples: clip.samples.len(),
            needed: cfg.frame_len,
        });
    }
    if pitch::lag_bounds(
        cfg.frame_len / 2,
        cfg.frame_len,
        clip.sample_rate_hz,
        cfg.pitch_fmin_hz,
        cfg.pitch_fmax_hz,
    )
    .is_none()
    {
        return Err(FeatureError::InvalidPitchBand {
            fmin_hz: cfg.pitch_fmin_hz,
            fmax_hz: cfg.pitch_fmax_hz,
            sample_rate_hz: clip.sample_rate_hz,
        });
    }

    let analyzer = spectrum::SpectralAnalyzer::new(cfg.frame_len, clip.sample_rate_hz);

    let mut energy_sum = 0.0f64;
    let mut frame_count = 0usize;
    let mut pitch_sum = 0.0f64;
    let mut pitch_count = 0usize;
    let mut centroid_sum = 0.0f64;
    let mut centroid_count = 0usize;

    let mut start = 0usize;
    while start + cfg.frame_len <= clip.samples.len() {
        let frame = &clip.samples[start..start + cfg.frame_len];

        energy_sum += f64::from(frame_rms(frame));
        frame_count += 1;

        if let Some(p) = pitch::yin_frame(
            frame,
            clip.sample_rate_hz,
            cfg.pitch_fmin_hz,
            cfg.pitch_fmax_hz,
        ) {
            pitch_sum += f64::from(p);
            pitch_count += 1;
        }

        if let Some(c) = analyzer.centroid_hz(frame) {
            centroid_sum += f64::from(c);
            centroid_count += 1;
        }

        start += cfg.hop_len;
    }

    let energy = (energy_sum / frame_count as f64) as f32;
    let pitch_hz = if pitch_count > 0 {
        (pitch_sum / pitch_count as f64) as f32
    } else {
        cfg.pitch_fmin_hz
    };
    let spectral_centroid_hz = if centroid_count > 0 {
        (centroid_sum / centroid_count as f64) as f32
    } else {
        0.0
    };

    Ok(AudioFeatures {
        pitch_hz,
        energy,
        spectral_centroid_hz,
    })
}

fn frame_rms(frame: &[f32]) -> f32 {
    let sum_sq: f64 = frame.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    ((sum_sq / frame.len() as f64) as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_clip(freq_hz: f32, amplitude: f32, sample_rate_hz: u32, secs: f32) -> AudioClip {
        let len = (sample_rate_hz as f32 * secs) as usize;
        let samples = (0..len)
            .map(|i| {
                amplitude
                    * (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate_hz as f32)
                        .sin()
            })
            .collect();
        AudioClip::new(sample_rate_hz, samples).expect("valid clip")
    }

    #[test]
    fn energy_matches_sine_rms() {
        let clip = sine_clip(220.0, 0.1, 22_050, 1.0);
        let feats = extract_features(&clip, &FeatureConfig::default()).expect("features");
        // RMS of a sine is amplitude / sqrt(2).
        assert!((feats.energy - 0.1 / std::f32::consts::SQRT_2).abs() < 0.005);
    }

    #[test]
    fn pitch_tracks_a_pure_tone() {
        let clip = sine_clip(220.0, 0.3, 22_050, 1.0);
        let feats = extract_features(&clip, &FeatureConfig::default()).expect("features");
        assert!((feats.pitch_hz - 220.0).abs() < 5.0, "pitch {}", feats.pitch_hz);
    }

    #[test]
    fn centroid_sits_near_the_tone() {
        let clip = sine_clip(220.0, 0.3, 22_050, 1.0);
        let feats = extract_features(&clip, &FeatureConfig::default()).expect("features");
        assert!(
            (feats.spectral_centroid_hz - 220.0).abs() < 60.0,
            "centroid {}",
            feats.spectral_centroid_hz
        );
    }

    #[test]
    fn extraction_is_deterministic() {
        let clip = sine_clip(150.0, 0.2, 22_050, 0.5);
        let cfg = FeatureConfig::default();
        let a = extract_features(&clip, &cfg).expect("features");
        let b = extract_features(&clip, &cfg).expect("features");
        assert_eq!(a, b);
    }

    #[test]
    fn short_clip_is_rejected() {
        let clip = AudioClip::new(22_050, vec![0.1; 100]).expect("valid clip");
        let err = extract_features(&clip, &FeatureConfig::default()).unwrap_err();
        assert!(matches!(err, FeatureError::ClipTooShort { needed: 2048, .. }));
    }

    #[test]
    fn degenerate_pitch_band_is_rejected() {
        let clip = sine_clip(220.0, 0.3, 22_050, 0.5);
        let cfg = FeatureConfig {
            pitch_fmin_hz: 300.0,
            pitch_fmax_hz: 300.0,
            ..FeatureConfig::default()
        };
        assert!(matches!(
            extract_features(&clip, &cfg).unwrap_err(),
            FeatureError::InvalidPitchBand { .. }
        ));
    }
}
