use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// One mono waveform, f32 PCM in [-1, 1]. Built fresh per analysis and
/// never persisted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AudioClip {
    pub sample_rate_hz: u32,
    pub samples: Vec<f32>,
}

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("audio clip must contain at least one sample")]
    EmptyClip,

    #[error("sample rate must be > 0 Hz")]
    ZeroSampleRate,

    #[error("wav read failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("resample failed: {0}")]
    Resample(String),
}

pub type Result<T> = std::result::Result<T, AudioError>;

impl AudioClip {
    pub fn new(sample_rate_hz: u32, samples: Vec<f32>) -> Result<Self> {
        if sample_rate_hz == 0 {
            return Err(AudioError::ZeroSampleRate);
        }
        if samples.is_empty() {
            return Err(AudioError::EmptyClip);
        }
        Ok(Self {
            sample_rate_hz,
            samples,
        })
    }

    pub fn duration(&self) -> Duration {
        duration_from_samples(self.sample_rate_hz, self.samples.len())
    }
}

/// Load a WAV file as a mono clip. Integer and float sample formats are
/// accepted; multi-channel audio is downmixed by averaging each frame.
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<AudioClip> {
    let reader = hound::WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0f32 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let mono = downmix_to_mono(&samples, spec.channels);
    AudioClip::new(spec.sample_rate, mono)
}

/// Average interleaved frames down to one channel. Mono input is returned
/// unchanged; a trailing partial frame is averaged over what is present.
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(usize::from(channels))
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

pub fn duration_from_samples(sample_rate_hz: u32, samples: usize) -> Duration {
    if sample_rate_hz == 0 {
        return Duration::from_secs(0);
    }
    let micros = (samples as u128 * 1_000_000u128) / u128::from(sample_rate_hz);
    Duration::from_micros(micros.min(u128::from(u64::MAX)) as u64)
}

/// Resample a mono buffer, used to bring arbitrary-rate WAV input down to
/// the 16 kHz the ASR backend expects.
pub fn resample(samples: &[f32], from_hz: u32, to_hz: u32) -> Result<Vec<f32>> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    if from_hz == to_hz {
        return Ok(samples.to_vec());
    }
    if from_hz == 0 || to_hz == 0 {
        return Err(AudioError::ZeroSampleRate);
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        f64::from(to_hz) / f64::from(from_hz),
        2.0,
        params,
        samples.len(),
        1,
    )
    .map_err(|e| AudioError::Resample(e.to_string()))?;

    let output = resampler
        .process(&[samples.to_vec()], None)
        .map_err(|e| AudioError::Resample(e.to_string()))?;

    Ok(output.into_iter().next().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_rejects_empty_samples() {
        assert!(matches!(
            AudioClip::new(16_000, Vec::new()),
            Err(AudioError::EmptyClip)
        ));
    }

    #[test]
    fn clip_rejects_zero_sample_rate() {
        assert!(matches!(
            AudioClip::new(0, vec![0.0]),
            Err(AudioError::ZeroSampleRate)
        ));
    }

    #[test]
    fn downmix_averages_stereo_frames() {
        let mixed = downmix_to_mono(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2);
        assert_eq!(mixed, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn downmix_passes_mono_through() {
        let mono = downmix_to_mono(&[0.1, 0.2], 1);
        assert_eq!(mono, vec![0.1, 0.2]);
    }

    #[test]
    fn duration_mono_16k() {
        let d = duration_from_samples(16_000, 16_000);
        assert_eq!(d.as_secs(), 1);
    }

    #[test]
    fn load_wav_int16_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tone.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
        for s in [-16384i16, 0, 16384] {
            writer.write_sample(s).expect("write sample");
        }
        writer.finalize().expect("finalize");

        let clip = load_wav(&path).expect("load wav");
        assert_eq!(clip.sample_rate_hz, 22_050);
        assert_eq!(clip.samples.len(), 3);
        assert!((clip.samples[0] + 0.5).abs() < 1e-4);
        assert!((clip.samples[2] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn load_wav_downmixes_stereo() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stereo.wav");

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
        for s in [1.0f32, 0.0, -0.5, 0.5] {
            writer.write_sample(s).expect("write sample");
        }
        writer.finalize().expect("finalize");

        let clip = load_wav(&path).expect("load wav");
        assert_eq!(clip.samples.len(), 2);
        assert!((clip.samples[0] - 0.5).abs() < 1e-6);
        assert!((clip.samples[1] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn resample_identity_when_rates_match() {
        let out = resample(&[0.1, 0.2, 0.3], 16_000, 16_000).expect("resample");
        assert_eq!(out, vec![0.1, 0.2, 0.3]);
    }
}
