//! Audio file I/O
//!
//! WAV import/export via hound. Imported audio is downmixed to mono and can be
//! resampled to a requested rate; exported audio is clamped to -1.0..1.0.
//! Sample rate conversion uses linear interpolation.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::engine::buffer::AudioBuffer;
use crate::error::{ExtendError, Result};

/// Load a WAV file into a mono AudioBuffer
///
/// Multi-channel files are averaged down to one channel. When `target_rate`
/// is given and differs from the file's rate, the audio is resampled.
///
/// # Errors
/// * `UnreadableInput` - If the file is missing or not a valid WAV file
/// * `UnsupportedFormat` - If the integer bit depth is not 8/16/24/32
/// * `EmptyBuffer` - If the file holds no samples
pub fn load_wav<P: AsRef<Path>>(path: P, target_rate: Option<u32>) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let reader = WavReader::open(path).map_err(|e| ExtendError::UnreadableInput {
        path: path.display().to_string(),
        source: e,
    })?;

    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;
    let interleaved = read_samples_as_f32(reader, path)?;

    let mono = downmix(&interleaved, channels);
    if mono.is_empty() {
        return Err(ExtendError::EmptyBuffer);
    }

    let (samples, sample_rate) = match target_rate {
        Some(rate) if rate != spec.sample_rate => {
            if rate == 0 {
                return Err(ExtendError::invalid("sample_rate", rate, "> 0"));
            }
            debug!(from = spec.sample_rate, to = rate, "resampling on load");
            let ratio = rate as f64 / spec.sample_rate as f64;
            (resample_linear(&mono, ratio), rate)
        }
        _ => (mono, spec.sample_rate),
    };

    AudioBuffer::new(samples, sample_rate)
}

/// Save an AudioBuffer to a 32-bit float WAV file
pub fn save_wav<P: AsRef<Path>>(buffer: &AudioBuffer, path: P) -> Result<()> {
    save_wav_with_depth(buffer, path, 32)
}

/// Save an AudioBuffer to a WAV file with a specific bit depth
///
/// 32 bits writes IEEE float; 16 and 24 write signed integers.
pub fn save_wav_with_depth<P: AsRef<Path>>(buffer: &AudioBuffer, path: P, bits: u16) -> Result<()> {
    let path = path.as_ref();
    let sample_format = match bits {
        32 => SampleFormat::Float,
        16 | 24 => SampleFormat::Int,
        _ => {
            return Err(ExtendError::UnsupportedFormat {
                details: format!("{}-bit export (only 16, 24, 32 supported)", bits),
            })
        }
    };

    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: bits,
        sample_format,
    };

    let write_err = |e: hound::Error| ExtendError::WriteFailed {
        path: path.display().to_string(),
        source: e,
    };

    let mut writer = WavWriter::create(path, spec).map_err(write_err)?;

    let clamped = buffer.samples().iter().map(|s| s.clamp(-1.0, 1.0));
    match sample_format {
        SampleFormat::Float => {
            for sample in clamped {
                writer.write_sample(sample).map_err(write_err)?;
            }
        }
        SampleFormat::Int => {
            let max_val = ((1u32 << (bits - 1)) - 1) as f32;
            for sample in clamped {
                writer
                    .write_sample((sample * max_val).round() as i32)
                    .map_err(write_err)?;
            }
        }
    }

    writer.finalize().map_err(write_err)?;

    debug!(
        path = %path.display(),
        samples = buffer.len(),
        duration_secs = buffer.duration_secs(),
        "wrote wav"
    );
    Ok(())
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Read samples from a WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(reader: WavReader<R>, path: &Path) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let read_err = |e: hound::Error| ExtendError::UnreadableInput {
        path: path.display().to_string(),
        source: e,
    };

    match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map_err(read_err))
            .collect(),
        SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            if !matches!(bits, 8 | 16 | 24 | 32) {
                return Err(ExtendError::UnsupportedFormat {
                    details: format!("{}-bit integer audio", bits),
                });
            }
            let scale = (1u64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale).map_err(read_err))
                .collect()
        }
    }
}

/// Average interleaved channels down to mono
fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear interpolation resampling
///
/// `ratio` is target rate over source rate.
pub(crate) fn resample_linear(samples: &[f32], ratio: f64) -> Vec<f32> {
    if samples.is_empty() || ratio <= 0.0 {
        return Vec::new();
    }

    let source_len = samples.len();
    let target_len = ((source_len as f64) * ratio).round().max(1.0) as usize;
    let mut output = Vec::with_capacity(target_len);

    for i in 0..target_len {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let sample = if src_idx + 1 < source_len {
            samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
        } else if src_idx < source_len {
            samples[src_idx]
        } else {
            samples[source_len - 1]
        };

        output.push(sample);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_wav_round_trip_float() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.wav");

        let original = AudioBuffer::sine_wave(440.0, 0.8, 0.5, 22050);
        save_wav(&original, &path).unwrap();

        let loaded = load_wav(&path, None).unwrap();
        assert_eq!(loaded.sample_rate(), 22050);
        assert!(original.is_approx_equal(&loaded, 1e-6));
    }

    #[test]
    fn test_wav_round_trip_16bit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_16bit.wav");

        let original = AudioBuffer::sine_wave(440.0, 0.8, 0.5, 16000);
        save_wav_with_depth(&original, &path, 16).unwrap();

        let loaded = load_wav(&path, None).unwrap();
        // 16-bit has less precision, allow larger tolerance
        assert!(original.is_approx_equal(&loaded, 1e-4));
    }

    #[test]
    fn test_save_clamps_out_of_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loud.wav");

        let buffer = AudioBuffer::new(vec![2.0, -3.0, 0.5], 8000).unwrap();
        save_wav(&buffer, &path).unwrap();

        let loaded = load_wav(&path, None).unwrap();
        assert_eq!(loaded.samples(), &[1.0, -1.0, 0.5]);
    }

    #[test]
    fn test_stereo_is_downmixed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(0.5f32).unwrap();
            writer.write_sample(-0.1f32).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = load_wav(&path, None).unwrap();
        assert_eq!(loaded.len(), 100);
        assert!(loaded.samples().iter().all(|&s| (s - 0.2).abs() < 1e-6));
    }

    #[test]
    fn test_load_with_resample() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resample.wav");

        let original = AudioBuffer::sine_wave(220.0, 0.5, 1.0, 44100);
        save_wav(&original, &path).unwrap();

        let loaded = load_wav(&path, Some(22050)).unwrap();
        assert_eq!(loaded.sample_rate(), 22050);
        assert_eq!(loaded.len(), 22050);
    }

    #[test]
    fn test_unsupported_export_depth() {
        let dir = tempdir().unwrap();
        let buffer = AudioBuffer::silence(10, 8000);
        let result = save_wav_with_depth(&buffer, dir.path().join("x.wav"), 12);
        assert!(matches!(result, Err(ExtendError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_wav("nonexistent_file.wav", None);
        assert!(matches!(result, Err(ExtendError::UnreadableInput { .. })));
    }

    #[test]
    fn test_resample_linear_upsample() {
        let out = resample_linear(&[0.0, 1.0, 0.0], 2.0);
        assert_eq!(out.len(), 6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }
}
