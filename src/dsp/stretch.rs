//! Time-Stretcher
//!
//! Phase vocoder time stretching. Changes duration by `1 / rate` while
//! keeping pitch:
//! - Hann-windowed STFT, centered with zero padding
//! - Magnitudes interpolated between analysis frames at fractional steps of `rate`
//! - Phase accumulated from the unwrapped per-bin phase advance
//! - Overlap-add resynthesis normalized by the summed squared window

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use tracing::debug;

use crate::engine::AudioBuffer;
use crate::error::{ExtendError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Analysis/synthesis frame size
const FFT_SIZE: usize = 2048;

/// Hop between frames (FFT_SIZE / 4)
const HOP_SIZE: usize = 512;

/// Squared-window sums below this are treated as silence during resynthesis
const WINDOW_FLOOR: f32 = 1e-8;

// ============================================================================
// Public API
// ============================================================================

/// Stretch a buffer in time without changing its pitch
///
/// `rate < 1` slows playback down (longer output), `rate > 1` speeds it up.
/// The output holds exactly `round(len / rate)` samples. `rate == 1` returns
/// an unchanged copy.
///
/// # Errors
/// * `InvalidConfig` - If `rate` is not a positive finite number
/// * `EmptyBuffer` - If the input holds no samples
pub fn time_stretch(buffer: &AudioBuffer, rate: f32) -> Result<AudioBuffer> {
    if !(rate.is_finite() && rate > 0.0) {
        return Err(ExtendError::invalid("stretch_rate", rate, "> 0"));
    }
    buffer.ensure_not_empty()?;

    if rate == 1.0 {
        return Ok(buffer.clone());
    }

    let output_len = (buffer.len() as f64 / rate as f64).round().max(1.0) as usize;
    let vocoder = PhaseVocoder::new(FFT_SIZE, HOP_SIZE);
    let samples = vocoder.stretch(buffer.samples(), rate, output_len);

    debug!(
        rate,
        input_len = buffer.len(),
        output_len = samples.len(),
        "time stretch"
    );
    Ok(AudioBuffer::with_rate(samples, buffer.sample_rate()))
}

// ============================================================================
// Phase Vocoder
// ============================================================================

struct PhaseVocoder {
    fft_size: usize,
    hop: usize,
    window: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl PhaseVocoder {
    fn new(fft_size: usize, hop: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft_size,
            hop,
            window: hann_window(fft_size),
            forward: planner.plan_fft_forward(fft_size),
            inverse: planner.plan_fft_inverse(fft_size),
        }
    }

    /// Number of non-redundant bins of a real signal's spectrum
    fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    fn stretch(&self, input: &[f32], rate: f32, output_len: usize) -> Vec<f32> {
        let spectra = self.analyze(input);
        let modified = self.interpolate(&spectra, rate);
        let mut output = self.synthesize(&modified);
        output.resize(output_len, 0.0);
        output
    }

    /// Short-time spectra of the centered, zero-padded input
    fn analyze(&self, input: &[f32]) -> Vec<Vec<Complex<f32>>> {
        let pad = self.fft_size / 2;
        let padded_len = (input.len() + 2 * pad).max(self.fft_size);
        let mut padded = vec![0.0f32; padded_len];
        padded[pad..pad + input.len()].copy_from_slice(input);

        let num_frames = 1 + (padded_len - self.fft_size) / self.hop;
        let mut frame = vec![Complex::new(0.0, 0.0); self.fft_size];

        (0..num_frames)
            .map(|f| {
                let start = f * self.hop;
                for (i, bin) in frame.iter_mut().enumerate() {
                    *bin = Complex::new(padded[start + i] * self.window[i], 0.0);
                }
                self.forward.process(&mut frame);
                frame[..self.num_bins()].to_vec()
            })
            .collect()
    }

    /// Resample the frame sequence at `0, rate, 2 * rate, ...`
    fn interpolate(&self, spectra: &[Vec<Complex<f32>>], rate: f32) -> Vec<Vec<Complex<f32>>> {
        let num_bins = self.num_bins();
        let num_frames = spectra.len();
        let silent = vec![Complex::new(0.0, 0.0); num_bins];

        // Expected phase advance per hop for each bin
        let expected: Vec<f32> = (0..num_bins)
            .map(|k| 2.0 * PI * k as f32 * self.hop as f32 / self.fft_size as f32)
            .collect();

        let mut phase: Vec<f32> = spectra[0].iter().map(|c| c.arg()).collect();
        let mut output = Vec::new();
        let mut t = 0.0f64;

        while t < num_frames as f64 {
            let left = t.floor() as usize;
            let alpha = (t - left as f64) as f32;
            let current = &spectra[left];
            let next = spectra.get(left + 1).unwrap_or(&silent);

            let frame: Vec<Complex<f32>> = (0..num_bins)
                .map(|k| {
                    let magnitude = (1.0 - alpha) * current[k].norm() + alpha * next[k].norm();
                    let out = Complex::from_polar(magnitude, phase[k]);

                    let delta = next[k].arg() - current[k].arg() - expected[k];
                    phase[k] += expected[k] + wrap_phase(delta);
                    out
                })
                .collect();

            output.push(frame);
            t += rate as f64;
        }

        output
    }

    /// Overlap-add resynthesis, trimmed of the centering pad
    fn synthesize(&self, frames: &[Vec<Complex<f32>>]) -> Vec<f32> {
        let pad = self.fft_size / 2;
        let total_len = self.fft_size + self.hop * frames.len().saturating_sub(1);
        let mut output = vec![0.0f32; total_len];
        let mut window_sum = vec![0.0f32; total_len];
        let mut full = vec![Complex::new(0.0, 0.0); self.fft_size];
        let scale = 1.0 / self.fft_size as f32;

        for (f, half) in frames.iter().enumerate() {
            // Rebuild the conjugate-symmetric spectrum of a real frame
            full[..half.len()].copy_from_slice(half);
            for k in half.len()..self.fft_size {
                full[k] = full[self.fft_size - k].conj();
            }
            self.inverse.process(&mut full);

            let start = f * self.hop;
            for i in 0..self.fft_size {
                let w = self.window[i];
                output[start + i] += full[i].re * scale * w;
                window_sum[start + i] += w * w;
            }
        }

        for (sample, &norm) in output.iter_mut().zip(window_sum.iter()) {
            if norm > WINDOW_FLOOR {
                *sample /= norm;
            }
        }

        output.drain(..pad.min(output.len()));
        output
    }
}

/// Wrap a phase difference into -PI..PI
#[inline]
fn wrap_phase(phase: f32) -> f32 {
    phase - 2.0 * PI * (phase / (2.0 * PI)).round()
}

/// Periodic Hann window
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / size as f32).cos())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Count rising zero crossings per second as a pitch estimate
    fn estimate_frequency(buffer: &AudioBuffer) -> f32 {
        let samples = buffer.samples();
        // Skip edges where the window ramps in and out
        let skip = FFT_SIZE;
        let body = &samples[skip..samples.len() - skip];
        let crossings = body
            .windows(2)
            .filter(|w| w[0] < 0.0 && w[1] >= 0.0)
            .count();
        crossings as f32 / (body.len() as f32 / buffer.sample_rate() as f32)
    }

    #[test]
    fn test_rate_one_is_identity() {
        let input = AudioBuffer::sine_wave(440.0, 0.5, 0.3, 22050);
        let output = time_stretch(&input, 1.0).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let input = AudioBuffer::sine_wave(440.0, 0.5, 0.1, 22050);
        for rate in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                time_stretch(&input, rate),
                Err(ExtendError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn test_empty_input_rejected() {
        let input = AudioBuffer::silence(0, 22050);
        assert!(matches!(time_stretch(&input, 0.8), Err(ExtendError::EmptyBuffer)));
    }

    #[test]
    fn test_output_length_scales_with_rate() {
        let input = AudioBuffer::sine_wave(300.0, 0.5, 1.2, 22050);
        let slow = time_stretch(&input, 0.8).unwrap();
        assert_eq!(slow.len(), (26460.0f64 / 0.8).round() as usize);

        let fast = time_stretch(&input, 1.25).unwrap();
        assert_eq!(fast.len(), (26460.0f64 / 1.25).round() as usize);
    }

    #[test]
    fn test_pitch_preserved() {
        let input = AudioBuffer::sine_wave(440.0, 0.5, 1.0, 22050);
        let stretched = time_stretch(&input, 0.8).unwrap();

        let original = estimate_frequency(&input);
        let after = estimate_frequency(&stretched);
        assert!(
            (after - original).abs() / original < 0.05,
            "pitch drifted: {} Hz -> {} Hz",
            original,
            after
        );
    }

    #[test]
    fn test_amplitude_roughly_preserved() {
        let input = AudioBuffer::sine_wave(440.0, 0.5, 1.0, 22050);
        let stretched = time_stretch(&input, 0.8).unwrap();
        assert_abs_diff_eq!(stretched.rms(), input.rms(), epsilon = 0.05);
        assert!(stretched.is_finite());
    }

    #[test]
    fn test_short_input_is_handled() {
        let input = AudioBuffer::sine_wave(440.0, 0.5, 0.01, 22050);
        let stretched = time_stretch(&input, 0.5).unwrap();
        assert_eq!(stretched.len(), 441);
        assert!(stretched.is_finite());
    }

    #[test]
    fn test_wrap_phase_range() {
        for phase in [-10.0f32, -3.5, 0.0, 3.5, 10.0] {
            let wrapped = wrap_phase(phase);
            assert!(wrapped >= -PI - 1e-5 && wrapped <= PI + 1e-5);
        }
    }
}
