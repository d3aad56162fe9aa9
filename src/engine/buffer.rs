//! Audio Buffer
//!
//! Mono sample buffer passed between pipeline stages. Stages never mutate a
//! buffer they were handed; each returns a new, independently owned one.

use crate::error::{ExtendError, Result};

// ============================================================================
// Helper Functions
// ============================================================================

/// Number of samples for a duration, rounded to the nearest sample
#[inline]
pub fn target_len(duration_secs: f64, sample_rate: u32) -> usize {
    (duration_secs * sample_rate as f64).round().max(0.0) as usize
}

/// Convert linear amplitude to decibels
///
/// Returns `f32::NEG_INFINITY` for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Mono audio samples nominally in -1.0..1.0 with their sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from existing samples
    ///
    /// # Errors
    /// * `InvalidConfig` - If `sample_rate` is zero
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ExtendError::invalid("sample_rate", sample_rate, "> 0"));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Build a buffer that shares a sample rate with an existing one
    pub(crate) fn with_rate(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a silent buffer of `num_samples` samples
    pub fn silence(num_samples: usize, sample_rate: u32) -> Self {
        Self {
            samples: vec![0.0; num_samples],
            sample_rate,
        }
    }

    /// Create a sine wave test tone
    pub fn sine_wave(frequency: f32, amplitude: f32, duration_secs: f64, sample_rate: u32) -> Self {
        let num_samples = target_len(duration_secs, sample_rate);
        let angular_freq = 2.0 * std::f64::consts::PI * frequency as f64 / sample_rate as f64;
        let samples = (0..num_samples)
            .map(|i| amplitude * (angular_freq * i as f64).sin() as f32)
            .collect();

        Self {
            samples,
            sample_rate,
        }
    }

    /// Get a reference to the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the buffer, returning its samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Peak absolute amplitude (0.0 for an empty buffer)
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
    }

    /// Root-mean-square level (0.0 for an empty buffer)
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (sum_sq / self.samples.len() as f64).sqrt() as f32
    }

    /// Check that no sample is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }

    /// Reject zero-length buffers
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.samples.is_empty() {
            Err(ExtendError::EmptyBuffer)
        } else {
            Ok(())
        }
    }

    /// Check if buffers are approximately equal within tolerance
    pub fn is_approx_equal(&self, other: &AudioBuffer, tolerance: f32) -> bool {
        self.sample_rate == other.sample_rate
            && self.samples.len() == other.samples.len()
            && self
                .samples
                .iter()
                .zip(other.samples.iter())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}
