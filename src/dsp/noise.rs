//! Noise Injector
//!
//! White Gaussian noise and tiled background-noise mixing. The random source
//! is always passed in by the caller.

use std::f64::consts::TAU;

use rand::distributions::Distribution;
use rand::Rng;
use tracing::debug;

use crate::engine::AudioBuffer;
use crate::error::{ExtendError, Result};

/// Zero-mean normal distribution, sampled with the Box-Muller transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    std_dev: f32,
}

impl Gaussian {
    /// `None` unless `std_dev` is finite and non-negative
    pub fn new(std_dev: f32) -> Option<Self> {
        (std_dev.is_finite() && std_dev >= 0.0).then_some(Self { std_dev })
    }

    pub fn std_dev(&self) -> f32 {
        self.std_dev
    }
}

impl Distribution<f32> for Gaussian {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        // u1 in (0, 1] keeps ln finite
        let u1 = 1.0 - rng.gen::<f64>();
        let u2 = rng.gen::<f64>();
        let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
        (z * self.std_dev as f64) as f32
    }
}

/// Add zero-mean Gaussian noise with standard deviation `noise_level`
///
/// `noise_level == 0` returns an exact copy and leaves `rng` untouched.
///
/// # Errors
/// * `InvalidConfig` - If `noise_level` is negative or not finite
/// * `EmptyBuffer` - If the input holds no samples
pub fn add_white_noise<R: Rng + ?Sized>(
    buffer: &AudioBuffer,
    noise_level: f32,
    rng: &mut R,
) -> Result<AudioBuffer> {
    if !(noise_level.is_finite() && noise_level >= 0.0) {
        return Err(ExtendError::invalid("noise_level", noise_level, ">= 0"));
    }
    buffer.ensure_not_empty()?;
    if noise_level == 0.0 {
        return Ok(buffer.clone());
    }

    let normal = Gaussian::new(noise_level)
        .ok_or_else(|| ExtendError::invalid("noise_level", noise_level, ">= 0"))?;
    let samples = buffer
        .samples()
        .iter()
        .map(|&s| s + normal.sample(&mut *rng))
        .collect();

    debug!(noise_level, "white noise");
    Ok(AudioBuffer::with_rate(samples, buffer.sample_rate()))
}

/// Mix a background noise clip into the buffer
///
/// The noise clip is repeated until it covers the buffer, truncated to the
/// buffer length and scaled by `level`.
///
/// # Errors
/// * `EmptyBuffer` - If the buffer or the noise clip holds no samples
/// * `SampleRateMismatch` - If the clips have different sample rates
/// * `InvalidConfig` - If `level` is negative or not finite
pub fn add_background_noise(buffer: &AudioBuffer, noise: &AudioBuffer, level: f32) -> Result<AudioBuffer> {
    if !(level.is_finite() && level >= 0.0) {
        return Err(ExtendError::invalid("background_level", level, ">= 0"));
    }
    buffer.ensure_not_empty()?;
    noise.ensure_not_empty()?;
    if noise.sample_rate() != buffer.sample_rate() {
        return Err(ExtendError::SampleRateMismatch {
            expected: buffer.sample_rate(),
            actual: noise.sample_rate(),
        });
    }

    let samples = buffer
        .samples()
        .iter()
        .zip(noise.samples().iter().cycle())
        .map(|(&s, &n)| s + n * level)
        .collect();

    debug!(level, noise_len = noise.len(), "background noise");
    Ok(AudioBuffer::with_rate(samples, buffer.sample_rate()))
}
