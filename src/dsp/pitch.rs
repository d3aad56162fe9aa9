//! Pitch shifter
//!
//! Stretches by `2^(-steps / 12)` and resamples back to the original length,
//! so duration is kept and pitch moves by `steps` semitones.

use tracing::debug;

use crate::dsp::stretch::time_stretch;
use crate::engine::io::resample_linear;
use crate::engine::AudioBuffer;
use crate::error::{ExtendError, Result};

/// Semitones per octave
const BINS_PER_OCTAVE: f32 = 12.0;

/// Shift pitch by `steps` semitones without changing duration
///
/// `steps == 0` returns an unchanged copy.
///
/// # Errors
/// * `InvalidConfig` - If `steps` is not finite
/// * `EmptyBuffer` - If the input holds no samples
pub fn pitch_shift(buffer: &AudioBuffer, steps: f32) -> Result<AudioBuffer> {
    if !steps.is_finite() {
        return Err(ExtendError::invalid("pitch_steps", steps, "a finite number of semitones"));
    }
    buffer.ensure_not_empty()?;
    if steps == 0.0 {
        return Ok(buffer.clone());
    }

    let rate = 2.0f32.powf(-steps / BINS_PER_OCTAVE);
    let stretched = time_stretch(buffer, rate)?;

    let mut samples = resample_linear(stretched.samples(), rate as f64);
    samples.resize(buffer.len(), 0.0);

    debug!(steps, rate, "pitch shift");
    Ok(AudioBuffer::with_rate(samples, buffer.sample_rate()))
}
