//! Normalizer
//!
//! Peak normalization by a single linear gain.

use tracing::debug;

use crate::engine::{linear_to_db, AudioBuffer};
use crate::error::{ExtendError, Result};

/// Scale the buffer so its peak absolute amplitude equals `ceiling`
///
/// Waveform shape is preserved. An all-zero buffer is returned unchanged.
///
/// # Errors
/// * `InvalidConfig` - If `ceiling` is outside 0 < ceiling <= 1
/// * `EmptyBuffer` - If the input holds no samples
pub fn normalize_peak(buffer: &AudioBuffer, ceiling: f32) -> Result<AudioBuffer> {
    if !(ceiling > 0.0 && ceiling <= 1.0) {
        return Err(ExtendError::invalid("normalize_ceiling", ceiling, "0 < ceiling <= 1"));
    }
    buffer.ensure_not_empty()?;

    let peak = buffer.peak();
    if peak == 0.0 || !peak.is_finite() {
        return Ok(buffer.clone());
    }

    let gain = ceiling / peak;
    let samples = buffer.samples().iter().map(|&s| s * gain).collect();

    debug!(peak, gain_db = linear_to_db(gain), "normalize");
    Ok(AudioBuffer::with_rate(samples, buffer.sample_rate()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_peak_reaches_ceiling() {
        let input = AudioBuffer::sine_wave(440.0, 0.2, 0.1, 22050);
        let output = normalize_peak(&input, 0.95).unwrap();
        assert_abs_diff_eq!(output.peak(), 0.95, epsilon = 1e-6);
    }

    #[test]
    fn test_loud_input_is_attenuated() {
        let input = AudioBuffer::new(vec![0.0, 2.0, -4.0, 1.0], 8000).unwrap();
        let output = normalize_peak(&input, 0.95).unwrap();
        assert_abs_diff_eq!(output.samples()[2], -0.95, epsilon = 1e-6);
        assert_abs_diff_eq!(output.samples()[1], 0.475, epsilon = 1e-6);
    }

    #[test]
    fn test_shape_preserved() {
        let input = AudioBuffer::new(vec![0.1, -0.2, 0.05], 8000).unwrap();
        let output = normalize_peak(&input, 0.8).unwrap();
        let ratio = output.samples()[0] / input.samples()[0];
        for (&o, &i) in output.samples().iter().zip(input.samples()) {
            assert_abs_diff_eq!(o, i * ratio, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_silence_unchanged() {
        let input = AudioBuffer::silence(100, 8000);
        let output = normalize_peak(&input, 0.95).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_idempotent() {
        let input = AudioBuffer::sine_wave(300.0, 0.3, 0.1, 22050);
        let once = normalize_peak(&input, 0.95).unwrap();
        let twice = normalize_peak(&once, 0.95).unwrap();
        assert!(once.is_approx_equal(&twice, 1e-6));
    }

    #[test]
    fn test_empty_rejected() {
        let result = normalize_peak(&AudioBuffer::silence(0, 8000), 0.95);
        assert!(matches!(result, Err(ExtendError::EmptyBuffer)));
    }

    #[test]
    fn test_invalid_ceiling() {
        let input = AudioBuffer::silence(10, 8000);
        for ceiling in [0.0, -0.5, 1.5] {
            assert!(normalize_peak(&input, ceiling).is_err());
        }
    }
}
