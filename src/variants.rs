//! Variant generation
//!
//! Several `comprehensive` runs over one clip, each with its own randomly
//! drawn stretch rate and noise level.

use std::ops::Range;

use rand::Rng;
use tracing::debug;

use crate::config::{AugmentationConfig, Strategy};
use crate::engine::AudioBuffer;
use crate::error::Result;
use crate::pipeline::Augmentor;

/// Stretch rates drawn per variant
pub const VARIANT_STRETCH_RANGE: Range<f32> = 0.75..0.85;

/// Noise levels drawn per variant
pub const VARIANT_NOISE_RANGE: Range<f32> = 0.003..0.008;

/// One generated variant and the parameters that produced it
#[derive(Debug, Clone)]
pub struct Variant {
    pub config: AugmentationConfig,
    pub buffer: AudioBuffer,
}

/// Produce `count` comprehensive extensions of `input`
///
/// Every variant inherits `augmentor`'s config (and background clip) apart
/// from the strategy, stretch rate and noise level.
pub fn generate_variants<R: Rng + ?Sized>(
    augmentor: &Augmentor,
    input: &AudioBuffer,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Variant>> {
    input.ensure_not_empty()?;

    let mut variants = Vec::with_capacity(count);
    for index in 0..count {
        let config = AugmentationConfig {
            strategy: Strategy::Comprehensive,
            stretch_rate: rng.gen_range(VARIANT_STRETCH_RANGE),
            noise_level: rng.gen_range(VARIANT_NOISE_RANGE),
            ..augmentor.config().clone()
        };
        debug!(
            index,
            stretch_rate = config.stretch_rate,
            noise_level = config.noise_level,
            "generating variant"
        );

        let buffer = augmentor.reconfigured(config.clone())?.augment(input, rng)?;
        variants.push(Variant { config, buffer });
    }

    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::target_len;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_variant_parameters_in_range() {
        let input = AudioBuffer::sine_wave(330.0, 0.5, 0.3, 8000);
        let augmentor = Augmentor::new(AugmentationConfig::new(1.0, Strategy::SimpleRepeat)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let variants = generate_variants(&augmentor, &input, 3, &mut rng).unwrap();
        assert_eq!(variants.len(), 3);

        for variant in &variants {
            assert_eq!(variant.config.strategy, Strategy::Comprehensive);
            assert!(VARIANT_STRETCH_RANGE.contains(&variant.config.stretch_rate));
            assert!(VARIANT_NOISE_RANGE.contains(&variant.config.noise_level));
            assert_eq!(variant.buffer.len(), target_len(1.0, 8000));
            assert!(variant.buffer.peak() <= 0.95 + 1e-6);
        }
    }

    #[test]
    fn test_variants_differ() {
        let input = AudioBuffer::sine_wave(330.0, 0.5, 0.3, 8000);
        let augmentor = Augmentor::new(AugmentationConfig::new(1.0, Strategy::Comprehensive)).unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        let variants = generate_variants(&augmentor, &input, 2, &mut rng).unwrap();
        assert_ne!(variants[0].config.stretch_rate, variants[1].config.stretch_rate);
        assert_ne!(variants[0].buffer, variants[1].buffer);
    }

    #[test]
    fn test_zero_count() {
        let input = AudioBuffer::sine_wave(330.0, 0.5, 0.3, 8000);
        let augmentor = Augmentor::new(AugmentationConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_variants(&augmentor, &input, 0, &mut rng).unwrap().is_empty());
    }
}
