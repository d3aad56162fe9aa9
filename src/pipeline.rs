//! Pipeline orchestration
//!
//! Maps each `Strategy` to its fixed stage list and runs the stages in order.
//! Configuration is validated before the first stage executes, and every
//! strategy produces exactly `round(target_duration * sample_rate)` samples.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::{AugmentationConfig, Strategy};
use crate::dsp::{
    add_background_noise, add_white_noise, apply_reverb, crossfade, fade_edges, normalize_peak,
    pad_with_silence, pitch_shift, tile, time_stretch, Stage, Tiled,
};
use crate::engine::{target_len, AudioBuffer};
use crate::error::{ExtendError, Result};

impl Strategy {
    /// Stages always run by this strategy, in order
    pub fn stages(&self) -> &'static [Stage] {
        match self {
            Strategy::SimpleRepeat => &[Stage::Tile, Stage::Normalize],
            Strategy::Stretch | Strategy::FitStretch => {
                &[Stage::Stretch, Stage::Tile, Stage::Normalize]
            }
            Strategy::Comprehensive => &[
                Stage::Stretch,
                Stage::Tile,
                Stage::Crossfade,
                Stage::WhiteNoise,
                Stage::Reverb,
                Stage::Normalize,
            ],
            Strategy::SilencePad => &[Stage::SilencePad, Stage::Normalize],
        }
    }
}

/// Run one strategy over `buffer`
///
/// Shorthand for `Augmentor::new(config.clone())?.augment(buffer, rng)`.
pub fn extend<R: Rng + ?Sized>(
    buffer: &AudioBuffer,
    config: &AugmentationConfig,
    rng: &mut R,
) -> Result<AudioBuffer> {
    Augmentor::new(config.clone())?.augment(buffer, rng)
}

/// A validated configuration plus an optional background noise clip
#[derive(Debug, Clone)]
pub struct Augmentor {
    config: AugmentationConfig,
    background: Option<AudioBuffer>,
}

impl Augmentor {
    /// Validate `config` and build an augmentor
    ///
    /// # Errors
    /// * `InvalidConfig` - If any parameter is out of range
    pub fn new(config: AugmentationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            background: None,
        })
    }

    /// Attach a background noise clip, mixed in by `comprehensive`
    pub fn with_background(mut self, noise: AudioBuffer) -> Result<Self> {
        noise.ensure_not_empty()?;
        self.background = Some(noise);
        Ok(self)
    }

    /// Same background clip, different configuration
    pub fn reconfigured(&self, config: AugmentationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            background: self.background.clone(),
        })
    }

    pub fn config(&self) -> &AugmentationConfig {
        &self.config
    }

    pub fn background(&self) -> Option<&AudioBuffer> {
        self.background.as_ref()
    }

    /// Stages this augmentor will run, including configured optional ones
    pub fn plan(&self) -> Vec<Stage> {
        let mut stages = self.config.strategy.stages().to_vec();

        if self.config.strategy == Strategy::Comprehensive {
            if self.config.pitch_steps != 0.0 {
                stages.push(Stage::PitchShift);
            }
            if self.background.is_some() && self.config.background_level > 0.0 {
                stages.push(Stage::BackgroundNoise);
            }
            if self.config.edge_fade_duration > 0.0 {
                stages.push(Stage::EdgeFade);
            }
            stages.sort();
        }

        stages
    }

    /// Extend using an RNG seeded from the config, or from entropy
    pub fn augment_seeded(&self, input: &AudioBuffer) -> Result<AudioBuffer> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.augment(input, &mut rng)
    }

    /// Extend `input` to the configured duration
    ///
    /// # Errors
    /// * `EmptyBuffer` - If the input holds no samples
    /// * any stage error
    pub fn augment<R: Rng + ?Sized>(&self, input: &AudioBuffer, rng: &mut R) -> Result<AudioBuffer> {
        input.ensure_not_empty()?;

        let config = &self.config;
        let sample_rate = input.sample_rate();
        let n = target_len(config.target_duration, sample_rate);
        if n == 0 {
            return Err(ExtendError::invalid(
                "target_duration",
                config.target_duration,
                "at least one sample at the input sample rate",
            ));
        }

        let plan = self.plan();
        info!(
            strategy = %config.strategy,
            input_len = input.len(),
            target_len = n,
            sample_rate,
            "extending clip"
        );

        let mut current = input.clone();
        let mut period = current.len();

        for stage in plan {
            debug!(stage = stage.name(), len = current.len(), "running stage");
            current = match stage {
                Stage::Stretch => time_stretch(&current, self.stretch_rate(current.len(), n))?,
                Stage::PitchShift => pitch_shift(&current, config.pitch_steps)?,
                Stage::Tile => {
                    let tiled = tile(&current, n)?;
                    period = tiled.period;
                    tiled.buffer
                }
                Stage::SilencePad => pad_with_silence(&current, n, config.pad_noise_level, rng)?,
                Stage::Crossfade => {
                    let fade_len = target_len(config.crossfade_duration, sample_rate);
                    crossfade(
                        &Tiled {
                            buffer: current,
                            period,
                        },
                        fade_len,
                        config.crossfade_curve,
                    )
                }
                Stage::WhiteNoise => add_white_noise(&current, config.noise_level, rng)?,
                Stage::BackgroundNoise => match &self.background {
                    Some(noise) => add_background_noise(&current, noise, config.background_level)?,
                    None => current,
                },
                Stage::Reverb => apply_reverb(&current, config.reverb_room_size)?,
                Stage::EdgeFade => {
                    fade_edges(&current, target_len(config.edge_fade_duration, sample_rate))
                }
                Stage::Normalize => normalize_peak(&current, config.normalize_ceiling)?,
            };
        }

        debug_assert_eq!(current.len(), n);
        Ok(current)
    }

    /// Playback rate for the stretch stage
    ///
    /// `fit_stretch` picks the rate that makes one copy fill the target; an
    /// input already at or past the target is left unstretched.
    fn stretch_rate(&self, len: usize, n: usize) -> f32 {
        match self.config.strategy {
            Strategy::FitStretch if len < n => (len as f64 / n as f64) as f32,
            Strategy::FitStretch => 1.0,
            _ => self.config.stretch_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrossfadeCurve;
    use approx::assert_abs_diff_eq;

    fn clip() -> AudioBuffer {
        AudioBuffer::sine_wave(220.0, 0.4, 0.5, 8000)
    }

    #[test]
    fn test_stage_lists() {
        assert_eq!(
            Strategy::SimpleRepeat.stages(),
            &[Stage::Tile, Stage::Normalize]
        );
        assert_eq!(
            Strategy::SilencePad.stages(),
            &[Stage::SilencePad, Stage::Normalize]
        );
        assert_eq!(Strategy::Comprehensive.stages().len(), 6);
    }

    #[test]
    fn test_plan_includes_optional_stages_in_order() {
        let config = AugmentationConfig {
            pitch_steps: 2.0,
            edge_fade_duration: 0.01,
            ..AugmentationConfig::default()
        };
        let augmentor = Augmentor::new(config)
            .unwrap()
            .with_background(AudioBuffer::silence(10, 8000))
            .unwrap();

        assert_eq!(
            augmentor.plan(),
            vec![
                Stage::Stretch,
                Stage::PitchShift,
                Stage::Tile,
                Stage::Crossfade,
                Stage::WhiteNoise,
                Stage::BackgroundNoise,
                Stage::Reverb,
                Stage::EdgeFade,
                Stage::Normalize,
            ]
        );
    }

    #[test]
    fn test_optional_stages_ignored_outside_comprehensive() {
        let config = AugmentationConfig {
            strategy: Strategy::SimpleRepeat,
            pitch_steps: 2.0,
            ..AugmentationConfig::default()
        };
        let augmentor = Augmentor::new(config).unwrap();
        assert_eq!(augmentor.plan(), vec![Stage::Tile, Stage::Normalize]);
    }

    #[test]
    fn test_invalid_config_rejected_before_processing() {
        let config = AugmentationConfig::new(-1.0, Strategy::Comprehensive);
        let mut rng = StdRng::seed_from_u64(0);
        let result = extend(&clip(), &config, &mut rng);
        assert!(matches!(result, Err(ExtendError::InvalidConfig { .. })));
    }

    #[test]
    fn test_empty_input_rejected() {
        let config = AugmentationConfig::new(1.0, Strategy::SimpleRepeat);
        let mut rng = StdRng::seed_from_u64(0);
        let result = extend(&AudioBuffer::silence(0, 8000), &config, &mut rng);
        assert!(matches!(result, Err(ExtendError::EmptyBuffer)));
    }

    #[test]
    fn test_fit_stretch_single_copy() {
        let config = AugmentationConfig::new(1.0, Strategy::FitStretch);
        let mut rng = StdRng::seed_from_u64(0);
        let output = extend(&clip(), &config, &mut rng).unwrap();
        assert_eq!(output.len(), 8000);
        assert_abs_diff_eq!(output.peak(), 0.95, epsilon = 1e-5);
    }

    #[test]
    fn test_seeded_augment_reproducible() {
        let config = AugmentationConfig::new(1.0, Strategy::Comprehensive)
            .with_crossfade(0.02, CrossfadeCurve::EqualPower)
            .with_seed(11);
        let augmentor = Augmentor::new(config).unwrap();
        let a = augmentor.augment_seeded(&clip()).unwrap();
        let b = augmentor.augment_seeded(&clip()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_target_too_short_for_sample_rate() {
        let config = AugmentationConfig::new(1e-5, Strategy::SimpleRepeat);
        let mut rng = StdRng::seed_from_u64(0);
        let result = extend(&clip(), &config, &mut rng);
        assert!(matches!(result, Err(ExtendError::InvalidConfig { .. })));
    }
}
