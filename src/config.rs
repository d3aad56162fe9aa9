//! Augmentation configuration
//!
//! `AugmentationConfig` is an immutable value describing one extension run.
//! It deserializes from JSON with per-field defaults, and `validate` rejects
//! out-of-range parameters before any stage runs.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExtendError, Result};

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_TARGET_DURATION: f64 = 5.0;
pub const DEFAULT_STRETCH_RATE: f32 = 0.8;
pub const DEFAULT_NOISE_LEVEL: f32 = 0.005;
pub const DEFAULT_ROOM_SIZE: f32 = 0.3;
pub const DEFAULT_CROSSFADE_SECS: f64 = 0.05;
pub const DEFAULT_CEILING: f32 = 0.95;
pub const DEFAULT_BACKGROUND_LEVEL: f32 = 0.1;

/// Longest accepted target duration in seconds
pub const MAX_TARGET_DURATION: f64 = 3600.0;

/// Pitch shift range in semitones
const MAX_PITCH_STEPS: f32 = 12.0;

// ============================================================================
// Strategy
// ============================================================================

/// Named pipeline configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Tile, then normalize
    SimpleRepeat,
    /// Stretch, tile, normalize
    Stretch,
    /// Stretch, tile, crossfade, noise, reverb, normalize
    #[default]
    Comprehensive,
    /// Center the clip in silence, then normalize
    SilencePad,
    /// Stretch so one copy fills the target, then normalize
    FitStretch,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::SimpleRepeat,
        Strategy::Stretch,
        Strategy::Comprehensive,
        Strategy::SilencePad,
        Strategy::FitStretch,
    ];

    /// Canonical name used on the command line and in config files
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::SimpleRepeat => "simple_repeat",
            Strategy::Stretch => "stretch",
            Strategy::Comprehensive => "comprehensive",
            Strategy::SilencePad => "silence_pad",
            Strategy::FitStretch => "fit_stretch",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ExtendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "simple_repeat" | "simple" | "repeat" => Ok(Strategy::SimpleRepeat),
            "stretch" => Ok(Strategy::Stretch),
            "comprehensive" => Ok(Strategy::Comprehensive),
            "silence_pad" | "pad_silence" | "silence" => Ok(Strategy::SilencePad),
            "fit_stretch" | "fit" => Ok(Strategy::FitStretch),
            _ => Err(ExtendError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Crossfade Curve
// ============================================================================

/// Gain law used across a crossfade window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossfadeCurve {
    /// Gains sum to 1
    #[default]
    Linear,
    /// Squared gains sum to 1
    EqualPower,
}

impl CrossfadeCurve {
    /// (fade_out, fade_in) gains at position `t` in 0..=1
    #[inline]
    pub fn gains(&self, t: f32) -> (f32, f32) {
        match self {
            CrossfadeCurve::Linear => (1.0 - t, t),
            CrossfadeCurve::EqualPower => {
                let angle = t * std::f32::consts::FRAC_PI_2;
                (angle.cos(), angle.sin())
            }
        }
    }
}

impl FromStr for CrossfadeCurve {
    type Err = ExtendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "linear" => Ok(CrossfadeCurve::Linear),
            "equal_power" => Ok(CrossfadeCurve::EqualPower),
            other => Err(ExtendError::invalid(
                "crossfade_curve",
                other,
                "linear or equal_power",
            )),
        }
    }
}

// ============================================================================
// Augmentation Config
// ============================================================================

/// Parameters for one extension run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentationConfig {
    /// Output duration in seconds (> 0)
    pub target_duration: f64,
    /// Pipeline to run
    pub strategy: Strategy,
    /// Playback rate for the stretcher (0 < rate <= 1, < 1 slows down)
    pub stretch_rate: f32,
    /// Standard deviation of injected white noise (>= 0)
    pub noise_level: f32,
    /// Room size for the reverb (0..=1)
    pub reverb_room_size: f32,
    /// Crossfade window at tile seams, in seconds (>= 0)
    pub crossfade_duration: f64,
    /// Gain law for seam crossfades
    pub crossfade_curve: CrossfadeCurve,
    /// Peak amplitude after normalization (0 < ceiling <= 1)
    pub normalize_ceiling: f32,
    /// Pitch shift in semitones applied after stretching (-12..=12)
    pub pitch_steps: f32,
    /// Fade-in/fade-out at the output edges, in seconds (>= 0)
    pub edge_fade_duration: f64,
    /// Noise std-dev inside silence padding (>= 0)
    pub pad_noise_level: f32,
    /// Gain applied to a background noise clip (>= 0)
    pub background_level: f32,
    /// Seed for the noise generator; entropy when absent
    pub seed: Option<u64>,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            target_duration: DEFAULT_TARGET_DURATION,
            strategy: Strategy::default(),
            stretch_rate: DEFAULT_STRETCH_RATE,
            noise_level: DEFAULT_NOISE_LEVEL,
            reverb_room_size: DEFAULT_ROOM_SIZE,
            crossfade_duration: DEFAULT_CROSSFADE_SECS,
            crossfade_curve: CrossfadeCurve::default(),
            normalize_ceiling: DEFAULT_CEILING,
            pitch_steps: 0.0,
            edge_fade_duration: 0.0,
            pad_noise_level: 0.0,
            background_level: DEFAULT_BACKGROUND_LEVEL,
            seed: None,
        }
    }
}

impl AugmentationConfig {
    /// Default parameters with a given target duration and strategy
    pub fn new(target_duration: f64, strategy: Strategy) -> Self {
        Self {
            target_duration,
            strategy,
            ..Self::default()
        }
    }

    /// Load a config from a JSON file; missing fields take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a config from a JSON string; missing fields take defaults
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_stretch_rate(mut self, rate: f32) -> Self {
        self.stretch_rate = rate;
        self
    }

    pub fn with_noise_level(mut self, level: f32) -> Self {
        self.noise_level = level;
        self
    }

    pub fn with_room_size(mut self, room_size: f32) -> Self {
        self.reverb_room_size = room_size;
        self
    }

    pub fn with_crossfade(mut self, secs: f64, curve: CrossfadeCurve) -> Self {
        self.crossfade_duration = secs;
        self.crossfade_curve = curve;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate all parameters are within range
    ///
    /// Nothing is clamped: the first out-of-range parameter is reported.
    pub fn validate(&self) -> Result<()> {
        if !(self.target_duration > 0.0 && self.target_duration <= MAX_TARGET_DURATION) {
            return Err(ExtendError::invalid(
                "target_duration",
                self.target_duration,
                "0 < duration <= 3600 seconds",
            ));
        }
        if !(self.stretch_rate.is_finite() && self.stretch_rate > 0.0 && self.stretch_rate <= 1.0) {
            return Err(ExtendError::invalid("stretch_rate", self.stretch_rate, "0 < rate <= 1"));
        }
        check_non_negative("noise_level", self.noise_level as f64)?;
        if !(0.0..=1.0).contains(&self.reverb_room_size) {
            return Err(ExtendError::invalid("reverb_room_size", self.reverb_room_size, "0.0 to 1.0"));
        }
        check_non_negative("crossfade_duration", self.crossfade_duration)?;
        if !(self.normalize_ceiling > 0.0 && self.normalize_ceiling <= 1.0) {
            return Err(ExtendError::invalid("normalize_ceiling", self.normalize_ceiling, "0 < ceiling <= 1"));
        }
        if !(-MAX_PITCH_STEPS..=MAX_PITCH_STEPS).contains(&self.pitch_steps) {
            return Err(ExtendError::invalid("pitch_steps", self.pitch_steps, "-12 to 12 semitones"));
        }
        check_non_negative("edge_fade_duration", self.edge_fade_duration)?;
        check_non_negative("pad_noise_level", self.pad_noise_level as f64)?;
        check_non_negative("background_level", self.background_level as f64)?;
        Ok(())
    }
}

fn check_non_negative(param: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ExtendError::invalid(param, value, ">= 0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_valid() {
        let config = AugmentationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategy, Strategy::Comprehensive);
    }

    #[test]
    fn test_param_validation() {
        let bad = [
            AugmentationConfig::new(-1.0, Strategy::SimpleRepeat),
            AugmentationConfig::new(0.0, Strategy::SimpleRepeat),
            AugmentationConfig::default().with_stretch_rate(0.0),
            AugmentationConfig::default().with_stretch_rate(1.5),
            AugmentationConfig::default().with_noise_level(-0.1),
            AugmentationConfig::default().with_room_size(1.1),
            AugmentationConfig::default().with_crossfade(-0.01, CrossfadeCurve::Linear),
            AugmentationConfig {
                normalize_ceiling: 0.0,
                ..AugmentationConfig::default()
            },
            AugmentationConfig {
                pitch_steps: 13.0,
                ..AugmentationConfig::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(ExtendError::InvalidConfig { .. })),
                "expected rejection for {:?}",
                config
            );
        }
    }

    #[test]
    fn test_target_duration_upper_bound() {
        assert!(AugmentationConfig::new(MAX_TARGET_DURATION, Strategy::SimpleRepeat)
            .validate()
            .is_ok());
        for duration in [MAX_TARGET_DURATION + 1.0, 1e15, f64::INFINITY] {
            let config = AugmentationConfig::new(duration, Strategy::SimpleRepeat);
            assert!(
                matches!(config.validate(), Err(ExtendError::InvalidConfig { .. })),
                "accepted {}",
                duration
            );
        }
    }

    #[test]
    fn test_nan_rejected() {
        let config = AugmentationConfig::new(f64::NAN, Strategy::Stretch);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_strategy_from_str() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.name().parse::<Strategy>().unwrap(), strategy);
        }
        assert_eq!("simple".parse::<Strategy>().unwrap(), Strategy::SimpleRepeat);
        assert_eq!("pad-silence".parse::<Strategy>().unwrap(), Strategy::SilencePad);
        assert!(matches!(
            "loop".parse::<Strategy>(),
            Err(ExtendError::UnknownStrategy { .. })
        ));
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config = AugmentationConfig::from_json_str(
            r#"{ "target_duration": 3.0, "strategy": "silence_pad", "seed": 7 }"#,
        )
        .unwrap();

        assert_eq!(
            config,
            AugmentationConfig {
                target_duration: 3.0,
                strategy: Strategy::SilencePad,
                seed: Some(7),
                ..AugmentationConfig::default()
            }
        );
    }

    #[test]
    fn test_json_round_trip() {
        let config = AugmentationConfig::default()
            .with_crossfade(0.02, CrossfadeCurve::EqualPower)
            .with_seed(42);
        let json = serde_json::to_string(&config).unwrap();
        let back = AugmentationConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_crossfade_gains() {
        let (out, inn) = CrossfadeCurve::Linear.gains(0.25);
        assert!((out + inn - 1.0).abs() < 1e-6);

        let (out, inn) = CrossfadeCurve::EqualPower.gains(0.3);
        assert!((out * out + inn * inn - 1.0).abs() < 1e-6);
    }
}
