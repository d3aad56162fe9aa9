//! Audio Extend - Fixed-Duration Audio Augmentation
//!
//! Lengthens short mono clips to an exact target duration for building
//! training datasets. Each strategy is a fixed chain of pure stages:
//!
//! - Time-stretch (phase vocoder) and optional pitch shift
//! - Tiling or silence padding to the exact target length
//! - Crossfades at tile seams
//! - White and background noise injection
//! - Tapped-delay reverb
//! - Peak normalization
//!
//! # Example
//!
//! ```no_run
//! use audio_extend::{load_wav, save_wav, AugmentationConfig, Augmentor, Strategy};
//!
//! let input = load_wav("bark.wav", Some(22050))?;
//! let config = AugmentationConfig::new(5.0, Strategy::Comprehensive).with_seed(42);
//! let output = Augmentor::new(config)?.augment_seeded(&input)?;
//! save_wav(&output, "bark_extended.wav")?;
//! # Ok::<(), audio_extend::ExtendError>(())
//! ```

pub mod batch;
pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod variants;

pub use config::{AugmentationConfig, CrossfadeCurve, Strategy};
pub use dsp::Stage;
pub use engine::{load_wav, save_wav, save_wav_with_depth, target_len, AudioBuffer};
pub use error::{ExtendError, Result};
pub use pipeline::{extend, Augmentor};
pub use variants::{generate_variants, Variant};
