//! CLI Module
//!
//! Command-line interface for audio-extend.

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{AugmentationConfig, CrossfadeCurve, Strategy};
use crate::error::Result;

/// Audio Extend - lengthen short clips into fixed-duration training samples
#[derive(Parser, Debug)]
#[command(name = "audio-extend")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extend a single WAV file
    #[command(name = "extend")]
    Extend {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        #[command(flatten)]
        args: AugmentArgs,
    },

    /// Extend every WAV file in a directory
    #[command(name = "batch")]
    Batch {
        /// Directory of input WAV files
        input_dir: PathBuf,

        /// Directory for outputs and manifest.json
        output_dir: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        #[command(flatten)]
        args: AugmentArgs,
    },

    /// Write several randomly parameterized extensions of one file
    #[command(name = "variants")]
    Variants {
        /// Input WAV file
        input: PathBuf,

        /// Directory for the variant files
        output_dir: PathBuf,

        /// Number of variants
        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,

        #[command(flatten)]
        args: AugmentArgs,
    },
}

/// Parameters shared by every subcommand
///
/// Values given here override those loaded from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct AugmentArgs {
    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Target duration in seconds
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Resample input to this rate (native rate when omitted)
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Strategy: simple_repeat, stretch, comprehensive, silence_pad, fit_stretch
    #[arg(short, long)]
    pub method: Option<Strategy>,

    /// White noise standard deviation
    #[arg(long)]
    pub noise_level: Option<f32>,

    /// Stretch playback rate (< 1 slows down)
    #[arg(long)]
    pub stretch_rate: Option<f32>,

    /// Reverb room size, 0 to 1
    #[arg(long)]
    pub room_size: Option<f32>,

    /// Crossfade at tile seams, in seconds
    #[arg(long)]
    pub crossfade: Option<f64>,

    /// Crossfade curve: linear or equal_power
    #[arg(long)]
    pub curve: Option<CrossfadeCurve>,

    /// Pitch shift in semitones
    #[arg(long, allow_hyphen_values = true)]
    pub pitch: Option<f32>,

    /// Fade-in/out at the output edges, in seconds
    #[arg(long)]
    pub edge_fade: Option<f64>,

    /// Background noise WAV mixed in by the comprehensive strategy
    #[arg(long)]
    pub background: Option<PathBuf>,

    /// Background noise gain
    #[arg(long)]
    pub background_level: Option<f32>,

    /// Seed for reproducible noise
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output bit depth: 16, 24 or 32
    #[arg(long, default_value_t = 32)]
    pub bit_depth: u16,
}

impl AugmentArgs {
    /// Build the effective config: file (or defaults), then flag overrides
    pub fn to_config(&self) -> Result<AugmentationConfig> {
        let mut config = match &self.config {
            Some(path) => AugmentationConfig::from_json_file(path)?,
            None => AugmentationConfig::default(),
        };

        if let Some(duration) = self.duration {
            config.target_duration = duration;
        }
        if let Some(strategy) = self.method {
            config.strategy = strategy;
        }
        if let Some(level) = self.noise_level {
            config.noise_level = level;
        }
        if let Some(rate) = self.stretch_rate {
            config.stretch_rate = rate;
        }
        if let Some(room_size) = self.room_size {
            config.reverb_room_size = room_size;
        }
        if let Some(secs) = self.crossfade {
            config.crossfade_duration = secs;
        }
        if let Some(curve) = self.curve {
            config.crossfade_curve = curve;
        }
        if let Some(steps) = self.pitch {
            config.pitch_steps = steps;
        }
        if let Some(secs) = self.edge_fade {
            config.edge_fade_duration = secs;
        }
        if let Some(level) = self.background_level {
            config.background_level = level;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}
