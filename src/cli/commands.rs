//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::batch::{process_dir, BatchOptions};
use crate::cli::AugmentArgs;
use crate::engine::{load_wav, save_wav_with_depth};
use crate::pipeline::Augmentor;
use crate::variants::generate_variants;

/// Build an augmentor from the flags, attaching the background clip if given
fn build_augmentor(args: &AugmentArgs) -> Result<Augmentor> {
    let config = args.to_config().context("invalid configuration")?;
    let augmentor = Augmentor::new(config)?;

    match &args.background {
        Some(path) => {
            let noise = load_wav(path, args.sample_rate)
                .with_context(|| format!("failed to load background {}", path.display()))?;
            Ok(augmentor.with_background(noise)?)
        }
        None => Ok(augmentor),
    }
}

/// Extend a single file.
pub fn extend(input: &Path, output: &Path, args: &AugmentArgs) -> Result<()> {
    let augmentor = build_augmentor(args)?;
    let buffer = load_wav(input, args.sample_rate)
        .with_context(|| format!("failed to load {}", input.display()))?;

    let extended = augmentor
        .augment_seeded(&buffer)
        .with_context(|| format!("failed to extend {}", input.display()))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    save_wav_with_depth(&extended, output, args.bit_depth)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        strategy = %augmentor.config().strategy,
        "done"
    );
    println!(
        "{} -> {} ({:.2}s @ {} Hz)",
        input.display(),
        output.display(),
        extended.duration_secs(),
        extended.sample_rate()
    );

    Ok(())
}

/// Extend every WAV file in a directory.
pub fn batch(input_dir: &Path, output_dir: &Path, recursive: bool, args: &AugmentArgs) -> Result<()> {
    let augmentor = build_augmentor(args)?;
    let options = BatchOptions {
        sample_rate: args.sample_rate,
        bit_depth: args.bit_depth,
        recursive,
    };

    let report = process_dir(input_dir, output_dir, &augmentor, &options)
        .with_context(|| format!("batch over {} failed", input_dir.display()))?;

    println!(
        "Processed {} file(s), {} failure(s)",
        report.processed.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  {}: {} ({})", failure.input.display(), failure.message, failure.error_code);
    }

    Ok(())
}

/// Write `count` variants of one file.
pub fn variants(input: &Path, output_dir: &Path, count: usize, args: &AugmentArgs) -> Result<()> {
    let augmentor = build_augmentor(args)?;
    let buffer = load_wav(input, args.sample_rate)
        .with_context(|| format!("failed to load {}", input.display()))?;

    let mut rng = match augmentor.config().seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let variants = generate_variants(&augmentor, &buffer, count, &mut rng)?;

    fs::create_dir_all(output_dir)?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string());

    for (index, variant) in variants.iter().enumerate() {
        let path = output_dir.join(format!("{}_variant_{}.wav", stem, index + 1));
        save_wav_with_depth(&variant.buffer, &path, args.bit_depth)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!(
            "{} (stretch {:.3}, noise {:.4})",
            path.display(),
            variant.config.stretch_rate,
            variant.config.noise_level
        );
    }

    Ok(())
}
