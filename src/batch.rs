//! Batch processing
//!
//! Extends every WAV file in a directory, writes `<stem>_extended.wav` next to
//! a `manifest.json` describing each output and its SHA-256 checksum. A file
//! that fails is logged and recorded; the run carries on with the next one.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::{AugmentationConfig, Strategy};
use crate::engine::{load_wav, save_wav_with_depth};
use crate::error::{ExtendError, Result};
use crate::pipeline::Augmentor;

/// Appended to each input stem to name its output
pub const OUTPUT_SUFFIX: &str = "_extended";

/// Manifest file written into the output directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Options that apply to every file in a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// Resample inputs to this rate; native rate when `None`
    pub sample_rate: Option<u32>,
    /// Output bit depth (16, 24 or 32)
    pub bit_depth: u16,
    /// Descend into subdirectories
    pub recursive: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            sample_rate: None,
            bit_depth: 32,
            recursive: false,
        }
    }
}

/// One successfully written output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub input: PathBuf,
    pub output: PathBuf,
    pub strategy: Strategy,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub seed: Option<u64>,
    pub sha256: String,
}

/// One input that could not be processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub error_code: String,
    pub message: String,
}

/// Contents of `manifest.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub config: AugmentationConfig,
    pub processed: Vec<ManifestEntry>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Load a manifest written by `process_dir`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// List `.wav` files under `dir`, sorted by name
pub fn find_wav_files<P: AsRef<Path>>(dir: P, recursive: bool) -> Result<Vec<PathBuf>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).max_depth(max_depth).sort_by_file_name() {
        let entry = entry.map_err(|e| ExtendError::Io(e.into()))?;
        let is_wav = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if entry.file_type().is_file() && is_wav {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Extend every WAV file in `input_dir` into `output_dir`
///
/// With a configured seed, file `i` (in name order) is processed with seed
/// `seed + i`.
///
/// # Errors
/// Only directory-level failures (listing, creating the output directory,
/// writing the manifest) are returned. Per-file failures land in
/// `BatchReport::failures`.
pub fn process_dir<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    augmentor: &Augmentor,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let output_dir = output_dir.as_ref();
    let files = find_wav_files(input_dir.as_ref(), options.recursive)?;
    fs::create_dir_all(output_dir)?;

    info!(
        input_dir = %input_dir.as_ref().display(),
        files = files.len(),
        "starting batch"
    );

    let mut report = BatchReport {
        config: augmentor.config().clone(),
        processed: Vec::new(),
        failures: Vec::new(),
    };

    for (index, path) in files.iter().enumerate() {
        let seed = augmentor.config().seed.map(|s| s.wrapping_add(index as u64));
        match process_file(path, output_dir, augmentor, seed, options) {
            Ok(entry) => {
                info!(input = %path.display(), output = %entry.output.display(), "extended");
                report.processed.push(entry);
            }
            Err(e) => {
                warn!(input = %path.display(), code = e.error_code(), "skipping file: {}", e);
                report.failures.push(BatchFailure {
                    input: path.clone(),
                    error_code: e.error_code().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    let manifest = fs::File::create(output_dir.join(MANIFEST_FILE))?;
    serde_json::to_writer_pretty(manifest, &report)?;

    info!(
        processed = report.processed.len(),
        failed = report.failures.len(),
        "batch complete"
    );
    Ok(report)
}

/// Output path for `input` inside `output_dir`
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}{}.wav", stem, OUTPUT_SUFFIX))
}

fn process_file(
    input: &Path,
    output_dir: &Path,
    augmentor: &Augmentor,
    seed: Option<u64>,
    options: &BatchOptions,
) -> Result<ManifestEntry> {
    let buffer = load_wav(input, options.sample_rate)?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let extended = augmentor.augment(&buffer, &mut rng)?;

    let output = output_path(input, output_dir);
    save_wav_with_depth(&extended, &output, options.bit_depth)?;

    Ok(ManifestEntry {
        input: input.to_path_buf(),
        sha256: file_checksum(&output)?,
        output,
        strategy: augmentor.config().strategy,
        duration_secs: extended.duration_secs(),
        sample_rate: extended.sample_rate(),
        seed,
    })
}

/// SHA-256 of a file as lowercase hex
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
