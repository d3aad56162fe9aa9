//! Repeater/Tiler and silence padding
//!
//! Both bring a clip to an exact sample count. Tiling repeats the clip
//! end-to-end and truncates the last partial tile at the boundary; crossfading
//! the seams is left to the crossfade stage. Padding centers the clip in
//! silence instead.

use rand::distributions::Distribution;
use rand::Rng;
use tracing::debug;

use crate::dsp::noise::Gaussian;
use crate::engine::AudioBuffer;
use crate::error::{ExtendError, Result};

/// A tiled buffer together with the tile period used to build it
#[derive(Debug, Clone, PartialEq)]
pub struct Tiled {
    pub buffer: AudioBuffer,
    /// Length of one tile in samples; seams sit at multiples of this
    pub period: usize,
}

impl Tiled {
    /// Sample positions where one tile ends and the next begins
    pub fn seams(&self) -> impl Iterator<Item = usize> + '_ {
        (1..)
            .map(move |k| k * self.period)
            .take_while(move |&s| s < self.buffer.len())
    }
}

/// Repeat `buffer` end-to-end and truncate to exactly `target_len` samples
///
/// When the input already holds at least `target_len` samples this is a
/// plain truncation.
///
/// # Errors
/// * `EmptyBuffer` - If the input holds no samples
pub fn tile(buffer: &AudioBuffer, target_len: usize) -> Result<Tiled> {
    buffer.ensure_not_empty()?;

    let period = buffer.len();
    let samples: Vec<f32> = buffer
        .samples()
        .iter()
        .copied()
        .cycle()
        .take(target_len)
        .collect();

    debug!(
        period,
        target_len,
        tiles = target_len.div_ceil(period),
        "tile"
    );
    Ok(Tiled {
        buffer: AudioBuffer::with_rate(samples, buffer.sample_rate()),
        period,
    })
}

/// Center `buffer` in silence so it holds exactly `target_len` samples
///
/// `floor(deficit / 2)` samples go before the clip and the rest after. When
/// `pad_noise_level > 0` the padding carries Gaussian noise of that standard
/// deviation instead of digital silence. Longer inputs are truncated.
///
/// # Errors
/// * `EmptyBuffer` - If the input holds no samples
/// * `InvalidConfig` - If `pad_noise_level` is negative or not finite
pub fn pad_with_silence<R: Rng + ?Sized>(
    buffer: &AudioBuffer,
    target_len: usize,
    pad_noise_level: f32,
    rng: &mut R,
) -> Result<AudioBuffer> {
    buffer.ensure_not_empty()?;
    let noise = if pad_noise_level > 0.0 {
        Some(
            Gaussian::new(pad_noise_level)
                .ok_or_else(|| ExtendError::invalid("pad_noise_level", pad_noise_level, ">= 0"))?,
        )
    } else if pad_noise_level == 0.0 {
        None
    } else {
        return Err(ExtendError::invalid("pad_noise_level", pad_noise_level, ">= 0"));
    };

    if buffer.len() >= target_len {
        let samples = buffer.samples()[..target_len].to_vec();
        return Ok(AudioBuffer::with_rate(samples, buffer.sample_rate()));
    }

    let deficit = target_len - buffer.len();
    let before = deficit / 2;
    let after = deficit - before;

    let mut padding = |count: usize| -> Vec<f32> {
        match &noise {
            Some(dist) => (0..count).map(|_| dist.sample(&mut *rng)).collect(),
            None => vec![0.0; count],
        }
    };

    let mut samples = Vec::with_capacity(target_len);
    samples.extend(padding(before));
    samples.extend_from_slice(buffer.samples());
    samples.extend(padding(after));

    debug!(before, after, "silence pad");
    Ok(AudioBuffer::with_rate(samples, buffer.sample_rate()))
}
