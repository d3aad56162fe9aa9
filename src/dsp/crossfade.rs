//! Crossfader
//!
//! Smooths the seams of a tiled buffer with a length-preserving overlap-mix.
//!
//! For a seam at `s` the window spans `h` samples on each side, where
//! `h = min(fade_len, period) / 2` clamped to the buffer. Inside the window
//! the earlier tile fades out while the later tile fades in. Each tile is
//! continued past its own edge by reflection about the seam, so both ends of
//! the window meet the untouched neighbouring samples without a step. The
//! output always has the same length as the input.

use tracing::debug;

use crate::config::CrossfadeCurve;
use crate::dsp::tile::Tiled;
use crate::engine::AudioBuffer;

/// Crossfade every internal seam of a tiled buffer
pub fn crossfade(tiled: &Tiled, fade_len: usize, curve: CrossfadeCurve) -> AudioBuffer {
    let src = tiled.buffer.samples();
    let len = src.len();
    let mut out = src.to_vec();

    let window = fade_len.min(tiled.period);
    let half = window / 2;
    let mut seams = 0usize;

    if half > 0 {
        for seam in tiled.seams() {
            let h = half.min(seam).min(len - seam);
            if h == 0 {
                continue;
            }

            let width = 2 * h;
            for j in 0..width {
                let p = seam - h + j;
                let mirrored = 2 * seam - 1 - p;
                let (earlier, later) = if p < seam {
                    (src[p], src[mirrored])
                } else {
                    (src[mirrored], src[p])
                };

                let t = (j as f32 + 0.5) / width as f32;
                let (fade_out, fade_in) = curve.gains(t);
                out[p] = earlier * fade_out + later * fade_in;
            }
            seams += 1;
        }
    }

    debug!(seams, window, ?curve, "crossfade");
    AudioBuffer::with_rate(out, tiled.buffer.sample_rate())
}

/// Linear fade-in at the start and fade-out at the end
///
/// Skipped when the buffer is not longer than `2 * fade_len`.
pub fn fade_edges(buffer: &AudioBuffer, fade_len: usize) -> AudioBuffer {
    let mut out = buffer.samples().to_vec();
    let len = out.len();

    if fade_len > 1 && len > 2 * fade_len {
        let step = 1.0 / (fade_len - 1) as f32;
        for i in 0..fade_len {
            let gain = i as f32 * step;
            out[i] *= gain;
            out[len - 1 - i] *= gain;
        }
    }

    AudioBuffer::with_rate(out, buffer.sample_rate())
}
