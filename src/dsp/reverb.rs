//! Reverb Simulator
//!
//! Tapped-delay room model: the dry signal plus decaying, time-shifted copies
//! of itself. `room_size` controls both the tail length (tap spacing and tap
//! count) and the wet level. Energy that would land past the end of the buffer
//! is discarded, so the output length equals the input length.

use tracing::debug;

use crate::engine::AudioBuffer;
use crate::error::{ExtendError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Tap spacing at room_size 1.0, in seconds
const MAX_TAP_SPACING_SECS: f32 = 0.05;

/// Number of taps at room_size 1.0
const MAX_TAPS: usize = 6;

/// First-tap gain at room_size 1.0
const WET_SCALE: f32 = 0.3;

/// Per-tap decay at room_size 0.0
const DECAY_OFFSET: f32 = 0.3;

/// Additional per-tap decay at room_size 1.0
const DECAY_SCALE: f32 = 0.4;

// ============================================================================
// Room Model
// ============================================================================

/// One delayed copy of the dry signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    /// Delay in samples
    pub delay: usize,
    /// Linear gain
    pub gain: f32,
}

/// Synthetic impulse response derived from a room size
#[derive(Debug, Clone, PartialEq)]
pub struct RoomModel {
    taps: Vec<Tap>,
}

impl RoomModel {
    /// Build the tap set for `room_size` (0..=1) at `sample_rate`
    ///
    /// # Errors
    /// * `InvalidConfig` - If `room_size` is outside 0..=1
    pub fn new(room_size: f32, sample_rate: u32) -> Result<Self> {
        if !(0.0..=1.0).contains(&room_size) {
            return Err(ExtendError::invalid("reverb_room_size", room_size, "0.0 to 1.0"));
        }
        if room_size == 0.0 {
            return Ok(Self { taps: Vec::new() });
        }

        let spacing = ((MAX_TAP_SPACING_SECS * room_size * sample_rate as f32).round() as usize).max(1);
        let count = ((room_size * MAX_TAPS as f32).ceil() as usize).max(1);
        let wet = WET_SCALE * room_size;
        let decay = DECAY_OFFSET + DECAY_SCALE * room_size;

        let taps = (0..count)
            .map(|k| Tap {
                delay: (k + 1) * spacing,
                gain: wet * decay.powi(k as i32),
            })
            .collect();

        Ok(Self { taps })
    }

    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    /// Delay of the last tap in samples
    pub fn tail_len(&self) -> usize {
        self.taps.last().map_or(0, |t| t.delay)
    }

    /// Mix the taps into a copy of `input`
    pub fn process(&self, input: &[f32]) -> Vec<f32> {
        let mut output = input.to_vec();
        for tap in &self.taps {
            if tap.delay >= input.len() {
                break;
            }
            for (out, &dry) in output[tap.delay..].iter_mut().zip(input.iter()) {
                *out += dry * tap.gain;
            }
        }
        output
    }
}

/// Apply the room model for `room_size` to a buffer
///
/// `room_size == 0` returns an unchanged copy.
///
/// # Errors
/// * `InvalidConfig` - If `room_size` is outside 0..=1
/// * `EmptyBuffer` - If the input holds no samples
pub fn apply_reverb(buffer: &AudioBuffer, room_size: f32) -> Result<AudioBuffer> {
    let room = RoomModel::new(room_size, buffer.sample_rate())?;
    buffer.ensure_not_empty()?;
    debug!(
        room_size,
        taps = room.taps().len(),
        tail_len = room.tail_len(),
        "reverb"
    );
    Ok(AudioBuffer::with_rate(room.process(buffer.samples()), buffer.sample_rate()))
}
