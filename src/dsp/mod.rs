//! Signal transformation stages
//!
//! Each stage is a pure function from a buffer (plus parameters) to a new
//! buffer. The pipeline module composes them per strategy.

pub mod crossfade;
pub mod noise;
pub mod normalize;
pub mod pitch;
pub mod reverb;
pub mod stretch;
pub mod tile;

pub use crossfade::{crossfade, fade_edges};
pub use noise::{add_background_noise, add_white_noise, Gaussian};
pub use normalize::normalize_peak;
pub use pitch::pitch_shift;
pub use reverb::{apply_reverb, RoomModel, Tap};
pub use stretch::time_stretch;
pub use tile::{pad_with_silence, tile, Tiled};

use serde::{Deserialize, Serialize};

/// Pipeline stages in their fixed processing order
///
/// Stretch → Pitch → Tile/Pad → Crossfade → Noise → Background → Reverb → EdgeFade → Normalize
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Stretch = 0,
    PitchShift = 1,
    Tile = 2,
    SilencePad = 3,
    Crossfade = 4,
    WhiteNoise = 5,
    BackgroundNoise = 6,
    Reverb = 7,
    EdgeFade = 8,
    Normalize = 9,
}

impl Stage {
    /// Stable identifier used in logs and manifests
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Stretch => "stretch",
            Stage::PitchShift => "pitch_shift",
            Stage::Tile => "tile",
            Stage::SilencePad => "silence_pad",
            Stage::Crossfade => "crossfade",
            Stage::WhiteNoise => "white_noise",
            Stage::BackgroundNoise => "background_noise",
            Stage::Reverb => "reverb",
            Stage::EdgeFade => "edge_fade",
            Stage::Normalize => "normalize",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_ordering() {
        assert!(Stage::Stretch < Stage::Tile);
        assert!(Stage::Tile < Stage::Crossfade);
        assert!(Stage::Crossfade < Stage::WhiteNoise);
        assert!(Stage::WhiteNoise < Stage::Reverb);
        assert!(Stage::Reverb < Stage::Normalize);
    }
}
