//! Audio Engine Module
//!
//! - Audio buffer type shared by every pipeline stage
//! - WAV file I/O

pub mod buffer;
pub mod io;

pub use buffer::{linear_to_db, target_len, AudioBuffer};
pub use io::{load_wav, save_wav, save_wav_with_depth};
