//! Error handling for audio-extend
//!
//! Every failure carries a stable error code and a recovery hint so that
//! batch tooling can report problems without parsing messages.

use thiserror::Error;

/// Result type alias for audio-extend operations
pub type Result<T> = std::result::Result<T, ExtendError>;

/// Main error type for audio-extend operations
#[derive(Error, Debug)]
pub enum ExtendError {
    // Configuration Errors
    #[error("Invalid configuration: {param} = {value} (expected {expected})")]
    InvalidConfig {
        param: String,
        value: String,
        expected: String,
    },

    #[error("Unknown strategy: {name}")]
    UnknownStrategy { name: String },

    // Audio Errors
    #[error("Audio buffer is empty")]
    EmptyBuffer,

    #[error("Sample rate mismatch: expected {expected}, got {actual}")]
    SampleRateMismatch { expected: u32, actual: u32 },

    // File Errors
    #[error("Failed to read audio file: {path}")]
    UnreadableInput {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Failed to write audio file: {path}")]
    WriteFailed {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Unsupported audio format: {details}")]
    UnsupportedFormat { details: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExtendError {
    /// Shorthand for an out-of-range parameter
    pub fn invalid(param: &str, value: impl ToString, expected: &str) -> Self {
        ExtendError::InvalidConfig {
            param: param.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ExtendError::InvalidConfig { .. } => "INVALID_CONFIG",
            ExtendError::UnknownStrategy { .. } => "UNKNOWN_STRATEGY",
            ExtendError::EmptyBuffer => "EMPTY_BUFFER",
            ExtendError::SampleRateMismatch { .. } => "SAMPLE_RATE_MISMATCH",
            ExtendError::UnreadableInput { .. } => "UNREADABLE_INPUT",
            ExtendError::WriteFailed { .. } => "WRITE_FAILED",
            ExtendError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            ExtendError::Io(_) => "IO_ERROR",
            ExtendError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Returns a suggested recovery action for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ExtendError::InvalidConfig { .. } => "Adjust the parameter to be within its valid range",
            ExtendError::UnknownStrategy { .. } => {
                "Use one of: simple_repeat, stretch, comprehensive, silence_pad, fit_stretch"
            }
            ExtendError::EmptyBuffer => "Check that the input clip contains audio",
            ExtendError::SampleRateMismatch { .. } => {
                "Resample the background clip to the input's sample rate"
            }
            ExtendError::UnreadableInput { .. } => {
                "Check that the file exists and is a valid WAV file"
            }
            ExtendError::WriteFailed { .. } => "Check the output directory exists and is writable",
            ExtendError::UnsupportedFormat { .. } => "Convert to WAV (16/24/32-bit int or 32-bit float)",
            _ => "Check the error details and try again",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ExtendError::invalid("target_duration", -1.0, "> 0");
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert_eq!(ExtendError::EmptyBuffer.error_code(), "EMPTY_BUFFER");
    }

    #[test]
    fn test_invalid_config_message() {
        let err = ExtendError::invalid("stretch_rate", 0.0, "0 < rate <= 1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: stretch_rate = 0 (expected 0 < rate <= 1)"
        );
    }

    #[test]
    fn test_recovery_hints() {
        let err = ExtendError::UnknownStrategy {
            name: "loop".to_string(),
        };
        assert!(err.recovery_hint().contains("comprehensive"));
    }
}
