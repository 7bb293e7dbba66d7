//! Error types for chainstudio.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // External tool errors
    #[error("External tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("{tool} timed out after {timeout_secs}s")]
    ToolTimedOut { tool: String, timeout_secs: u64 },

    // Generation errors
    #[error("Segment generation failed: {message}")]
    Generation { message: String },

    #[error("Segment mismatch: expected {expected}, got {actual}")]
    SegmentMismatch { expected: String, actual: String },

    // Lookup errors
    #[error("Unknown voice: {name}")]
    UnknownVoice { name: String },

    // Media file errors
    #[error("Audio file error: {message}")]
    AudioFile { message: String },

    #[error("Image error: {message}")]
    Image { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl StudioError {
    /// Whether this error is one the transcoder fallback policy absorbs.
    ///
    /// Missing binaries, non-zero exits and timeouts degrade to the raw
    /// artifact. Anything else (I/O on our own files) is a real failure.
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            StudioError::ToolNotFound { .. }
                | StudioError::ToolFailed { .. }
                | StudioError::ToolTimedOut { .. }
        )
    }
}

impl From<hound::Error> for StudioError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => StudioError::Io(io),
            other => StudioError::AudioFile {
                message: other.to_string(),
            },
        }
    }
}

impl From<image::ImageError> for StudioError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => StudioError::Io(io),
            other => StudioError::Image {
                message: other.to_string(),
            },
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, StudioError>;
