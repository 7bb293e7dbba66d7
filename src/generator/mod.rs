//! Segment generators: the seam between the pipeline and whatever actually
//! produces samples and frames.
//!
//! The pipeline only depends on the traits below. Backends load one generator
//! per model; the orchestrator keeps loaded generators in a
//! [`registry::ModelRegistry`] for the lifetime of a studio.

pub mod catalog;
pub mod command;
pub mod mock;
pub mod registry;
pub mod synth;

use crate::config::GeneratorConfig;
use crate::error::{Result, StudioError};
use crate::segment::{AudioSegment, VideoSegment};
use catalog::ModelQuality;

pub use catalog::{AudioCategory, VoicePreset};
pub use registry::ModelRegistry;

/// Parameters for one generated video clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRequest<'a> {
    pub prompt: &'a str,
    pub frame_count: u32,
    pub fps: u32,
    pub guidance_scale: f32,
}

/// Text-to-music generation.
pub trait AudioGenerator: Send + Sync {
    /// Generate roughly `duration_secs` of audio for `prompt`.
    fn generate(&self, prompt: &str, duration_secs: f32) -> Result<AudioSegment>;

    /// Identifier of the loaded model.
    fn model_name(&self) -> &str;
}

/// Text-to-video generation.
pub trait VideoGenerator: Send + Sync {
    /// Generate `request.frame_count` frames for `request.prompt`.
    fn generate(&self, request: &ClipRequest<'_>) -> Result<VideoSegment>;

    fn model_name(&self) -> &str;
}

/// Text-to-speech generation.
pub trait VoiceGenerator: Send + Sync {
    /// Speak `text` in the voice described by `description`.
    fn speak(&self, text: &str, description: &str) -> Result<AudioSegment>;

    fn model_name(&self) -> &str;
}

/// A family of generators that can be loaded on demand.
pub trait GeneratorBackend: Send + Sync {
    fn name(&self) -> &str;

    fn load_audio(&self, quality: ModelQuality) -> Result<Box<dyn AudioGenerator>>;

    fn load_video(&self) -> Result<Box<dyn VideoGenerator>>;

    fn load_voice(&self) -> Result<Box<dyn VoiceGenerator>>;
}

/// Names accepted for `generator.backend`.
pub const BACKENDS: &[&str] = &[synth::NAME, command::NAME];

/// Build the backend named in `config`.
pub fn backend_from_config(config: &GeneratorConfig) -> Result<Box<dyn GeneratorBackend>> {
    match config.backend.trim().to_ascii_lowercase().as_str() {
        synth::NAME => Ok(Box::new(synth::SynthBackend::new())),
        command::NAME => Ok(Box::new(command::CommandBackend::from_config(config))),
        other => Err(StudioError::ConfigInvalidValue {
            key: "generator.backend".to_string(),
            message: format!("unknown backend '{}' (expected one of: {})", other, BACKENDS.join(", ")),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_known_backends() {
        let mut config = GeneratorConfig::default();
        assert_eq!(backend_from_config(&config).unwrap().name(), "synth");

        config.backend = "Command".to_string();
        assert_eq!(backend_from_config(&config).unwrap().name(), "command");
    }

    #[test]
    fn rejects_unknown_backend() {
        let config = GeneratorConfig {
            backend: "gpu-magic".to_string(),
            ..Default::default()
        };
        match backend_from_config(&config) {
            Err(StudioError::ConfigInvalidValue { key, message }) => {
                assert_eq!(key, "generator.backend");
                assert!(message.contains("gpu-magic"));
            }
            Err(other) => panic!("Expected ConfigInvalidValue, got {other:?}"),
            Ok(_) => panic!("Expected an error"),
        }
    }
}
