use crate::defaults;
use crate::dimensions::{self, Dimensions};
use crate::error::{Result, StudioError};
use crate::format::{AudioFormat, VideoFormat};
use crate::generator::catalog::{self, ModelQuality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub transcoder: TranscoderConfig,
    pub generator: GeneratorConfig,
    pub audio: AudioConfig,
    pub video: VideoConfig,
}

/// Where artifacts are written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Output root. `None` means `~/CreationStudio/outputs`.
    pub root: Option<PathBuf>,
}

/// External transcoder configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscoderConfig {
    pub program: String,
    /// Per-invocation deadline in seconds, 0 disables it.
    pub timeout_secs: u64,
}

/// Segment generator configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub backend: String,
    pub audio_command: Vec<String>,
    pub video_command: Vec<String>,
    pub voice_command: Vec<String>,
    /// Per-call deadline for command generators, 0 disables it.
    pub timeout_secs: u64,
}

/// Audio chain and narration defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub quality: ModelQuality,
    pub segment_secs: f32,
    pub crossfade_ms: u32,
    pub loop_crossfade_ms: u32,
    pub format: AudioFormat,
    pub voice: String,
}

/// Video chain defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoConfig {
    pub frames: u32,
    pub fps: u32,
    pub crossfade_frames: i32,
    pub guidance_scale: f32,
    /// Preset name or alias; `None` keeps the generated size.
    pub preset: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: VideoFormat,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: defaults::FFMPEG.to_string(),
            timeout_secs: defaults::TRANSCODER_TIMEOUT_SECS,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            backend: defaults::DEFAULT_BACKEND.to_string(),
            audio_command: Vec::new(),
            video_command: Vec::new(),
            voice_command: Vec::new(),
            timeout_secs: 0,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            quality: ModelQuality::default(),
            segment_secs: defaults::SEGMENT_SECS,
            crossfade_ms: defaults::CHAIN_CROSSFADE_MS,
            loop_crossfade_ms: defaults::LOOP_CROSSFADE_MS,
            format: AudioFormat::default(),
            voice: catalog::DEFAULT_VOICE.to_string(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            frames: defaults::VIDEO_FRAMES,
            fps: defaults::VIDEO_FPS,
            crossfade_frames: defaults::CROSSFADE_FRAMES,
            guidance_scale: defaults::GUIDANCE_SCALE,
            preset: None,
            width: None,
            height: None,
            format: VideoFormat::default(),
        }
    }
}

impl OutputConfig {
    /// Resolved output root.
    pub fn root_dir(&self) -> PathBuf {
        match &self.root {
            Some(root) => root.clone(),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(defaults::OUTPUT_DIR),
        }
    }
}

impl VideoConfig {
    /// Target dimensions from the preset and custom size, if any.
    ///
    /// An unrecognised preset means no resize, like "Custom" without a size.
    pub fn dimensions(&self) -> Option<Dimensions> {
        let preset = self.preset.as_deref()?;
        if dimensions::find_preset(preset).is_none() {
            tracing::warn!("unknown preset '{}', keeping the generated size", preset);
        }
        dimensions::resolve(preset, self.width, self.height)
    }
}

fn invalid(key: &str, message: &str) -> StudioError {
    StudioError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StudioError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                StudioError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(StudioError::ConfigFileNotFound { .. }) => {
                tracing::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CHAINSTUDIO_FFMPEG → transcoder.program
    /// - CHAINSTUDIO_OUTPUT_DIR → output.root
    /// - CHAINSTUDIO_BACKEND → generator.backend
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(program) = std::env::var("CHAINSTUDIO_FFMPEG")
            && !program.is_empty()
        {
            self.transcoder.program = program;
        }

        if let Ok(root) = std::env::var("CHAINSTUDIO_OUTPUT_DIR")
            && !root.is_empty()
        {
            self.output.root = Some(PathBuf::from(root));
        }

        if let Ok(backend) = std::env::var("CHAINSTUDIO_BACKEND")
            && !backend.is_empty()
        {
            self.generator.backend = backend;
        }

        self
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.transcoder.program.trim().is_empty() {
            return Err(invalid("transcoder.program", "must not be empty"));
        }
        if self.audio.segment_secs.is_nan() || self.audio.segment_secs <= 0.0 {
            return Err(invalid("audio.segment_secs", "must be positive"));
        }
        if self.video.fps == 0 {
            return Err(invalid("video.fps", "must be positive"));
        }
        if self.video.frames == 0 {
            return Err(invalid("video.frames", "must be positive"));
        }
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| StudioError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/chainstudio/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chainstudio")
            .join("config.toml")
    }
}
