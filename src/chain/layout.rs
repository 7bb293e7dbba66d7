//! On-disk artifact layout and run-unique file names.
//!
//! ```text
//! <root>/audio/bgm/chain_<stamp>.wav
//! <root>/audio/<category>/<category>_<stamp>.wav
//! <root>/video/raw_<stamp>.mp4
//! <root>/video/clip_<stamp>_<nn>.mp4
//! <root>/video/video_<stamp>.<ext>
//! <root>/voice/voice_<stamp>.wav
//! ```

use crate::format::VideoFormat;
use crate::generator::catalog::AudioCategory;
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};

/// Timestamp naming one run. Millisecond resolution keeps back-to-back runs apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp(String);

impl RunStamp {
    pub fn now() -> Self {
        Self::from_time(Local::now())
    }

    pub fn from_time(time: DateTime<Local>) -> Self {
        Self(time.format("%Y%m%d_%H%M%S_%3f").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output directory tree.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join("audio")
    }

    pub fn category_dir(&self, category: AudioCategory) -> PathBuf {
        self.audio_dir().join(category.dir_name())
    }

    pub fn video_dir(&self) -> PathBuf {
        self.root.join("video")
    }

    pub fn voice_dir(&self) -> PathBuf {
        self.root.join("voice")
    }

    /// Stitched audio chain, before format conversion. Chains are music, so
    /// they land with the background tracks.
    pub fn audio_chain(&self, stamp: &RunStamp) -> PathBuf {
        self.category_dir(AudioCategory::Bgm)
            .join(format!("chain_{stamp}.wav"))
    }

    /// Single-shot audio, before format conversion.
    pub fn category_audio(&self, category: AudioCategory, stamp: &RunStamp) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}_{stamp}.wav", category.dir_name()))
    }

    /// Stitched video before post-processing.
    pub fn raw_video(&self, stamp: &RunStamp) -> PathBuf {
        self.video_dir().join(format!("raw_{stamp}.mp4"))
    }

    /// Per-clip intermediate with the given extension.
    pub fn clip(&self, stamp: &RunStamp, index: usize, extension: &str) -> PathBuf {
        self.video_dir()
            .join(format!("clip_{stamp}_{index:02}.{extension}"))
    }

    /// Final post-processed video.
    pub fn final_video(&self, stamp: &RunStamp, format: VideoFormat) -> PathBuf {
        self.video_dir()
            .join(format!("video_{stamp}.{}", format.extension()))
    }

    /// Narration, before format conversion.
    pub fn voice(&self, stamp: &RunStamp) -> PathBuf {
        self.voice_dir().join(format!("voice_{stamp}.wav"))
    }

    /// Create every directory of the tree.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [self.audio_dir(), self.video_dir(), self.voice_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
