//! Scriptable backend for testing the pipeline without real generation.

use crate::error::{Result, StudioError};
use crate::generator::catalog::ModelQuality;
use crate::generator::{AudioGenerator, ClipRequest, GeneratorBackend, VideoGenerator, VoiceGenerator};
use crate::segment::{AudioSegment, VideoSegment};
use image::RgbImage;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock backend. Audio segments are a constant 0.5, frames are black.
///
/// Per-call sample rates and frame sizes can be scripted to exercise the
/// orchestrator's uniformity checks; calls past the script reuse its last
/// entry.
#[derive(Debug, Clone)]
pub struct MockBackend {
    sample_rates: Vec<u32>,
    frame_sizes: Vec<(u32, u32)>,
    fail_at: Option<usize>,
    loads: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            sample_rates: vec![8000],
            frame_sizes: vec![(4, 4)],
            fail_at: None,
            loads: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample rate for each successive audio or voice call.
    pub fn with_sample_rates(mut self, rates: &[u32]) -> Self {
        self.sample_rates = rates.to_vec();
        self
    }

    /// Frame size for each successive video call.
    pub fn with_frame_sizes(mut self, sizes: &[(u32, u32)]) -> Self {
        self.frame_sizes = sizes.to_vec();
        self
    }

    /// Fail the generation call with this zero-based index.
    pub fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    /// Number of generators loaded so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of generation calls so far, across all media.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn loaded(&self) -> MockGenerator {
        self.loads.fetch_add(1, Ordering::SeqCst);
        MockGenerator {
            backend: self.clone(),
        }
    }
}

fn pick<T: Copy>(script: &[T], index: usize, fallback: T) -> T {
    script
        .get(index)
        .or_else(|| script.last())
        .copied()
        .unwrap_or(fallback)
}

impl GeneratorBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn load_audio(&self, _quality: ModelQuality) -> Result<Box<dyn AudioGenerator>> {
        Ok(Box::new(self.loaded()))
    }

    fn load_video(&self) -> Result<Box<dyn VideoGenerator>> {
        Ok(Box::new(self.loaded()))
    }

    fn load_voice(&self) -> Result<Box<dyn VoiceGenerator>> {
        Ok(Box::new(self.loaded()))
    }
}

#[derive(Debug)]
pub struct MockGenerator {
    backend: MockBackend,
}

impl MockGenerator {
    /// Claim the next call index, failing if it is the scripted failure.
    fn next_call(&self) -> Result<usize> {
        let index = self.backend.calls.fetch_add(1, Ordering::SeqCst);
        if self.backend.fail_at == Some(index) {
            return Err(StudioError::Generation {
                message: format!("mock failure on call {index}"),
            });
        }
        Ok(index)
    }

    fn audio(&self, secs: f32) -> Result<AudioSegment> {
        let index = self.next_call()?;
        let rate = pick(&self.backend.sample_rates, index, 8000);
        let len = (secs.max(0.0) * rate as f32) as usize;
        Ok(AudioSegment::new(vec![0.5; len], rate))
    }
}

impl AudioGenerator for MockGenerator {
    fn generate(&self, _prompt: &str, duration_secs: f32) -> Result<AudioSegment> {
        self.audio(duration_secs)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

impl VideoGenerator for MockGenerator {
    fn generate(&self, request: &ClipRequest<'_>) -> Result<VideoSegment> {
        let index = self.next_call()?;
        let (w, h) = pick(&self.backend.frame_sizes, index, (4, 4));
        let frames = vec![RgbImage::new(w, h); request.frame_count as usize];
        Ok(VideoSegment::new(frames, request.fps))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

impl VoiceGenerator for MockGenerator {
    fn speak(&self, text: &str, _description: &str) -> Result<AudioSegment> {
        // One tenth of a second per word.
        let words = text.split_whitespace().count().max(1);
        self.audio(words as f32 * 0.1)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
