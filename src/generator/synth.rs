//! Built-in deterministic backend.
//!
//! Produces test tones, gradient frames and a syllable-like voice buzz, all
//! seeded from the prompt so the same prompt always yields the same segment.
//! Useful for previews, demos and end-to-end runs without any model installed.

use crate::defaults;
use crate::error::Result;
use crate::generator::catalog::ModelQuality;
use crate::generator::{AudioGenerator, ClipRequest, GeneratorBackend, VideoGenerator, VoiceGenerator};
use crate::segment::{AudioSegment, VideoSegment};
use image::{Rgb, RgbImage};
use std::f32::consts::TAU;

pub const NAME: &str = "synth";

/// 64-bit FNV-1a.
pub fn seed(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Tone frequency for a prompt, between 220 and 880 Hz.
fn tone_hz(seed: u64) -> f32 {
    220.0 + (seed % 661) as f32
}

fn sine(len: usize, sample_rate: u32, hz: f32, amplitude: f32) -> Vec<f32> {
    (0..len)
        .map(|i| amplitude * (TAU * hz * i as f32 / sample_rate as f32).sin())
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SynthBackend;

impl SynthBackend {
    pub fn new() -> Self {
        Self
    }
}

impl GeneratorBackend for SynthBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn load_audio(&self, quality: ModelQuality) -> Result<Box<dyn AudioGenerator>> {
        Ok(Box::new(SynthAudio {
            model: format!("synth-{}", quality),
            sample_rate: defaults::SAMPLE_RATE,
        }))
    }

    fn load_video(&self) -> Result<Box<dyn VideoGenerator>> {
        Ok(Box::new(SynthVideo {
            width: defaults::SYNTH_WIDTH,
            height: defaults::SYNTH_HEIGHT,
        }))
    }

    fn load_voice(&self) -> Result<Box<dyn VoiceGenerator>> {
        Ok(Box::new(SynthVoice {
            sample_rate: defaults::VOICE_SAMPLE_RATE,
        }))
    }
}

/// Sine tone whose pitch is derived from the prompt.
#[derive(Debug, Clone)]
pub struct SynthAudio {
    model: String,
    sample_rate: u32,
}

impl AudioGenerator for SynthAudio {
    fn generate(&self, prompt: &str, duration_secs: f32) -> Result<AudioSegment> {
        let len = (duration_secs.max(0.0) * self.sample_rate as f32) as usize;
        let samples = sine(len, self.sample_rate, tone_hz(seed(prompt)), 0.5);
        Ok(AudioSegment::new(samples, self.sample_rate))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Diagonal colour gradient that drifts across frames.
#[derive(Debug, Clone)]
pub struct SynthVideo {
    width: u32,
    height: u32,
}

impl SynthVideo {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn frame(&self, seed: u64, index: u32) -> RgbImage {
        let [r0, g0, b0, ..] = seed.to_le_bytes();
        let shift = index.wrapping_mul(8);
        let (w, h) = (self.width.max(1), self.height.max(1));
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let fx = (x * 255 / w) as u8;
            let fy = (y * 255 / h) as u8;
            Rgb([
                r0.wrapping_add(fx).wrapping_add(shift as u8),
                g0.wrapping_add(fy),
                b0.wrapping_add(fx / 2).wrapping_add(fy / 2),
            ])
        })
    }
}

impl VideoGenerator for SynthVideo {
    fn generate(&self, request: &ClipRequest<'_>) -> Result<VideoSegment> {
        let seed = seed(request.prompt);
        let frames = (0..request.frame_count)
            .map(|i| self.frame(seed, i))
            .collect();
        Ok(VideoSegment::new(frames, request.fps))
    }

    fn model_name(&self) -> &str {
        "synth-gradient"
    }
}

/// Pitched buzz gated into syllables, one per word.
#[derive(Debug, Clone)]
pub struct SynthVoice {
    sample_rate: u32,
}

/// Length of one synthetic syllable, in seconds.
const SYLLABLE_SECS: f32 = 0.18;

impl VoiceGenerator for SynthVoice {
    fn speak(&self, text: &str, description: &str) -> Result<AudioSegment> {
        let words = text.split_whitespace().count().max(1);
        let syllable = (SYLLABLE_SECS * self.sample_rate as f32) as usize;
        let hz = 110.0 + (seed(description) % 110) as f32;

        let mut samples = sine(words * syllable, self.sample_rate, hz, 0.6);
        for (i, s) in samples.iter_mut().enumerate() {
            // Half-sine envelope per syllable.
            let phase = (i % syllable.max(1)) as f32 / syllable.max(1) as f32;
            *s *= (phase * std::f32::consts::PI).sin();
        }
        Ok(AudioSegment::new(samples, self.sample_rate))
    }

    fn model_name(&self) -> &str {
        "synth-voice"
    }
}
