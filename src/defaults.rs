//! Default configuration constants for chainstudio.
//!
//! Shared between the config layer, the CLI and the pipeline so that every
//! entry point starts from the same numbers.

/// Native sample rate of the music model's audio decoder, in Hz.
pub const SAMPLE_RATE: u32 = 32000;

/// Native sample rate of the narration voice model, in Hz.
pub const VOICE_SAMPLE_RATE: u32 = 44100;

/// Default duration of one chained audio segment, in seconds.
pub const SEGMENT_SECS: f32 = 8.0;

/// Default crossfade between chained audio segments, in milliseconds.
pub const CHAIN_CROSSFADE_MS: u32 = 500;

/// Default head/tail blend used when making a single clip loopable.
pub const LOOP_CROSSFADE_MS: u32 = 500;

/// Default playback rate of generated video, in frames per second.
pub const VIDEO_FPS: u32 = 8;

/// Default number of frames generated per video clip.
///
/// Every clip in one chain uses the same count; the xfade offsets rely on it.
pub const VIDEO_FRAMES: u32 = 16;

/// Default crossfade between chained video clips, in frames.
pub const CROSSFADE_FRAMES: i32 = 4;

/// Default classifier-free guidance passed to the video model.
pub const GUIDANCE_SCALE: f32 = 6.0;

/// Width of GIF output when no explicit dimensions are requested.
pub const GIF_WIDTH: u32 = 480;

/// x264 preset used for MP4 output.
pub const X264_PRESET: &str = "medium";

/// x264 constant rate factor used for MP4 output.
pub const X264_CRF: u32 = 23;

/// VP9 constant quality target used for WebM output.
pub const VP9_CRF: u32 = 30;

/// Default external transcoder binary.
pub const FFMPEG: &str = "ffmpeg";

/// Default deadline for one transcoder invocation, in seconds. Zero disables it.
pub const TRANSCODER_TIMEOUT_SECS: u64 = 600;

/// Output root, relative to the user's home directory.
pub const OUTPUT_DIR: &str = "CreationStudio/outputs";

/// Narration chunks are merged until they would reach this many characters.
pub const NARRATION_CHUNK_CHARS: usize = 150;

/// Silence inserted between narration chunks, in seconds.
pub const NARRATION_GAP_SECS: f32 = 0.4;

/// Peak level narration is normalized to.
pub const NARRATION_PEAK: f32 = 0.95;

/// Frame size produced by the built-in synth backend.
pub const SYNTH_WIDTH: u32 = 720;
pub const SYNTH_HEIGHT: u32 = 480;

/// Default generator backend name.
pub const DEFAULT_BACKEND: &str = "synth";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synth_frame_size_is_codec_legal() {
        assert_eq!(SYNTH_WIDTH % 2, 0);
        assert_eq!(SYNTH_HEIGHT % 2, 0);
    }

    #[test]
    fn default_crossfade_fits_inside_default_clip() {
        assert!(CROSSFADE_FRAMES > 0);
        assert!((CROSSFADE_FRAMES as u32) < VIDEO_FRAMES);
    }
}
