//! Media segment types produced by generators and consumed by the stitchers.

use image::RgbImage;

/// A decoded mono audio segment.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    /// Samples normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioSegment {
    /// Creates a new audio segment.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// An empty segment at the given rate.
    pub fn empty(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    /// A run of silence.
    pub fn silence(duration_secs: f32, sample_rate: u32) -> Self {
        let len = (duration_secs.max(0.0) * sample_rate as f32) as usize;
        Self::new(vec![0.0; len], sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Highest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }
}

/// A decoded video segment: equally sized RGB frames at a fixed rate.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSegment {
    pub frames: Vec<RgbImage>,
    pub fps: u32,
}

impl VideoSegment {
    /// Creates a new video segment.
    pub fn new(frames: Vec<RgbImage>, fps: u32) -> Self {
        Self { frames, fps }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame size, taken from the first frame. `(0, 0)` when empty.
    pub fn dimensions(&self) -> (u32, u32) {
        self.frames
            .first()
            .map(|f| f.dimensions())
            .unwrap_or((0, 0))
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.fps == 0 {
            return 0.0;
        }
        self.frames.len() as f64 / self.fps as f64
    }

    /// Whether every frame has the size of the first one.
    pub fn has_uniform_frames(&self) -> bool {
        let dims = self.dimensions();
        self.frames.iter().all(|f| f.dimensions() == dims)
    }

    /// All frames concatenated as packed rgb24, the layout ffmpeg's rawvideo
    /// demuxer expects.
    pub fn to_rgb24(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.frames.iter().map(|f| f.as_raw().len()).sum());
        for frame in &self.frames {
            out.extend_from_slice(frame.as_raw());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_duration_uses_sample_rate() {
        let seg = AudioSegment::new(vec![0.0; 16000], 32000);
        assert_eq!(seg.duration_secs(), 0.5);
        assert_eq!(seg.len(), 16000);
    }

    #[test]
    fn audio_silence_has_expected_length() {
        let seg = AudioSegment::silence(0.4, 44100);
        assert_eq!(seg.len(), 17640);
        assert!(seg.samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn audio_peak_is_absolute() {
        let seg = AudioSegment::new(vec![0.1, -0.7, 0.3], 8000);
        assert_eq!(seg.peak(), 0.7);
        assert_eq!(AudioSegment::empty(8000).peak(), 0.0);
    }

    #[test]
    fn video_dimensions_and_duration() {
        let frames = vec![RgbImage::new(4, 2); 16];
        let seg = VideoSegment::new(frames, 8);
        assert_eq!(seg.dimensions(), (4, 2));
        assert_eq!(seg.duration_secs(), 2.0);
        assert!(seg.has_uniform_frames());
    }

    #[test]
    fn video_detects_mixed_frame_sizes() {
        let seg = VideoSegment::new(vec![RgbImage::new(4, 2), RgbImage::new(2, 2)], 8);
        assert!(!seg.has_uniform_frames());
    }

    #[test]
    fn rgb24_packs_frames_in_order() {
        let a = RgbImage::from_pixel(1, 1, image::Rgb([1, 2, 3]));
        let b = RgbImage::from_pixel(1, 1, image::Rgb([4, 5, 6]));
        let seg = VideoSegment::new(vec![a, b], 8);
        assert_eq!(seg.to_rgb24(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn empty_video_has_zero_dimensions() {
        let seg = VideoSegment::new(Vec::new(), 8);
        assert_eq!(seg.dimensions(), (0, 0));
        assert!(seg.has_uniform_frames());
    }
}
