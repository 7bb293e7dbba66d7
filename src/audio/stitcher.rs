//! Sequences generated audio segments into one continuous buffer.
//!
//! Segments are joined in the order given, each boundary blended with the
//! crossfade engine. The order is the user's narrative and is never changed.

use crate::audio::crossfade::{append_with_crossfade, fade_samples};
use crate::defaults;
use crate::segment::AudioSegment;

/// Stitch `segments` left to right with a `crossfade_ms` blend at each seam.
///
/// An empty input gives an empty segment at the default rate; a single segment
/// is returned unchanged. All segments are assumed to share one sample rate;
/// the rate of the first is used.
pub fn stitch(segments: Vec<AudioSegment>, crossfade_ms: u32) -> AudioSegment {
    let mut iter = segments.into_iter();
    let Some(first) = iter.next() else {
        return AudioSegment::empty(defaults::SAMPLE_RATE);
    };

    let sample_rate = first.sample_rate;
    let fade = fade_samples(sample_rate, crossfade_ms);
    let mut samples = first.samples;
    for segment in iter {
        append_with_crossfade(&mut samples, &segment.samples, fade);
    }

    AudioSegment::new(samples, sample_rate)
}

/// Expected stitched length for `count` segments of `segment_len` samples.
///
/// Only exact when every segment is at least one fade window long.
pub fn stitched_len(count: usize, segment_len: usize, fade: usize) -> usize {
    if count == 0 {
        return 0;
    }
    count * segment_len - (count - 1) * fade
}
