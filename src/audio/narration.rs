//! Narration assembly: sentence chunking, gap insertion, peak normalization.
//!
//! Voice models handle roughly one breath of text per call, so long scripts
//! are split at sentence ends, merged back into chunks of bounded length,
//! voiced one chunk at a time and joined with short pauses.

use crate::segment::AudioSegment;

/// Split `text` after `.`, `!` or `?` when followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let text = text.trim();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut after_terminal = false;
    let mut in_gap = false;

    for (idx, c) in text.char_indices() {
        if c.is_whitespace() {
            if after_terminal {
                parts.push(&text[start..idx]);
                in_gap = true;
            }
        } else if in_gap {
            start = idx;
            in_gap = false;
        }
        after_terminal = matches!(c, '.' | '!' | '?');
    }
    if !in_gap && start < text.len() {
        parts.push(&text[start..]);
    }
    parts
}

/// Merge sentences into chunks shorter than `max_chars`.
///
/// A single sentence longer than the limit becomes its own chunk. Text with no
/// content yields one chunk holding the original text.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for part in split_sentences(text) {
        if current.len() + part.len() < max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(part);
        } else {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current = part.to_string();
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    if chunks.is_empty() {
        vec![text.to_string()]
    } else {
        chunks
    }
}

/// Join voiced chunks with `gap_secs` of silence between consecutive chunks.
///
/// Returns `None` for an empty input. The rate of the first chunk is used.
pub fn join_with_gaps(chunks: Vec<AudioSegment>, gap_secs: f32) -> Option<AudioSegment> {
    let sample_rate = chunks.first()?.sample_rate;
    let gap = AudioSegment::silence(gap_secs, sample_rate);
    let count = chunks.len();

    let mut samples = Vec::new();
    for (i, chunk) in chunks.into_iter().enumerate() {
        samples.extend_from_slice(&chunk.samples);
        if i + 1 < count {
            samples.extend_from_slice(&gap.samples);
        }
    }
    Some(AudioSegment::new(samples, sample_rate))
}

/// Scale the segment so its loudest sample sits at `peak`. Silence is left alone.
pub fn normalize_peak(segment: &mut AudioSegment, peak: f32) {
    let max = segment.peak();
    if max > 0.0 {
        let gain = peak / max;
        for s in &mut segment.samples {
            *s *= gain;
        }
    }
}
