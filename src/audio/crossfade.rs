//! Linear crossfades at segment boundaries and for seamless loops.
//!
//! At every index of a fade window the fade-out and fade-in weights sum to
//! exactly 1.0, so blending never adds or removes energy at the seam.

/// Number of samples covered by `fade_ms` at `sample_rate`.
pub fn fade_samples(sample_rate: u32, fade_ms: u32) -> usize {
    (sample_rate as u64 * fade_ms as u64 / 1000) as usize
}

/// Weight of the incoming buffer at index `i` of a window of `fade` samples.
#[inline]
pub fn fade_in_weight(i: usize, fade: usize) -> f64 {
    i as f64 / fade as f64
}

/// Weight of the outgoing buffer at index `i` of a window of `fade` samples.
#[inline]
pub fn fade_out_weight(i: usize, fade: usize) -> f64 {
    1.0 - fade_in_weight(i, fade)
}

#[inline]
fn mix(outgoing: f32, incoming: f32, i: usize, fade: usize) -> f32 {
    let w_in = fade_in_weight(i, fade);
    let w_out = 1.0 - w_in;
    (outgoing as f64 * w_out + incoming as f64 * w_in) as f32
}

/// Blend `b` onto the end of `a` over `fade` samples.
///
/// Degrades to plain concatenation when `fade` is zero or longer than either
/// buffer. Otherwise the result is `a.len() + b.len() - fade` samples long.
pub fn blend_boundary(a: &[f32], b: &[f32], fade: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    append_with_crossfade(&mut out, b, fade);
    out
}

/// In-place form of [`blend_boundary`]: `acc` becomes `blend_boundary(acc, next, fade)`.
pub fn append_with_crossfade(acc: &mut Vec<f32>, next: &[f32], fade: usize) {
    if fade == 0 || acc.len() < fade || next.len() < fade {
        acc.extend_from_slice(next);
        return;
    }

    let start = acc.len() - fade;
    for (i, (out, &incoming)) in acc[start..].iter_mut().zip(&next[..fade]).enumerate() {
        *out = mix(*out, incoming, i, fade);
    }
    acc.extend_from_slice(&next[fade..]);
}

/// Crossfade the tail of `buffer` into its head so it loops without a click.
///
/// The blended head is mirrored onto the tail, so the last `fade` samples equal
/// the first `fade` samples. Buffers shorter than two fade windows are
/// returned unchanged.
pub fn make_loopable(buffer: &[f32], sample_rate: u32, fade_ms: u32) -> Vec<f32> {
    let fade = fade_samples(sample_rate, fade_ms);
    if fade == 0 || buffer.len() < fade * 2 {
        return buffer.to_vec();
    }

    let mut result = buffer.to_vec();
    let tail_start = buffer.len() - fade;
    for (i, out) in result[..fade].iter_mut().enumerate() {
        *out = mix(buffer[tail_start + i], buffer[i], i, fade);
    }
    result.copy_within(0..fade, tail_start);
    result
}
