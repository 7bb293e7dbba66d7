//! Audio buffer processing: crossfades, chain stitching, narration, WAV I/O.

pub mod crossfade;
pub mod narration;
pub mod stitcher;
pub mod wav;

pub use crossfade::{blend_boundary, fade_samples, make_loopable};
pub use stitcher::stitch;
