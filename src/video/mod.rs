//! Video chain assembly.

pub mod stitcher;

pub use stitcher::{Stitched, build_xfade_graph, stitch_clips};
