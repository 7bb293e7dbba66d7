//! In-process animated GIF writer, used when no external transcoder runs.

use crate::error::{Result, StudioError};
use crate::segment::VideoSegment;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Encode every frame of `segment` as an endlessly looping GIF.
pub fn write_gif_to<W: Write>(writer: W, segment: &VideoSegment) -> Result<()> {
    if segment.frames.is_empty() || segment.fps == 0 {
        return Err(StudioError::SegmentMismatch {
            expected: "frames at a positive rate".to_string(),
            actual: format!("{} frames at {} fps", segment.frame_count(), segment.fps),
        });
    }

    let delay = Delay::from_numer_denom_ms(1000, segment.fps);
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(Repeat::Infinite)?;

    let frames = segment.frames.iter().map(|rgb| {
        let rgba = DynamicImage::ImageRgb8(rgb.clone()).to_rgba8();
        Frame::from_parts(rgba, 0, 0, delay)
    });
    encoder.encode_frames(frames)?;
    Ok(())
}

/// Write `segment` to `path` as an animated GIF, creating parent directories.
pub fn write_gif(path: &Path, segment: &VideoSegment) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_gif_to(&mut writer, segment)?;
    writer.flush()?;
    Ok(())
}
