//! WAV persistence for stitched audio and WAV decoding for generator output.

use crate::error::{Result, StudioError};
use crate::segment::AudioSegment;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

/// Convert a normalized sample to 16-bit PCM, clipping out-of-range values.
pub fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Write a segment as 16-bit mono PCM.
pub fn write_to<W: Write + Seek>(writer: W, segment: &AudioSegment) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: segment.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut wav = hound::WavWriter::new(writer, spec)?;
    for &s in &segment.samples {
        wav.write_sample(to_i16(s))?;
    }
    wav.finalize()?;
    Ok(())
}

/// Write a segment to `path`, creating parent directories as needed.
pub fn write_wav(path: &Path, segment: &AudioSegment) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(path)?);
    write_to(file, segment)
}

/// Decode WAV data into a mono, normalized segment.
///
/// Accepts integer PCM of any width and 32-bit float. Multi-channel input is
/// averaged down to mono.
pub fn read_from<R: Read>(reader: R) -> Result<AudioSegment> {
    let mut wav = hound::WavReader::new(reader).map_err(|e| StudioError::AudioFile {
        message: format!("Failed to parse WAV file: {}", e),
    })?;

    let spec = wav.spec();
    if spec.channels == 0 {
        return Err(StudioError::AudioFile {
            message: "WAV file declares zero channels".to_string(),
        });
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => wav
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            wav.samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let channels = spec.channels as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(AudioSegment::new(samples, spec.sample_rate))
}

/// Read a WAV file from disk.
pub fn read_wav(path: &Path) -> Result<AudioSegment> {
    let file = BufReader::new(File::open(path)?);
    read_from(file)
}
