//! ffmpeg adapter: resize/pad, format conversion, concat, filter graphs and
//! raw frame encoding.
//!
//! `postprocess` and `convert_audio` are best-effort: a missing binary, a
//! non-zero exit or a timeout is logged and the unconverted input is returned
//! as the artifact. The lower-level operations return errors so the video
//! stitcher can apply its own fallback.

use crate::defaults;
use crate::dimensions::Dimensions;
use crate::error::{Result, StudioError};
use crate::format::{AudioFormat, VideoFormat};
use crate::segment::VideoSegment;
use crate::transcoder::executor::CommandExecutor;
use std::path::{Path, PathBuf};

/// External transcoder bound to a command executor.
pub struct Transcoder<E: CommandExecutor> {
    executor: E,
    program: String,
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn strings<const N: usize>(args: [&str; N]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// Scale preserving aspect ratio, then letterbox to exactly `dims`.
pub fn resize_filter(dims: Dimensions) -> String {
    let Dimensions { width: w, height: h } = dims;
    format!("scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2")
}

/// Full `-vf` chain for a post-processing run, if any filtering is needed.
///
/// GIF has no container frame-rate flag, so its rate goes into the chain;
/// without explicit dimensions it is also scaled to a fixed width with the
/// height derived from the aspect ratio.
pub fn video_filter(dims: Option<Dimensions>, fps: u32, format: VideoFormat) -> Option<String> {
    let mut filters = Vec::new();
    if let Some(dims) = dims {
        filters.push(resize_filter(dims));
    }
    if format == VideoFormat::Gif {
        filters.push(format!("fps={fps}"));
        if dims.is_none() {
            filters.push(format!("scale={}:-1:flags=lanczos", defaults::GIF_WIDTH));
        }
    }
    (!filters.is_empty()).then(|| filters.join(","))
}

/// Codec flags for each video container.
pub fn video_codec_args(format: VideoFormat) -> Vec<String> {
    match format {
        VideoFormat::Gif => Vec::new(),
        VideoFormat::Webm => vec![
            "-c:v".to_string(),
            "libvpx-vp9".to_string(),
            "-crf".to_string(),
            defaults::VP9_CRF.to_string(),
            "-b:v".to_string(),
            "0".to_string(),
        ],
        VideoFormat::Mp4 => vec![
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            defaults::X264_PRESET.to_string(),
            "-crf".to_string(),
            defaults::X264_CRF.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
        ],
    }
}

/// Arguments for converting `raw` into `target`.
pub fn postprocess_args(
    raw: &Path,
    target: &Path,
    dims: Option<Dimensions>,
    fps: u32,
    format: VideoFormat,
) -> Vec<String> {
    let mut args = strings(["-y", "-loglevel", "error", "-i"]);
    args.push(path_arg(raw));
    if let Some(filter) = video_filter(dims, fps, format) {
        args.push("-vf".to_string());
        args.push(filter);
    }
    args.extend(video_codec_args(format));
    args.push(path_arg(target));
    args
}

/// Arguments for converting a WAV file to a compressed audio format.
pub fn audio_args(wav: &Path, target: &Path, format: AudioFormat) -> Vec<String> {
    let mut args = strings(["-y", "-loglevel", "error", "-i"]);
    args.push(path_arg(wav));
    match format {
        AudioFormat::Mp3 => args.extend(strings(["-c:a", "libmp3lame", "-q:a", "2"])),
        AudioFormat::Ogg => args.extend(strings(["-c:a", "libvorbis", "-q:a", "5"])),
        AudioFormat::Wav => {}
    }
    args.push(path_arg(target));
    args
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn remove_intermediate(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!("could not remove intermediate {}: {}", path.display(), e);
    }
}

impl<E: CommandExecutor> Transcoder<E> {
    pub fn new(executor: E, program: impl Into<String>) -> Self {
        Self {
            executor,
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn run(&self, args: &[String], input: Option<&[u8]>) -> Result<()> {
        self.executor.execute(&self.program, args, input).map(|_| ())
    }

    /// Whether the transcoder binary runs at all.
    pub fn is_available(&self) -> bool {
        self.version().is_ok()
    }

    /// First line of `-version` output, e.g. `ffmpeg version 6.1.1 ...`.
    pub fn version(&self) -> Result<String> {
        let out = self
            .executor
            .execute(&self.program, &strings(["-version"]), None)?;
        Ok(out.lines().next().unwrap_or_default().trim().to_string())
    }

    /// Resize/pad and convert `raw` into `target`.
    ///
    /// Returns `target` on success, deleting `raw`. On any tool failure the
    /// raw file is kept and its path returned instead.
    pub fn postprocess(
        &self,
        raw: &Path,
        target: &Path,
        dims: Option<Dimensions>,
        fps: u32,
        format: VideoFormat,
    ) -> PathBuf {
        let args = postprocess_args(raw, target, dims, fps, format);
        match ensure_parent_dir(target).and_then(|()| self.run(&args, None)) {
            Ok(()) => {
                if raw != target {
                    remove_intermediate(raw);
                }
                tracing::info!("saved {}", target.display());
                target.to_path_buf()
            }
            Err(e) => {
                tracing::warn!("{} error: {}, returning raw file", self.program, e);
                raw.to_path_buf()
            }
        }
    }

    /// Convert a WAV artifact to `format`, falling back to the WAV itself.
    pub fn convert_audio(&self, wav: &Path, format: AudioFormat) -> PathBuf {
        if format == AudioFormat::Wav {
            return wav.to_path_buf();
        }
        let target = wav.with_extension(format.extension());
        match self.run(&audio_args(wav, &target, format), None) {
            Ok(()) => {
                remove_intermediate(wav);
                tracing::info!("saved {}", target.display());
                target
            }
            Err(e) => {
                tracing::warn!(
                    "{} unavailable for {} export ({}), returning WAV",
                    self.program,
                    format,
                    e
                );
                wav.to_path_buf()
            }
        }
    }

    /// Encode decoded frames to an H.264 clip by piping rgb24 into the tool.
    pub fn encode_frames(&self, segment: &VideoSegment, output: &Path) -> Result<()> {
        let (width, height) = segment.dimensions();
        if segment.frames.is_empty() || width == 0 || height == 0 {
            return Err(StudioError::SegmentMismatch {
                expected: "at least one non-empty frame".to_string(),
                actual: format!("{} frames of {}x{}", segment.frame_count(), width, height),
            });
        }
        if !segment.has_uniform_frames() {
            return Err(StudioError::SegmentMismatch {
                expected: format!("all frames {width}x{height}"),
                actual: "mixed frame sizes".to_string(),
            });
        }
        ensure_parent_dir(output)?;

        let mut args = strings([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
        ]);
        args.push(format!("{width}x{height}"));
        args.push("-r".to_string());
        args.push(segment.fps.to_string());
        args.extend(strings([
            "-i",
            "pipe:0",
            "-an",
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]));
        args.push(path_arg(output));

        self.run(&args, Some(&segment.to_rgb24()))
    }

    /// Lossless stream-copy concatenation driven by a concat list file.
    pub fn concat(&self, list: &Path, output: &Path) -> Result<()> {
        let mut args = strings(["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"]);
        args.push(path_arg(list));
        args.extend(strings(["-c", "copy"]));
        args.push(path_arg(output));
        self.run(&args, None)
    }

    /// Run a `-filter_complex` graph over `inputs`, mapping `output_label` to `output`.
    pub fn run_filter_graph(
        &self,
        inputs: &[PathBuf],
        graph: &str,
        output_label: &str,
        output: &Path,
    ) -> Result<()> {
        let mut args = strings(["-y", "-loglevel", "error"]);
        for input in inputs {
            args.push("-i".to_string());
            args.push(path_arg(input));
        }
        args.push("-filter_complex".to_string());
        args.push(graph.to_string());
        args.push("-map".to_string());
        args.push(format!("[{output_label}]"));
        args.extend(video_codec_args(VideoFormat::Mp4));
        args.push(path_arg(output));
        self.run(&args, None)
    }
}
