//! Sequences encoded clips into one video, by stream-copy concat or a chained
//! xfade filter graph.
//!
//! Stitching is best-effort. When the transcoder fails the first clip is
//! returned on its own and every intermediate file is left on disk for
//! diagnosis; a successful run removes the per-clip files and the list file.

use crate::error::StudioError;
use crate::transcoder::executor::CommandExecutor;
use crate::transcoder::ffmpeg::Transcoder;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// How a chain of clips gets joined.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinPlan {
    /// Lossless stream copy, clip after clip.
    Concat,
    /// Pairwise fades of `fade_secs`, each starting at the matching offset.
    Crossfade { fade_secs: f64, offsets: Vec<f64> },
}

/// Decide how to join `clip_count` clips of `frames_per_clip` frames.
///
/// A fade must be positive and strictly shorter than one clip; anything else
/// falls back to concatenation.
pub fn plan_join(clip_count: usize, crossfade_frames: i32, fps: u32, frames_per_clip: u32) -> JoinPlan {
    if crossfade_frames <= 0 || fps == 0 {
        return JoinPlan::Concat;
    }
    if crossfade_frames as u32 >= frames_per_clip {
        tracing::warn!(
            "crossfade of {} frames does not fit clips of {} frames, concatenating instead",
            crossfade_frames,
            frames_per_clip
        );
        return JoinPlan::Concat;
    }

    let fade_secs = crossfade_frames as f64 / fps as f64;
    let clip_secs = frames_per_clip as f64 / fps as f64;
    let offsets = (1..clip_count)
        .map(|i| i as f64 * (clip_secs - fade_secs))
        .collect();
    JoinPlan::Crossfade { fade_secs, offsets }
}

/// Build the chained xfade graph and return it with its final output label.
///
/// Stage `i` fades the composite so far (`[v{i-1}]`, or `[0:v]` for the
/// first stage) into input `i`.
pub fn build_xfade_graph(fade_secs: f64, offsets: &[f64]) -> (String, String) {
    let mut stages = Vec::with_capacity(offsets.len());
    let mut previous = "0:v".to_string();
    for (idx, offset) in offsets.iter().enumerate() {
        let input = idx + 1;
        let label = format!("v{input}");
        stages.push(format!(
            "[{previous}][{input}:v]xfade=transition=fade:duration={fade_secs:.3}:offset={offset:.3}[{label}]"
        ));
        previous = label;
    }
    (stages.join(";"), previous)
}

/// Quote a path for an ffmpeg concat list line.
fn concat_entry(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{escaped}'")
}

/// Write the concat list for `clips` to `list`.
pub fn write_concat_list(list: &Path, clips: &[PathBuf]) -> std::io::Result<()> {
    let mut file = fs::File::create(list)?;
    for clip in clips {
        writeln!(file, "{}", concat_entry(clip))?;
    }
    file.flush()
}

/// Path of the concat list written next to `output`.
pub fn concat_list_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chain".to_string());
    output.with_file_name(format!("{stem}_concat.txt"))
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            tracing::debug!("could not remove {}: {}", path.display(), e);
        }
    }
}

/// A joined video and how many clips it actually holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Stitched {
    pub path: PathBuf,
    pub clips: usize,
}

/// Join `clips` into `output`.
///
/// Returns `None` for an empty chain. A single clip is returned untouched,
/// without invoking the transcoder. On any transcoder failure the first clip
/// is returned, counted as one.
pub fn stitch_clips<E: CommandExecutor>(
    transcoder: &Transcoder<E>,
    clips: Vec<PathBuf>,
    crossfade_frames: i32,
    fps: u32,
    frames_per_clip: u32,
    output: &Path,
) -> Option<Stitched> {
    let first = clips.first()?.clone();
    if clips.len() == 1 {
        return Some(Stitched {
            path: first,
            clips: 1,
        });
    }

    let mut intermediates = clips.clone();
    let result = match plan_join(clips.len(), crossfade_frames, fps, frames_per_clip) {
        JoinPlan::Concat => {
            let list = concat_list_path(output);
            let result = write_concat_list(&list, &clips)
                .map_err(StudioError::from)
                .and_then(|()| transcoder.concat(&list, output));
            intermediates.push(list);
            result
        }
        JoinPlan::Crossfade { fade_secs, offsets } => {
            let (graph, label) = build_xfade_graph(fade_secs, &offsets);
            tracing::debug!("xfade graph: {}", graph);
            transcoder.run_filter_graph(&clips, &graph, &label, output)
        }
    };

    match result {
        Ok(()) => {
            remove_all(&intermediates);
            tracing::info!("stitched {} clips into {}", clips.len(), output.display());
            Some(Stitched {
                path: output.to_path_buf(),
                clips: clips.len(),
            })
        }
        Err(e) => {
            tracing::warn!(
                "stitching failed ({}), keeping first clip {}; intermediates left in place",
                e,
                first.display()
            );
            Some(Stitched {
                path: first,
                clips: 1,
            })
        }
    }
}
