//! Top-level sequencing of a studio run.
//!
//! Every operation follows the same shape: generate segments strictly one
//! after another, stitch them, normalize geometry and format, persist under a
//! run-unique name. Generation errors propagate unchanged; transcoder trouble
//! degrades to the best artifact that could still be written.

use crate::audio::{self, narration, wav};
use crate::config::Config;
use crate::defaults;
use crate::dimensions::Dimensions;
use crate::error::{Result, StudioError};
use crate::format::{AudioFormat, ExportFormat, VideoFormat};
use crate::generator::catalog::{self, AudioCategory, ModelQuality};
use crate::generator::{
    self, AudioGenerator, ClipRequest, GeneratorBackend, ModelRegistry, VideoGenerator,
    VoiceGenerator,
};
use crate::segment::{AudioSegment, VideoSegment};
use crate::transcoder::executor::{CommandExecutor, SystemCommandExecutor};
use crate::transcoder::ffmpeg::Transcoder;
use crate::transcoder::gif;
use crate::video::stitcher;
use super::layout::{OutputLayout, RunStamp};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Settings for a chained audio run.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChainOptions {
    pub quality: ModelQuality,
    pub segment_secs: f32,
    pub crossfade_ms: u32,
    pub format: AudioFormat,
}

/// Settings for a chained (or single) video run.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoChainOptions {
    pub frames: u32,
    pub fps: u32,
    pub crossfade_frames: i32,
    pub guidance_scale: f32,
    pub dimensions: Option<Dimensions>,
    pub format: VideoFormat,
}

/// Settings for single-shot audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioOptions {
    pub category: AudioCategory,
    /// Requested length; the category default when `None`.
    pub duration_secs: Option<f32>,
    pub quality: ModelQuality,
    pub make_loop: bool,
    pub loop_crossfade_ms: u32,
    pub format: AudioFormat,
}

/// Settings for narration.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationOptions {
    pub voice: String,
    pub format: AudioFormat,
}

impl AudioChainOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            quality: config.audio.quality,
            segment_secs: config.audio.segment_secs,
            crossfade_ms: config.audio.crossfade_ms,
            format: config.audio.format,
        }
    }
}

impl VideoChainOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            frames: config.video.frames,
            fps: config.video.fps,
            crossfade_frames: config.video.crossfade_frames,
            guidance_scale: config.video.guidance_scale,
            dimensions: config.video.dimensions(),
            format: config.video.format,
        }
    }
}

impl AudioOptions {
    pub fn from_config(config: &Config, category: AudioCategory) -> Self {
        Self {
            category,
            duration_secs: None,
            quality: config.audio.quality,
            make_loop: false,
            loop_crossfade_ms: config.audio.loop_crossfade_ms,
            format: config.audio.format,
        }
    }
}

impl NarrationOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            voice: config.audio.voice.clone(),
            format: config.audio.format,
        }
    }
}

/// Shape of a stitched video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSummary {
    pub clips: usize,
    pub frames_per_clip: u32,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
}

/// The media behind a persisted artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum StitchedMedia {
    Audio(AudioSegment),
    Video(VideoSummary),
}

/// Outcome of a run: the persisted file and the format it actually has.
#[derive(Debug, Clone, PartialEq)]
pub struct StitchResult {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub segments: usize,
    pub media: StitchedMedia,
}

/// Serializable view of a [`StitchResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactSummary {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub kind: &'static str,
    pub segments: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoSummary>,
}

impl StitchResult {
    fn new(path: PathBuf, fallback: ExportFormat, segments: usize, media: StitchedMedia) -> Self {
        let format = ExportFormat::from_path(&path).unwrap_or(fallback);
        Self {
            path,
            format,
            segments,
            media,
        }
    }

    pub fn summary(&self) -> ArtifactSummary {
        let (kind, duration_secs, sample_rate, video) = match &self.media {
            StitchedMedia::Audio(seg) => ("audio", Some(seg.duration_secs()), Some(seg.sample_rate), None),
            StitchedMedia::Video(v) => ("video", None, None, Some(v.clone())),
        };
        ArtifactSummary {
            path: self.path.clone(),
            format: self.format,
            kind,
            segments: self.segments,
            duration_secs,
            sample_rate,
            video,
        }
    }
}

fn mismatch(index: usize, expected: String, actual: String) -> StudioError {
    StudioError::SegmentMismatch {
        expected,
        actual: format!("{actual} (segment {})", index + 1),
    }
}

fn check_rate(expected: u32, segment: &AudioSegment, index: usize) -> Result<()> {
    if segment.sample_rate != expected {
        return Err(mismatch(
            index,
            format!("{expected} Hz"),
            format!("{} Hz", segment.sample_rate),
        ));
    }
    Ok(())
}

fn check_clip(
    segment: &VideoSegment,
    request: &ClipRequest<'_>,
    dims: Option<(u32, u32)>,
    index: usize,
) -> Result<()> {
    if segment.frame_count() != request.frame_count as usize {
        return Err(mismatch(
            index,
            format!("{} frames", request.frame_count),
            format!("{} frames", segment.frame_count()),
        ));
    }
    if segment.fps != request.fps {
        return Err(mismatch(
            index,
            format!("{} fps", request.fps),
            format!("{} fps", segment.fps),
        ));
    }
    if !segment.has_uniform_frames() {
        return Err(mismatch(
            index,
            "uniform frame size".to_string(),
            "mixed frame sizes".to_string(),
        ));
    }
    let (w, h) = segment.dimensions();
    if let Some((ew, eh)) = dims
        && (w, h) != (ew, eh)
    {
        return Err(mismatch(index, format!("{ew}x{eh}"), format!("{w}x{h}")));
    }
    Ok(())
}

/// Owns the loaded generators, the transcoder and the output tree.
pub struct Studio<E: CommandExecutor> {
    backend: Box<dyn GeneratorBackend>,
    transcoder: Transcoder<E>,
    layout: OutputLayout,
    audio_models: ModelRegistry<ModelQuality, Box<dyn AudioGenerator>>,
    video_models: ModelRegistry<&'static str, Box<dyn VideoGenerator>>,
    voice_models: ModelRegistry<&'static str, Box<dyn VoiceGenerator>>,
}

impl Studio<SystemCommandExecutor> {
    /// Studio wired to the real transcoder and the configured backend.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let backend = generator::backend_from_config(&config.generator)?;
        let executor = SystemCommandExecutor::with_timeout_secs(config.transcoder.timeout_secs);
        let transcoder = Transcoder::new(executor, config.transcoder.program.clone());
        Ok(Self::new(
            backend,
            transcoder,
            OutputLayout::new(config.output.root_dir()),
        ))
    }
}

impl<E: CommandExecutor> Studio<E> {
    pub fn new(backend: Box<dyn GeneratorBackend>, transcoder: Transcoder<E>, layout: OutputLayout) -> Self {
        Self {
            backend,
            transcoder,
            layout,
            audio_models: ModelRegistry::new(),
            video_models: ModelRegistry::new(),
            voice_models: ModelRegistry::new(),
        }
    }

    pub fn transcoder(&self) -> &Transcoder<E> {
        &self.transcoder
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Generate one audio segment per prompt and crossfade them together.
    ///
    /// Returns `Ok(None)` when there are no prompts.
    pub fn run_audio_chain(
        &mut self,
        prompts: &[String],
        options: &AudioChainOptions,
    ) -> Result<Option<StitchResult>> {
        if prompts.is_empty() {
            tracing::info!("no prompts, nothing to generate");
            return Ok(None);
        }

        let backend = &self.backend;
        let generator = self
            .audio_models
            .get_or_load(options.quality, |q| backend.load_audio(q))?;

        let mut segments: Vec<AudioSegment> = Vec::with_capacity(prompts.len());
        for (i, prompt) in prompts.iter().enumerate() {
            tracing::info!("generating segment {}/{}: {}", i + 1, prompts.len(), prompt);
            let segment = generator.generate(prompt, options.segment_secs)?;
            if let Some(first) = segments.first() {
                check_rate(first.sample_rate, &segment, i)?;
            }
            segments.push(segment);
        }

        let count = segments.len();
        let stitched = audio::stitch(segments, options.crossfade_ms);
        tracing::info!(
            "stitched {} segments into {:.2}s",
            count,
            stitched.duration_secs()
        );

        let stamp = RunStamp::now();
        let wav_path = self.layout.audio_chain(&stamp);
        let path = self.persist_audio(&wav_path, &stitched, options.format)?;
        Ok(Some(StitchResult::new(
            path,
            ExportFormat::Audio(options.format),
            count,
            StitchedMedia::Audio(stitched),
        )))
    }

    /// One prompt of categorized audio, optionally made loopable.
    pub fn generate_audio(&mut self, prompt: &str, options: &AudioOptions) -> Result<StitchResult> {
        let category = options.category;
        let duration = category.clamp_duration(
            options
                .duration_secs
                .unwrap_or(category.default_duration() as f32),
        );
        let prompt = match prompt.trim() {
            "" => {
                tracing::info!("empty prompt, using the {} example", category);
                category.placeholder()
            }
            p => p,
        };

        let backend = &self.backend;
        let generator = self
            .audio_models
            .get_or_load(options.quality, |q| backend.load_audio(q))?;
        tracing::info!("generating {} ({}s): {}", category, duration, prompt);
        let mut segment = generator.generate(prompt, duration)?;

        if options.make_loop {
            segment.samples =
                audio::make_loopable(&segment.samples, segment.sample_rate, options.loop_crossfade_ms);
        }

        let stamp = RunStamp::now();
        let wav_path = self.layout.category_audio(category, &stamp);
        let path = self.persist_audio(&wav_path, &segment, options.format)?;
        Ok(StitchResult::new(
            path,
            ExportFormat::Audio(options.format),
            1,
            StitchedMedia::Audio(segment),
        ))
    }

    /// Generate one clip per prompt and join them into one video.
    ///
    /// Returns `Ok(None)` when there are no prompts.
    pub fn run_video_chain(
        &mut self,
        prompts: &[String],
        options: &VideoChainOptions,
    ) -> Result<Option<StitchResult>> {
        if prompts.is_empty() {
            tracing::info!("no prompts, nothing to generate");
            return Ok(None);
        }

        let backend = &self.backend;
        let generator = self
            .video_models
            .get_or_load(catalog::VIDEO_MODEL_ID, |_| backend.load_video())?;

        let stamp = RunStamp::now();
        let mut clips = Vec::with_capacity(prompts.len());
        let mut frame_dims = None;
        let mut transcoder_ok = true;

        for (i, prompt) in prompts.iter().enumerate() {
            tracing::info!("generating clip {}/{}: {}", i + 1, prompts.len(), prompt);
            let request = ClipRequest {
                prompt,
                frame_count: options.frames,
                fps: options.fps,
                guidance_scale: options.guidance_scale,
            };
            let segment = generator.generate(&request)?;
            check_clip(&segment, &request, frame_dims, i)?;
            frame_dims.get_or_insert(segment.dimensions());

            let clip = export_clip(
                &self.transcoder,
                &self.layout,
                &stamp,
                i,
                &segment,
                &mut transcoder_ok,
            )?;
            clips.push(clip);
        }

        let raw = self.layout.raw_video(&stamp);
        let Some(stitcher::Stitched { path: stitched, clips }) = stitcher::stitch_clips(
            &self.transcoder,
            clips,
            options.crossfade_frames,
            options.fps,
            options.frames,
            &raw,
        ) else {
            return Ok(None);
        };
        let (width, height) = frame_dims.unwrap_or((0, 0));
        let summary = VideoSummary {
            clips,
            frames_per_clip: options.frames,
            fps: options.fps,
            width,
            height,
        };

        let path = if transcoder_ok {
            let target = self.layout.final_video(&stamp, options.format);
            self.transcoder
                .postprocess(&stitched, &target, options.dimensions, options.fps, options.format)
        } else {
            tracing::warn!("{} unavailable, keeping {}", self.transcoder.program(), stitched.display());
            stitched
        };

        Ok(Some(StitchResult::new(
            path,
            ExportFormat::Video(options.format),
            summary.clips,
            StitchedMedia::Video(summary),
        )))
    }

    /// Single-prompt video: a chain of one.
    pub fn generate_video(
        &mut self,
        prompt: &str,
        options: &VideoChainOptions,
    ) -> Result<Option<StitchResult>> {
        let prompts: Vec<String> = Some(prompt.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .into_iter()
            .collect();
        self.run_video_chain(&prompts, options)
    }

    /// Voice `text` chunk by chunk and join the chunks with short pauses.
    ///
    /// Returns `Ok(None)` when the text has nothing to say.
    pub fn narrate(&mut self, text: &str, options: &NarrationOptions) -> Result<Option<StitchResult>> {
        let voice = catalog::require_voice(&options.voice)?;
        let chunks: Vec<String> = narration::chunk_text(text, defaults::NARRATION_CHUNK_CHARS)
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect();
        if chunks.is_empty() {
            tracing::info!("no text to narrate");
            return Ok(None);
        }

        let backend = &self.backend;
        let generator = self
            .voice_models
            .get_or_load(catalog::VOICE_MODEL_ID, |_| backend.load_voice())?;

        let mut voiced: Vec<AudioSegment> = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let preview: String = chunk.chars().take(50).collect();
            tracing::info!("voicing chunk {}/{}: {}", i + 1, chunks.len(), preview);
            let segment = generator.speak(chunk, voice.description)?;
            if let Some(first) = voiced.first() {
                check_rate(first.sample_rate, &segment, i)?;
            }
            voiced.push(segment);
        }

        let count = voiced.len();
        let Some(mut joined) = narration::join_with_gaps(voiced, defaults::NARRATION_GAP_SECS) else {
            return Ok(None);
        };
        narration::normalize_peak(&mut joined, defaults::NARRATION_PEAK);

        let stamp = RunStamp::now();
        let wav_path = self.layout.voice(&stamp);
        let path = self.persist_audio(&wav_path, &joined, options.format)?;
        Ok(Some(StitchResult::new(
            path,
            ExportFormat::Audio(options.format),
            count,
            StitchedMedia::Audio(joined),
        )))
    }

    fn persist_audio(&self, wav_path: &Path, segment: &AudioSegment, format: AudioFormat) -> Result<PathBuf> {
        wav::write_wav(wav_path, segment)?;
        tracing::info!("saved {}", wav_path.display());
        Ok(self.transcoder.convert_audio(wav_path, format))
    }
}

/// Write one generated clip, as MP4 through the transcoder or as GIF when the
/// transcoder cannot run. After the first tool failure every later clip goes
/// straight to GIF.
fn export_clip<E: CommandExecutor>(
    transcoder: &Transcoder<E>,
    layout: &OutputLayout,
    stamp: &RunStamp,
    index: usize,
    segment: &VideoSegment,
    transcoder_ok: &mut bool,
) -> Result<PathBuf> {
    if *transcoder_ok {
        let clip = layout.clip(stamp, index, VideoFormat::Mp4.extension());
        match transcoder.encode_frames(segment, &clip) {
            Ok(()) => return Ok(clip),
            Err(e) if e.is_tool_failure() => {
                tracing::warn!("{} unavailable ({}), writing GIF clips", transcoder.program(), e);
                *transcoder_ok = false;
            }
            Err(e) => return Err(e),
        }
    }
    let clip = layout.clip(stamp, index, VideoFormat::Gif.extension());
    gif::write_gif(&clip, segment)?;
    Ok(clip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::mock::MockBackend;
    use crate::transcoder::executor::MockCommandExecutor;
    use tempfile::TempDir;

    fn studio(backend: MockBackend, executor: MockCommandExecutor) -> (Studio<MockCommandExecutor>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let studio = Studio::new(
            Box::new(backend),
            Transcoder::new(executor, "ffmpeg"),
            OutputLayout::new(dir.path()),
        );
        (studio, dir)
    }

    fn audio_options() -> AudioChainOptions {
        AudioChainOptions {
            quality: ModelQuality::Small,
            segment_secs: 1.0,
            crossfade_ms: 100,
            format: AudioFormat::Wav,
        }
    }

    fn video_options() -> VideoChainOptions {
        VideoChainOptions {
            frames: 4,
            fps: 8,
            crossfade_frames: 1,
            guidance_scale: 6.0,
            dimensions: None,
            format: VideoFormat::Mp4,
        }
    }

    fn prompts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_prompt_list_is_a_no_op() {
        let backend = MockBackend::new();
        let (mut studio, _dir) = studio(backend.clone(), MockCommandExecutor::new());
        assert_eq!(studio.run_audio_chain(&[], &audio_options()).unwrap(), None);
        assert_eq!(studio.run_video_chain(&[], &video_options()).unwrap(), None);
        assert_eq!(studio.generate_video("   ", &video_options()).unwrap(), None);
        assert_eq!(backend.load_count(), 0);
    }

    #[test]
    fn audio_chain_stitches_in_order_and_writes_wav() {
        let backend = MockBackend::new();
        let (mut studio, _dir) = studio(backend.clone(), MockCommandExecutor::new());

        let result = studio
            .run_audio_chain(&prompts(&["a", "b", "c"]), &audio_options())
            .unwrap()
            .unwrap();

        // 3 x 8000 samples with 800-sample fades.
        let StitchedMedia::Audio(seg) = &result.media else {
            panic!("expected audio");
        };
        assert_eq!(seg.len(), 3 * 8000 - 2 * 800);
        assert_eq!(result.segments, 3);
        assert_eq!(result.format, ExportFormat::Audio(AudioFormat::Wav));
        assert!(result.path.exists());
        assert_eq!(wav::read_wav(&result.path).unwrap().len(), seg.len());
        assert_eq!(backend.call_count(), 3);
    }

    #[test]
    fn generators_load_once_per_studio() {
        let backend = MockBackend::new();
        let (mut studio, _dir) = studio(backend.clone(), MockCommandExecutor::new());
        studio.run_audio_chain(&prompts(&["a"]), &audio_options()).unwrap();
        studio.run_audio_chain(&prompts(&["b"]), &audio_options()).unwrap();
        assert_eq!(backend.load_count(), 1);
    }

    #[test]
    fn mixed_sample_rates_are_rejected() {
        let backend = MockBackend::new().with_sample_rates(&[8000, 16000]);
        let (mut studio, _dir) = studio(backend, MockCommandExecutor::new());
        let result = studio.run_audio_chain(&prompts(&["a", "b"]), &audio_options());
        assert!(matches!(result, Err(StudioError::SegmentMismatch { .. })));
    }

    #[test]
    fn generation_failure_propagates_without_retry() {
        let backend = MockBackend::new().failing_at(1);
        let (mut studio, dir) = studio(backend.clone(), MockCommandExecutor::new());
        let result = studio.run_audio_chain(&prompts(&["a", "b", "c"]), &audio_options());
        assert!(matches!(result, Err(StudioError::Generation { .. })));
        assert_eq!(backend.call_count(), 2);
        assert!(!dir.path().join("audio").exists());
    }

    #[test]
    fn mp3_export_falls_back_to_wav_without_transcoder() {
        let (mut studio, _dir) = studio(MockBackend::new(), MockCommandExecutor::missing_tool("ffmpeg", 1));
        let options = AudioChainOptions {
            format: AudioFormat::Mp3,
            ..audio_options()
        };
        let result = studio.run_audio_chain(&prompts(&["a"]), &options).unwrap().unwrap();
        assert_eq!(result.format, ExportFormat::Audio(AudioFormat::Wav));
        assert!(result.path.exists());
    }

    #[test]
    fn single_shot_audio_is_clamped_and_looped() {
        let (mut studio, _dir) = studio(MockBackend::new(), MockCommandExecutor::new());
        let options = AudioOptions {
            category: AudioCategory::Sfx,
            duration_secs: Some(60.0),
            quality: ModelQuality::Small,
            make_loop: true,
            loop_crossfade_ms: 500,
            format: AudioFormat::Wav,
        };
        let result = studio.generate_audio("boom", &options).unwrap();
        let StitchedMedia::Audio(seg) = &result.media else {
            panic!("expected audio");
        };
        // SFX caps at 8 s.
        assert_eq!(seg.len(), 8 * 8000);
        assert!(result.path.starts_with(studio.layout().category_dir(AudioCategory::Sfx)));
    }

    #[test]
    fn video_chain_encodes_stitches_and_postprocesses() {
        let executor = MockCommandExecutor::new().touching_outputs();
        let (mut studio, _dir) = studio(MockBackend::new(), executor);

        let result = studio
            .run_video_chain(&prompts(&["one", "two"]), &video_options())
            .unwrap()
            .unwrap();

        // Two clip encodes, one xfade, one post-process.
        let calls = studio.transcoder().executor().calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].input_len, Some(4 * 4 * 3 * 4));
        assert!(calls[2].args.contains(&"-filter_complex".to_string()));
        assert_eq!(result.format, ExportFormat::Video(VideoFormat::Mp4));
        assert!(result.path.file_name().unwrap().to_string_lossy().starts_with("video_"));
        assert!(result.path.exists());
        let StitchedMedia::Video(summary) = &result.media else {
            panic!("expected video");
        };
        assert_eq!(summary.clips, 2);
        assert_eq!((summary.width, summary.height), (4, 4));
    }

    #[test]
    fn video_chain_without_transcoder_falls_back_to_gif_clip() {
        let (mut studio, _dir) = studio(MockBackend::new(), MockCommandExecutor::missing_tool("ffmpeg", 10));

        let result = studio
            .run_video_chain(&prompts(&["one", "two"]), &video_options())
            .unwrap()
            .unwrap();

        assert_eq!(result.format, ExportFormat::Video(VideoFormat::Gif));
        assert!(result.path.exists());
        // Only the first encode attempt and the stitch reach the transcoder.
        assert_eq!(studio.transcoder().executor().call_count(), 2);
    }

    #[test]
    fn failed_crossfade_reports_the_single_clip_kept() {
        let executor = MockCommandExecutor::new()
            .touching_outputs()
            .with_response("")
            .with_response("")
            .with_error(StudioError::ToolFailed {
                tool: "ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "xfade: invalid offset".to_string(),
            });
        let (mut studio, _dir) = studio(MockBackend::new(), executor);

        let result = studio
            .run_video_chain(&prompts(&["one", "two"]), &video_options())
            .unwrap()
            .unwrap();

        assert_eq!(result.segments, 1);
        let StitchedMedia::Video(summary) = &result.media else {
            panic!("expected video");
        };
        assert_eq!(summary.clips, 1);
        assert_eq!(result.summary().segments, 1);
        // Encode, encode, failed xfade, post-process of the first clip.
        let calls = studio.transcoder().executor().calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[3].args.iter().any(|a| a.contains("clip_")));
    }

    #[test]
    fn mismatched_frame_sizes_are_rejected() {
        let backend = MockBackend::new().with_frame_sizes(&[(4, 4), (8, 8)]);
        let (mut studio, _dir) = studio(backend, MockCommandExecutor::new().touching_outputs());
        let result = studio.run_video_chain(&prompts(&["one", "two"]), &video_options());
        assert!(matches!(result, Err(StudioError::SegmentMismatch { .. })));
    }

    #[test]
    fn narration_joins_chunks_with_gaps_and_normalizes() {
        let (mut studio, _dir) = studio(MockBackend::new(), MockCommandExecutor::new());
        let text = format!("{}. Next part here.", "word ".repeat(40).trim_end());
        let options = NarrationOptions {
            voice: "Male (Deep Narrator)".to_string(),
            format: AudioFormat::Wav,
        };

        let result = studio.narrate(&text, &options).unwrap().unwrap();
        let StitchedMedia::Audio(seg) = &result.media else {
            panic!("expected audio");
        };
        assert_eq!(result.segments, 2);
        // 40 words + 3 words at 0.1 s each, plus one 0.4 s gap, at 8 kHz.
        assert_eq!(seg.len(), 40 * 800 + 3 * 800 + 3200);
        assert!((seg.peak() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn narration_of_blank_text_is_a_no_op() {
        let (mut studio, _dir) = studio(MockBackend::new(), MockCommandExecutor::new());
        let options = NarrationOptions {
            voice: catalog::DEFAULT_VOICE.to_string(),
            format: AudioFormat::Wav,
        };
        assert_eq!(studio.narrate("   ", &options).unwrap(), None);
    }

    #[test]
    fn narration_rejects_unknown_voice() {
        let (mut studio, _dir) = studio(MockBackend::new(), MockCommandExecutor::new());
        let options = NarrationOptions {
            voice: "Robot".to_string(),
            format: AudioFormat::Wav,
        };
        assert!(matches!(
            studio.narrate("Hello.", &options),
            Err(StudioError::UnknownVoice { .. })
        ));
    }

    #[test]
    fn summary_serializes_for_json_output() {
        let (mut studio, _dir) = studio(MockBackend::new(), MockCommandExecutor::new());
        let result = studio
            .run_audio_chain(&prompts(&["a"]), &audio_options())
            .unwrap()
            .unwrap();
        let json = serde_json::to_value(result.summary()).unwrap();
        assert_eq!(json["kind"], "audio");
        assert_eq!(json["format"], "wav");
        assert_eq!(json["sample_rate"], 8000);
        assert!(json.get("video").is_none());
    }
}
