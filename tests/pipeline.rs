//! End-to-end runs through the public API, with the transcoder mocked.

use chainstudio::audio::wav;
use chainstudio::chain::{
    AudioChainOptions, NarrationOptions, OutputLayout, StitchedMedia, Studio, VideoChainOptions,
};
use chainstudio::format::{AudioFormat, ExportFormat, VideoFormat};
use chainstudio::generator::catalog::{DEFAULT_VOICE, ModelQuality};
use chainstudio::generator::mock::MockBackend;
use chainstudio::generator::synth::SynthBackend;
use chainstudio::transcoder::{MockCommandExecutor, Transcoder};
use chainstudio::dimensions::Dimensions;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn prompts(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn synth_studio(executor: MockCommandExecutor) -> (Studio<MockCommandExecutor>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let studio = Studio::new(
        Box::new(SynthBackend::new()),
        Transcoder::new(executor, "ffmpeg"),
        OutputLayout::new(dir.path()),
    );
    (studio, dir)
}

#[test]
fn audio_chain_of_three_eight_second_segments() {
    let (mut studio, _dir) = synth_studio(MockCommandExecutor::new());
    let options = AudioChainOptions {
        quality: ModelQuality::Small,
        segment_secs: 8.0,
        crossfade_ms: 500,
        format: AudioFormat::Wav,
    };

    let result = studio
        .run_audio_chain(
            &prompts(&[
                "calm ambient intro with soft pads",
                "intense battle drums and brass",
                "victory fanfare with orchestra",
            ]),
            &options,
        )
        .unwrap()
        .unwrap();

    // 3 x 256000 samples, two 16000-sample overlaps.
    let StitchedMedia::Audio(segment) = &result.media else {
        panic!("expected audio");
    };
    assert_eq!(segment.sample_rate, 32000);
    assert_eq!(segment.len(), 736_000);

    let on_disk = wav::read_wav(&result.path).unwrap();
    assert_eq!(on_disk.len(), 736_000);
    assert_eq!(on_disk.sample_rate, 32000);
    // WAV export never touches the transcoder.
    assert_eq!(studio.transcoder().executor().call_count(), 0);
}

#[test]
fn mp3_conversion_deletes_intermediate_wav() {
    let (mut studio, _dir) = synth_studio(MockCommandExecutor::new().touching_outputs());
    let options = AudioChainOptions {
        quality: ModelQuality::Small,
        segment_secs: 1.0,
        crossfade_ms: 100,
        format: AudioFormat::Mp3,
    };

    let result = studio
        .run_audio_chain(&prompts(&["one", "two"]), &options)
        .unwrap()
        .unwrap();

    assert_eq!(result.format, ExportFormat::Audio(AudioFormat::Mp3));
    assert!(result.path.exists());
    assert!(!result.path.with_extension("wav").exists());
    let call = studio.transcoder().executor().call(0).unwrap();
    assert!(call.args.contains(&"libmp3lame".to_string()));
}

#[test]
fn postprocess_without_transcoder_keeps_raw_file() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.mp4");
    fs::write(&raw, b"raw video").unwrap();
    let target = dir.path().join("final.mp4");

    let transcoder = Transcoder::new(MockCommandExecutor::missing_tool("ffmpeg", 1), "ffmpeg");
    let out = transcoder.postprocess(
        &raw,
        &target,
        Some(Dimensions::new(1080, 1920)),
        8,
        VideoFormat::Mp4,
    );

    assert_eq!(out, raw);
    assert!(raw.exists());
    assert!(!target.exists());
}

#[test]
fn video_chain_with_preset_resizes_in_one_pass() {
    let (mut studio, _dir) = synth_studio(MockCommandExecutor::new().touching_outputs());
    let options = VideoChainOptions {
        frames: 16,
        fps: 8,
        crossfade_frames: 4,
        guidance_scale: 6.0,
        dimensions: Some(Dimensions::new(1080, 1920)),
        format: VideoFormat::Mp4,
    };

    let result = studio
        .run_video_chain(&prompts(&["sunrise", "noon", "sunset"]), &options)
        .unwrap()
        .unwrap();

    let calls = studio.transcoder().executor().calls();
    // Three clip encodes, one xfade graph, one post-process.
    assert_eq!(calls.len(), 5);
    let graph_at = calls[3]
        .args
        .iter()
        .position(|a| a == "-filter_complex")
        .unwrap();
    assert_eq!(
        calls[3].args[graph_at + 1],
        "[0:v][1:v]xfade=transition=fade:duration=0.500:offset=1.500[v1];\
         [v1][2:v]xfade=transition=fade:duration=0.500:offset=3.000[v2]"
    );
    let vf_count = calls[4].args.iter().filter(|a| *a == "-vf").count();
    assert_eq!(vf_count, 1);
    assert!(calls[4].args.iter().any(|a| a.contains("scale=1080:1920")));
    assert!(result.path.exists());

    // Intermediates are gone once the final file exists.
    let video_dir = studio.layout().video_dir();
    let leftovers: Vec<_> = fs::read_dir(&video_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("clip_"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn single_clip_with_crossfade_is_returned_without_stitching() {
    let backend = MockBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let mut studio = Studio::new(
        Box::new(backend),
        Transcoder::new(MockCommandExecutor::new().touching_outputs(), "ffmpeg"),
        OutputLayout::new(dir.path()),
    );
    let options = VideoChainOptions {
        frames: 4,
        fps: 8,
        crossfade_frames: 8,
        guidance_scale: 6.0,
        dimensions: None,
        format: VideoFormat::Mp4,
    };

    studio.generate_video("a lone clip", &options).unwrap().unwrap();

    // One encode and one post-process; no concat or xfade call.
    let calls = studio.transcoder().executor().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| !c.args.contains(&"-filter_complex".to_string())));
    assert!(calls.iter().all(|c| !c.args.contains(&"concat".to_string())));
}

#[test]
fn gif_export_drops_intermediate_raw_video() {
    let (mut studio, _dir) = synth_studio(MockCommandExecutor::new().touching_outputs());
    let options = VideoChainOptions {
        frames: 2,
        fps: 8,
        crossfade_frames: 0,
        guidance_scale: 6.0,
        dimensions: None,
        format: VideoFormat::Gif,
    };

    let result = studio
        .run_video_chain(&prompts(&["a", "b"]), &options)
        .unwrap()
        .unwrap();

    assert_eq!(result.format, ExportFormat::Video(VideoFormat::Gif));
    let calls = studio.transcoder().executor().calls();
    let last = calls.last().unwrap();
    assert!(last.args.iter().any(|a| a.contains("fps=8")));
    assert!(last.args.iter().any(|a| a.contains("scale=480:-1:flags=lanczos")));
    assert!(!has_file_with_prefix(&studio.layout().video_dir(), "raw_"));
}

#[test]
fn narration_with_synth_voice_is_normalized() {
    let (mut studio, _dir) = synth_studio(MockCommandExecutor::new());
    let options = NarrationOptions {
        voice: DEFAULT_VOICE.to_string(),
        format: AudioFormat::Wav,
    };

    let result = studio
        .narrate("Welcome to the studio. Today we build a chain.", &options)
        .unwrap()
        .unwrap();

    let StitchedMedia::Audio(segment) = &result.media else {
        panic!("expected audio");
    };
    assert_eq!(segment.sample_rate, 44100);
    assert!((segment.peak() - 0.95).abs() < 1e-3);
    assert!(result.path.starts_with(studio.layout().voice_dir()));
}

fn has_file_with_prefix(dir: &Path, prefix: &str) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.file_name().to_string_lossy().starts_with(prefix))
        })
        .unwrap_or(false)
}
