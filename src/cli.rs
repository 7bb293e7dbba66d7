//! Command-line interface for chainstudio
//!
//! Provides argument parsing using clap derive macros.

use crate::format::{AudioFormat, VideoFormat};
use crate::generator::catalog::{AudioCategory, ModelQuality};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Prompt-chained audio and video generation with seamless crossfades
#[derive(Parser, Debug)]
#[command(
    name = "chainstudio",
    version,
    about = "Prompt-chained audio and video generation with seamless crossfades"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Generator backend override (synth, command)
    #[arg(long, global = true, value_name = "NAME")]
    pub backend: Option<String>,

    /// Transcoder binary override
    #[arg(long, global = true, value_name = "PATH")]
    pub ffmpeg: Option<String>,

    /// Transcoder deadline per call (e.g. 90s, 10m; 0 disables)
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_duration_secs)]
    pub timeout: Option<u64>,

    /// Output root override
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the artifact summary as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

/// Parse a duration string into whole seconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers (seconds),
/// single-unit (`30s`, `5m`, `2h`), and compound (`1h30m`, `2m30s`).
fn parse_duration_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

/// Where a chain's prompts come from.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct PromptArgs {
    /// One prompt; repeat for a chain (order is kept)
    #[arg(short, long = "prompt", value_name = "TEXT")]
    pub prompts: Vec<String>,

    /// File with one prompt per line ("-" reads stdin)
    #[arg(long = "prompts", value_name = "FILE")]
    pub prompts_file: Option<PathBuf>,
}

/// Video generation and export settings. Unset values come from the config.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct VideoArgs {
    /// Frames generated per clip
    #[arg(long, value_name = "N")]
    pub frames: Option<u32>,

    /// Playback rate
    #[arg(long, value_name = "FPS")]
    pub fps: Option<u32>,

    /// Crossfade between clips in frames (0 or less concatenates)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub crossfade_frames: Option<i32>,

    /// Classifier-free guidance scale
    #[arg(long, value_name = "SCALE")]
    pub guidance: Option<f32>,

    /// Output preset (reels, tiktok, square, shorts, youtube, twitter, custom)
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Width for the custom preset
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Height for the custom preset
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,

    /// Export format
    #[arg(long, value_enum)]
    pub format: Option<VideoFormat>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate one music segment per prompt and crossfade them together
    AudioChain {
        #[command(flatten)]
        prompts: PromptArgs,

        /// Seconds per segment
        #[arg(long, value_name = "SECS")]
        segment_secs: Option<f32>,

        /// Crossfade between segments in milliseconds
        #[arg(long, value_name = "MS")]
        crossfade_ms: Option<u32>,

        /// Music model size
        #[arg(long, value_enum)]
        quality: Option<ModelQuality>,

        /// Export format
        #[arg(long, value_enum)]
        format: Option<AudioFormat>,
    },

    /// Generate background music, a sound effect or an ambience
    Audio {
        /// Prompt (defaults to the category's example)
        prompt: Option<String>,

        /// Audio category, which bounds the duration
        #[arg(long, value_enum, default_value_t = AudioCategory::Bgm)]
        category: AudioCategory,

        /// Duration in seconds (clamped to the category range)
        #[arg(long, value_name = "SECS")]
        duration: Option<f32>,

        /// Blend the ends so the clip loops seamlessly
        #[arg(long = "loop")]
        make_loop: bool,

        /// Music model size
        #[arg(long, value_enum)]
        quality: Option<ModelQuality>,

        /// Export format
        #[arg(long, value_enum)]
        format: Option<AudioFormat>,
    },

    /// Generate one clip per prompt and join them into one video
    VideoChain {
        #[command(flatten)]
        prompts: PromptArgs,

        #[command(flatten)]
        video: VideoArgs,
    },

    /// Generate a single video clip
    Video {
        /// Prompt describing the clip
        prompt: String,

        #[command(flatten)]
        video: VideoArgs,
    },

    /// Turn a script into narration
    Narrate {
        /// Script text
        #[arg(long, value_name = "TEXT", conflicts_with = "file")]
        text: Option<String>,

        /// Script file ("-" reads stdin)
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Voice preset name (see `voices`)
        #[arg(long, value_name = "NAME")]
        voice: Option<String>,

        /// Export format
        #[arg(long, value_enum)]
        format: Option<AudioFormat>,
    },

    /// List output size presets
    Presets,

    /// List narration voices
    Voices,

    /// Check the transcoder and output directory
    Check,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the default configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["chainstudio"]).is_err());
    }

    #[test]
    fn test_parse_audio_chain_with_repeated_prompts() {
        let cli = Cli::try_parse_from([
            "chainstudio",
            "audio-chain",
            "-p",
            "calm intro",
            "--prompt",
            "battle drums",
            "--crossfade-ms",
            "250",
            "--quality",
            "large",
            "--format",
            "mp3",
        ])
        .unwrap();

        match cli.command {
            Commands::AudioChain {
                prompts,
                segment_secs,
                crossfade_ms,
                quality,
                format,
            } => {
                assert_eq!(prompts.prompts, vec!["calm intro", "battle drums"]);
                assert_eq!(prompts.prompts_file, None);
                assert_eq!(segment_secs, None);
                assert_eq!(crossfade_ms, Some(250));
                assert_eq!(quality, Some(ModelQuality::Large));
                assert_eq!(format, Some(AudioFormat::Mp3));
            }
            other => panic!("Expected AudioChain command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_prompts_from_stdin() {
        let cli = Cli::try_parse_from(["chainstudio", "video-chain", "--prompts", "-"]).unwrap();
        match cli.command {
            Commands::VideoChain { prompts, video } => {
                assert_eq!(prompts.prompts_file, Some(PathBuf::from("-")));
                assert_eq!(video, VideoArgs::default());
            }
            other => panic!("Expected VideoChain command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_video_with_preset_and_negative_crossfade() {
        let cli = Cli::try_parse_from([
            "chainstudio",
            "video",
            "a golden retriever on a beach",
            "--preset",
            "reels",
            "--crossfade-frames",
            "-1",
            "--format",
            "gif",
        ])
        .unwrap();
        match cli.command {
            Commands::Video { prompt, video } => {
                assert_eq!(prompt, "a golden retriever on a beach");
                assert_eq!(video.preset.as_deref(), Some("reels"));
                assert_eq!(video.crossfade_frames, Some(-1));
                assert_eq!(video.format, Some(VideoFormat::Gif));
            }
            other => panic!("Expected Video command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_audio_defaults_to_bgm() {
        let cli = Cli::try_parse_from(["chainstudio", "audio", "--loop"]).unwrap();
        match cli.command {
            Commands::Audio {
                prompt,
                category,
                make_loop,
                ..
            } => {
                assert_eq!(prompt, None);
                assert_eq!(category, AudioCategory::Bgm);
                assert!(make_loop);
            }
            other => panic!("Expected Audio command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_audio_category_names() {
        let cli = Cli::try_parse_from(["chainstudio", "audio", "--category", "sfx", "boom"]).unwrap();
        match cli.command {
            Commands::Audio { category, prompt, .. } => {
                assert_eq!(category, AudioCategory::Sfx);
                assert_eq!(prompt.as_deref(), Some("boom"));
            }
            other => panic!("Expected Audio command, got {other:?}"),
        }
    }

    #[test]
    fn test_narrate_text_conflicts_with_file() {
        let result = Cli::try_parse_from([
            "chainstudio",
            "narrate",
            "--text",
            "Hello.",
            "--file",
            "script.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "chainstudio",
            "check",
            "-vv",
            "--ffmpeg",
            "/opt/ffmpeg",
            "--timeout",
            "2m",
            "--json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Check));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.ffmpeg.as_deref(), Some("/opt/ffmpeg"));
        assert_eq!(cli.timeout, Some(120));
        assert!(cli.json);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_parse_config_actions() {
        let cli = Cli::try_parse_from(["chainstudio", "config", "path"]).unwrap();
        match cli.command {
            Commands::Config { action } => assert_eq!(action, ConfigAction::Path),
            other => panic!("Expected Config command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["chainstudio", "completions", "bash"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completions { shell: Shell::Bash }
        ));
    }

    #[test]
    fn test_invalid_command_returns_error() {
        assert!(Cli::try_parse_from(["chainstudio", "render"]).is_err());
    }

    #[test]
    fn test_parse_duration_secs() {
        assert_eq!(parse_duration_secs("0"), Ok(0));
        assert_eq!(parse_duration_secs("45"), Ok(45));
        assert_eq!(parse_duration_secs("1h30m"), Ok(5400));
        assert!(parse_duration_secs("soon").is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
