//! Backend that delegates generation to external programs.
//!
//! Each media kind is configured as an argument vector. Placeholders inside
//! any argument are substituted per call; arguments are never passed through
//! a shell. The program writes its result to `{output}`:
//!
//! - audio and voice: a WAV file
//! - video: a directory it fills with PNG frames, read back in name order
//!
//! Placeholders: `{prompt}`, `{duration}`, `{frames}`, `{fps}`, `{guidance}`,
//! `{quality}`, `{model}`, `{text}`, `{voice}`, `{output}`.

use crate::audio::wav;
use crate::config::GeneratorConfig;
use crate::error::{Result, StudioError};
use crate::generator::catalog::{self, ModelQuality};
use crate::generator::{AudioGenerator, ClipRequest, GeneratorBackend, VideoGenerator, VoiceGenerator};
use crate::segment::{AudioSegment, VideoSegment};
use crate::transcoder::executor::{CommandExecutor, SystemCommandExecutor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const NAME: &str = "command";

/// Program plus argument templates.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    /// Split a configured argument vector; `None` when it is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Substitute `{name}` placeholders in every argument.
    pub fn render(&self, vars: &[(&str, String)]) -> Vec<String> {
        self.args.iter().map(|arg| render_arg(arg, vars)).collect()
    }
}

/// One left-to-right pass over `template`. Substituted values are never
/// scanned again; unknown placeholders stay as written.
fn render_arg(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match vars.iter().find(|(n, _)| *n == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Scratch directories handed out so far in this process.
static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Per-process scratch directories for generator output.
#[derive(Debug)]
struct Scratch {
    root: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        Self {
            root: std::env::temp_dir().join(format!("chainstudio-{}", std::process::id())),
        }
    }

    fn next(&self, name: &str) -> Result<PathBuf> {
        let n = SCRATCH_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = self.root.join(format!("{n:04}"));
        std::fs::create_dir_all(&dir)?;
        Ok(dir.join(name))
    }

    fn release(&self, path: &Path) {
        if let Some(dir) = path.parent()
            && let Err(e) = std::fs::remove_dir_all(dir)
        {
            tracing::debug!("could not remove scratch {}: {}", dir.display(), e);
        }
    }
}

/// Shared state of every generator a command backend loads.
struct Runner {
    executor: Arc<dyn CommandExecutor>,
    scratch: Scratch,
}

impl Runner {
    fn run(&self, template: &CommandTemplate, vars: &[(&str, String)]) -> Result<()> {
        let args = template.render(vars);
        self.executor
            .execute(&template.program, &args, None)
            .map(|_| ())
            .map_err(|e| StudioError::Generation {
                message: format!("{} failed: {}", template.program, e),
            })
    }

    fn read_wav(&self, template: &CommandTemplate, mut vars: Vec<(&str, String)>) -> Result<AudioSegment> {
        let output = self.scratch.next("out.wav")?;
        vars.push(("output", output.to_string_lossy().into_owned()));
        let result = self.run(template, &vars).and_then(|()| {
            wav::read_wav(&output).map_err(|e| StudioError::Generation {
                message: format!("{} produced no readable WAV: {}", template.program, e),
            })
        });
        self.scratch.release(&output);
        result
    }
}

/// Read every PNG in `dir`, sorted by file name.
pub fn read_frames(dir: &Path) -> Result<Vec<image::RgbImage>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("png"))
        })
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|p| -> Result<image::RgbImage> { Ok(image::open(p)?.to_rgb8()) })
        .collect()
}

/// Generators backed by configured external programs.
pub struct CommandBackend {
    audio: Option<CommandTemplate>,
    video: Option<CommandTemplate>,
    voice: Option<CommandTemplate>,
    runner: Arc<Runner>,
}

impl CommandBackend {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::with_executor(
            config,
            Arc::new(SystemCommandExecutor::with_timeout_secs(config.timeout_secs)),
        )
    }

    pub fn with_executor(config: &GeneratorConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            audio: CommandTemplate::from_argv(&config.audio_command),
            video: CommandTemplate::from_argv(&config.video_command),
            voice: CommandTemplate::from_argv(&config.voice_command),
            runner: Arc::new(Runner {
                executor,
                scratch: Scratch::new(),
            }),
        }
    }
}

fn require(template: &Option<CommandTemplate>, key: &str) -> Result<CommandTemplate> {
    template.clone().ok_or_else(|| StudioError::ConfigInvalidValue {
        key: format!("generator.{key}"),
        message: "no command configured for the command backend".to_string(),
    })
}

impl GeneratorBackend for CommandBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn load_audio(&self, quality: ModelQuality) -> Result<Box<dyn AudioGenerator>> {
        Ok(Box::new(CommandAudio {
            template: require(&self.audio, "audio_command")?,
            quality,
            runner: Arc::clone(&self.runner),
        }))
    }

    fn load_video(&self) -> Result<Box<dyn VideoGenerator>> {
        Ok(Box::new(CommandVideo {
            template: require(&self.video, "video_command")?,
            runner: Arc::clone(&self.runner),
        }))
    }

    fn load_voice(&self) -> Result<Box<dyn VoiceGenerator>> {
        Ok(Box::new(CommandVoice {
            template: require(&self.voice, "voice_command")?,
            runner: Arc::clone(&self.runner),
        }))
    }
}

struct CommandAudio {
    template: CommandTemplate,
    quality: ModelQuality,
    runner: Arc<Runner>,
}

impl AudioGenerator for CommandAudio {
    fn generate(&self, prompt: &str, duration_secs: f32) -> Result<AudioSegment> {
        let vars = vec![
            ("prompt", prompt.to_string()),
            ("duration", duration_secs.to_string()),
            ("quality", self.quality.to_string()),
            ("model", self.quality.audio_model_id().to_string()),
        ];
        self.runner.read_wav(&self.template, vars)
    }

    fn model_name(&self) -> &str {
        self.quality.audio_model_id()
    }
}

struct CommandVideo {
    template: CommandTemplate,
    runner: Arc<Runner>,
}

impl VideoGenerator for CommandVideo {
    fn generate(&self, request: &ClipRequest<'_>) -> Result<VideoSegment> {
        let output = self.runner.scratch.next("frames")?;
        std::fs::create_dir_all(&output)?;
        let vars = [
            ("prompt", request.prompt.to_string()),
            ("frames", request.frame_count.to_string()),
            ("fps", request.fps.to_string()),
            ("guidance", request.guidance_scale.to_string()),
            ("model", catalog::VIDEO_MODEL_ID.to_string()),
            ("output", output.to_string_lossy().into_owned()),
        ];

        let result = self.runner.run(&self.template, &vars).and_then(|()| {
            let frames = read_frames(&output)?;
            if frames.is_empty() {
                return Err(StudioError::Generation {
                    message: format!("{} wrote no PNG frames", self.template.program),
                });
            }
            Ok(VideoSegment::new(frames, request.fps))
        });
        self.runner.scratch.release(&output);
        result
    }

    fn model_name(&self) -> &str {
        catalog::VIDEO_MODEL_ID
    }
}

struct CommandVoice {
    template: CommandTemplate,
    runner: Arc<Runner>,
}

impl VoiceGenerator for CommandVoice {
    fn speak(&self, text: &str, description: &str) -> Result<AudioSegment> {
        let vars = vec![
            ("text", text.to_string()),
            ("prompt", text.to_string()),
            ("voice", description.to_string()),
            ("model", catalog::VOICE_MODEL_ID.to_string()),
        ];
        self.runner.read_wav(&self.template, vars)
    }

    fn model_name(&self) -> &str {
        catalog::VOICE_MODEL_ID
    }
}
