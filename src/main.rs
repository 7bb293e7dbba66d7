use anyhow::{Context, Result, bail};
use chainstudio::chain::prompts::read_prompts;
use chainstudio::chain::{
    AudioChainOptions, AudioOptions, NarrationOptions, StitchResult, Studio, VideoChainOptions,
};
use chainstudio::cli::{Cli, Commands, ConfigAction, PromptArgs, VideoArgs};
use chainstudio::config::Config;
use chainstudio::diagnostics::check_environment;
use chainstudio::dimensions::list_presets;
use chainstudio::generator::catalog::{DEFAULT_VOICE, list_voices};
use chainstudio::transcoder::{SystemCommandExecutor, Transcoder};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);
    tracing::debug!("chainstudio {}", chainstudio::version_string());

    match cli.command {
        Commands::AudioChain {
            ref prompts,
            segment_secs,
            crossfade_ms,
            quality,
            format,
        } => {
            let mut config = load_cli_config(&cli)?;
            if let Some(secs) = segment_secs {
                config.audio.segment_secs = secs;
            }
            if let Some(ms) = crossfade_ms {
                config.audio.crossfade_ms = ms;
            }
            if let Some(q) = quality {
                config.audio.quality = q;
            }
            if let Some(f) = format {
                config.audio.format = f;
            }
            let prompts = collect_prompts(prompts)?;
            let mut studio = Studio::from_config(&config)?;
            let result = studio.run_audio_chain(&prompts, &AudioChainOptions::from_config(&config))?;
            report(result, cli.json)?;
        }
        Commands::Audio {
            ref prompt,
            category,
            duration,
            make_loop,
            quality,
            format,
        } => {
            let mut config = load_cli_config(&cli)?;
            if let Some(q) = quality {
                config.audio.quality = q;
            }
            if let Some(f) = format {
                config.audio.format = f;
            }
            let mut options = AudioOptions::from_config(&config, category);
            options.duration_secs = duration;
            options.make_loop = make_loop;
            let mut studio = Studio::from_config(&config)?;
            let result = studio.generate_audio(prompt.as_deref().unwrap_or_default(), &options)?;
            report(Some(result), cli.json)?;
        }
        Commands::VideoChain {
            ref prompts,
            ref video,
        } => {
            let mut config = load_cli_config(&cli)?;
            apply_video_args(&mut config, video);
            let prompts = collect_prompts(prompts)?;
            let mut studio = Studio::from_config(&config)?;
            let result = studio.run_video_chain(&prompts, &VideoChainOptions::from_config(&config))?;
            report(result, cli.json)?;
        }
        Commands::Video {
            ref prompt,
            ref video,
        } => {
            let mut config = load_cli_config(&cli)?;
            apply_video_args(&mut config, video);
            let mut studio = Studio::from_config(&config)?;
            let result = studio.generate_video(prompt, &VideoChainOptions::from_config(&config))?;
            report(result, cli.json)?;
        }
        Commands::Narrate {
            ref text,
            ref file,
            ref voice,
            format,
        } => {
            let mut config = load_cli_config(&cli)?;
            if let Some(v) = voice {
                config.audio.voice = v.clone();
            }
            if let Some(f) = format {
                config.audio.format = f;
            }
            let script = match (text, file) {
                (Some(text), _) => text.clone(),
                (None, Some(path)) => read_input(path)?,
                (None, None) => bail!("Provide the script with --text or --file"),
            };
            let mut studio = Studio::from_config(&config)?;
            let result = studio.narrate(&script, &NarrationOptions::from_config(&config))?;
            report(result, cli.json)?;
        }
        Commands::Presets => print_presets(),
        Commands::Voices => print_voices(),
        Commands::Check => {
            let config = load_cli_config(&cli)?;
            let transcoder = Transcoder::new(
                SystemCommandExecutor::with_timeout_secs(config.transcoder.timeout_secs),
                config.transcoder.program.clone(),
            );
            if !check_environment(&config, &transcoder) {
                std::process::exit(1);
            }
        }
        Commands::Config { ref action } => {
            handle_config_command(action, &cli)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over the verbosity flags.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("chainstudio={level},warn"))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/chainstudio/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)
            .with_context(|| format!("Failed to load {}", default_path.display()))?
    };

    Ok(config.with_env_overrides())
}

/// Configuration with the global command-line overrides applied on top.
fn load_cli_config(cli: &Cli) -> Result<Config> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(backend) = &cli.backend {
        config.generator.backend = backend.clone();
    }
    if let Some(program) = &cli.ffmpeg {
        config.transcoder.program = program.clone();
    }
    if let Some(secs) = cli.timeout {
        config.transcoder.timeout_secs = secs;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.root = Some(dir.clone());
    }
    Ok(config)
}

fn apply_video_args(config: &mut Config, args: &VideoArgs) {
    let video = &mut config.video;
    if let Some(frames) = args.frames {
        video.frames = frames;
    }
    if let Some(fps) = args.fps {
        video.fps = fps;
    }
    if let Some(c) = args.crossfade_frames {
        video.crossfade_frames = c;
    }
    if let Some(g) = args.guidance {
        video.guidance_scale = g;
    }
    if args.preset.is_some() {
        video.preset = args.preset.clone();
    }
    if args.width.is_some() {
        video.width = args.width;
    }
    if args.height.is_some() {
        video.height = args.height;
    }
    if let Some(f) = args.format {
        video.format = f;
    }
}

/// Read a file, or stdin for `-`.
fn read_input(path: &Path) -> Result<String> {
    let mut text = String::new();
    if path == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
    } else {
        text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }
    Ok(text)
}

/// `--prompt` values first, then the lines of `--prompts`.
fn collect_prompts(args: &PromptArgs) -> Result<Vec<String>> {
    let mut prompts: Vec<String> = args
        .prompts
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if let Some(path) = &args.prompts_file {
        let text = read_input(path)?;
        prompts.extend(read_prompts(text.as_bytes())?);
    }
    Ok(prompts)
}

fn report(result: Option<StitchResult>, json: bool) -> Result<()> {
    let Some(result) = result else {
        eprintln!("{}", "Nothing to generate.".yellow());
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&result.summary())?);
    } else {
        println!("{}", result.path.display());
    }
    Ok(())
}

fn print_presets() {
    println!("Output presets:");
    for preset in list_presets() {
        let size = match preset.size {
            Some((w, h)) => format!("{w}x{h}"),
            None => "--width/--height".to_string(),
        };
        println!(
            "  {:<32} {:<18} {}",
            preset.name.bold(),
            size,
            preset.aliases.join(", ").dimmed()
        );
    }
}

fn print_voices() {
    println!("Narration voices:");
    for voice in list_voices() {
        let marker = if voice.name == DEFAULT_VOICE {
            " (default)".green().to_string()
        } else {
            String::new()
        };
        println!("  {}{}", voice.name.bold(), marker);
        println!("    {}", voice.description.dimmed());
    }
}

fn handle_config_command(action: &ConfigAction, cli: &Cli) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_cli_config(cli)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
