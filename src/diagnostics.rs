//! Environment diagnostics.
//!
//! Verifies that the transcoder runs and that the output tree is writable.

use crate::config::Config;
use crate::transcoder::executor::CommandExecutor;
use crate::transcoder::ffmpeg::Transcoder;
use crate::error::StudioError;
use owo_colors::OwoColorize;
use std::path::Path;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Working, with a detail line
    Ok(String),
    /// Tool is not found
    NotFound,
    /// Usable only partially, or broken
    Warning(String),
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckResult::Ok(_))
    }
}

/// Check that the transcoder runs and report its version line.
pub fn check_transcoder<E: CommandExecutor>(transcoder: &Transcoder<E>) -> CheckResult {
    match transcoder.version() {
        Ok(version) if version.is_empty() => CheckResult::Ok(transcoder.program().to_string()),
        Ok(version) => CheckResult::Ok(version),
        Err(StudioError::ToolNotFound { .. }) => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(e.to_string()),
    }
}

/// Check that files can be created under `dir` (creating it if needed).
pub fn check_output_dir(dir: &Path) -> CheckResult {
    if let Err(e) = std::fs::create_dir_all(dir) {
        return CheckResult::Warning(format!("cannot create {}: {}", dir.display(), e));
    }
    let probe = dir.join(format!(".chainstudio-check-{}", std::process::id()));
    match std::fs::write(&probe, b"") {
        Ok(()) => {
            if let Err(e) = std::fs::remove_file(&probe) {
                tracing::debug!("could not remove {}: {}", probe.display(), e);
            }
            CheckResult::Ok(dir.display().to_string())
        }
        Err(e) => CheckResult::Warning(format!("{} is not writable: {}", dir.display(), e)),
    }
}

fn print_result(label: &str, result: &CheckResult) {
    print!("{label}: ");
    match result {
        CheckResult::Ok(detail) => println!("{} {}", "✓".green(), detail),
        CheckResult::NotFound => println!("{}", "✗ NOT FOUND".red()),
        CheckResult::Warning(msg) => println!("{} {}", "⚠ WARNING:".yellow(), msg),
    }
}

/// Run all checks and print results. Returns whether everything passed.
pub fn check_environment<E: CommandExecutor>(config: &Config, transcoder: &Transcoder<E>) -> bool {
    println!("chainstudio {}", crate::version_string());
    println!("Checking environment...\n");

    let transcoder_result = check_transcoder(transcoder);
    print_result(&format!("Transcoder ({})", transcoder.program()), &transcoder_result);
    if transcoder_result == CheckResult::NotFound {
        println!("  Install: sudo apt install ffmpeg    (Debian/Ubuntu)");
        println!("           sudo pacman -S ffmpeg      (Arch)");
        println!("           brew install ffmpeg        (macOS)");
        println!("  Without it audio stays WAV and video falls back to GIF clips.");
    }

    let output_result = check_output_dir(&config.output.root_dir());
    print_result("Output directory", &output_result);

    println!("Generator backend: {}", config.generator.backend);

    println!();
    let all_ok = transcoder_result.is_ok() && output_result.is_ok();
    if all_ok {
        println!("{}", "✓ Ready.".green());
    } else {
        println!("{}", "⚠ Some checks failed; outputs may be degraded.".yellow());
    }
    all_ok
}
