//! voice-reminder: Claude Code hook binary for spoken notifications.
//!
//! Reads the hook event JSON from stdin, speaks a short phrase for it and
//! writes the input back to stdout byte for byte. The hook contract needs
//! that passthrough, so nothing after reading stdin is allowed to fail the
//! process or change its output.

use std::io::{Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, warn};

use statusline_hooks::paths::Paths;
use statusline_hooks::voice::config::{is_enabled, VoiceConfig};
use statusline_hooks::voice::select::select_message;
use statusline_hooks::voice::speaker::{SpeakOutcome, Speaker};
use statusline_hooks::voice::stats::{load_stats, update_stats};
use statusline_hooks::voice::{log, HookInput};

const AFTER_HELP: &str = "\
USAGE AS A HOOK:
  voice-reminder < hook-input.json

  Claude Code pipes the hook event JSON to stdin; the same bytes are
  echoed to stdout unchanged.

CONFIGURATION:
  Config file:  ~/.claude/omystatusline/plugins/voice-reminder/config/voice-reminder-config.json
  Enable file:  ~/.claude/omystatusline/plugins/voice-reminder/data/voice-reminder-enabled
  Debug log:    ~/.claude/omystatusline/plugins/voice-reminder/data/voice-reminder-debug.log
  Stats file:   ~/.claude/omystatusline/plugins/voice-reminder/data/voice-reminder-stats.json
  (legacy files directly under ~/.claude/ are still read)

FEATURES:
  - 10-second timeout protection for voice playback
  - Automatic retry on failure (1 retry)
  - Fallback to system sounds when voice fails
  - Multi-language support (English, Chinese)
  - Debug logging (debug_mode in config or VOICE_REMINDER_DEBUG=true)";

#[derive(Parser, Debug)]
#[command(
    name = "voice-reminder",
    about = "Claude Code voice notification hook",
    after_help = AFTER_HELP
)]
struct Args {
    /// Show version information
    #[arg(short = 'v', long = "version")]
    show_version: bool,

    /// Print trigger statistics and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if args.show_version {
        println!("voice-reminder version {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    if args.stats {
        return print_stats();
    }

    let mut input = Vec::new();
    if let Err(e) = std::io::stdin().read_to_end(&mut input) {
        eprintln!("Error reading stdin: {e}");
        return ExitCode::FAILURE;
    }

    handle(&input).await;
    passthrough(&input);
    ExitCode::SUCCESS
}

/// Everything the hook does besides passthrough. Failures end here.
async fn handle(raw: &[u8]) {
    let Ok(paths) = Paths::discover() else {
        return;
    };

    if !is_enabled(&paths) {
        return;
    }

    let Ok(config) = VoiceConfig::load(&paths) else {
        return;
    };

    if log::debug_requested(config.debug_mode) {
        log::init_file_logging(paths.debug_log().writable());
    }

    info!("========== hook triggered ==========");
    info!("Raw input: {}", String::from_utf8_lossy(raw));

    let input: HookInput = match serde_json::from_slice(raw) {
        Ok(input) => input,
        Err(e) => {
            warn!("JSON parse error: {e}");
            return;
        }
    };

    info!(
        "Parsed event={} message={:?} tool={:?}",
        input.hook_event_name, input.message, input.tool_name
    );
    info!("Config language={} speed={}", config.language, config.speed);

    let message = select_message(&config, &input);
    info!("Selected message: {message:?}");

    if !config.sound_effects.enabled {
        info!("Sound effects disabled in config, skipping playback");
    } else if message.is_empty() {
        info!("Nothing to say for this event");
    } else {
        let speaker = Speaker::for_platform(&config.sound_effects.fallback_sound);
        match speaker.speak(&message, config.speed, &config.language).await {
            SpeakOutcome::Spoken { attempts } => info!("Speech played (attempts: {attempts})"),
            SpeakOutcome::Fallback { attempts } => {
                info!("Fallback sound used after {attempts} speech attempt(s)")
            }
        }
    }

    match update_stats(&paths, input.event()) {
        Ok(_) => debug!("Stats updated"),
        Err(e) => warn!("Stats update failed: {e}"),
    }

    info!("========== done ==========");
}

fn passthrough(raw: &[u8]) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(raw);
    let _ = stdout.flush();
}

fn print_stats() -> ExitCode {
    let paths = match Paths::discover() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error getting home directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    match load_stats(&paths) {
        Ok(Some(stats)) => {
            println!("{}", stats.report());
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("No statistics available yet.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error reading stats file: {e}");
            ExitCode::FAILURE
        }
    }
}
