//! statusline: Claude Code status line renderer.
//!
//! Reads the status line JSON from stdin and prints one summary line,
//! optionally followed by the last user message.

use std::io::{Read, Write};
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use statusline_hooks::git::BranchCache;
use statusline_hooks::paths::Paths;
use statusline_hooks::session::SessionStore;
use statusline_hooks::statusline::{self, Input};

#[derive(Parser, Debug)]
#[command(name = "statusline", version, about = "Claude Code status line")]
struct Args {
    /// Enable verbose (debug) logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // stdout is the status line; logs go to stderr
    let filter = EnvFilter::try_from_env("STATUSLINE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut raw = String::new();
    std::io::stdin().read_to_string(&mut raw)?;
    let input: Input = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to decode input: {e}"))?;
    debug!("Session {} in {}", input.session_id, input.working_dir().display());

    let sessions = match Paths::discover() {
        Ok(paths) => Some(Arc::new(SessionStore::from_paths(&paths))),
        Err(e) => {
            warn!("Session tracking disabled: {e}");
            None
        }
    };
    let branches = Arc::new(BranchCache::default());

    let segments = statusline::gather(&input, branches, sessions.clone()).await;

    // After the parallel reads, so the write never races them
    if let Some(sessions) = &sessions {
        if let Err(e) = sessions.update(&input.session_id) {
            debug!("Session update skipped: {e}");
        }
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(statusline::render(&input, &segments).as_bytes())?;
    stdout.flush()?;

    Ok(())
}
