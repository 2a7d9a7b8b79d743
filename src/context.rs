//! Context window usage bar.

use std::path::Path;

use crate::color;
use crate::transcript;

/// Context window size the percentage is measured against.
pub const CONTEXT_LIMIT: u64 = 200_000;
const USAGE_SCAN_LINES: usize = 100;
const BAR_WIDTH: u64 = 10;

/// Render `" | <bar> <pct>% <tokens>"` for the status line. A missing
/// transcript (brand-new conversation) renders an empty bar.
pub fn analyze(transcript_path: Option<&Path>) -> String {
    let usage = transcript_path.map_or(0, calculate_usage);
    let percentage = (usage * 100 / CONTEXT_LIMIT).min(100);

    format!(
        " | {} {}{percentage}% {}{}",
        progress_bar(percentage),
        context_color(percentage),
        format_number(usage),
        color::RESET
    )
}

/// Token count of the most recent main-chain turn that reported usage.
pub fn calculate_usage(transcript_path: &Path) -> u64 {
    transcript::tail_entries(transcript_path, USAGE_SCAN_LINES)
        .into_iter()
        .filter(|entry| !entry.is_sidechain())
        .filter_map(|entry| entry.message?.usage)
        .map(|usage| usage.context_tokens())
        .find(|&total| total > 0)
        .unwrap_or(0)
}

pub fn progress_bar(percentage: u64) -> String {
    let filled = (percentage * BAR_WIDTH / 100).min(BAR_WIDTH) as usize;
    let empty = BAR_WIDTH as usize - filled;

    let mut bar = String::new();
    if filled > 0 {
        bar.push_str(context_color(percentage));
        bar.push_str(&"█".repeat(filled));
        bar.push_str(color::RESET);
    }
    if empty > 0 {
        bar.push_str(color::GRAY);
        bar.push_str(&"░".repeat(empty));
        bar.push_str(color::RESET);
    }
    bar
}

pub fn context_color(percentage: u64) -> &'static str {
    if percentage < 60 {
        color::CTX_GREEN
    } else if percentage < 80 {
        color::CTX_GOLD
    } else {
        color::CTX_RED
    }
}

/// Compact token count; truncates rather than rounds.
pub fn format_number(num: u64) -> String {
    match num {
        0 => "--".to_string(),
        n if n >= 1_000_000 => format!("{}M", n / 1_000_000),
        n if n >= 1000 => format!("{}k", n / 1000),
        n => n.to_string(),
    }
}
