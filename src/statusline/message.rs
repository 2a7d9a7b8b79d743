//! Last user message block shown under the status line.

use std::path::Path;

use serde_json::Value;

use crate::color;
use crate::transcript;

const MESSAGE_SCAN_LINES: usize = 200;
const MAX_LINES: usize = 3;
const LINE_WIDTH: usize = 80;

/// Markers the host wraps around slash-command output and other
/// non-human turns.
const COMMAND_TAGS: [&str; 4] = [
    "<local-command-stdout>",
    "<command-name>",
    "<command-message>",
    "<command-args>",
];

/// Most recent human-typed message of `session_id`, formatted for display.
/// Empty when none is found in the scan window.
pub fn extract_user_message(transcript_path: &Path, session_id: &str) -> String {
    transcript::tail_entries(transcript_path, MESSAGE_SCAN_LINES)
        .into_iter()
        .filter(|entry| !entry.is_sidechain())
        .filter(|entry| entry.session_id.as_deref() == Some(session_id))
        .filter(|entry| entry.entry_type.as_deref() == Some("user"))
        .filter_map(|entry| entry.message)
        .filter(|message| message.role.as_deref() == Some("user"))
        .find_map(|message| match message.content {
            Some(Value::String(content)) if !is_system_message(&content) => Some(content),
            _ => None,
        })
        .map(|content| format_user_message(&content))
        .unwrap_or_default()
}

pub fn is_system_message(content: &str) -> bool {
    (content.starts_with('[') && content.ends_with(']'))
        || (content.starts_with('{') && content.ends_with('}'))
        || COMMAND_TAGS.iter().any(|tag| content.contains(tag))
        || content.starts_with("Caveat:")
}

pub fn format_user_message(message: &str) -> String {
    if message.is_empty() {
        return String::new();
    }

    let lines: Vec<&str> = message.split('\n').collect();
    let mut out: Vec<String> = lines
        .iter()
        .take(MAX_LINES)
        .map(|line| {
            format!(
                "{}｜{}{}{}",
                color::RESET,
                color::GREEN,
                truncate(line.trim(), LINE_WIDTH),
                color::RESET
            )
        })
        .collect();

    if lines.len() > MAX_LINES {
        out.push(format!(
            "{}｜... ({} more lines){}",
            color::RESET,
            lines.len() - MAX_LINES,
            color::RESET
        ));
    }

    out.join("\n") + "\n"
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    }
}
