//! Claude Code JSONL transcript reader.
//!
//! Transcripts are append-only, one JSON object per line, newest last.
//! Callers only care about recent activity, so reads are bounded to the
//! last N lines and walked newest-first.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct TranscriptEntry {
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    #[serde(rename = "isSidechain")]
    sidechain: Option<Value>,
    pub message: Option<TranscriptMessage>,
}

impl TranscriptEntry {
    /// Only a literal `true` marks a sidechain entry.
    pub fn is_sidechain(&self) -> bool {
        matches!(self.sidechain, Some(Value::Bool(true)))
    }
}

#[derive(Debug, Deserialize)]
pub struct TranscriptMessage {
    pub role: Option<String>,
    pub content: Option<Value>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<u64>,
    pub cache_read_input_tokens: Option<u64>,
    pub cache_creation_input_tokens: Option<u64>,
}

impl Usage {
    /// Tokens occupying the context window for this turn.
    pub fn context_tokens(&self) -> u64 {
        self.input_tokens.unwrap_or(0)
            + self.cache_read_input_tokens.unwrap_or(0)
            + self.cache_creation_input_tokens.unwrap_or(0)
    }
}

/// Parsed entries from the last `max_lines` lines of the transcript,
/// newest first. Blank and unparsable lines (invalid UTF-8 included) are
/// dropped but still count toward the window. A missing file yields an
/// empty list.
pub fn tail_entries(transcript_path: &Path, max_lines: usize) -> Vec<TranscriptEntry> {
    let file = match File::open(transcript_path) {
        Ok(f) => f,
        Err(e) => {
            debug!("Failed to open transcript {}: {e}", transcript_path.display());
            return Vec::new();
        }
    };

    let mut window: VecDeque<Vec<u8>> = VecDeque::with_capacity(max_lines);
    for line in BufReader::new(file).split(b'\n') {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                debug!("Transcript read stopped: {e}");
                break;
            }
        };
        if window.len() == max_lines {
            window.pop_front();
        }
        window.push_back(line);
    }

    window
        .iter()
        .rev()
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .filter_map(|line| serde_json::from_slice(line).ok())
        .collect()
}
