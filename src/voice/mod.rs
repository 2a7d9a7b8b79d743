//! Voice reminder: spoken notifications for Claude Code hook events.
//!
//! Components:
//! - `config`: JSON config, enabled flag and built-in message defaults
//! - `select`: picks the phrase for a hook event
//! - `speaker`: platform speech with timeout, retry and fallback sound
//! - `stats`: per-event trigger counters
//! - `log`: opt-in debug log file

pub mod config;
pub mod log;
pub mod select;
pub mod speaker;
pub mod stats;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Hook payload. Only the fields message selection needs are typed.
/// Missing and `null` strings both read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HookInput {
    #[serde(deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub hook_event_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub session_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub transcript_path: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub cwd: String,
    /// PreToolUse / PostToolUse only
    #[serde(deserialize_with = "null_as_empty")]
    pub tool_name: String,
    pub tool_input: Option<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    Notification,
    Stop,
    SubagentStop,
    PreToolUse,
    Other,
}

impl HookEvent {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Notification" => Self::Notification,
            "Stop" => Self::Stop,
            "SubagentStop" => Self::SubagentStop,
            "PreToolUse" => Self::PreToolUse,
            _ => Self::Other,
        }
    }
}

impl HookInput {
    pub fn event(&self) -> HookEvent {
        HookEvent::from_name(&self.hook_event_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_fields_read_as_empty() {
        let input: HookInput = serde_json::from_str(
            r#"{"hook_event_name":"Notification","message":null,"tool_name":null,"cwd":null}"#,
        )
        .unwrap();

        assert_eq!(input.event(), HookEvent::Notification);
        assert_eq!(input.message, "");
        assert_eq!(input.tool_name, "");
        assert_eq!(input.cwd, "");
    }

    #[test]
    fn test_missing_fields_default() {
        let input: HookInput = serde_json::from_str(r#"{"message":"Task done"}"#).unwrap();
        assert_eq!(input.message, "Task done");
        assert_eq!(input.event(), HookEvent::Other);
        assert!(input.tool_input.is_none());
    }
}
