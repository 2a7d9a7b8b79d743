//! Phrase selection for hook events.

use super::config::{pick, EventMessages, VoiceConfig};
use super::{HookEvent, HookInput};

const ASK_USER_QUESTION: &str = "AskUserQuestion";

/// Phrase to speak for `input`. Empty means stay silent.
pub fn select_message(config: &VoiceConfig, input: &HookInput) -> String {
    let messages = config.messages();
    let toggles = &config.events;

    match input.event() {
        HookEvent::Notification if toggles.notification => {
            select_notification(&messages.notification, &input.message)
        }
        HookEvent::Stop if toggles.stop => pick(&messages.stop.default),
        HookEvent::SubagentStop if toggles.subagent_stop => pick(&messages.subagent_stop.default),
        HookEvent::PreToolUse if toggles.pre_tool_use => {
            select_pre_tool_use(&messages.pre_tool_use, config, &input.tool_name)
        }
        HookEvent::Other => config.attention_phrase().to_string(),
        _ => String::new(),
    }
}

fn select_notification(messages: &EventMessages, text: &str) -> String {
    let lower = text.to_lowercase();

    if text.contains(['?', '？']) || contains_any(&lower, &["permission", "confirm", "approve"]) {
        pick(&messages.confirmation)
    } else if contains_any(&lower, &["error", "failed", "fail"]) {
        pick(&messages.error)
    } else if contains_any(&lower, &["completed", "finished", "done", "success"]) {
        pick(&messages.completed)
    } else {
        pick(&messages.default)
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Without filters only `AskUserQuestion` is announced. With filters the
/// ignore list wins, then the notify list; anything else is silent.
fn select_pre_tool_use(messages: &EventMessages, config: &VoiceConfig, tool: &str) -> String {
    let filters = &config.pre_tool_use_filters;

    if !filters.enabled {
        return if tool == ASK_USER_QUESTION {
            pick(&messages.confirmation)
        } else {
            String::new()
        };
    }

    if filters.ignore_tools.iter().any(|t| t == tool) {
        return String::new();
    }

    if filters.notify_tools.iter().any(|t| t == tool) {
        return if tool == ASK_USER_QUESTION {
            pick(&messages.confirmation)
        } else {
            pick(&messages.default)
        };
    }

    String::new()
}
