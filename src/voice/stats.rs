//! Trigger counters for the voice reminder.
//!
//! Read-modify-write on every invocation. The host runs hooks one at a
//! time, so there is no locking.

use std::fs;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::HookEvent;
use crate::error::Result;
use crate::paths::Paths;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub notification_count: u64,
    pub stop_count: u64,
    pub subagent_stop_count: u64,
    pub pre_tool_use_count: u64,
    pub last_triggered: Option<DateTime<Local>>,
}

impl Stats {
    pub fn record(&mut self, event: HookEvent, at: DateTime<Local>) {
        self.last_triggered = Some(at);
        match event {
            HookEvent::Notification => self.notification_count += 1,
            HookEvent::Stop => self.stop_count += 1,
            HookEvent::SubagentStop => self.subagent_stop_count += 1,
            HookEvent::PreToolUse => self.pre_tool_use_count += 1,
            HookEvent::Other => {}
        }
    }

    pub fn report(&self) -> String {
        let last = self
            .last_triggered
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".into());
        format!(
            "Voice Reminder Statistics:\n\
             \x20 Last Triggered:      {last}\n\
             \x20 Notification Count:  {}\n\
             \x20 Stop Count:          {}\n\
             \x20 Subagent Stop Count: {}\n\
             \x20 PreToolUse Count:    {}",
            self.notification_count,
            self.stop_count,
            self.subagent_stop_count,
            self.pre_tool_use_count
        )
    }
}

/// Count one `event` in the stats file.
pub fn update_stats(paths: &Paths, event: HookEvent) -> Result<Stats> {
    let candidates = paths.stats();
    let path = candidates.writable();

    let mut stats: Stats = fs::read_to_string(path)
        .ok()
        .and_then(|data| serde_json::from_str(&data).ok())
        .unwrap_or_default();

    stats.record(event, Local::now());

    fs::write(path, serde_json::to_string_pretty(&stats)?)?;
    debug!("Stats written to {}", path.display());
    Ok(stats)
}

/// Stats as last written, or `None` if the reminder never ran.
pub fn load_stats(paths: &Paths) -> Result<Option<Stats>> {
    let candidates = paths.stats();
    let Some(path) = candidates.existing() else {
        return Ok(None);
    };
    let data = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&data)?))
}
