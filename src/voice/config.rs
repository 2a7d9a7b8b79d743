//! Voice reminder configuration.
//!
//! Loaded from JSON at the plugin path, falling back to the legacy
//! `~/.claude` file and then to built-in defaults. Every field is optional
//! in the file.

use std::fs;

use rand::seq::IndexedRandom;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::paths::Paths;

/// A phrase, or a set of alternatives picked uniformly at random.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MessageChoice {
    Single(String),
    Alternatives(Vec<String>),
}

impl MessageChoice {
    pub fn pick(&self) -> String {
        match self {
            Self::Single(s) => s.clone(),
            Self::Alternatives(list) => list.choose(&mut rand::rng()).cloned().unwrap_or_default(),
        }
    }
}

impl From<&str> for MessageChoice {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventMessages {
    pub confirmation: Option<MessageChoice>,
    pub error: Option<MessageChoice>,
    pub completed: Option<MessageChoice>,
    pub default: Option<MessageChoice>,
}

impl EventMessages {
    fn only_default(text: &str) -> Self {
        Self {
            default: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Pick from an optional slot; an absent slot is silent.
pub fn pick(slot: &Option<MessageChoice>) -> String {
    slot.as_ref().map(MessageChoice::pick).unwrap_or_default()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageSet {
    pub notification: EventMessages,
    pub stop: EventMessages,
    pub subagent_stop: EventMessages,
    pub pre_tool_use: EventMessages,
}

impl MessageSet {
    fn zh() -> Self {
        Self {
            notification: EventMessages {
                confirmation: Some("Claude 需要您的確認".into()),
                error: Some("任務失敗，請檢查".into()),
                completed: Some("任務完成".into()),
                default: Some("請注意".into()),
            },
            stop: EventMessages::only_default("Claude 回應完成"),
            subagent_stop: EventMessages::only_default("子任務已完成"),
            pre_tool_use: EventMessages {
                confirmation: Some("Claude 有問題想問您".into()),
                ..Default::default()
            },
        }
    }

    fn en() -> Self {
        Self {
            notification: EventMessages {
                confirmation: Some("Claude needs your confirmation".into()),
                error: Some("Task failed, please check".into()),
                completed: Some("Task completed".into()),
                default: Some("Attention needed".into()),
            },
            stop: EventMessages::only_default("Claude finished responding"),
            subagent_stop: EventMessages::only_default("Subagent task completed"),
            pre_tool_use: EventMessages {
                confirmation: Some("Claude has a question for you".into()),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub enabled: bool,
    pub fallback_sound: String,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fallback_sound: "/System/Library/Sounds/Glass.aiff".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreToolUseFilters {
    pub enabled: bool,
    pub notify_tools: Vec<String>,
    pub ignore_tools: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventToggles {
    pub notification: bool,
    pub stop: bool,
    pub subagent_stop: bool,
    pub pre_tool_use: bool,
}

impl Default for EventToggles {
    fn default() -> Self {
        Self {
            notification: true,
            stop: true,
            subagent_stop: true,
            pre_tool_use: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub debug_mode: bool,
    pub language: String,
    /// Words per minute.
    pub speed: u32,
    pub messages: MessageSet,
    pub messages_en: MessageSet,
    pub sound_effects: SoundConfig,
    pub pre_tool_use_filters: PreToolUseFilters,
    pub events: EventToggles,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            language: "zh".into(),
            speed: 180,
            messages: MessageSet::zh(),
            messages_en: MessageSet::en(),
            sound_effects: SoundConfig::default(),
            pre_tool_use_filters: PreToolUseFilters::default(),
            events: EventToggles::default(),
        }
    }
}

impl VoiceConfig {
    /// Load the config file. A missing or unreadable file yields defaults;
    /// a file that is present but not valid JSON is an error.
    pub fn load(paths: &Paths) -> Result<Self> {
        let Some(path) = paths.voice_config().existing().map(|p| p.to_path_buf()) else {
            debug!("No voice config found, using defaults");
            return Ok(Self::default());
        };

        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                debug!("Failed to read {}: {e}, using defaults", path.display());
                return Ok(Self::default());
            }
        };

        let config = serde_json::from_str(&contents)?;
        info!("Loaded voice config from {}", path.display());
        Ok(config)
    }

    /// Phrases for the configured language.
    pub fn messages(&self) -> &MessageSet {
        if self.language == "zh" {
            &self.messages
        } else {
            &self.messages_en
        }
    }

    /// Fallback phrase for events without their own messages.
    pub fn attention_phrase(&self) -> &'static str {
        if self.language == "zh" {
            "請注意"
        } else {
            "Attention needed"
        }
    }
}

/// Whether the reminder is switched on. The flag file holds `true` to
/// enable; a missing or unreadable flag counts as enabled.
pub fn is_enabled(paths: &Paths) -> bool {
    let Some(path) = paths.enabled_flag().existing().map(|p| p.to_path_buf()) else {
        return true;
    };
    match fs::read_to_string(&path) {
        Ok(contents) => contents.trim() == "true",
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home_with_config(json: &str) -> (tempfile::TempDir, Paths) {
        let home = tempfile::tempdir().unwrap();
        let paths = Paths::from_home(home.path());
        fs::create_dir_all(paths.voice_config_dir()).unwrap();
        fs::write(&paths.voice_config().preferred, json).unwrap();
        (home, paths)
    }

    #[test]
    fn test_message_choice_decodes_both_shapes() {
        let single: MessageChoice = serde_json::from_str(r#""hello""#).unwrap();
        assert_eq!(single, MessageChoice::Single("hello".into()));

        let many: MessageChoice = serde_json::from_str(r#"["a","b"]"#).unwrap();
        let picked = many.pick();
        assert!(picked == "a" || picked == "b");

        assert_eq!(MessageChoice::Alternatives(vec![]).pick(), "");
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let home = tempfile::tempdir().unwrap();
        let config = VoiceConfig::load(&Paths::from_home(home.path())).unwrap();

        assert_eq!(config.language, "zh");
        assert_eq!(config.speed, 180);
        assert!(config.sound_effects.enabled);
        assert_eq!(pick(&config.messages().stop.default), "Claude 回應完成");
    }

    #[test]
    fn test_partial_config_and_language_switch() {
        let (_home, paths) = home_with_config(
            r#"{"language":"en","speed":200,"messages_en":{"stop":{"default":["Done","All set"]}}}"#,
        );
        let config = VoiceConfig::load(&paths).unwrap();

        assert_eq!(config.speed, 200);
        let stop = pick(&config.messages().stop.default);
        assert!(stop == "Done" || stop == "All set");
        assert!(config.messages().notification.default.is_none());
    }

    #[test]
    fn test_legacy_config_path() {
        let home = tempfile::tempdir().unwrap();
        let paths = Paths::from_home(home.path());
        fs::create_dir_all(paths.claude_dir()).unwrap();
        fs::write(&paths.voice_config().legacy, r#"{"speed":150}"#).unwrap();

        assert_eq!(VoiceConfig::load(&paths).unwrap().speed, 150);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let (_home, paths) = home_with_config("{ not json");
        assert!(VoiceConfig::load(&paths).is_err());
    }

    #[test]
    fn test_enabled_flag() {
        let home = tempfile::tempdir().unwrap();
        let paths = Paths::from_home(home.path());
        assert!(is_enabled(&paths));

        let flag = paths.enabled_flag();
        fs::create_dir_all(paths.voice_data_dir()).unwrap();
        fs::write(&flag.preferred, "false").unwrap();
        assert!(!is_enabled(&paths));

        fs::write(&flag.preferred, "true\n").unwrap();
        assert!(is_enabled(&paths));
    }
}
