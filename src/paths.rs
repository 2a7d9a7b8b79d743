//! On-disk locations under `~/.claude`.
//!
//! The voice reminder moved into a plugin directory; every lookup prefers
//! the plugin path and falls back to the legacy flat file in `~/.claude`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const PLUGIN_DIR: &str = "omystatusline/plugins/voice-reminder";

#[derive(Debug, Clone)]
pub struct Paths {
    claude_dir: PathBuf,
}

impl Paths {
    /// Resolve paths relative to the current user's home directory.
    pub fn discover() -> Result<Self> {
        dirs::home_dir().map(Self::from_home).ok_or(Error::NoHomeDir)
    }

    pub fn from_home(home: impl AsRef<Path>) -> Self {
        Self {
            claude_dir: home.as_ref().join(".claude"),
        }
    }

    pub fn claude_dir(&self) -> &Path {
        &self.claude_dir
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.claude_dir.join("session-tracker").join("sessions")
    }

    pub fn voice_data_dir(&self) -> PathBuf {
        self.claude_dir.join(PLUGIN_DIR).join("data")
    }

    pub fn voice_config_dir(&self) -> PathBuf {
        self.claude_dir.join(PLUGIN_DIR).join("config")
    }

    pub fn enabled_flag(&self) -> Candidates {
        Candidates {
            preferred: self.voice_data_dir().join("voice-reminder-enabled"),
            legacy: self.claude_dir.join("voice-reminder-enabled"),
        }
    }

    pub fn voice_config(&self) -> Candidates {
        Candidates {
            preferred: self.voice_config_dir().join("voice-reminder-config.json"),
            legacy: self.claude_dir.join("voice-reminder-config.json"),
        }
    }

    pub fn stats(&self) -> Candidates {
        Candidates {
            preferred: self.voice_data_dir().join("voice-reminder-stats.json"),
            legacy: self.claude_dir.join("voice-reminder-stats.json"),
        }
    }

    pub fn debug_log(&self) -> Candidates {
        Candidates {
            preferred: self.voice_data_dir().join("voice-reminder-debug.log"),
            legacy: self.claude_dir.join("voice-reminder-debug.log"),
        }
    }
}

/// A preferred location plus the legacy location it replaced.
#[derive(Debug, Clone)]
pub struct Candidates {
    pub preferred: PathBuf,
    pub legacy: PathBuf,
}

impl Candidates {
    /// First candidate that exists on disk, for reading.
    pub fn existing(&self) -> Option<&Path> {
        [&self.preferred, &self.legacy]
            .into_iter()
            .find(|p| p.exists())
            .map(PathBuf::as_path)
    }

    /// Location to write to: the preferred path if its parent directory can
    /// be created, otherwise the legacy path.
    pub fn writable(&self) -> &Path {
        match self.preferred.parent().map(fs::create_dir_all) {
            Some(Ok(())) | None => &self.preferred,
            Some(Err(_)) => &self.legacy,
        }
    }
}
