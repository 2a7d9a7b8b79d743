//! Platform speech with timeout, retry and a fallback sound.
//!
//! Speech synthesis runs as an external process raced against a timer.
//! A process that outlives the timer is killed, never abandoned. When every
//! attempt fails a short notification sound plays instead, and failing
//! that a terminal bell, so the caller always gets an answer.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub const SPEAK_TIMEOUT: Duration = Duration::from_secs(10);
pub const RETRY_DELAY: Duration = Duration::from_millis(500);
pub const MAX_RETRIES: u32 = 1;

#[derive(Debug, Error)]
pub enum SpeakError {
    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("failed waiting for {program}: {source}")]
    Wait { program: String, source: io::Error },
    #[error("{program} exited with {status}")]
    Exit { program: String, status: ExitStatus },
    #[error("speech timed out after {0:?}")]
    Timeout(Duration),
}

/// An external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SoundCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SpeechBackend {
    /// macOS `say`
    Say,
    /// `espeak` on Linux and friends
    Espeak,
    /// Any command; the message is appended as the last argument.
    Custom(SoundCommand),
}

impl SpeechBackend {
    fn command(&self, message: &str, speed: u32, language: &str) -> SoundCommand {
        match self {
            Self::Say => SoundCommand::new(
                "say",
                [
                    "-v".to_string(),
                    select_voice(language).to_string(),
                    "-r".to_string(),
                    speed.to_string(),
                    message.to_string(),
                ],
            ),
            Self::Espeak => SoundCommand::new(
                "espeak",
                ["-s".to_string(), speed.to_string(), message.to_string()],
            ),
            Self::Custom(base) => {
                let mut cmd = base.clone();
                cmd.args.push(message.to_string());
                cmd
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    Spoken { attempts: u32 },
    Fallback { attempts: u32 },
}

pub struct Speaker {
    pub timeout: Duration,
    pub retry_delay: Duration,
    pub max_retries: u32,
    backend: Option<SpeechBackend>,
    fallback: Vec<SoundCommand>,
}

impl Speaker {
    /// Speaker for the current OS. `fallback_sound` is played with `afplay`
    /// on macOS; elsewhere the freedesktop/ALSA sample sounds are used.
    pub fn for_platform(fallback_sound: &str) -> Self {
        let (backend, fallback) = if cfg!(target_os = "macos") {
            (
                Some(SpeechBackend::Say),
                vec![SoundCommand::new("afplay", [fallback_sound])],
            )
        } else {
            let backend = has_command("espeak").then_some(SpeechBackend::Espeak);
            let fallback: Vec<SoundCommand> = [
                ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
                ("aplay", "/usr/share/sounds/alsa/Front_Center.wav"),
            ]
            .into_iter()
            .filter(|(program, _)| has_command(program))
            .map(|(program, sound)| SoundCommand::new(program, [sound]))
            .collect();
            (backend, fallback)
        };
        Self::new(backend, fallback)
    }

    pub fn new(backend: Option<SpeechBackend>, fallback: Vec<SoundCommand>) -> Self {
        Self {
            timeout: SPEAK_TIMEOUT,
            retry_delay: RETRY_DELAY,
            max_retries: MAX_RETRIES,
            backend,
            fallback,
        }
    }

    /// Speak `message`. Never takes much longer than
    /// `(max_retries + 1) * (timeout + retry_delay)` plus the fallback sound.
    pub async fn speak(&self, message: &str, speed: u32, language: &str) -> SpeakOutcome {
        let Some(backend) = &self.backend else {
            info!("No speech synthesizer available, playing fallback sound");
            self.play_fallback().await;
            return SpeakOutcome::Fallback { attempts: 0 };
        };

        let command = backend.command(message, speed, language);
        let mut attempts = 0;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                info!("Retrying speech ({attempt}/{})", self.max_retries);
                tokio::time::sleep(self.retry_delay).await;
            }
            attempts += 1;

            match run_with_timeout(&command, self.timeout).await {
                Ok(()) => {
                    debug!("Spoke via {} on attempt {attempts}", command.program);
                    return SpeakOutcome::Spoken { attempts };
                }
                Err(e) => warn!("Speech attempt {attempts} failed: {e}"),
            }
        }

        info!("All speech attempts failed, playing fallback sound");
        self.play_fallback().await;
        SpeakOutcome::Fallback { attempts }
    }

    async fn play_fallback(&self) {
        for sound in &self.fallback {
            match run_with_timeout(sound, self.timeout).await {
                Ok(()) => return,
                Err(e) => warn!("Fallback sound failed: {e}"),
            }
        }
        // Terminal bell. stdout belongs to the hook passthrough.
        eprint!("\x07");
    }
}

async fn run_with_timeout(cmd: &SoundCommand, limit: Duration) -> Result<(), SpeakError> {
    let mut child = Command::new(&cmd.program)
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| SpeakError::Spawn {
            program: cmd.program.clone(),
            source,
        })?;

    match tokio::time::timeout(limit, child.wait()).await {
        Ok(Ok(status)) if status.success() => Ok(()),
        Ok(Ok(status)) => Err(SpeakError::Exit {
            program: cmd.program.clone(),
            status,
        }),
        Ok(Err(source)) => Err(SpeakError::Wait {
            program: cmd.program.clone(),
            source,
        }),
        Err(_) => {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill {}: {e}", cmd.program);
            } else {
                warn!("Killed {} after {limit:?}", cmd.program);
            }
            Err(SpeakError::Timeout(limit))
        }
    }
}

/// macOS voice for a language code.
pub fn select_voice(language: &str) -> &'static str {
    match language {
        "en" => "Samantha",
        // Meijia (zh-TW) is also the default
        _ => "Meijia",
    }
}

fn has_command(name: &str) -> bool {
    std::env::var_os("PATH").is_some_and(|paths| {
        std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(name)))
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
