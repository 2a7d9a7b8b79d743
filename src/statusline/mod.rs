//! Status line assembly.
//!
//! The four lookups are independent, so they run as blocking tasks that
//! each report one tagged segment; rendering waits for all of them.

pub mod message;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::color;
use crate::context;
use crate::git::BranchCache;
use crate::session::SessionStore;

/// Status line payload from Claude Code.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Input {
    pub model: Model,
    pub session_id: String,
    pub workspace: Workspace,
    pub transcript_path: Option<PathBuf>,
    pub hook_event_name: Option<String>,
    pub cwd: Option<PathBuf>,
    pub version: Option<String>,
    pub output_style: Option<OutputStyle>,
    pub cost: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Model {
    pub display_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Workspace {
    pub current_dir: PathBuf,
    pub project_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputStyle {
    pub name: String,
}

impl Input {
    /// Directory git is queried in.
    pub fn working_dir(&self) -> PathBuf {
        if !self.workspace.current_dir.as_os_str().is_empty() {
            self.workspace.current_dir.clone()
        } else {
            self.cwd.clone().unwrap_or_default()
        }
    }

    pub fn project_name(&self) -> String {
        self.working_dir()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn transcript(&self) -> Option<&Path> {
        self.transcript_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

#[derive(Debug)]
pub enum Segment {
    Git(String),
    Hours(String),
    Context(String),
    Message(String),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Segments {
    pub git_branch: String,
    pub total_hours: String,
    pub context_usage: String,
    pub user_message: String,
}

impl Segments {
    fn apply(&mut self, segment: Segment) {
        match segment {
            Segment::Git(s) => self.git_branch = s,
            Segment::Hours(s) => self.total_hours = s,
            Segment::Context(s) => self.context_usage = s,
            Segment::Message(s) => self.user_message = s,
        }
    }
}

/// Run the four lookups concurrently and collect their results.
pub async fn gather(
    input: &Input,
    branches: Arc<BranchCache>,
    sessions: Option<Arc<SessionStore>>,
) -> Segments {
    let (tx, mut rx) = mpsc::channel::<Segment>(4);

    let dir = input.working_dir();
    spawn_segment(&tx, move || Segment::Git(branches.get_branch(&dir)));

    spawn_segment(&tx, move || {
        Segment::Hours(sessions.map_or_else(|| "0m".to_string(), |s| s.total_hours()))
    });

    let transcript = input.transcript().map(Path::to_path_buf);
    spawn_segment(&tx, move || {
        Segment::Context(context::analyze(transcript.as_deref()))
    });

    let transcript = input.transcript().map(Path::to_path_buf);
    let session_id = input.session_id.clone();
    spawn_segment(&tx, move || {
        Segment::Message(
            transcript
                .map(|path| message::extract_user_message(&path, &session_id))
                .unwrap_or_default(),
        )
    });

    // The channel closes once every task has reported.
    drop(tx);

    let mut segments = Segments::default();
    while let Some(segment) = rx.recv().await {
        debug!("Segment ready: {segment:?}");
        segments.apply(segment);
    }
    segments
}

fn spawn_segment<F>(tx: &mpsc::Sender<Segment>, lookup: F)
where
    F: FnOnce() -> Segment + Send + 'static,
{
    let tx = tx.clone();
    tokio::task::spawn_blocking(move || {
        if tx.blocking_send(lookup()).is_err() {
            warn!("Status line collector went away");
        }
    });
}

const MODEL_STYLES: [(&str, &str, &str); 3] = [
    ("Opus", color::GOLD, "💛"),
    ("Sonnet", color::CYAN, "💠"),
    ("Haiku", color::PINK, "🌸"),
];

pub fn format_model(model: &str) -> String {
    MODEL_STYLES
        .iter()
        .find(|(key, _, _)| model.contains(*key))
        .map(|(_, style, icon)| format!("{style}{icon} {model}{}", color::RESET))
        .unwrap_or_else(|| model.to_string())
}

/// Full status line output: the summary line plus the optional message block.
pub fn render(input: &Input, segments: &Segments) -> String {
    let mut out = format!(
        "{reset}[{model}] 📂 {project}{git}{context} | {hours}{reset}\n",
        reset = color::RESET,
        model = format_model(&input.model.display_name),
        project = input.project_name(),
        git = segments.git_branch,
        context = segments.context_usage,
        hours = segments.total_hours,
    );
    out.push_str(&segments.user_message);
    out
}
