//! statusline-hooks: prompt status line and voice notifications for Claude Code.
//!
//! Two hook binaries share this library:
//! - `statusline`: renders model, git branch, context usage, today's session
//!   time and the last user message on every prompt render
//! - `voice-reminder`: speaks a short message on lifecycle events and echoes
//!   its input back unchanged

pub mod color;
pub mod context;
pub mod error;
pub mod git;
pub mod paths;
pub mod session;
pub mod statusline;
pub mod transcript;
pub mod voice;

pub use error::{Error, Result};
