//! Opt-in debug log for the voice reminder.
//!
//! The hook's stdout is reserved for passthrough and its stderr may be shown
//! to the user, so diagnostics go to an append-only file instead.

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

pub const DEBUG_ENV: &str = "VOICE_REMINDER_DEBUG";

/// Local wall-clock timestamps with milliseconds.
struct LocalMillis;

impl FormatTime for LocalMillis {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Debug logging is on when the config asks for it or the environment
/// variable is `true`.
pub fn debug_requested(config_debug: bool) -> bool {
    config_debug || std::env::var(DEBUG_ENV).is_ok_and(|v| v == "true")
}

pub fn open_log(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Route `tracing` output to `path`. Any failure leaves logging off.
pub fn init_file_logging(path: &Path) {
    let Ok(file) = open_log(path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(LocalMillis)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_appends() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");

        writeln!(open_log(&path).unwrap(), "first").unwrap();
        writeln!(open_log(&path).unwrap(), "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_timestamp_format() {
        let mut buf = String::new();
        LocalMillis.format_time(&mut Writer::new(&mut buf)).unwrap();

        // [YYYY-MM-DD HH:MM:SS.mmm]
        assert_eq!(buf.len(), 25, "got {buf:?}");
        assert_eq!(&buf[20..21], ".");
    }
}
