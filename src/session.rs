//! Session time tracking.
//!
//! Each status-line render is a heartbeat. Heartbeats closer than
//! `IDLE_GAP_SECS` apart extend the current interval; a longer silence
//! starts a new one, so idle time is never counted. One JSON file per
//! session id under `~/.claude/session-tracker/sessions/`.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::paths::Paths;

pub const IDLE_GAP_SECS: i64 = 600;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub id: String,
    pub date: String,
    pub start: i64,
    pub last_heartbeat: i64,
    pub total_seconds: i64,
    pub intervals: Vec<Interval>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: i64,
    pub end: Option<i64>,
}

impl Session {
    fn new(id: &str, date: String, now: i64) -> Self {
        Self {
            id: id.to_string(),
            date,
            start: now,
            last_heartbeat: now,
            total_seconds: 0,
            intervals: vec![Interval {
                start: now,
                end: None,
            }],
        }
    }

    /// Record a heartbeat at `now` on calendar day `today`.
    pub fn heartbeat(&mut self, today: &str, now: i64) {
        if !self.date.is_empty() && self.date != today {
            *self = Self::new(&self.id, today.to_string(), now);
        }
        if self.date.is_empty() {
            self.date = today.to_string();
        }

        let gap = now - self.last_heartbeat;
        self.last_heartbeat = now;

        if gap < IDLE_GAP_SECS {
            if let Some(last) = self.intervals.last_mut() {
                last.end = Some(now);
            }
        } else {
            self.intervals.push(Interval {
                start: now,
                end: Some(now),
            });
        }

        self.total_seconds = self
            .intervals
            .iter()
            .filter_map(|i| i.end.map(|end| end - i.start))
            .sum();
    }
}

pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_paths(paths: &Paths) -> Self {
        Self::new(paths.sessions_dir())
    }

    pub fn update(&self, session_id: &str) -> Result<Session> {
        self.update_at(session_id, Local::now())
    }

    /// Load or create the record for `session_id`, apply one heartbeat and
    /// persist it.
    pub fn update_at(&self, session_id: &str, now: DateTime<Local>) -> Result<Session> {
        let path = self.session_file(session_id)?;
        fs::create_dir_all(&self.dir)?;

        let today = now.format("%Y-%m-%d").to_string();
        let ts = now.timestamp();

        let mut session = match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                warn!("Corrupt session file {}: {e}", path.display());
                Session::default()
            }),
            Err(_) => Session::new(session_id, today.clone(), ts),
        };
        if session.id.is_empty() {
            session.id = session_id.to_string();
        }

        session.heartbeat(&today, ts);

        fs::write(&path, serde_json::to_vec(&session)?)?;
        Ok(session)
    }

    pub fn load(&self, session_id: &str) -> Result<Session> {
        let data = fs::read_to_string(self.session_file(session_id)?)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn total_hours(&self) -> String {
        self.total_hours_at(Local::now())
    }

    /// Today's tracked time across every session, e.g. `"1h23m"`, with an
    /// `" [N sessions]"` suffix when more than one session is active.
    pub fn total_hours_at(&self, now: DateTime<Local>) -> String {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) => {
                debug!("No session dir {}: {e}", self.dir.display());
                return "0m".to_string();
            }
        };

        let today = now.format("%Y-%m-%d").to_string();
        let ts = now.timestamp();
        let mut total_seconds = 0;
        let mut active = 0;

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(data) = fs::read_to_string(&path) else {
                continue;
            };
            let session: Session = match serde_json::from_str(&data) {
                Ok(s) => s,
                Err(e) => {
                    debug!("Skipping unreadable session {}: {e}", path.display());
                    continue;
                }
            };

            if session.date == today {
                total_seconds += session.total_seconds;
                if ts - session.last_heartbeat < IDLE_GAP_SECS {
                    active += 1;
                }
            }
        }

        let time = format_duration(total_seconds);
        if active > 1 {
            format!("{time} [{active} sessions]")
        } else {
            time
        }
    }

    fn session_file(&self, session_id: &str) -> Result<PathBuf> {
        if session_id.is_empty()
            || session_id.contains(['/', '\\'])
            || session_id == "."
            || session_id == ".."
        {
            return Err(Error::InvalidSessionId(session_id.to_string()));
        }
        Ok(self.dir.join(format!("{session_id}.json")))
    }
}

pub fn format_duration(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    match (hours, minutes) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h{m}m"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn morning() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_close_heartbeats_extend_one_interval() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let t0 = morning();

        store.update_at("abc", t0).unwrap();
        let session = store.update_at("abc", t0 + Duration::seconds(1)).unwrap();

        assert_eq!(session.intervals.len(), 1);
        assert_eq!(session.total_seconds, 1);
        assert_eq!(store.load("abc").unwrap(), session);
    }

    #[test]
    fn test_long_gap_opens_new_interval() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let t0 = morning();

        store.update_at("abc", t0).unwrap();
        store.update_at("abc", t0 + Duration::seconds(120)).unwrap();
        let session = store.update_at("abc", t0 + Duration::seconds(900)).unwrap();

        assert_eq!(session.intervals.len(), 2);
        assert_eq!(session.intervals[1].start, session.intervals[1].end.unwrap());
        assert_eq!(session.total_seconds, 120);

        let session = store.update_at("abc", t0 + Duration::seconds(960)).unwrap();
        assert_eq!(session.total_seconds, 180);
    }

    #[test]
    fn test_stale_date_resets_counters() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let yesterday = morning() - Duration::days(1);

        store.update_at("abc", yesterday).unwrap();
        store.update_at("abc", yesterday + Duration::seconds(300)).unwrap();

        let session = store.update_at("abc", morning()).unwrap();
        assert_eq!(session.date, "2026-03-02");
        assert_eq!(session.total_seconds, 0);
        assert_eq!(session.intervals.len(), 1);
        assert_eq!(session.start, morning().timestamp());
    }

    #[test]
    fn test_rejects_path_like_session_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        assert!(matches!(store.update_at("", morning()), Err(Error::InvalidSessionId(_))));
        assert!(matches!(
            store.update_at("../escape", morning()),
            Err(Error::InvalidSessionId(_))
        ));
    }

    #[test]
    fn test_total_hours_sums_today_and_counts_active() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let t0 = morning();

        for secs in (0..=3600).step_by(300) {
            store.update_at("a", t0 + Duration::seconds(secs)).unwrap();
        }
        store.update_at("b", t0 + Duration::seconds(3000)).unwrap();
        store.update_at("b", t0 + Duration::seconds(3540)).unwrap();
        store.update_at("old", t0 - Duration::days(2)).unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let now = t0 + Duration::seconds(3600);
        assert_eq!(store.total_hours_at(now), "1h9m [2 sessions]");
    }

    #[test]
    fn test_total_hours_without_dir() {
        let store = SessionStore::new("/nonexistent/session-tracker/sessions");
        assert_eq!(store.total_hours_at(morning()), "0m");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(59 * 60), "59m");
        assert_eq!(format_duration(3600), "1h");
        assert_eq!(format_duration(3600 + 5 * 60 + 30), "1h5m");
    }
}
