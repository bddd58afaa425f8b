use chrono::{DateTime, Local, TimeZone};
use std::{fs, io, path::Path};

use crate::{
    sessions::{FocusSession, SessionLog},
    timer::Mode,
};

pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_focus_minutes: u64,
    pub total_sessions: usize,
    pub today_focus_minutes: u64,
    pub breakdown: [(Mode, u64); 3],
}

impl Summary {
    pub fn from_log(log: &SessionLog, now: DateTime<Local>) -> Self {
        let sessions = log.sessions();
        Self {
            total_focus_minutes: minutes_in_mode(sessions, Mode::Work),
            total_sessions: sessions.iter().filter(|s| s.mode == Mode::Work).count(),
            today_focus_minutes: today_focus_minutes(sessions, now),
            breakdown: Mode::ALL.map(|m| (m, minutes_in_mode(sessions, m))),
        }
    }
}

pub fn minutes_in_mode(sessions: &[FocusSession], mode: Mode) -> u64 {
    sessions
        .iter()
        .filter(|s| s.mode == mode)
        .map(|s| u64::from(s.duration))
        .sum()
}

/// Work minutes logged since local midnight of `now`.
pub fn today_focus_minutes(sessions: &[FocusSession], now: DateTime<Local>) -> u64 {
    let Some(midnight) = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
    else {
        return 0;
    };
    let since = midnight.timestamp_millis();

    sessions
        .iter()
        .filter(|s| s.mode == Mode::Work && s.timestamp >= since)
        .map(|s| u64::from(s.duration))
        .sum()
}

pub fn format_minutes(minutes: u64) -> String {
    let hrs = minutes / 60;
    let mins = minutes % 60;
    if hrs > 0 { format!("{}h {}m", hrs, mins) } else { format!("{}m", mins) }
}

pub fn export_csv(log: &SessionLog, now: DateTime<Local>, path: &Path) -> io::Result<()> {
    let summary = Summary::from_log(log, now);
    let mut csv = format!(
        "Date,Total Sessions,Focus Time (min),Today Focus (min)\n{},{},{},{}\n\n",
        now.format("%Y-%m-%d"),
        summary.total_sessions,
        summary.total_focus_minutes,
        summary.today_focus_minutes,
    );

    csv.push_str("Session History\nTimestamp,Mode,Duration (min)\n");
    for s in log.sessions() {
        let ts = s
            .local_time()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| s.timestamp.to_string());
        csv.push_str(&format!("{},{},{}\n", ts, s.mode.label(), s.duration));
    }

    fs::write(path, csv)
}
