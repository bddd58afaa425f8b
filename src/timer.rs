//! Countdown state machine.
//!
//! The engine is driven by whole-second [`TimerEngine::tick`] calls and knows
//! nothing about wall clocks or threads. A zero crossing while running yields
//! exactly one [`Completion`].

use serde::{Deserialize, Serialize};

use crate::settings::AppSettings;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    #[serde(rename = "Work")]
    Work,
    #[serde(rename = "Short Break")]
    ShortBreak,
    #[serde(rename = "Long Break")]
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Work, Mode::ShortBreak, Mode::LongBreak];

    pub fn label(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    pub fn banner(self) -> &'static str {
        match self {
            Self::Work => "🎯 FOCUS TIME",
            Self::ShortBreak => "☕ SHORT BREAK",
            Self::LongBreak => "🌴 LONG BREAK",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Work => "🎯",
            Self::ShortBreak => "☕",
            Self::LongBreak => "🌴",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Running,
    Paused,
}

/// A finished interval, reported once per zero crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub mode: Mode,
    pub minutes: u32,
    pub next_mode: Mode,
    pub auto_started: bool,
}

/// Persisted form of the engine for `--resume`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub mode: Mode,
    pub remaining_secs: u64,
    pub completed_work: u32,
    pub in_progress: bool,
}

#[derive(Debug, Clone)]
pub struct TimerEngine {
    settings: AppSettings,
    mode: Mode,
    status: Status,
    remaining_secs: u64,
    completed_work: u32,
}

impl TimerEngine {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            settings: settings.clone(),
            mode: Mode::Work,
            status: Status::Idle,
            remaining_secs: settings.seconds_for(Mode::Work),
            completed_work: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn completed_work(&self) -> u32 {
        self.completed_work
    }

    pub fn total_secs(&self) -> u64 {
        self.settings.seconds_for(self.mode)
    }

    /// 1-based position of the current work interval inside its long-break cycle.
    pub fn cycle_position(&self) -> (u32, u32) {
        let per_cycle = self.settings.sessions_before_long_break.max(1);
        ((self.completed_work % per_cycle) + 1, per_cycle)
    }

    pub fn progress(&self) -> f64 {
        let total = self.total_secs() as f64;
        if total == 0.0 {
            return 0.0;
        }
        (1.0 - self.remaining_secs as f64 / total).clamp(0.0, 1.0)
    }

    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    pub fn start(&mut self) {
        if self.status == Status::Idle {
            self.status = Status::Running;
        }
    }

    pub fn pause(&mut self) {
        if self.status == Status::Running {
            self.status = Status::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.status == Status::Paused {
            self.status = Status::Running;
        }
    }

    pub fn toggle(&mut self) {
        match self.status {
            Status::Idle => self.start(),
            Status::Running => self.pause(),
            Status::Paused => self.resume(),
        }
    }

    pub fn reset(&mut self) {
        self.status = Status::Idle;
        self.remaining_secs = self.total_secs();
    }

    pub fn switch_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.reset();
    }

    /// Jump to the mode that would follow the current one, without
    /// counting the current interval as finished.
    pub fn skip(&mut self) {
        let next = self.next_mode_after(self.mode, self.completed_work);
        self.switch_mode(next);
    }

    pub fn apply_settings(&mut self, settings: &AppSettings) {
        self.settings = settings.clone();
        if self.status == Status::Idle {
            self.remaining_secs = self.total_secs();
        } else {
            self.remaining_secs = self.remaining_secs.min(self.total_secs());
        }
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Option<Completion> {
        if self.status != Status::Running {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        let finished = self.mode;
        let minutes = self.settings.minutes_for(finished);
        if finished == Mode::Work {
            self.completed_work += 1;
        }

        let next_mode = self.next_mode_after(finished, self.completed_work);
        let auto_started = match finished {
            Mode::Work => self.settings.auto_start_breaks,
            Mode::ShortBreak | Mode::LongBreak => self.settings.auto_start_pomodoros,
        };

        self.mode = next_mode;
        self.remaining_secs = self.total_secs();
        self.status = if auto_started { Status::Running } else { Status::Idle };

        Some(Completion { mode: finished, minutes, next_mode, auto_started })
    }

    fn next_mode_after(&self, mode: Mode, completed_work: u32) -> Mode {
        match mode {
            Mode::Work => {
                let per_cycle = self.settings.sessions_before_long_break.max(1);
                // `completed_work` already counts the interval that just ended.
                if completed_work > 0 && completed_work % per_cycle == 0 {
                    Mode::LongBreak
                } else {
                    Mode::ShortBreak
                }
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Work,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            completed_work: self.completed_work,
            in_progress: self.status != Status::Idle,
        }
    }

    /// Restore a saved snapshot. An interval that was in progress comes
    /// back paused so the countdown never resumes on its own.
    pub fn restore(&mut self, snapshot: TimerSnapshot) {
        self.mode = snapshot.mode;
        self.completed_work = snapshot.completed_work;
        let total = self.total_secs();
        if snapshot.in_progress && snapshot.remaining_secs > 0 && snapshot.remaining_secs <= total {
            self.remaining_secs = snapshot.remaining_secs;
            self.status = Status::Paused;
        } else {
            self.remaining_secs = total;
            self.status = Status::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings(work: u32, short: u32, long: u32) -> AppSettings {
        AppSettings {
            work_duration: work,
            short_break_duration: short,
            long_break_duration: long,
            ..AppSettings::default()
        }
    }

    fn run_to_completion(engine: &mut TimerEngine) -> Vec<Completion> {
        let mut done = Vec::new();
        let ticks = engine.remaining_secs();
        for _ in 0..ticks {
            if let Some(c) = engine.tick() {
                done.push(c);
            }
        }
        done
    }

    #[test]
    fn new_engine_is_idle_work_with_full_duration() {
        let engine = TimerEngine::new(&AppSettings::default());
        assert_eq!(engine.mode(), Mode::Work);
        assert_eq!(engine.status(), Status::Idle);
        assert_eq!(engine.remaining_secs(), 25 * 60);
        assert_eq!(engine.clock(), "25:00");
    }

    #[test]
    fn idle_and_paused_do_not_count_down() {
        let mut engine = TimerEngine::new(&AppSettings::default());
        assert_eq!(engine.tick(), None);
        assert_eq!(engine.remaining_secs(), 1500);

        engine.start();
        engine.tick();
        engine.pause();
        engine.tick();
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1499);
        assert_eq!(engine.status(), Status::Paused);

        engine.resume();
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1498);
    }

    #[test]
    fn toggle_walks_the_state_machine() {
        let mut engine = TimerEngine::new(&AppSettings::default());
        engine.toggle();
        assert_eq!(engine.status(), Status::Running);
        engine.toggle();
        assert_eq!(engine.status(), Status::Paused);
        engine.toggle();
        assert_eq!(engine.status(), Status::Running);
    }

    #[test]
    fn work_interval_completes_exactly_once() {
        let mut engine = TimerEngine::new(&settings(2, 1, 3));
        engine.start();

        let done = run_to_completion(&mut engine);

        assert_eq!(
            done,
            vec![Completion {
                mode: Mode::Work,
                minutes: 2,
                next_mode: Mode::ShortBreak,
                auto_started: false,
            }]
        );
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.status(), Status::Idle);
        assert_eq!(engine.remaining_secs(), 60);
        assert_eq!(engine.tick(), None);
    }

    #[test]
    fn reset_while_running_restores_full_duration() {
        let mut engine = TimerEngine::new(&AppSettings::default());
        engine.start();
        for _ in 0..90 {
            engine.tick();
        }
        assert_eq!(engine.remaining_secs(), 1410);

        engine.reset();

        assert_eq!(engine.status(), Status::Idle);
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn switch_mode_goes_idle_with_that_duration() {
        let mut engine = TimerEngine::new(&AppSettings::default());
        engine.start();
        engine.tick();
        engine.switch_mode(Mode::LongBreak);
        assert_eq!(engine.mode(), Mode::LongBreak);
        assert_eq!(engine.status(), Status::Idle);
        assert_eq!(engine.remaining_secs(), 15 * 60);
    }

    #[test]
    fn auto_start_breaks_keeps_running_into_break() {
        let mut s = settings(1, 1, 1);
        s.auto_start_breaks = true;
        let mut engine = TimerEngine::new(&s);
        engine.start();

        let done = run_to_completion(&mut engine);

        assert_eq!(done.len(), 1);
        assert!(done[0].auto_started);
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.status(), Status::Running);
    }

    #[test]
    fn break_uses_auto_start_pomodoros_flag() {
        let mut s = settings(1, 1, 1);
        s.auto_start_breaks = true;
        s.auto_start_pomodoros = false;
        let mut engine = TimerEngine::new(&s);
        engine.start();

        run_to_completion(&mut engine);
        let done = run_to_completion(&mut engine);

        assert_eq!(done[0].mode, Mode::ShortBreak);
        assert_eq!(engine.mode(), Mode::Work);
        assert_eq!(engine.status(), Status::Idle);
    }

    #[test]
    fn long_break_after_configured_number_of_pomodoros() {
        let mut s = settings(1, 1, 1);
        s.sessions_before_long_break = 2;
        s.auto_start_breaks = true;
        s.auto_start_pomodoros = true;
        let mut engine = TimerEngine::new(&s);
        engine.start();

        let mut modes = Vec::new();
        for _ in 0..4 {
            modes.extend(run_to_completion(&mut engine).into_iter().map(|c| c.next_mode));
        }

        assert_eq!(
            modes,
            vec![Mode::ShortBreak, Mode::Work, Mode::LongBreak, Mode::Work]
        );
        assert_eq!(engine.completed_work(), 2);
    }

    #[test]
    fn skip_does_not_count_as_completed() {
        let mut engine = TimerEngine::new(&AppSettings::default());
        engine.start();
        engine.skip();
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.status(), Status::Idle);
        assert_eq!(engine.completed_work(), 0);
        engine.skip();
        assert_eq!(engine.mode(), Mode::Work);
    }

    #[test]
    fn settings_change_resets_idle_countdown_only() {
        let mut engine = TimerEngine::new(&AppSettings::default());
        engine.apply_settings(&settings(50, 5, 15));
        assert_eq!(engine.remaining_secs(), 3000);

        engine.start();
        engine.tick();
        engine.apply_settings(&settings(30, 5, 15));
        assert_eq!(engine.remaining_secs(), 1800);
        engine.apply_settings(&settings(45, 5, 15));
        assert_eq!(engine.remaining_secs(), 1800);
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut engine = TimerEngine::new(&settings(2, 1, 1));
        assert_eq!(engine.progress(), 0.0);
        engine.start();
        for _ in 0..60 {
            engine.tick();
        }
        assert!((engine.progress() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn cycle_position_wraps_at_long_break() {
        let mut s = settings(1, 1, 1);
        s.sessions_before_long_break = 2;
        let mut engine = TimerEngine::new(&s);
        assert_eq!(engine.cycle_position(), (1, 2));
        engine.start();
        run_to_completion(&mut engine);
        assert_eq!(engine.cycle_position(), (2, 2));
    }

    #[test]
    fn restore_brings_running_interval_back_paused() {
        let mut engine = TimerEngine::new(&AppSettings::default());
        engine.start();
        for _ in 0..10 {
            engine.tick();
        }
        let snap = engine.snapshot();
        assert!(snap.in_progress);

        let mut restored = TimerEngine::new(&AppSettings::default());
        restored.restore(snap);

        assert_eq!(restored.status(), Status::Paused);
        assert_eq!(restored.remaining_secs(), 1490);
    }

    #[test]
    fn restore_discards_out_of_range_remaining() {
        let mut engine = TimerEngine::new(&AppSettings::default());
        engine.restore(TimerSnapshot {
            mode: Mode::ShortBreak,
            remaining_secs: 9999,
            completed_work: 3,
            in_progress: true,
        });
        assert_eq!(engine.status(), Status::Idle);
        assert_eq!(engine.remaining_secs(), 300);
        assert_eq!(engine.completed_work(), 3);
    }

    #[test]
    fn mode_serializes_as_display_names() {
        assert_eq!(serde_json::to_string(&Mode::ShortBreak).unwrap(), r#""Short Break""#);
        let m: Mode = serde_json::from_str(r#""Long Break""#).unwrap();
        assert_eq!(m, Mode::LongBreak);
    }
}
