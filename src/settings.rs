use serde::{Deserialize, Serialize};

use crate::timer::Mode;

pub const THEMES: &[&str] = &["default", "nord", "dracula", "gruvbox", "solarized"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    pub auto_start_breaks: bool,
    pub auto_start_pomodoros: bool,
    pub sessions_before_long_break: u32,
    pub sound_enabled: bool,
    pub theme: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            work_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            auto_start_breaks: false,
            auto_start_pomodoros: false,
            sessions_before_long_break: 4,
            sound_enabled: true,
            theme: "default".into(),
        }
    }
}

impl AppSettings {
    pub fn minutes_for(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Work => self.work_duration,
            Mode::ShortBreak => self.short_break_duration,
            Mode::LongBreak => self.long_break_duration,
        }
    }

    pub fn seconds_for(&self, mode: Mode) -> u64 {
        u64::from(self.minutes_for(mode)) * 60
    }

    /// Pull hand-edited or legacy values back into their valid ranges.
    pub fn sanitized(mut self) -> Self {
        self.work_duration = self.work_duration.clamp(1, 240);
        self.short_break_duration = self.short_break_duration.clamp(1, 60);
        self.long_break_duration = self.long_break_duration.clamp(1, 120);
        self.sessions_before_long_break = self.sessions_before_long_break.clamp(1, 10);
        if !THEMES.contains(&self.theme.as_str()) {
            self.theme = "default".into();
        }
        self
    }

    pub fn field_value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::WorkDuration => self.work_duration.to_string(),
            SettingsField::ShortBreakDuration => self.short_break_duration.to_string(),
            SettingsField::LongBreakDuration => self.long_break_duration.to_string(),
            SettingsField::SessionsBeforeLongBreak => self.sessions_before_long_break.to_string(),
            SettingsField::AutoStartBreaks => on_off(self.auto_start_breaks).into(),
            SettingsField::AutoStartPomodoros => on_off(self.auto_start_pomodoros).into(),
            SettingsField::SoundEnabled => on_off(self.sound_enabled).into(),
            SettingsField::Theme => self.theme.clone(),
        }
    }

    /// Apply typed input to a numeric field. Returns false and leaves the
    /// settings untouched when the input is unparsable or out of range.
    pub fn apply_input(&mut self, field: SettingsField, input: &str) -> bool {
        let Ok(value) = input.trim().parse::<u32>() else {
            return false;
        };

        let (slot, range) = match field {
            SettingsField::WorkDuration => (&mut self.work_duration, 1..=240),
            SettingsField::ShortBreakDuration => (&mut self.short_break_duration, 1..=60),
            SettingsField::LongBreakDuration => (&mut self.long_break_duration, 1..=120),
            SettingsField::SessionsBeforeLongBreak => (&mut self.sessions_before_long_break, 1..=10),
            _ => return false,
        };

        if !range.contains(&value) {
            return false;
        }
        *slot = value;
        true
    }

    /// Flip a boolean field. Returns false for non-boolean fields.
    pub fn toggle(&mut self, field: SettingsField) -> bool {
        let flag = match field {
            SettingsField::AutoStartBreaks => &mut self.auto_start_breaks,
            SettingsField::AutoStartPomodoros => &mut self.auto_start_pomodoros,
            SettingsField::SoundEnabled => &mut self.sound_enabled,
            _ => return false,
        };
        *flag = !*flag;
        true
    }

    pub fn cycle_theme(&mut self, forward: bool) {
        let idx = THEMES.iter().position(|&t| t == self.theme).unwrap_or(0);
        let new_idx = if forward {
            (idx + 1) % THEMES.len()
        } else if idx == 0 {
            THEMES.len() - 1
        } else {
            idx - 1
        };
        self.theme = THEMES[new_idx].into();
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SettingsField {
    WorkDuration,
    ShortBreakDuration,
    LongBreakDuration,
    SessionsBeforeLongBreak,
    AutoStartBreaks,
    AutoStartPomodoros,
    SoundEnabled,
    Theme,
}

impl SettingsField {
    pub const ALL: [SettingsField; 8] = [
        Self::WorkDuration,
        Self::ShortBreakDuration,
        Self::LongBreakDuration,
        Self::SessionsBeforeLongBreak,
        Self::AutoStartBreaks,
        Self::AutoStartPomodoros,
        Self::SoundEnabled,
        Self::Theme,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::WorkDuration => "🎯 Work Duration (min)",
            Self::ShortBreakDuration => "☕ Short Break (min)",
            Self::LongBreakDuration => "🌴 Long Break (min)",
            Self::SessionsBeforeLongBreak => "🔄 Pomodoros Before Long Break",
            Self::AutoStartBreaks => "▶️  Auto-start Breaks",
            Self::AutoStartPomodoros => "▶️  Auto-start Pomodoros",
            Self::SoundEnabled => "🔔 Sound",
            Self::Theme => "🎨 Theme",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::WorkDuration
                | Self::ShortBreakDuration
                | Self::LongBreakDuration
                | Self::SessionsBeforeLongBreak
        )
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Parse `90`, `45m`, `1h30m` or `90s` into whole minutes, rounding up.
pub fn parse_minutes(s: &str) -> Result<u32, String> {
    let s = s.trim().to_lowercase();
    let mut total = 0.0;
    let mut num = String::new();

    for c in s.chars() {
        match c {
            '0'..='9' | '.' => num.push(c),
            'h' => { total += num.parse::<f64>().map_err(|_| "Invalid hours")? * 60.0; num.clear(); }
            'm' => { total += num.parse::<f64>().map_err(|_| "Invalid minutes")?; num.clear(); }
            's' => { total += num.parse::<f64>().map_err(|_| "Invalid seconds")? / 60.0; num.clear(); }
            _ => return Err("Invalid format".into()),
        }
    }
    if !num.is_empty() {
        total += num.parse::<f64>().map_err(|_| "Invalid minutes")?;
    }

    if total > 0.0 { Ok(total.ceil() as u32) } else { Err("Duration must be > 0".into()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let s = AppSettings::default();
        assert_eq!(s.minutes_for(Mode::Work), 25);
        assert_eq!(s.minutes_for(Mode::ShortBreak), 5);
        assert_eq!(s.minutes_for(Mode::LongBreak), 15);
        assert_eq!(s.seconds_for(Mode::Work), 1500);
        assert!(!s.auto_start_breaks);
        assert!(!s.auto_start_pomodoros);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(AppSettings::default()).unwrap();
        assert_eq!(json["workDuration"], 25);
        assert_eq!(json["shortBreakDuration"], 5);
        assert_eq!(json["autoStartPomodoros"], false);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let s: AppSettings = serde_json::from_str(r#"{"workDuration": 50, "autoStartBreaks": true}"#).unwrap();
        assert_eq!(
            s,
            AppSettings { work_duration: 50, auto_start_breaks: true, ..AppSettings::default() }
        );
    }

    #[test]
    fn sanitized_clamps_zero_durations() {
        let s = AppSettings {
            work_duration: 0,
            short_break_duration: 500,
            sessions_before_long_break: 0,
            theme: "neon".into(),
            ..AppSettings::default()
        }
        .sanitized();
        assert_eq!(s.work_duration, 1);
        assert_eq!(s.short_break_duration, 60);
        assert_eq!(s.sessions_before_long_break, 1);
        assert_eq!(s.theme, "default");
    }

    #[test]
    fn apply_input_accepts_in_range_values() {
        let mut s = AppSettings::default();
        assert!(s.apply_input(SettingsField::WorkDuration, " 50 "));
        assert_eq!(s.work_duration, 50);
        assert!(s.apply_input(SettingsField::SessionsBeforeLongBreak, "2"));
        assert_eq!(s.sessions_before_long_break, 2);
    }

    #[test]
    fn apply_input_rejects_bad_values() {
        let mut s = AppSettings::default();
        assert!(!s.apply_input(SettingsField::WorkDuration, "0"));
        assert!(!s.apply_input(SettingsField::ShortBreakDuration, "61"));
        assert!(!s.apply_input(SettingsField::LongBreakDuration, "abc"));
        assert!(!s.apply_input(SettingsField::SoundEnabled, "1"));
        assert_eq!(s, AppSettings::default());
    }

    #[test]
    fn toggle_only_flips_flags() {
        let mut s = AppSettings::default();
        assert!(s.toggle(SettingsField::AutoStartBreaks));
        assert!(s.auto_start_breaks);
        assert!(!s.toggle(SettingsField::WorkDuration));
        assert_eq!(s.work_duration, 25);
    }

    #[test]
    fn theme_cycles_both_directions() {
        let mut s = AppSettings::default();
        s.cycle_theme(false);
        assert_eq!(s.theme, "solarized");
        s.cycle_theme(true);
        s.cycle_theme(true);
        assert_eq!(s.theme, "nord");
    }

    #[test]
    fn field_navigation_wraps() {
        assert_eq!(SettingsField::Theme.next(), SettingsField::WorkDuration);
        assert_eq!(SettingsField::WorkDuration.prev(), SettingsField::Theme);
        assert_eq!(SettingsField::WorkDuration.next(), SettingsField::ShortBreakDuration);
    }

    #[test]
    fn parse_minutes_formats() {
        assert_eq!(parse_minutes("25"), Ok(25));
        assert_eq!(parse_minutes("45m"), Ok(45));
        assert_eq!(parse_minutes("1h30m"), Ok(90));
        assert_eq!(parse_minutes("90s"), Ok(2));
        assert!(parse_minutes("0").is_err());
        assert!(parse_minutes("ten").is_err());
    }
}
