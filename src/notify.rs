use notify_rust::{Notification, Urgency};
use std::{path::Path, process::{Command, Stdio}, thread};
use tracing::debug;

use crate::timer::{Completion, Mode};

const SOUNDS: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// Title and body announcing what comes after a finished interval.
pub fn completion_message(done: &Completion) -> (&'static str, &'static str) {
    match (done.mode, done.next_mode) {
        (Mode::Work, Mode::LongBreak) => ("Long Break Time! 🌴", "Great work! Take a longer break."),
        (Mode::Work, _) => ("Break Time! ☕", "Time for a short break."),
        _ => ("Back to Work! 🎯", "Let's focus on your next session."),
    }
}

pub fn announce(done: &Completion, sound: bool) {
    let (title, body) = completion_message(done);
    notify(title, body, sound);
}

pub fn notify(title: &str, body: &str, sound: bool) {
    if let Err(e) = Notification::new()
        .summary(title)
        .body(body)
        .appname("mintimer")
        .icon("alarm-clock")
        .urgency(Urgency::Critical)
        .show()
    {
        debug!(error = %e, "desktop notification unavailable");
    }

    if sound {
        thread::spawn(|| {
            for (cmd, file) in SOUNDS {
                if Path::new(file).exists() {
                    let _ = Command::new(cmd)
                        .arg(file)
                        .stdout(Stdio::null())
                        .stderr(Stdio::null())
                        .spawn();
                    break;
                }
            }
        });
    }
}
