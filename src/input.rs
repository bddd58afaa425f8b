use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    app::{AppState, Tab, TaskMode},
    settings::SettingsField,
    tasks::MAX_EXPECTED_POMODOROS,
    timer::Mode,
};

/// Handle one key press. Returns true when the app should quit.
pub fn handle_input(key: KeyEvent, app: &mut AppState) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    app.status_message = None;

    // Text entry modes
    match app.task_mode {
        TaskMode::AddingTitle => {
            handle_title_entry(key, app);
            return false;
        }
        TaskMode::AddingEstimate => {
            handle_estimate_entry(key, app);
            return false;
        }
        TaskMode::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    app.delete_selected_task();
                    app.task_mode = TaskMode::Browsing;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.task_mode = TaskMode::Browsing;
                }
                _ => {}
            }
            return false;
        }
        TaskMode::Browsing => {}
    }

    if app.settings_editing {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => app.settings_input.push(c),
            KeyCode::Backspace => { app.settings_input.pop(); }
            KeyCode::Enter => app.commit_settings_edit(),
            KeyCode::Esc => {
                app.settings_editing = false;
                app.settings_input.clear();
            }
            _ => {}
        }
        return false;
    }

    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc) {
            app.show_help = false;
        }
        return false;
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('?') => {
            app.show_help = true;
            return false;
        }
        KeyCode::Tab => {
            app.enter_tab(app.tab.next());
            return false;
        }
        KeyCode::BackTab => {
            app.enter_tab(app.tab.prev());
            return false;
        }
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            app.enter_tab(Tab::ALL[idx]);
            return false;
        }
        _ => {}
    }

    match app.tab {
        Tab::Focus => handle_focus_view(key, app),
        Tab::Tasks => handle_tasks_view(key, app),
        Tab::Stats => {
            if key.code == KeyCode::Char('e') {
                app.export_sessions();
            }
        }
        Tab::Coach => {
            if key.code == KeyCode::Char('r') {
                app.request_advice();
            }
        }
        Tab::Settings => handle_settings_view(key, app),
    }
    false
}

fn handle_focus_view(key: KeyEvent, app: &mut AppState) {
    match key.code {
        KeyCode::Char(' ') => app.toggle_timer(),
        KeyCode::Char('r') => app.engine.reset(),
        KeyCode::Char('n') => app.engine.skip(),
        KeyCode::Char('w') => app.engine.switch_mode(Mode::Work),
        KeyCode::Char('b') => app.engine.switch_mode(Mode::ShortBreak),
        KeyCode::Char('l') => app.engine.switch_mode(Mode::LongBreak),
        _ => {}
    }
}

fn handle_tasks_view(key: KeyEvent, app: &mut AppState) {
    match key.code {
        KeyCode::Char('a') => {
            app.task_input.clear();
            app.estimate_input.clear();
            app.task_mode = TaskMode::AddingTitle;
        }
        KeyCode::Down | KeyCode::Char('j') => app.move_task_selection(true),
        KeyCode::Up | KeyCode::Char('k') => app.move_task_selection(false),
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('x') => app.toggle_selected_task(),
        KeyCode::Char('f') => app.focus_selected_task(),
        KeyCode::Char('d') => {
            if app.selected_task_id().is_some() {
                app.task_mode = TaskMode::ConfirmingDelete;
            }
        }
        _ => {}
    }
}

fn handle_title_entry(key: KeyEvent, app: &mut AppState) {
    match key.code {
        KeyCode::Char(c) => app.task_input.push(c),
        KeyCode::Backspace => { app.task_input.pop(); }
        KeyCode::Enter => {
            if app.task_input.trim().is_empty() {
                app.status_message = Some("Task title cannot be empty".into());
            } else {
                app.estimate_input = "1".into();
                app.task_mode = TaskMode::AddingEstimate;
            }
        }
        KeyCode::Esc => cancel_task_entry(app),
        _ => {}
    }
}

fn handle_estimate_entry(key: KeyEvent, app: &mut AppState) {
    let current: u32 = app.estimate_input.parse().unwrap_or(1);
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() && app.estimate_input.len() < 2 => app.estimate_input.push(c),
        KeyCode::Char('+') | KeyCode::Up => {
            app.estimate_input = (current + 1).min(MAX_EXPECTED_POMODOROS).to_string();
        }
        KeyCode::Char('-') | KeyCode::Down => {
            app.estimate_input = current.saturating_sub(1).max(1).to_string();
        }
        KeyCode::Backspace => { app.estimate_input.pop(); }
        KeyCode::Enter => {
            let title = std::mem::take(&mut app.task_input);
            app.add_task(&title, current);
            cancel_task_entry(app);
        }
        KeyCode::Esc => cancel_task_entry(app),
        _ => {}
    }
}

fn cancel_task_entry(app: &mut AppState) {
    app.task_mode = TaskMode::Browsing;
    app.task_input.clear();
    app.estimate_input.clear();
}

fn handle_settings_view(key: KeyEvent, app: &mut AppState) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.settings_field = app.settings_field.next(),
        KeyCode::Up | KeyCode::Char('k') => app.settings_field = app.settings_field.prev(),
        KeyCode::Enter | KeyCode::Char('e') => app.start_settings_edit(),
        KeyCode::Char(' ') => {
            if app.settings.toggle(app.settings_field) {
                app.settings_changed();
            }
        }
        KeyCode::Left | KeyCode::Char('h') if app.settings_field == SettingsField::Theme => {
            app.settings.cycle_theme(false);
            app.settings_changed();
        }
        KeyCode::Right | KeyCode::Char('l') if app.settings_field == SettingsField::Theme => {
            app.settings.cycle_theme(true);
            app.settings_changed();
        }
        _ => {}
    }
}
