use chrono::Local;
use std::sync::{
    mpsc::{self, Receiver, Sender},
    Arc,
};
use tracing::{info, warn};

use crate::{
    coach::{self, Coach, CoachKind, CoachReply, CoachRequest},
    notify,
    sessions::{FocusSession, SessionLog},
    settings::{AppSettings, SettingsField},
    stats,
    store::{Store, SESSIONS_KEY, SETTINGS_KEY, TASKS_KEY, TIMER_STATE_KEY},
    tasks::TaskList,
    timer::{Completion, Mode, Status, TimerEngine, TimerSnapshot},
    ui::{get_theme, Theme},
};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Tab {
    Focus,
    Tasks,
    Stats,
    Coach,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Focus, Tab::Tasks, Tab::Stats, Tab::Coach, Tab::Settings];

    pub fn title(self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::Tasks => "Tasks",
            Self::Stats => "Stats",
            Self::Coach => "AI Coach",
            Self::Settings => "Settings",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TaskMode {
    Browsing,
    AddingTitle,
    AddingEstimate,
    ConfirmingDelete,
}

pub struct AppState {
    pub store: Store,
    pub settings: AppSettings,
    pub tasks: TaskList,
    pub sessions: SessionLog,
    pub engine: TimerEngine,
    pub theme: Theme,
    pub tab: Tab,
    pub show_help: bool,
    pub animation_frame: u8,
    pub desktop_notify: bool,
    pub status_message: Option<String>,

    pub task_mode: TaskMode,
    pub task_input: String,
    pub estimate_input: String,
    pub selected_task: usize,
    pub focus_task: Option<String>,

    pub settings_field: SettingsField,
    pub settings_editing: bool,
    pub settings_input: String,

    coach: Option<Arc<Coach>>,
    coach_tx: Sender<CoachReply>,
    coach_rx: Receiver<CoachReply>,
    pub advice: Option<String>,
    pub advice_loading: bool,
    pub toast: Option<String>,
}

impl AppState {
    pub fn new(
        store: Store,
        settings: AppSettings,
        tasks: TaskList,
        sessions: SessionLog,
        coach: Option<Arc<Coach>>,
    ) -> Self {
        let (coach_tx, coach_rx) = mpsc::channel();
        Self {
            theme: get_theme(&settings.theme),
            engine: TimerEngine::new(&settings),
            store,
            settings,
            tasks,
            sessions,
            tab: Tab::Focus,
            show_help: false,
            animation_frame: 0,
            desktop_notify: true,
            status_message: None,
            task_mode: TaskMode::Browsing,
            task_input: String::new(),
            estimate_input: String::new(),
            selected_task: 0,
            focus_task: None,
            settings_field: SettingsField::WorkDuration,
            settings_editing: false,
            settings_input: String::new(),
            coach,
            coach_tx,
            coach_rx,
            advice: None,
            advice_loading: false,
            toast: None,
        }
    }

    /// Load settings, tasks and sessions from `store`. `overrides` adjusts
    /// the stored settings for this run only.
    pub fn load(store: Store, overrides: impl FnOnce(&mut AppSettings), coach: Option<Arc<Coach>>) -> Self {
        let mut settings: AppSettings = store.load(SETTINGS_KEY);
        overrides(&mut settings);
        let settings = settings.sanitized();
        let tasks: TaskList = store.load(TASKS_KEY);
        let sessions: SessionLog = store.load(SESSIONS_KEY);
        info!(tasks = tasks.len(), sessions = sessions.len(), "state loaded");
        Self::new(store, settings, tasks, sessions, coach)
    }

    pub fn coach_available(&self) -> bool {
        self.coach.as_ref().is_some_and(|c| c.is_available())
    }

    /// Restore the snapshot saved at last quit. The snapshot is consumed so a
    /// crash before the next quit cannot restore it a second time.
    pub fn resume_timer(&mut self) {
        if let Some(snapshot) = self.store.load::<Option<TimerSnapshot>>(TIMER_STATE_KEY) {
            info!(mode = snapshot.mode.label(), remaining = snapshot.remaining_secs, "resuming timer");
            self.engine.restore(snapshot);
            if let Err(e) = self.store.remove(TIMER_STATE_KEY) {
                warn!(error = %e, "failed to clear timer state");
            }
        }
    }

    // ------------------------------------------------------------------------
    // Timer
    // ------------------------------------------------------------------------

    /// Space on the Focus tab. Starting a fresh interval drops the previous
    /// reflection.
    pub fn toggle_timer(&mut self) {
        if self.engine.status() == Status::Idle {
            self.toast = None;
        }
        self.engine.toggle();
    }

    pub fn on_tick(&mut self) {
        if let Some(done) = self.engine.tick() {
            self.on_completion(done);
        }
    }

    fn on_completion(&mut self, done: Completion) {
        info!(mode = done.mode.label(), minutes = done.minutes, next = done.next_mode.label(), "interval completed");
        self.toast = None;

        if self.sessions.append(FocusSession::now(done.mode, done.minutes)) {
            self.save_sessions();
        }

        if done.mode == Mode::Work {
            let credited = self
                .tasks
                .focus_target(self.focus_task.as_deref())
                .map(|t| t.id.clone());
            if let Some(id) = credited {
                if self.tasks.record_pomodoro(&id).is_ok() {
                    self.save_tasks();
                }
                self.request_reflection(&id, done.minutes);
            } else if self.coach_available() {
                self.spawn_coach(CoachRequest::Reflection { worked_on: vec![], minutes: done.minutes });
            }
        }

        if self.desktop_notify {
            notify::announce(&done, self.settings.sound_enabled);
        }
    }

    // ------------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------------

    pub fn selected_task_id(&self) -> Option<String> {
        self.tasks
            .display_order()
            .get(self.selected_task)
            .map(|t| t.id.clone())
    }

    pub fn select_task_id(&mut self, id: &str) {
        if let Some(idx) = self.tasks.display_order().iter().position(|t| t.id == id) {
            self.selected_task = idx;
        }
    }

    pub fn move_task_selection(&mut self, down: bool) {
        let len = self.tasks.len();
        if len == 0 {
            self.selected_task = 0;
        } else if down {
            self.selected_task = (self.selected_task + 1).min(len - 1);
        } else {
            self.selected_task = self.selected_task.saturating_sub(1);
        }
    }

    pub fn add_task(&mut self, title: &str, expected: u32) -> bool {
        match self.tasks.add(title, expected) {
            Ok(task) => {
                let id = task.id.clone();
                info!(task = %id, "task added");
                self.select_task_id(&id);
                self.save_tasks();
                true
            }
            Err(e) => {
                self.status_message = Some(e.to_string());
                false
            }
        }
    }

    pub fn toggle_selected_task(&mut self) {
        let Some(id) = self.selected_task_id() else { return };
        if let Ok(completed) = self.tasks.toggle(&id) {
            info!(task = %id, completed, "task toggled");
            self.select_task_id(&id);
            self.save_tasks();
        }
    }

    pub fn delete_selected_task(&mut self) {
        let Some(id) = self.selected_task_id() else { return };
        if let Ok(task) = self.tasks.delete(&id) {
            info!(task = %task.id, "task deleted");
            if self.focus_task.as_deref() == Some(id.as_str()) {
                self.focus_task = None;
            }
            self.selected_task = self.selected_task.min(self.tasks.len().saturating_sub(1));
            self.save_tasks();
        }
    }

    pub fn focus_selected_task(&mut self) {
        let Some(id) = self.selected_task_id() else { return };
        self.focus_task = if self.focus_task.as_deref() == Some(id.as_str()) { None } else { Some(id) };
    }

    pub fn focus_task_title(&self) -> Option<&str> {
        self.tasks
            .focus_target(self.focus_task.as_deref())
            .map(|t| t.title.as_str())
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    pub fn settings_changed(&mut self) {
        self.engine.apply_settings(&self.settings);
        self.theme = get_theme(&self.settings.theme);
        if let Err(e) = self.store.save(SETTINGS_KEY, &self.settings) {
            warn!(error = %e, "failed to save settings");
        }
    }

    pub fn start_settings_edit(&mut self) {
        if self.settings_field.is_numeric() {
            self.settings_input = self.settings.field_value(self.settings_field);
            self.settings_editing = true;
        }
    }

    pub fn commit_settings_edit(&mut self) {
        if self.settings.apply_input(self.settings_field, &self.settings_input) {
            self.settings_changed();
        } else {
            self.status_message = Some(format!("Invalid value: {}", self.settings_input.trim()));
        }
        self.settings_editing = false;
        self.settings_input.clear();
    }

    // ------------------------------------------------------------------------
    // Coach
    // ------------------------------------------------------------------------

    pub fn enter_tab(&mut self, tab: Tab) {
        self.tab = tab;
        if tab == Tab::Coach && self.advice.is_none() && !self.advice_loading {
            self.request_advice();
        }
    }

    pub fn request_advice(&mut self) {
        if self.advice_loading {
            return;
        }
        let request = CoachRequest::Advice { tasks: self.tasks.tasks().to_vec(), mode: self.engine.mode() };
        if self.coach.is_some() {
            self.advice_loading = true;
            self.spawn_coach(request);
        } else {
            self.advice = Some(coach::ADVICE_FAILED.to_string());
        }
    }

    fn request_reflection(&mut self, task_id: &str, minutes: u32) {
        if !self.coach_available() {
            return;
        }
        let worked_on = self.tasks.get(task_id).cloned().into_iter().collect();
        self.spawn_coach(CoachRequest::Reflection { worked_on, minutes });
    }

    fn spawn_coach(&self, request: CoachRequest) {
        if let Some(coach) = &self.coach {
            coach::spawn_request(Arc::clone(coach), request, self.coach_tx.clone());
        }
    }

    fn poll_coach(&mut self) {
        while let Ok(reply) = self.coach_rx.try_recv() {
            match reply.kind {
                CoachKind::Advice => {
                    self.advice = Some(reply.text);
                    self.advice_loading = false;
                }
                CoachKind::Reflection => self.toast = Some(reply.text),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Housekeeping
    // ------------------------------------------------------------------------

    pub fn update(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1) % 20;
        self.poll_coach();
    }

    pub fn export_sessions(&mut self) {
        let path = self.store.root().join("sessions_export.csv");
        self.status_message = Some(match stats::export_csv(&self.sessions, Local::now(), &path) {
            Ok(()) => {
                info!(path = %path.display(), "sessions exported");
                format!("Exported to {}", path.display())
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                format!("Export failed: {e}")
            }
        });
    }

    fn save_tasks(&self) {
        if let Err(e) = self.store.save(TASKS_KEY, &self.tasks) {
            warn!(error = %e, "failed to save tasks");
        }
    }

    fn save_sessions(&self) {
        if let Err(e) = self.store.save(SESSIONS_KEY, &self.sessions) {
            warn!(error = %e, "failed to save sessions");
        }
    }

    pub fn save_on_quit(&self) {
        self.save_tasks();
        self.save_sessions();
        if let Err(e) = self.store.save(TIMER_STATE_KEY, &Some(self.engine.snapshot())) {
            warn!(error = %e, "failed to save timer state");
        }
        info!("state saved on quit");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    pub(crate) fn test_app(settings: AppSettings) -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let mut app = AppState::new(store, settings, TaskList::default(), SessionLog::default(), None);
        app.desktop_notify = false;
        (dir, app)
    }

    fn one_minute() -> AppSettings {
        AppSettings { work_duration: 1, short_break_duration: 1, long_break_duration: 1, ..AppSettings::default() }
    }

    fn run_interval(app: &mut AppState) {
        for _ in 0..app.engine.remaining_secs() {
            app.on_tick();
        }
    }

    #[test]
    fn finished_work_interval_logs_one_session() {
        let (_dir, mut app) = test_app(one_minute());
        app.engine.start();

        run_interval(&mut app);

        assert_eq!(app.sessions.len(), 1);
        let session = app.sessions.sessions()[0];
        assert_eq!(session.mode, Mode::Work);
        assert_eq!(session.duration, 1);
        assert_eq!(app.engine.status(), Status::Idle);

        let stored: SessionLog = app.store.load(SESSIONS_KEY);
        assert_eq!(stored, app.sessions);
    }

    #[test]
    fn finished_work_credits_focus_task() {
        let (_dir, mut app) = test_app(one_minute());
        app.add_task("first", 2);
        app.add_task("second", 2);
        let first = app.tasks.tasks()[1].id.clone();
        app.select_task_id(&first);
        app.focus_selected_task();

        app.engine.start();
        run_interval(&mut app);

        assert_eq!(app.tasks.get(&first).unwrap().pomodoros, 1);
        assert_eq!(app.tasks.tasks()[0].pomodoros, 0);
        let stored: TaskList = app.store.load(TASKS_KEY);
        assert_eq!(stored.get(&first).unwrap().pomodoros, 1);
    }

    #[test]
    fn finished_break_does_not_credit_tasks() {
        let (_dir, mut app) = test_app(one_minute());
        app.add_task("only", 1);
        app.engine.switch_mode(Mode::ShortBreak);
        app.engine.start();

        run_interval(&mut app);

        assert_eq!(app.tasks.tasks()[0].pomodoros, 0);
        assert_eq!(app.sessions.sessions()[0].mode, Mode::ShortBreak);
    }

    #[test]
    fn toggle_keeps_selection_on_same_task() {
        let (_dir, mut app) = test_app(AppSettings::default());
        app.add_task("a", 1);
        app.add_task("b", 1);
        let b = app.selected_task_id().unwrap();

        app.toggle_selected_task();

        assert_eq!(app.selected_task_id(), Some(b.clone()));
        assert!(app.tasks.get(&b).unwrap().completed);
        assert_eq!(app.selected_task, 1);
    }

    #[test]
    fn deleting_focus_task_clears_focus() {
        let (_dir, mut app) = test_app(AppSettings::default());
        app.add_task("a", 1);
        app.focus_selected_task();
        assert!(app.focus_task.is_some());

        app.delete_selected_task();

        assert!(app.focus_task.is_none());
        assert!(app.tasks.is_empty());
        assert_eq!(app.selected_task, 0);
    }

    #[test]
    fn blank_task_sets_status_message() {
        let (_dir, mut app) = test_app(AppSettings::default());
        assert!(!app.add_task("  ", 1));
        assert_eq!(app.status_message.as_deref(), Some("task title is empty"));
    }

    #[test]
    fn settings_edit_updates_engine_and_store() {
        let (_dir, mut app) = test_app(AppSettings::default());
        app.settings_field = SettingsField::WorkDuration;
        app.start_settings_edit();
        app.settings_input = "40".into();

        app.commit_settings_edit();

        assert_eq!(app.engine.remaining_secs(), 40 * 60);
        let stored: AppSettings = app.store.load(SETTINGS_KEY);
        assert_eq!(stored.work_duration, 40);
        assert!(!app.settings_editing);
    }

    #[test]
    fn invalid_settings_edit_is_rejected() {
        let (_dir, mut app) = test_app(AppSettings::default());
        app.settings_field = SettingsField::ShortBreakDuration;
        app.start_settings_edit();
        app.settings_input = "0".into();

        app.commit_settings_edit();

        assert_eq!(app.settings.short_break_duration, 5);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn coach_tab_without_client_shows_fallback() {
        let (_dir, mut app) = test_app(AppSettings::default());
        app.enter_tab(Tab::Coach);
        assert_eq!(app.advice.as_deref(), Some(coach::ADVICE_FAILED));
        assert!(!app.advice_loading);
    }

    #[test]
    fn quit_snapshot_round_trips_through_resume() {
        let (dir, mut app) = test_app(AppSettings::default());
        app.engine.start();
        for _ in 0..30 {
            app.on_tick();
        }
        app.save_on_quit();

        let store = Store::open(dir.path()).unwrap();
        let mut resumed = AppState::load(store, |_| {}, None);
        resumed.resume_timer();

        assert_eq!(resumed.engine.status(), Status::Paused);
        assert_eq!(resumed.engine.remaining_secs(), 1470);
    }

    #[test]
    fn resume_consumes_saved_snapshot() {
        let (dir, mut app) = test_app(AppSettings::default());
        app.engine.start();
        app.on_tick();
        app.save_on_quit();

        let store = Store::open(dir.path()).unwrap();
        let mut resumed = AppState::load(store, |_| {}, None);
        resumed.resume_timer();
        assert!(!dir.path().join("timer_state.json").exists());

        let store = Store::open(dir.path()).unwrap();
        let mut again = AppState::load(store, |_| {}, None);
        again.resume_timer();
        assert_eq!(again.engine.status(), Status::Idle);
        assert_eq!(again.engine.remaining_secs(), 1500);
    }

    #[test]
    fn starting_fresh_interval_clears_reflection() {
        let (_dir, mut app) = test_app(AppSettings::default());
        app.toast = Some("Nice work.".into());

        app.toggle_timer();
        assert_eq!(app.engine.status(), Status::Running);
        assert_eq!(app.toast, None);

        app.toast = Some("late reply".into());
        app.toggle_timer();
        assert_eq!(app.engine.status(), Status::Paused);
        assert_eq!(app.toast.as_deref(), Some("late reply"));
    }

    #[test]
    fn completion_clears_previous_reflection() {
        let (_dir, mut app) = test_app(one_minute());
        app.toast = Some("old reflection".into());
        app.engine.start();
        run_interval(&mut app);
        assert_eq!(app.toast, None);
    }

    #[test]
    fn load_applies_overrides_and_sanitizes() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let app = AppState::load(store, |s| { s.work_duration = 0; s.auto_start_breaks = true; }, None);
        assert_eq!(app.settings.work_duration, 1);
        assert!(app.settings.auto_start_breaks);
    }

    #[test]
    fn export_writes_into_data_dir() {
        let (dir, mut app) = test_app(AppSettings::default());
        app.export_sessions();
        assert!(dir.path().join("sessions_export.csv").exists());
        assert!(app.status_message.unwrap().starts_with("Exported"));
    }

    #[test]
    fn tab_cycle_wraps() {
        assert_eq!(Tab::Settings.next(), Tab::Focus);
        assert_eq!(Tab::Focus.prev(), Tab::Settings);
    }
}
