mod app;
mod coach;
mod error;
mod input;
mod logging;
mod notify;
mod sessions;
mod settings;
mod stats;
mod store;
mod tasks;
mod ticker;
mod timer;
mod ui;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{io, path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, warn};

use crate::{
    app::AppState,
    coach::{Coach, CoachConfig},
    settings::{parse_minutes, AppSettings},
    store::Store,
    ticker::Ticker,
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
const FRAME_RATE: Duration = Duration::from_millis(50);

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "🍅 mintimer - A Terminal Pomodoro Focus Tracker")]
struct Args {
    /// Work interval length (e.g. 25, 50m, 1h)
    #[arg(short, long, value_parser = parse_minutes)]
    work: Option<u32>,
    /// Short break length
    #[arg(short = 'b', long, value_parser = parse_minutes)]
    short_break: Option<u32>,
    /// Long break length
    #[arg(short, long, value_parser = parse_minutes)]
    long_break: Option<u32>,
    /// Pomodoros before a long break
    #[arg(short, long)]
    sessions: Option<u32>,
    #[arg(short = 't', long)]
    theme: Option<String>,
    #[arg(long)]
    auto_breaks: bool,
    #[arg(long)]
    auto_pomodoros: bool,
    #[arg(long)]
    no_sound: bool,
    /// Disable desktop notifications
    #[arg(long)]
    quiet: bool,
    /// Restore the interval that was running at last exit
    #[arg(long)]
    resume: bool,
    #[arg(long, env = "MINTIMER_DATA_DIR")]
    data_dir: Option<PathBuf>,
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, default_value = coach::DEFAULT_MODEL)]
    model: String,
    /// Never contact the AI coach
    #[arg(long)]
    no_coach: bool,
    #[arg(long, default_value = "info")]
    log_level: String,
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    let store = Store::open(args.data_dir.clone().unwrap_or_else(store::default_data_dir))?;
    let _log_guard = logging::init(store.root(), &args.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), data_dir = %store.root().display(), "starting");

    let coach = build_coach(&args);
    let mut app = AppState::load(store, |s| apply_overrides(&args, s), coach);
    app.desktop_notify = !args.quiet;
    if args.resume {
        app.resume_timer();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        warn!(error = %e, "run loop failed");
    }
    app.save_on_quit();
    info!("exiting");
    res
}

fn apply_overrides(args: &Args, s: &mut AppSettings) {
    if let Some(w) = args.work {
        s.work_duration = w;
    }
    if let Some(b) = args.short_break {
        s.short_break_duration = b;
    }
    if let Some(l) = args.long_break {
        s.long_break_duration = l;
    }
    if let Some(n) = args.sessions {
        s.sessions_before_long_break = n;
    }
    if let Some(t) = &args.theme {
        s.theme = t.clone();
    }
    s.auto_start_breaks |= args.auto_breaks;
    s.auto_start_pomodoros |= args.auto_pomodoros;
    if args.no_sound {
        s.sound_enabled = false;
    }
}

fn build_coach(args: &Args) -> Option<Arc<Coach>> {
    let config = CoachConfig {
        enabled: !args.no_coach,
        api_key: args.api_key.clone().filter(|k| !k.trim().is_empty()),
        model: args.model.clone(),
        ..CoachConfig::default()
    };
    if !config.enabled {
        info!("coach disabled");
        return None;
    }
    match Coach::new(config) {
        Ok(coach) => {
            info!(model = coach.model(), available = coach.is_available(), "coach ready");
            Some(Arc::new(coach))
        }
        Err(e) => {
            warn!(error = %e, "failed to build coach client");
            None
        }
    }
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let mut ticker = Ticker::spawn();

    loop {
        ticker.sync(app.engine.is_running());
        for _ in 0..ticker.drain() {
            app.on_tick();
        }
        // A completion may have dropped the engine to idle or kept it running.
        ticker.sync(app.engine.is_running());

        app.update();
        terminal.draw(|f| ui::render_ui(f, app))?;

        if event::poll(FRAME_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && input::handle_input(key, app) {
                    return Ok(());
                }
            }
        }
    }
}
