use chrono::Local;
use ratatui::{prelude::*, widgets::*};

use crate::{
    app::{AppState, Tab, TaskMode},
    settings::SettingsField,
    stats::{self, Summary, RECENT_LIMIT},
    timer::{Mode, Status},
};

const PRO_TIPS: &[(&str, &str)] = &[
    ("Pro Tip", "Large tasks feel daunting. Break them into 2-pomodoro chunks for maximum efficiency."),
    ("Science", "Deep work cycles of 90 minutes are ideal, but the 25/5 rhythm builds consistency for most."),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub work_color: Color,
    pub short_break_color: Color,
    pub long_break_color: Color,
    pub border_color: Color,
    pub accent_color: Color,
}

impl Theme {
    pub fn mode_color(&self, mode: Mode) -> Color {
        match mode {
            Mode::Work => self.work_color,
            Mode::ShortBreak => self.short_break_color,
            Mode::LongBreak => self.long_break_color,
        }
    }
}

pub fn get_theme(name: &str) -> Theme {
    match name {
        "nord" => Theme {
            work_color: Color::Rgb(136, 192, 208),
            short_break_color: Color::Rgb(163, 190, 140),
            long_break_color: Color::Rgb(180, 142, 173),
            border_color: Color::Rgb(94, 129, 172),
            accent_color: Color::Rgb(235, 203, 139),
        },
        "dracula" => Theme {
            work_color: Color::Rgb(189, 147, 249),
            short_break_color: Color::Rgb(80, 250, 123),
            long_break_color: Color::Rgb(139, 233, 253),
            border_color: Color::Rgb(98, 114, 164),
            accent_color: Color::Rgb(255, 121, 198),
        },
        "gruvbox" => Theme {
            work_color: Color::Rgb(254, 128, 25),
            short_break_color: Color::Rgb(184, 187, 38),
            long_break_color: Color::Rgb(131, 165, 152),
            border_color: Color::Rgb(213, 196, 161),
            accent_color: Color::Rgb(250, 189, 47),
        },
        "solarized" => Theme {
            work_color: Color::Rgb(42, 161, 152),
            short_break_color: Color::Rgb(133, 153, 0),
            long_break_color: Color::Rgb(108, 113, 196),
            border_color: Color::Rgb(38, 139, 210),
            accent_color: Color::Rgb(181, 137, 0),
        },
        _ => Theme {
            work_color: Color::Rgb(74, 222, 128),
            short_break_color: Color::Rgb(96, 165, 250),
            long_break_color: Color::Rgb(192, 132, 252),
            border_color: Color::Rgb(75, 85, 99),
            accent_color: Color::Rgb(34, 197, 94),
        },
    }
}

// ============================================================================
// Frame
// ============================================================================

pub fn render_ui(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(2)])
        .split(f.size());

    render_tabs(f, app, chunks[0]);

    match app.tab {
        Tab::Focus => render_focus(f, app, chunks[1]),
        Tab::Tasks => render_tasks(f, app, chunks[1]),
        Tab::Stats => render_stats(f, app, chunks[1]),
        Tab::Coach => render_coach(f, app, chunks[1]),
        Tab::Settings => render_settings(f, app, chunks[1]),
    }

    render_footer(f, app, chunks[2]);

    if app.show_help {
        render_help(f, app);
    }
}

fn render_tabs(f: &mut Frame, app: &AppState, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .block(themed_block(" 🍅 MINTIMER ", app))
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))
        .divider("•");
    f.render_widget(tabs, area);
}

fn render_footer(f: &mut Frame, app: &AppState, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.tab {
        Tab::Focus => vec![("Space", "Start/Pause"), ("R", "Reset"), ("N", "Skip"), ("W/B/L", "Mode")],
        Tab::Tasks => vec![("A", "Add"), ("Space", "Toggle"), ("F", "Focus"), ("D", "Delete")],
        Tab::Stats => vec![("E", "Export CSV")],
        Tab::Coach => vec![("R", "Refresh advice")],
        Tab::Settings => vec![("↑↓", "Navigate"), ("Enter", "Edit"), ("Space", "Toggle"), ("←→", "Theme")],
    };

    let mut spans = Vec::new();
    for (key, desc) in hints.into_iter().chain([("Tab", "Switch"), ("?", "Help"), ("Q", "Quit")]) {
        if !spans.is_empty() {
            spans.push(Span::raw("  •  "));
        }
        spans.push(span_key(key, app));
        spans.push(Span::raw(format!(" {}", desc)));
    }

    let mut lines = vec![Line::from(spans)];
    if let Some(msg) = &app.status_message {
        lines.push(Line::from(Span::styled(msg.as_str(), Style::default().fg(Color::Yellow))));
    }

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

// ============================================================================
// Focus
// ============================================================================

fn render_focus(f: &mut Frame, app: &AppState, area: Rect) {
    let engine = &app.engine;
    let color = app.theme.mode_color(engine.mode());

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(2), Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    // Mode selector
    let mut modes = Vec::new();
    for mode in Mode::ALL {
        let style = if mode == engine.mode() {
            Style::default().fg(Color::Black).bg(app.theme.mode_color(mode)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        modes.push(Span::styled(format!(" {} ", mode.label()), style));
        modes.push(Span::raw("  "));
    }
    modes.pop();
    f.render_widget(Paragraph::new(Line::from(modes)).alignment(Alignment::Center), sections[1]);

    f.render_widget(
        Paragraph::new(engine.mode().banner())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[3],
    );

    f.render_widget(
        Paragraph::new(engine.clock())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded)
                .border_style(Style::default().fg(app.theme.border_color))),
        centered_horizontally(24, sections[5]),
    );

    let (status, status_color) = match engine.status() {
        Status::Running => (
            format!("{} FOCUSING", if app.animation_frame < 10 { "●" } else { "○" }),
            Color::Green,
        ),
        Status::Paused => (
            format!("⏸  PAUSED{}", ".".repeat((app.animation_frame / 5) as usize % 4)),
            Color::Yellow,
        ),
        Status::Idle => ("READY?".to_string(), Color::Gray),
    };
    f.render_widget(
        Paragraph::new(status)
            .style(Style::default().fg(status_color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[7],
    );

    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .percent((engine.progress() * 100.0) as u16),
        centered_horizontally(60, sections[9]),
    );

    let (pos, per_cycle) = engine.cycle_position();
    let today = stats::today_focus_minutes(app.sessions.sessions(), Local::now());
    let focus = app.focus_task_title().unwrap_or("no active task");
    let info = vec![
        Line::from(format!(
            "Pomodoro {} of {}  •  {} focused today",
            pos,
            per_cycle,
            stats::format_minutes(today)
        )),
        Line::from(vec![
            Span::raw("Working on: "),
            Span::styled(focus, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        ]),
    ];
    f.render_widget(
        Paragraph::new(info).style(Style::default().fg(Color::Gray)).alignment(Alignment::Center),
        sections[11],
    );

    if let Some(toast) = &app.toast {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("💬 {}", toast),
                Style::default().fg(app.theme.accent_color).add_modifier(Modifier::ITALIC),
            )))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
            sections[13],
        );
    }
}

// ============================================================================
// Tasks
// ============================================================================

fn render_tasks(f: &mut Frame, app: &AppState, area: Rect) {
    let active = app.tasks.active().count();
    let done = app.tasks.completed().count();

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {} active  •  {} completed", active, done),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
    ];

    match app.task_mode {
        TaskMode::AddingTitle | TaskMode::AddingEstimate => {
            lines.push(Line::from(Span::styled("  ✏️  NEW TASK", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))));
            lines.push(Line::from(""));
            lines.push(input_line("What are you working on? ", &app.task_input, app.task_mode == TaskMode::AddingTitle));
            if app.task_mode == TaskMode::AddingEstimate {
                let est: u32 = app.estimate_input.parse().unwrap_or(1);
                lines.push(input_line(
                    &format!("Est. Pomodoros ({} mins): ", est * app.settings.work_duration),
                    &app.estimate_input,
                    true,
                ));
            }
            lines.push(Line::from(""));
            lines.push(Line::from("  ─────────────────────────────────────────────────────────────────────"));
            lines.push(Line::from(""));
        }
        TaskMode::ConfirmingDelete => {
            if let Some(task) = app.selected_task_id().and_then(|id| app.tasks.get(&id)) {
                lines.push(Line::from(Span::styled("  ⚠️  DELETE TASK?  (y/n)", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))));
                lines.push(Line::from(vec![Span::raw("  "), Span::styled(task.title.as_str(), Style::default().fg(Color::White))]));
                lines.push(Line::from(""));
            }
        }
        TaskMode::Browsing => {}
    }

    if app.tasks.is_empty() {
        lines.push(Line::from(Span::styled("  No tasks yet! Press 'a' to add one.", Style::default().fg(Color::Gray))));
    }

    let focus_id = app.tasks.focus_target(app.focus_task.as_deref()).map(|t| t.id.as_str());
    let mut shown_completed_header = false;
    let mut selected_line = 0;
    for (idx, task) in app.tasks.display_order().into_iter().enumerate() {
        if task.completed && !shown_completed_header {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("  COMPLETED", Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD))));
            shown_completed_header = true;
        }

        let selected = idx == app.selected_task;
        if selected {
            selected_line = lines.len();
        }
        let prefix = if selected { "► " } else { "  " };
        let check = if task.completed { "[✓]" } else { "[ ]" };
        let title_style = match (task.completed, selected) {
            (true, _) => Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT),
            (false, true) => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            (false, false) => Style::default().fg(Color::Gray),
        };
        let count_style = if task.over_budget() {
            Style::default().fg(Color::Rgb(251, 146, 60))
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let mut spans = vec![
            Span::styled(prefix, Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD)),
            Span::raw(format!("{} ", check)),
            Span::styled(task.title.as_str(), title_style),
            Span::raw("  "),
            Span::styled(format!("{}/{} 🍅", task.pomodoros, task.expected_pomodoros), count_style),
        ];
        if focus_id == Some(task.id.as_str()) {
            spans.push(Span::styled("  ◆ focus", Style::default().fg(app.theme.accent_color)));
        }
        lines.push(Line::from(spans));
    }

    // Keep the selected row inside the bordered area.
    let visible = area.height.saturating_sub(2) as usize;
    let offset = (selected_line + 1).saturating_sub(visible);
    f.render_widget(
        Paragraph::new(lines)
            .scroll((offset as u16, 0))
            .block(themed_block(" Tasks ", app)),
        area,
    );
}

fn input_line<'a>(label: &str, value: &'a str, active: bool) -> Line<'a> {
    let value_style = if active {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![
        Span::raw(format!("  {}", label)),
        Span::styled(value, value_style),
    ];
    if active {
        spans.push(Span::styled("█", Style::default().fg(Color::Green)));
    }
    Line::from(spans)
}

// ============================================================================
// Stats
// ============================================================================

fn render_stats(f: &mut Frame, app: &AppState, area: Rect) {
    let summary = Summary::from_log(&app.sessions, Local::now());

    let block = themed_block(" Statistics ", app);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(6)])
        .split(inner);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let cards = vec![
        Line::from(""),
        stat_line("Total focus time", stats::format_minutes(summary.total_focus_minutes)),
        stat_line("Total sessions", summary.total_sessions.to_string()),
        Line::from(vec![
            Span::raw("     Today's focus: "),
            Span::styled(
                stats::format_minutes(summary.today_focus_minutes),
                Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    f.render_widget(Paragraph::new(cards), rows[0]);

    let bars: Vec<Bar> = summary
        .breakdown
        .iter()
        .map(|&(mode, minutes)| {
            Bar::default()
                .label(Line::from(match mode {
                    Mode::Work => "Focus",
                    other => other.label(),
                }))
                .value(minutes)
                .text_value(format!("{}m", minutes))
                .style(Style::default().fg(app.theme.mode_color(mode)))
        })
        .collect();
    f.render_widget(
        BarChart::default()
            .block(Block::default().title(" Activity Breakdown ").borders(Borders::ALL).border_type(BorderType::Rounded))
            .data(BarGroup::default().bars(&bars))
            .bar_width(11)
            .bar_gap(2)
            .value_style(Style::default().fg(Color::Black).add_modifier(Modifier::BOLD)),
        cols[0],
    );

    let mut recent = Vec::new();
    if app.sessions.is_empty() {
        recent.push(Line::from(Span::styled("  No sessions recorded yet.", Style::default().fg(Color::DarkGray))));
    } else {
        for s in app.sessions.recent(RECENT_LIMIT) {
            let when = s
                .local_time()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "Unknown".into());
            recent.push(Line::from(vec![
                Span::raw(format!("  {} ", s.mode.icon())),
                Span::styled(when, Style::default().fg(Color::Gray)),
                Span::raw(" • "),
                Span::styled(s.mode.label(), Style::default().fg(Color::White)),
                Span::raw(" • "),
                Span::styled(format!("{}m", s.duration), Style::default().fg(app.theme.accent_color)),
            ]));
        }
    }
    f.render_widget(
        Paragraph::new(recent)
            .block(Block::default().title(" Recent History ").borders(Borders::ALL).border_type(BorderType::Rounded)),
        cols[1],
    );
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("     {}: ", label)),
        Span::styled(value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
    ])
}

// ============================================================================
// Coach
// ============================================================================

fn render_coach(f: &mut Frame, app: &AppState, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("⚡ YOUR PERFORMANCE COACH", Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];

    if app.advice_loading {
        let dots = ".".repeat((app.animation_frame / 5) as usize % 4);
        lines.push(Line::from(Span::styled(format!("Thinking{}", dots), Style::default().fg(Color::Green))));
    } else {
        let advice = app
            .advice
            .as_deref()
            .unwrap_or("I'm ready to help you optimize your next focus session.");
        lines.push(Line::from(Span::styled(
            format!("\"{}\"", advice),
            Style::default().fg(Color::White).add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::from(""));

    if !app.coach_available() {
        lines.push(Line::from(Span::styled(
            "Offline tips only. Set GEMINI_API_KEY for personalised coaching.",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
    }

    for (heading, tip) in PRO_TIPS {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(heading.to_uppercase(), Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))));
        lines.push(Line::from(Span::styled(*tip, Style::default().fg(Color::Gray))));
    }

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(themed_block(" AI Coach ", app)),
        area,
    );
}

// ============================================================================
// Settings
// ============================================================================

fn render_settings(f: &mut Frame, app: &AppState, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("⚙️  SETTINGS", Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))),
        Line::from(Span::styled("  Tailor the focus experience to your workflow.", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    for field in SettingsField::ALL {
        let selected = app.settings_field == field;
        let editing = selected && app.settings_editing;
        let value = match field {
            SettingsField::Theme => format!("< {} >", app.settings.theme),
            _ => app.settings.field_value(field),
        };

        lines.push(Line::from(""));

        if editing {
            lines.push(Line::from(vec![
                Span::styled("  > ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::styled(field.label(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            ]));
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(app.settings_input.as_str(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled("█", Style::default().fg(Color::Green)),
            ]));
        } else {
            let (prefix, label_style, value_style) = if selected {
                ("  > ", Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD),
                 Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            } else {
                ("    ", Style::default().fg(Color::Gray), Style::default().fg(Color::DarkGray))
            };

            lines.push(Line::from(vec![Span::styled(prefix, label_style), Span::styled(field.label(), label_style)]));
            lines.push(Line::from(vec![Span::raw("    "), Span::styled(value, value_style)]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  💾 Auto-saved", Style::default().fg(Color::Green).add_modifier(Modifier::ITALIC))));

    f.render_widget(Paragraph::new(lines).block(themed_block(" Settings ", app)), area);
}

// ============================================================================
// Help
// ============================================================================

fn render_help(f: &mut Frame, app: &AppState) {
    let area = centered_rect(70, 85, f.size());

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("⌨️  KEYBOARD SHORTCUTS", Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("  Navigation:"),
        help_line("1-5", "Jump to tab"),
        help_line("Tab / Shift+Tab", "Next / previous tab"),
        help_line("?", "Toggle help"),
        help_line("Q / Esc", "Quit"),
        help_line("Ctrl+C", "Force quit"),
        Line::from(""),
        Line::from("  Focus:"),
        help_line("Space", "Start / pause / resume"),
        help_line("R", "Reset current interval"),
        help_line("N", "Skip to next mode"),
        help_line("W / B / L", "Work / short break / long break"),
        Line::from(""),
        Line::from("  Tasks:"),
        help_line("A", "Add task"),
        help_line("Space / Enter", "Toggle completed"),
        help_line("F", "Set focus task"),
        help_line("D", "Delete task"),
        help_line("↑↓ / JK", "Move selection"),
        Line::from(""),
        Line::from("  Stats / Coach:"),
        help_line("E", "Export sessions to CSV"),
        help_line("R", "Refresh advice"),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(help_text).alignment(Alignment::Left).block(themed_block(" Help ", app)),
        area,
    );
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", desc)),
    ])
}

// ============================================================================
// Helpers
// ============================================================================

fn themed_block<'a>(title: &'a str, app: &AppState) -> Block<'a> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.theme.border_color))
}

fn span_key<'a>(text: &'a str, app: &AppState) -> Span<'a> {
    Span::styled(text, Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))
}

fn centered_horizontally(w: u16, r: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w.min(100)) / 2),
            Constraint::Percentage(w.min(100)),
            Constraint::Percentage((100 - w.min(100)) / 2),
        ])
        .split(r)[1]
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    centered_horizontally(w, v[1])
}
