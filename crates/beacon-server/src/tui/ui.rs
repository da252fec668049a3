use crate::dispatch::TriggerIntent;
use crate::state::LocationState;
use crate::tui::app::{InputMode, TuiApp, TuiTab, CONTACT_FIELDS};
use crate::tui::widgets;
use anyhow::Context;
use beacon_core::{format_age, AlertCategory, SettingKey, APP_VERSION};
use chrono::Utc;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

pub async fn run_tui(
    mut app: TuiApp,
    mut intents: mpsc::UnboundedReceiver<TriggerIntent>,
) -> anyhow::Result<()> {
    if !atty::is(atty::Stream::Stdout) {
        return Err(anyhow::anyhow!("TUI requires an interactive terminal"));
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = event_loop(&mut terminal, &mut app, &mut intents).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut TuiApp,
    intents: &mut mpsc::UnboundedReceiver<TriggerIntent>,
) -> anyhow::Result<()> {
    let mut tick = interval(Duration::from_millis(150));

    loop {
        while let Ok(intent) = intents.try_recv() {
            app.apply_intent(intent);
        }
        app.refresh().await;

        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(Duration::from_millis(33))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code).await {
                    return Ok(());
                }
            }
        }

        tick.tick().await;
    }
}

pub fn render_ui(f: &mut Frame, app: &TuiApp) {
    let size = f.size();

    // Header | Main | Footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(size);

    render_header(f, chunks[0], app);

    match app.current_tab {
        TuiTab::Home => render_home_tab(f, chunks[1], app),
        TuiTab::Alerts => render_alerts_tab(f, chunks[1], app),
        TuiTab::Contacts => render_contacts_tab(f, chunks[1], app),
        TuiTab::Notifications => render_notifications_tab(f, chunks[1], app),
        TuiTab::Settings => render_settings_tab(f, chunks[1], app),
    }

    render_footer(f, chunks[2], app.current_tab);

    match &app.mode {
        InputMode::ContactForm(form) => {
            let area = centered_rect(60, 40, size);
            render_contact_form(f, area, &form.fields, form.focus);
        }
        InputMode::ConfirmDelete { name, .. } => {
            let area = centered_rect(50, 20, size);
            render_confirm(f, area, &format!("Remove {} from your contacts? (y/n)", name));
        }
        InputMode::Normal => {}
    }

    if app.show_help {
        let help_area = centered_rect(60, 80, size);
        widgets::render_help_panel(f, help_area);
    }

    if let Some(notice) = &app.notice {
        let notification_area = centered_rect(50, 10, size);
        widgets::render_notification(f, notification_area, &notice.message, notice.is_success);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn selected_style(is_selected: bool) -> Style {
    if is_selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &TuiApp) {
    let snapshot = &app.snapshot;
    let alert_color = if snapshot.active_alerts > 0 { Color::Red } else { Color::Green };

    let line = Line::from(vec![
        Span::styled("Emergency Beacon", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" │ "),
        Span::styled("●", Style::default().fg(alert_color)),
        Span::raw(format!(" Active alerts: {} │ ", snapshot.active_alerts)),
        Span::raw(format!("Unread: {} │ ", snapshot.unread)),
        Span::raw(format!("Uptime: {}", widgets::format_duration(snapshot.uptime_seconds))),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black));

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Left);

    f.render_widget(paragraph, area);
}

fn render_home_tab(f: &mut Frame, area: Rect, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let location_line = match &app.snapshot.location {
        LocationState::Determining => Line::from(Span::styled(
            "Determining your location...",
            Style::default().fg(Color::DarkGray),
        )),
        LocationState::Resolved(address) => Line::from(address.as_str()),
    };
    let location = Paragraph::new(location_line)
        .block(Block::default().borders(Borders::ALL).title("Your Current Location"));
    f.render_widget(location, chunks[0]);

    if app.snapshot.is_dispatching() {
        render_dispatch_banner(f, chunks[1], app);
    } else {
        render_emergency_buttons(f, chunks[1]);
    }

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[2]);
    widgets::render_tips(f, bottom[0]);
    widgets::render_event_log(f, bottom[1], &app.snapshot.events);
}

fn render_emergency_buttons(f: &mut Frame, area: Rect) {
    let colors = [Color::Red, Color::Blue, Color::LightRed, Color::Magenta];
    let keys = ['M', 'P', 'F', 'S'];
    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(area);

    for (idx, category) in AlertCategory::ALL.into_iter().enumerate() {
        let style = Style::default().fg(colors[idx]).add_modifier(Modifier::BOLD);
        let button = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(category.label(), style)),
            Line::from(Span::styled(format!("[{}]", keys[idx]), Style::default().fg(Color::DarkGray))),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(style));
        f.render_widget(button, buttons[idx]);
    }
}

fn render_dispatch_banner(f: &mut Frame, area: Rect, app: &TuiApp) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Contacting Emergency Services...",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for info in &app.snapshot.pending {
        lines.push(Line::from(format!(
            "#{} {} at {}",
            info.id,
            info.category.label(),
            info.location
        )));
    }
    if app.pending_count() > 0 {
        lines.push(Line::from(Span::styled(
            "[C] cancel last request",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let banner = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    f.render_widget(banner, area);
}

fn render_alerts_tab(f: &mut Frame, area: Rect, app: &TuiApp) {
    let now = Utc::now();
    let mut lines = Vec::new();

    for (idx, alert) in app.snapshot.alerts.iter().enumerate() {
        let is_selected = idx == app.alert_index;
        let prefix = if is_selected { "▶ " } else { "  " };
        let (status, status_color) = if alert.is_active() {
            ("ACTIVE", Color::Red)
        } else {
            ("RESOLVED", Color::Green)
        };

        lines.push(Line::from(vec![
            Span::styled(prefix, selected_style(is_selected)),
            Span::styled(alert.category.label(), selected_style(is_selected)),
            Span::raw("  "),
            Span::styled(status, Style::default().fg(status_color)),
            Span::styled(
                format!("  {} ({})", alert.created_at.format("%b %d, %Y %H:%M"), format_age(alert.created_at, now)),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.push(Line::from(format!("    {}", alert.location)));
        if alert.is_active() {
            if let Some(responders) = &alert.responders {
                lines.push(Line::from(Span::styled(
                    format!("    Responders: {}", responders.join(", ")),
                    Style::default().fg(Color::Yellow),
                )));
            }
            if let Some(eta) = alert.eta_minutes {
                lines.push(Line::from(Span::styled(
                    format!("    ETA: {} minutes", eta),
                    Style::default().fg(Color::Yellow),
                )));
            }
        }
        lines.push(Line::from(""));
    }

    if lines.is_empty() {
        lines.push(Line::from("  No alerts yet"));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Alerts (↑↓ select, Enter resolve)");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll_offset(app.alert_index, 5, area.height), 0));

    f.render_widget(paragraph, area);
}

fn render_contacts_tab(f: &mut Frame, area: Rect, app: &TuiApp) {
    let mut lines = Vec::new();

    for (idx, contact) in app.snapshot.contacts.iter().enumerate() {
        let is_selected = idx == app.contact_index;
        let prefix = if is_selected { "▶ " } else { "  " };
        let mut header = vec![
            Span::styled(prefix, selected_style(is_selected)),
            Span::styled(contact.name.clone(), selected_style(is_selected)),
        ];
        if !contact.relationship.is_empty() {
            header.push(Span::styled(
                format!("  ({})", contact.relationship),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(header));
        lines.push(Line::from(format!("    {}", contact.phone)));
        if !contact.email.is_empty() {
            lines.push(Line::from(format!("    {}", contact.email)));
        }
        lines.push(Line::from(""));
    }

    if lines.is_empty() {
        lines.push(Line::from("  No emergency contacts. Press a to add one."));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Emergency Contacts (a add, d delete)");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll_offset(app.contact_index, 4, area.height), 0));

    f.render_widget(paragraph, area);
}

fn render_notifications_tab(f: &mut Frame, area: Rect, app: &TuiApp) {
    let now = Utc::now();
    let enabled = if app.snapshot.notifications_enabled { "ON" } else { "OFF" };
    let mut lines = vec![
        Line::from(format!(
            "Notifications: {}   Unread: {}",
            enabled, app.snapshot.unread
        )),
        Line::from(""),
    ];

    for (idx, notification) in app.snapshot.notifications.iter().enumerate() {
        let is_selected = idx == app.notification_index;
        let prefix = if is_selected { "▶ " } else { "  " };
        let marker = if notification.read {
            Span::raw("  ")
        } else {
            Span::styled("● ", Style::default().fg(Color::Red))
        };
        lines.push(Line::from(vec![
            Span::styled(prefix, selected_style(is_selected)),
            marker,
            Span::styled(notification.title.clone(), selected_style(is_selected)),
            Span::styled(
                format!("  {}", format_age(notification.created_at, now)),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.push(Line::from(format!("      {}", notification.message)));
        lines.push(Line::from(""));
    }

    if app.snapshot.notifications.is_empty() {
        lines.push(Line::from("  No notifications"));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Notifications (Enter read, A all read, t toggle)");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

fn render_settings_tab(f: &mut Frame, area: Rect, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let profile = &app.snapshot.settings.profile;
    let profile_panel = Paragraph::new(vec![
        Line::from(Span::styled(profile.name.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(profile.email.clone()),
    ])
    .block(Block::default().borders(Borders::ALL).title("Profile"));
    f.render_widget(profile_panel, chunks[0]);

    let mut lines = Vec::new();
    let mut section = "";
    for (idx, key) in SettingKey::ALL.into_iter().enumerate() {
        if key.section() != section {
            section = key.section();
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                section,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
        }
        let is_selected = idx == app.setting_index;
        let prefix = if is_selected { "▶ " } else { "  " };
        let (toggle, toggle_color) = if app.snapshot.settings.get(key) {
            ("[on] ", Color::Green)
        } else {
            ("[off]", Color::DarkGray)
        };
        lines.push(Line::from(vec![
            Span::styled(prefix, selected_style(is_selected)),
            Span::styled(toggle, Style::default().fg(toggle_color)),
            Span::raw(" "),
            Span::styled(key.title(), selected_style(is_selected)),
            Span::styled(format!("  {}", key.description()), Style::default().fg(Color::DarkGray)),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Settings (Space toggle, l log out)");
    f.render_widget(Paragraph::new(lines).block(block), chunks[1]);

    let version = Paragraph::new(format!("Emergency Beacon v{}", APP_VERSION))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(version, chunks[2]);
}

fn render_contact_form(f: &mut Frame, area: Rect, fields: &[String; 4], focus: usize) {
    let mut lines = vec![Line::from("")];
    for (idx, (label, value)) in CONTACT_FIELDS.iter().zip(fields.iter()).enumerate() {
        let is_focused = idx == focus;
        let cursor = if is_focused { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>13}: ", label), selected_style(is_focused)),
            Span::raw(format!("{}{}", value, cursor)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tab next field, Enter save, Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Add Emergency Contact")
        .border_style(Style::default().fg(Color::Cyan));

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_confirm(f: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Confirm")
        .border_style(Style::default().fg(Color::Yellow));
    let paragraph = Paragraph::new(message)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

/// Keeps the selected entry on screen for lists with roughly fixed-height rows.
fn scroll_offset(selected: usize, row_height: u16, area_height: u16) -> u16 {
    let visible = area_height.saturating_sub(2);
    let bottom = (selected as u16 + 1).saturating_mul(row_height);
    bottom.saturating_sub(visible)
}

fn render_footer(f: &mut Frame, area: Rect, current_tab: TuiTab) {
    let mut spans = Vec::new();
    for (idx, tab) in TuiTab::ALL.into_iter().enumerate() {
        let style = if tab == current_tab {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("[{}] {}", idx + 1, tab.title()), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw("│ [?]Help [Q]uit"));

    let block = Block::default().borders(Borders::ALL);
    let paragraph = Paragraph::new(vec![Line::from(spans)])
        .block(block)
        .alignment(Alignment::Left);

    f.render_widget(paragraph, area);
}
