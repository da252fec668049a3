use crate::state::{UiEvent, UiEventLogEntry};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventColor {
    Normal,
    Error,
    Warning,
    Info,
}

impl EventColor {
    pub fn to_color(self) -> Color {
        match self {
            EventColor::Normal => Color::White,
            EventColor::Error => Color::Red,
            EventColor::Warning => Color::Yellow,
            EventColor::Info => Color::Cyan,
        }
    }
}

pub fn describe_event(event: &UiEvent) -> (String, EventColor) {
    match event {
        UiEvent::EmergencyRequested {
            dispatch_id,
            category,
        } => (
            format!("#{} contacting services: {}", dispatch_id, category.label()),
            EventColor::Warning,
        ),
        UiEvent::DispatchCancelled { dispatch_id } => {
            (format!("#{} cancelled", dispatch_id), EventColor::Warning)
        }
        UiEvent::AlertTriggered { id, category } => (
            format!("{} alert {} active", category.label(), id),
            EventColor::Error,
        ),
        UiEvent::AlertResolved { id } => (format!("Alert {} resolved", id), EventColor::Info),
        UiEvent::LocationResolved { location } => {
            (format!("Location: {}", location), EventColor::Info)
        }
        UiEvent::ContactAdded { name } => (format!("Contact added: {}", name), EventColor::Normal),
        UiEvent::ContactRemoved { name } => {
            (format!("Contact removed: {}", name), EventColor::Normal)
        }
        UiEvent::NotificationsRead { count } => (
            format!("{} notification(s) marked read", count),
            EventColor::Normal,
        ),
        UiEvent::SettingChanged { key, value } => (
            format!("{} {}", key.title(), if *value { "on" } else { "off" }),
            EventColor::Normal,
        ),
        UiEvent::Error(msg) => (msg.clone(), EventColor::Error),
    }
}

pub fn render_event_log(f: &mut Frame, area: Rect, events: &[UiEventLogEntry]) {
    let log_lines: Vec<Line> = events
        .iter()
        .rev()
        .take(30)
        .map(|entry| {
            let time_str = entry.timestamp.format("%H:%M:%S").to_string();
            let (text, color) = describe_event(&entry.event);
            Line::from(vec![
                Span::styled(format!("{} ", time_str), Style::default().fg(Color::DarkGray)),
                Span::styled(text, Style::default().fg(color.to_color())),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Recent Activity (most recent first)");

    let paragraph = Paragraph::new(log_lines)
        .block(block)
        .alignment(Alignment::Left);

    f.render_widget(paragraph, area);
}

const TIPS: [(&str, &str); 2] = [
    (
        "Stay Calm During Emergencies",
        "Taking deep breaths and focusing on the immediate actions needed can help you respond more effectively.",
    ),
    (
        "Create an Emergency Plan",
        "Ensure your family knows what to do and where to meet in case of different emergency scenarios.",
    ),
];

pub fn render_tips(f: &mut Frame, area: Rect) {
    let mut lines = Vec::new();
    for (title, text) in TIPS {
        lines.push(Line::from(Span::styled(
            title,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(text));
        lines.push(Line::from(""));
    }

    let block = Block::default().borders(Borders::ALL).title("Emergency Tips");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

pub fn render_help_panel(f: &mut Frame, area: Rect) {
    let heading = |text: &'static str| {
        Line::from(vec![Span::styled(
            text,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )])
    };
    let lines = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        heading("Navigation:"),
        Line::from("  1-5   Switch tabs"),
        Line::from("  ↑↓    Move selection"),
        Line::from("  ?     Toggle this help"),
        Line::from("  Q/Esc Quit"),
        Line::from(""),
        heading("Home:"),
        Line::from("  M P F S  Medical / Police / Fire / SOS"),
        Line::from("  C        Cancel the last request"),
        Line::from(""),
        heading("Lists:"),
        Line::from("  Enter Resolve alert / mark notification read"),
        Line::from("  a     Add contact (Tab next field, Esc cancel)"),
        Line::from("  d     Delete contact (y/n to confirm)"),
        Line::from("  A     Mark all notifications read"),
        Line::from("  t     Toggle notifications"),
        Line::from("  Space Toggle setting    l Log out"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(Color::DarkGray),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left);

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

pub fn render_notification(f: &mut Frame, area: Rect, message: &str, is_success: bool) {
    let color = if is_success { Color::Green } else { Color::Red };
    let icon = if is_success { "✓" } else { "✗" };

    let lines = vec![Line::from(vec![
        Span::styled(icon, Style::default().fg(color)),
        Span::raw(" "),
        Span::styled(message, Style::default().fg(color)),
    ])];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(Color::Black));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
