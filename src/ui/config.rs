use crate::app::App;
use crate::topics::{LANGUAGE_TOPICS, MATH_TOPICS};
use crate::ui::layout::calculate_screen_chunks;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

fn draw_topic_panel(
    f: &mut Frame,
    app: &App,
    title: &str,
    topics: &[&str],
    selected: &[String],
    panel: usize,
    area: Rect,
) {
    let focused = app.config_panel == panel;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let items: Vec<ListItem> = topics
        .iter()
        .enumerate()
        .map(|(i, topic)| {
            let mark = if selected.iter().any(|t| t == topic) {
                "[x]"
            } else {
                "[ ]"
            };
            let mut style = Style::default();
            if focused && i == app.config_cursor {
                style = style.fg(Color::Black).bg(Color::Cyan);
            }
            ListItem::new(format!(" {} {}", mark, topic)).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(list, area);
}

pub fn draw_config(f: &mut Frame, app: &App) {
    let layout = calculate_screen_chunks(f.area());

    let username = app
        .current_user
        .as_ref()
        .map(|u| u.username.as_str())
        .unwrap_or("-");
    let header = Paragraph::new(format!("KONFIGURASI MATERI - {}", username))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(4)])
        .split(layout.content_area);

    // Status line: lockout banner or the last generation error.
    let status = if app.topics.is_frozen() {
        Line::styled(
            "Simulasi sudah diselesaikan. Pilihan materi terkunci.",
            Style::default().fg(Color::Yellow),
        )
    } else if let Some(error) = &app.sys_error {
        Line::styled(error.as_str(), Style::default().fg(Color::Red))
    } else {
        Line::from(format!(
            "Undo: {} | Redo: {}",
            if app.topics.can_undo() { "yes" } else { "-" },
            if app.topics.can_redo() { "yes" } else { "-" },
        ))
    };
    f.render_widget(Paragraph::new(status).alignment(Alignment::Center), rows[0]);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let selection = app.topics.current();
    draw_topic_panel(
        f,
        app,
        "NUMERASI (Matematika) [1]",
        &MATH_TOPICS,
        &selection.math,
        0,
        panels[0],
    );
    draw_topic_panel(
        f,
        app,
        "LITERASI (Bahasa Indonesia) [2]",
        &LANGUAGE_TOPICS,
        &selection.indonesian,
        1,
        panels[1],
    );

    let help = if app.topics.is_frozen() {
        "h: riwayat | l: logout | Ctrl+C: quit"
    } else {
        "Enter/Space: toggle | Tab/1/2: panel | u/r: undo/redo | g: mulai simulasi | h: riwayat | l: logout"
    };
    let footer = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, layout.help_area);
}
