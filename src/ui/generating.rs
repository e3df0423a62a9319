use crate::app::App;
use crate::ui::layout::centered_rect;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Rotated once per second while the worker is busy, matching the pace of
/// the countdown tick.
const STATUS_LINES: [&str; 4] = [
    "Menghubungi AI core...",
    "Menyusun paket soal NUMERASI...",
    "Menyusun paket soal LITERASI...",
    "Memvalidasi kunci jawaban...",
];

pub fn draw_generating(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, area);

    let status = STATUS_LINES[app.sync_step % STATUS_LINES.len()];
    let mut text = Text::default();
    text.push_line(Line::from(""));
    text.push_line(Line::styled(
        status,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));
    text.push_line(Line::from(""));
    text.push_line(Line::styled(
        format!(
            "Simulasi dimulai otomatis setelah {} soal siap.",
            App::expected_total_questions()
        ),
        Style::default().fg(Color::DarkGray),
    ));

    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("GENERATING"));
    f.render_widget(popup, area);
}
