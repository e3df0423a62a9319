use crate::app::App;
use crate::ui::layout::calculate_screen_chunks;
use crate::utils::truncate_string;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

/// Newest-first log of completed attempts across all users of this install.
pub fn draw_history(f: &mut Frame, app: &App) {
    let layout = calculate_screen_chunks(f.area());

    let header = Paragraph::new("RIWAYAT SIMULASI")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    if app.history.is_empty() {
        let empty = Paragraph::new("Belum ada simulasi yang diselesaikan.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, layout.content_area);
    } else {
        let items: Vec<ListItem> = app
            .history
            .iter()
            .map(|result| {
                let own = app
                    .current_user
                    .as_ref()
                    .is_some_and(|u| u.username == result.username);
                let style = if own {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };
                let topics = truncate_string(&result.topics.join(", "), 40);
                ListItem::new(format!(
                    " {} | {:<12} | Skor {:>3} ({}/{}) | {}",
                    result.date,
                    result.username,
                    result.score,
                    result.correct_count,
                    result.total_questions,
                    topics,
                ))
                .style(style)
            })
            .collect();
        let list = List::new(items).block(Block::default().borders(Borders::ALL));
        f.render_widget(list, layout.content_area);
    }

    let footer = Paragraph::new("c/Esc: kembali | l: logout")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, layout.help_area);
}
