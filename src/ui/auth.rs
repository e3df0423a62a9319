use crate::app::{App, AuthField, AuthMode};
use crate::ui::layout::{calculate_screen_chunks, centered_rect};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

fn field_label(field: AuthField) -> &'static str {
    match field {
        AuthField::Username => "Username",
        AuthField::Passcode => "Access code",
        AuthField::Phone => "Phone",
    }
}

fn field_value<'a>(app: &'a App, field: AuthField) -> &'a str {
    match field {
        AuthField::Username => &app.auth.username,
        AuthField::Passcode => &app.auth.passcode,
        AuthField::Phone => &app.auth.phone,
    }
}

fn draw_input(f: &mut Frame, app: &App, field: AuthField, area: Rect) {
    let focused = app.auth.focus == field;
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(field_value(app, field)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(field_label(field)),
    );
    f.render_widget(input, area);

    if focused {
        let x = area.x + 1 + crate::utils::display_width(field_value(app, field));
        f.set_cursor_position((x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
    }
}

pub fn draw_auth(f: &mut Frame, app: &App) {
    let layout = calculate_screen_chunks(f.area());

    let title = match app.auth.mode {
        AuthMode::Login => "TKA SIMULATOR - LOGIN",
        AuthMode::Register => "TKA SIMULATOR - REGISTRASI",
        AuthMode::Recover => "TKA SIMULATOR - PEMULIHAN AKUN",
    };
    let header = Paragraph::new(title)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let form_area = centered_rect(60, 80, layout.content_area);
    let fields = app.auth.fields();
    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(2));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(form_area);

    for (i, field) in fields.iter().enumerate() {
        draw_input(f, app, *field, rows[i]);
    }

    // Error or notice line right under the form.
    let message = if let Some(error) = &app.auth.error {
        Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        ))
    } else if let Some(notice) = &app.auth.notice {
        Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Green),
        ))
    } else {
        Line::from("")
    };
    f.render_widget(
        Paragraph::new(message).alignment(Alignment::Center),
        rows[fields.len()],
    );

    let help = match app.auth.mode {
        AuthMode::Login => "Enter: login | Tab: next field | F2: register | F3: recover | Ctrl+C: quit",
        AuthMode::Register => "Enter: register | Tab: next field | F2: back to login | Ctrl+C: quit",
        AuthMode::Recover => "Enter: look up | Esc: back to login | Ctrl+C: quit",
    };
    let footer = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, layout.help_area);
}
