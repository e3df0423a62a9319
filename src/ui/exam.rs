use crate::app::App;
use crate::models::{Answer, QuestionType};
use crate::ui::layout::calculate_exam_chunks;
use crate::utils::{format_clock, option_letter};
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

fn option_lines<'a>(app: &'a App, index: usize) -> Vec<Line<'a>> {
    let question = &app.exam.questions[index];
    let answer = app.exam.answer(index);

    question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let letter = option_letter(i).to_string();
            let picked = match answer {
                Some(Answer::Choice(c)) => *c == letter,
                Some(Answer::Selection(items)) => items.contains(&letter),
                _ => false,
            };
            let marker = if picked { "(x)" } else { "( )" };
            let style = if picked {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(
                format!(" {} {}. {}", marker, letter, option),
                style,
            ))
        })
        .collect()
}

fn category_lines<'a>(app: &'a App, index: usize) -> Vec<Line<'a>> {
    let question = &app.exam.questions[index];
    let picked = match app.exam.answer(index) {
        Some(Answer::Mapping(map)) => Some(map),
        _ => None,
    };

    question
        .categories
        .iter()
        .enumerate()
        .map(|(row, item)| {
            let label = picked
                .and_then(|map| map.get(&row.to_string()))
                .map(String::as_str)
                .unwrap_or("-");
            let focused = row == app.category_row;
            let cursor = if focused { ">" } else { " " };
            let mut style = Style::default();
            if focused {
                style = style.fg(Color::Cyan);
            }
            Line::from(Span::styled(
                format!(" {} [{}] {}", cursor, label, item.statement),
                style,
            ))
        })
        .collect()
}

pub fn draw_exam(f: &mut Frame, app: &App) {
    let layout = calculate_exam_chunks(f.area());
    if app.exam.questions.is_empty() {
        return;
    }
    let index = app.current_question.min(app.exam.questions.len() - 1);
    let question = &app.exam.questions[index];

    let header_text = format!(
        "{} | Soal {} / {} | Terjawab {} | Sisa waktu {}",
        question.subject.label(),
        index + 1,
        app.exam.questions.len(),
        app.exam.answered_count(),
        format_clock(app.exam.time_left),
    );
    let time_style = if app.exam.time_left < 300 {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    };
    let header = Paragraph::new(header_text)
        .style(time_style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let mut body = Text::default();
    if let Some(passage) = &question.passage {
        body.push_line(Line::styled(
            passage.as_str(),
            Style::default().fg(Color::DarkGray),
        ));
        body.push_line(Line::from(""));
    }
    body.push_line(Line::from(question.text.as_str()));
    let question_widget = Paragraph::new(body).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{} - {}", question.kind.label(), question.topic)),
    );
    f.render_widget(question_widget, layout.question_area);

    let answer_lines = match question.kind {
        QuestionType::SingleChoice | QuestionType::MultiSelect => option_lines(app, index),
        QuestionType::Categorize => category_lines(app, index),
    };
    let answer_widget = Paragraph::new(Text::from(answer_lines))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Jawaban"));
    f.render_widget(answer_widget, layout.answer_area);

    let help = match question.kind {
        QuestionType::SingleChoice => "a-e: pilih | Left/Right: soal | Ctrl+F: selesai",
        QuestionType::MultiSelect => "a-e: toggle | Left/Right: soal | Ctrl+F: selesai",
        QuestionType::Categorize => {
            "Up/Down: pernyataan | b: Benar | s: Salah | Left/Right: soal | Ctrl+F: selesai"
        }
    };
    let footer = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, layout.help_area);
}
