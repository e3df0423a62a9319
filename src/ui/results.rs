use crate::app::App;
use crate::ui::layout::calculate_exam_chunks;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn draw_results(f: &mut Frame, app: &App) {
    let layout = calculate_exam_chunks(f.area());

    let Some(result) = &app.last_result else {
        let empty = Paragraph::new("Belum ada hasil untuk sesi ini.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("HASIL"));
        f.render_widget(empty, layout.question_area);
        return;
    };

    let banner_color = if result.score >= 70 {
        Color::Green
    } else {
        Color::Yellow
    };
    let header = Paragraph::new(format!(
        "SKOR: {} | Benar {} dari {} | {}",
        result.score, result.correct_count, result.total_questions, result.date
    ))
    .style(
        Style::default()
            .fg(banner_color)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("HASIL SIMULASI"));
    f.render_widget(header, layout.header_area);

    // Per-question review over the finished session still held in memory.
    if app.exam.questions.is_empty() {
        let note = Paragraph::new("Detail soal tidak tersedia lagi untuk sesi ini.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(note, layout.question_area);
    } else {
        let index = app.current_question.min(app.exam.questions.len() - 1);
        let question = &app.exam.questions[index];
        let submitted = app.exam.answer(index);
        let correct = submitted == Some(&question.correct_answer);

        let title = format!(
            "Soal {} / {} - {}",
            index + 1,
            app.exam.questions.len(),
            question.topic
        );
        let question_widget = Paragraph::new(question.text.as_str())
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(question_widget, layout.question_area);

        let mut review = Text::default();
        review.push_line(Line::from(Span::styled(
            if correct { "BENAR" } else { "SALAH" },
            Style::default()
                .fg(if correct { Color::Green } else { Color::Red })
                .add_modifier(Modifier::BOLD),
        )));
        review.push_line(Line::from(format!(
            "Jawaban Anda : {}",
            submitted.map(|a| a.display()).unwrap_or_else(|| "-".to_string())
        )));
        review.push_line(Line::from(format!(
            "Kunci        : {}",
            question.correct_answer.display()
        )));
        if let Some(explanation) = &question.explanation {
            review.push_line(Line::from(""));
            review.push_line(Line::from("Pembahasan:"));
            review.push_line(Line::from(explanation.as_str()));
        }
        let review_widget = Paragraph::new(review)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Review"));
        f.render_widget(review_widget, layout.answer_area);
    }

    let footer = Paragraph::new("Left/Right: soal | h: riwayat | c/Esc: konfigurasi")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, layout.help_area);
}
