use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::models::EntryKind;
use crate::session::{QuizSession, SessionState};
use crate::utils::truncate_string;

pub fn draw_quiz(f: &mut Frame, session: &QuizSession, error: Option<&str>) {
    match session.state() {
        SessionState::NotStarted => draw_start(f, session, error),
        SessionState::InProgress => draw_question(f, session),
        SessionState::Completed => draw_completion(f, session),
    }
}

fn kind_title(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Word => "Word Quiz",
        EntryKind::Idiom => "Idiom Quiz",
    }
}

fn draw_start(f: &mut Frame, session: &QuizSession, error: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let header = Paragraph::new(kind_title(session.kind()))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let body = match error {
        Some(message) => Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(Color::Red),
            )),
            Line::from(""),
            Line::from("Add more entries and try again."),
        ]),
        None => Paragraph::new(vec![
            Line::from(""),
            Line::from(format!(
                "{} questions, four choices each.",
                session.question_count()
            )),
            Line::from(""),
            Line::from("Press Enter to start."),
        ]),
    }
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, chunks[1]);

    draw_help(
        f,
        chunks[2],
        &[("Enter", " Start  "), ("Esc", " Back")],
    );
}

fn draw_question(f: &mut Frame, session: &QuizSession) {
    let Some(question) = session.current_question() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(f.area());

    let progress = format!(
        "{} — Question {} / {}",
        kind_title(session.kind()),
        session.current_index() + 1,
        session.question_count()
    );
    let header = Paragraph::new(progress)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let prompt = Paragraph::new(format!("What does \"{}\" mean?", question.prompt.text()))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(prompt, chunks[1]);

    let selection = session.last_selection();
    let mut lines = Vec::new();
    for (i, option) in question.options.iter().enumerate() {
        let style = match selection {
            Some((selected, correct)) if selected == i => {
                if correct {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Red)
                        .add_modifier(Modifier::BOLD)
                }
            }
            _ => Style::default(),
        };
        lines.push(Line::from(Span::styled(
            format!("  {}. {}", i + 1, option.text),
            style,
        )));
        lines.push(Line::from(""));
    }
    let options = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Options"));
    f.render_widget(options, chunks[2]);

    draw_help(
        f,
        chunks[3],
        &[("1-4", " Answer  "), ("Esc", " Quit Quiz")],
    );
}

fn draw_completion(f: &mut Frame, session: &QuizSession) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(f.area());

    let score = format!(
        "Quiz Completed — Score {} / {}",
        session.score(),
        session.question_count()
    );
    let header = Paragraph::new(score)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let questions = session.questions();
    let missed = session.incorrect();
    let mut summary = Text::default();
    if missed.is_empty() {
        summary.push_line(Line::from(""));
        summary.push_line(Line::from(Span::styled(
            "All answers correct!",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
    } else {
        summary.push_line(Line::from(Span::styled(
            "Missed questions:",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        summary.push_line(Line::from(""));
        for miss in &missed {
            let question = &questions[miss.question_index];
            let given = &question.options[miss.selected_option].text;
            summary.push_line(Line::from(format!(
                "\"{}\"",
                truncate_string(question.prompt.text(), 60)
            )));
            summary.push_line(Line::from(Span::styled(
                format!("  Correct: {}", truncate_string(question.prompt.meaning(), 56)),
                Style::default().fg(Color::Green),
            )));
            summary.push_line(Line::from(Span::styled(
                format!("  Yours:   {}", truncate_string(given, 56)),
                Style::default().fg(Color::Red),
            )));
            summary.push_line(Line::from(""));
        }
    }
    let body = Paragraph::new(summary)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, chunks[1]);

    draw_help(
        f,
        chunks[2],
        &[("r", " Retry  "), ("Esc", " Back to Menu")],
    );
}

fn draw_help(f: &mut Frame, area: ratatui::layout::Rect, keys: &[(&str, &str)]) {
    let mut spans = Vec::new();
    for (key, action) in keys {
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::from(action.to_string()));
    }
    let help = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}
