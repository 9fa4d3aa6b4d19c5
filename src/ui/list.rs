use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::models::{Entry, EntryKind};
use crate::utils::truncate_string;

pub fn draw_list(f: &mut Frame, kind: EntryKind, entries: &[Entry], selected: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(6),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = match kind {
        EntryKind::Word => format!("Words ({})", entries.len()),
        EntryKind::Idiom => format!("Idioms ({})", entries.len()),
    };
    let header = Paragraph::new(title)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = if entries.is_empty() {
        vec![ListItem::new("No entries yet — press 'a' to add one").style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let level = match entry {
                    Entry::Word(w) => w
                        .level
                        .map(|l| format!(" [{}]", l.as_str()))
                        .unwrap_or_default(),
                    Entry::Idiom(_) => String::new(),
                };
                let text = format!(
                    "{}{} — {}",
                    truncate_string(entry.text(), 30),
                    level,
                    truncate_string(entry.meaning(), 40)
                );
                let style = if i == selected {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(text).style(style)
            })
            .collect()
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL));
    f.render_widget(list, chunks[1]);

    let mut detail = Text::default();
    if let Some(entry) = entries.get(selected) {
        if let Some(usage) = entry.usage_sentence() {
            detail.push_line(Line::from(usage.to_string()));
        }
        let usage_meaning = match entry {
            Entry::Word(w) => w.usage_sentence_meaning.as_deref(),
            Entry::Idiom(i) => i.usage_sentence_meaning.as_deref(),
        };
        if let Some(meaning) = usage_meaning {
            detail.push_line(Line::from(Span::styled(
                meaning.to_string(),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    let detail_panel = Paragraph::new(detail)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Usage"));
    f.render_widget(detail_panel, chunks[2]);

    let help = Paragraph::new(Line::from(vec![
        Span::styled(
            "a",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Add  "),
        Span::styled(
            "Enter",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Edit  "),
        Span::styled(
            "d",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Delete  "),
        Span::styled(
            "Esc",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Back"),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}
