use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::models::Entry;
use crate::utils::truncate_string;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Words,
    Idioms,
    WordQuiz,
    IdiomQuiz,
    ImportCsv,
    Backup,
    Reset,
    Quit,
}

impl MenuItem {
    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Words => "Words",
            MenuItem::Idioms => "Idioms",
            MenuItem::WordQuiz => "Word Quiz",
            MenuItem::IdiomQuiz => "Idiom Quiz",
            MenuItem::ImportCsv => "Import CSV",
            MenuItem::Backup => "Backup to JSON",
            MenuItem::Reset => "Erase All Data",
            MenuItem::Quit => "Quit",
        }
    }
}

pub const MENU_ITEMS: [MenuItem; 8] = [
    MenuItem::Words,
    MenuItem::Idioms,
    MenuItem::WordQuiz,
    MenuItem::IdiomQuiz,
    MenuItem::ImportCsv,
    MenuItem::Backup,
    MenuItem::Reset,
    MenuItem::Quit,
];

pub fn draw_menu(
    f: &mut Frame,
    selected: usize,
    word_count: usize,
    idiom_count: usize,
    random_pick: Option<&Entry>,
    status: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(MENU_ITEMS.len() as u16 + 2),
            Constraint::Length(4),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new(format!(
        "Vocab Trainer — {} words, {} idioms",
        word_count, idiom_count
    ))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(item.label()).style(style)
        })
        .collect();
    let menu = List::new(items).block(Block::default().borders(Borders::ALL).title("Menu"));
    f.render_widget(menu, chunks[1]);

    let pick_lines = match random_pick {
        Some(entry) => vec![
            Line::from(Span::styled(
                truncate_string(entry.text(), 50),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(truncate_string(entry.meaning(), 50)),
        ],
        None => vec![Line::from(Span::styled(
            "Add some entries to see a random pick here",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))],
    };
    let pick = Paragraph::new(pick_lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Random Pick"));
    f.render_widget(pick, chunks[2]);

    let footer = match status {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(vec![
            Span::styled(
                "↑/↓",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::from(" Navigate  "),
            Span::styled(
                "Enter",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::from(" Select  "),
            Span::styled(
                "q",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::from(" Quit"),
        ]),
    };
    let help = Paragraph::new(footer)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}
