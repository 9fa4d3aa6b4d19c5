use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::models::{EntryKind, Idiom, IdiomFields, Level, Word, WordFields};

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub buffer: String,
}

impl FormField {
    fn new(label: &'static str) -> Self {
        FormField {
            label,
            buffer: String::new(),
        }
    }

    fn with_value(label: &'static str, value: impl Into<String>) -> Self {
        FormField {
            label,
            buffer: value.into(),
        }
    }
}

/// Add/edit form state for either entry kind. `editing_id` is set when the
/// form was opened on an existing row, in which case submit means update.
#[derive(Debug, Clone)]
pub struct EntryForm {
    pub kind: EntryKind,
    pub editing_id: Option<i64>,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub cursor: usize,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Continue,
    Cancel,
    Submit,
}

impl EntryForm {
    pub fn new_word() -> Self {
        EntryForm {
            kind: EntryKind::Word,
            editing_id: None,
            fields: vec![
                FormField::new("Word"),
                FormField::new("Meaning"),
                FormField::new("Level (A1-C2, optional)"),
                FormField::new("Usage sentence (optional)"),
                FormField::new("Usage meaning (optional)"),
            ],
            focus: 0,
            cursor: 0,
            warning: None,
        }
    }

    pub fn new_idiom() -> Self {
        EntryForm {
            kind: EntryKind::Idiom,
            editing_id: None,
            fields: vec![
                FormField::new("Idiom"),
                FormField::new("Meaning"),
                FormField::new("Usage sentence (optional)"),
                FormField::new("Usage meaning (optional)"),
            ],
            focus: 0,
            cursor: 0,
            warning: None,
        }
    }

    pub fn edit_word(word: &Word) -> Self {
        let mut form = EntryForm {
            kind: EntryKind::Word,
            editing_id: Some(word.id),
            fields: vec![
                FormField::with_value("Word", word.text.clone()),
                FormField::with_value("Meaning", word.meaning.clone()),
                FormField::with_value(
                    "Level (A1-C2, optional)",
                    word.level.map(|l| l.as_str().to_string()).unwrap_or_default(),
                ),
                FormField::with_value(
                    "Usage sentence (optional)",
                    word.usage_sentence.clone().unwrap_or_default(),
                ),
                FormField::with_value(
                    "Usage meaning (optional)",
                    word.usage_sentence_meaning.clone().unwrap_or_default(),
                ),
            ],
            focus: 0,
            cursor: 0,
            warning: None,
        };
        form.cursor = form.fields[0].buffer.chars().count();
        form
    }

    pub fn edit_idiom(idiom: &Idiom) -> Self {
        let mut form = EntryForm {
            kind: EntryKind::Idiom,
            editing_id: Some(idiom.id),
            fields: vec![
                FormField::with_value("Idiom", idiom.text.clone()),
                FormField::with_value("Meaning", idiom.meaning.clone()),
                FormField::with_value(
                    "Usage sentence (optional)",
                    idiom.usage_sentence.clone().unwrap_or_default(),
                ),
                FormField::with_value(
                    "Usage meaning (optional)",
                    idiom.usage_sentence_meaning.clone().unwrap_or_default(),
                ),
            ],
            focus: 0,
            cursor: 0,
            warning: None,
        };
        form.cursor = form.fields[0].buffer.chars().count();
        form
    }

    pub fn text(&self) -> &str {
        self.fields[0].buffer.trim()
    }

    pub fn meaning(&self) -> &str {
        self.fields[1].buffer.trim()
    }

    /// Text and meaning are required; everything else may be blank.
    pub fn is_complete(&self) -> bool {
        !self.text().is_empty() && !self.meaning().is_empty()
    }

    pub fn to_word_fields(&self) -> WordFields {
        WordFields {
            text: self.text().to_string(),
            meaning: self.meaning().to_string(),
            level: Level::parse(&self.fields[2].buffer),
            usage_sentence: non_empty(&self.fields[3].buffer),
            usage_sentence_meaning: non_empty(&self.fields[4].buffer),
        }
    }

    pub fn to_idiom_fields(&self) -> IdiomFields {
        IdiomFields {
            text: self.text().to_string(),
            meaning: self.meaning().to_string(),
            usage_sentence: non_empty(&self.fields[2].buffer),
            usage_sentence_meaning: non_empty(&self.fields[3].buffer),
        }
    }

    fn focus_field(&mut self, index: usize) {
        self.focus = index;
        self.cursor = self.fields[index].buffer.chars().count();
    }

    fn focus_next(&mut self) {
        self.focus_field((self.focus + 1) % self.fields.len());
    }

    fn focus_prev(&mut self) {
        let prev = if self.focus == 0 {
            self.fields.len() - 1
        } else {
            self.focus - 1
        };
        self.focus_field(prev);
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Char-index based editing so multi-byte input lands where the cursor is.
fn byte_index(buffer: &str, char_index: usize) -> usize {
    buffer
        .char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(buffer.len())
}

pub fn handle_form_input(form: &mut EntryForm, key: KeyEvent) -> FormOutcome {
    match key.code {
        KeyCode::Esc => FormOutcome::Cancel,
        KeyCode::Tab | KeyCode::Down => {
            form.focus_next();
            FormOutcome::Continue
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.focus_prev();
            FormOutcome::Continue
        }
        KeyCode::Enter => {
            if form.focus + 1 < form.fields.len() {
                form.focus_next();
                FormOutcome::Continue
            } else if form.is_complete() {
                FormOutcome::Submit
            } else {
                form.warning = Some("Text and meaning are required".to_string());
                FormOutcome::Continue
            }
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if form.is_complete() {
                FormOutcome::Submit
            } else {
                form.warning = Some("Text and meaning are required".to_string());
                FormOutcome::Continue
            }
        }
        KeyCode::Left => {
            form.cursor = form.cursor.saturating_sub(1);
            FormOutcome::Continue
        }
        KeyCode::Right => {
            let len = form.fields[form.focus].buffer.chars().count();
            if form.cursor < len {
                form.cursor += 1;
            }
            FormOutcome::Continue
        }
        KeyCode::Backspace => {
            if form.cursor > 0 {
                let focus = form.focus;
                let at = byte_index(&form.fields[focus].buffer, form.cursor - 1);
                form.fields[focus].buffer.remove(at);
                form.cursor -= 1;
            }
            FormOutcome::Continue
        }
        KeyCode::Char(c) => {
            let focus = form.focus;
            let at = byte_index(&form.fields[focus].buffer, form.cursor);
            form.fields[focus].buffer.insert(at, c);
            form.cursor += 1;
            form.warning = None;
            FormOutcome::Continue
        }
        _ => FormOutcome::Continue,
    }
}

pub fn draw_form(f: &mut Frame, form: &EntryForm) {
    let title = match (form.kind, form.editing_id) {
        (EntryKind::Word, None) => "Add Word",
        (EntryKind::Word, Some(_)) => "Edit Word",
        (EntryKind::Idiom, None) => "Add Idiom",
        (EntryKind::Idiom, Some(_)) => "Edit Idiom",
    };

    let mut constraints = vec![Constraint::Length(3)];
    constraints.extend(std::iter::repeat_n(
        Constraint::Length(3),
        form.fields.len(),
    ));
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(f.area());

    let header = Paragraph::new(title)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    for (i, field) in form.fields.iter().enumerate() {
        let area = chunks[i + 1];
        let focused = i == form.focus;
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let input = Paragraph::new(field.buffer.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(field.label),
        );
        f.render_widget(input, area);

        if focused {
            let prefix: String = field.buffer.chars().take(form.cursor).collect();
            f.set_cursor_position((area.x + 1 + prefix.width() as u16, area.y + 1));
        }
    }

    let footer = match &form.warning {
        Some(warning) => Line::from(Span::styled(
            warning.clone(),
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        None => Line::from(vec![
            Span::styled(
                "Tab",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::from(" Next Field  "),
            Span::styled(
                "Enter",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::from(" Next/Save  "),
            Span::styled(
                "Esc",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::from(" Cancel"),
        ]),
    };
    let help = Paragraph::new(footer)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[form.fields.len() + 2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn type_text(form: &mut EntryForm, text: &str) {
        for c in text.chars() {
            handle_form_input(form, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_typing_fills_focused_field() {
        let mut form = EntryForm::new_word();
        type_text(&mut form, "run");
        assert_eq!(form.fields[0].buffer, "run");
        assert_eq!(form.cursor, 3);
    }

    #[test]
    fn test_tab_cycles_fields() {
        let mut form = EntryForm::new_word();
        for _ in 0..form.fields.len() {
            handle_form_input(&mut form, key(KeyCode::Tab));
        }
        assert_eq!(form.focus, 0);

        handle_form_input(&mut form, key(KeyCode::BackTab));
        assert_eq!(form.focus, form.fields.len() - 1);
    }

    #[test]
    fn test_backspace_handles_multibyte_input() {
        let mut form = EntryForm::new_word();
        handle_form_input(&mut form, key(KeyCode::Tab));
        type_text(&mut form, "koşmak");
        handle_form_input(&mut form, key(KeyCode::Backspace));
        assert_eq!(form.fields[1].buffer, "koşma");

        handle_form_input(&mut form, key(KeyCode::Left));
        handle_form_input(&mut form, key(KeyCode::Left));
        handle_form_input(&mut form, key(KeyCode::Backspace));
        assert_eq!(form.fields[1].buffer, "koma");
    }

    #[test]
    fn test_enter_on_last_field_submits_when_complete() {
        let mut form = EntryForm::new_idiom();
        type_text(&mut form, "hit the road");
        handle_form_input(&mut form, key(KeyCode::Tab));
        type_text(&mut form, "yola koyulmak");

        for _ in 0..form.fields.len() - 2 {
            assert_eq!(
                handle_form_input(&mut form, key(KeyCode::Enter)),
                FormOutcome::Continue
            );
        }
        assert_eq!(
            handle_form_input(&mut form, key(KeyCode::Enter)),
            FormOutcome::Submit
        );
    }

    #[test]
    fn test_incomplete_form_warns_instead_of_submitting() {
        let mut form = EntryForm::new_word();
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(handle_form_input(&mut form, ctrl_s), FormOutcome::Continue);
        assert!(form.warning.is_some());
    }

    #[test]
    fn test_escape_cancels() {
        let mut form = EntryForm::new_word();
        assert_eq!(
            handle_form_input(&mut form, key(KeyCode::Esc)),
            FormOutcome::Cancel
        );
    }

    #[test]
    fn test_to_word_fields_parses_level() {
        let mut form = EntryForm::new_word();
        type_text(&mut form, "run");
        handle_form_input(&mut form, key(KeyCode::Tab));
        type_text(&mut form, "koşmak");
        handle_form_input(&mut form, key(KeyCode::Tab));
        type_text(&mut form, "a1");

        let fields = form.to_word_fields();
        assert_eq!(fields.text, "run");
        assert_eq!(fields.level, Some(Level::A1));
        assert_eq!(fields.usage_sentence, None);
    }

    #[test]
    fn test_edit_word_prefills_buffers() {
        let word = Word {
            id: 7,
            text: "run".to_string(),
            meaning: "koşmak".to_string(),
            level: Some(Level::B1),
            usage_sentence: Some("I run.".to_string()),
            usage_sentence_meaning: None,
        };
        let form = EntryForm::edit_word(&word);
        assert_eq!(form.editing_id, Some(7));
        assert_eq!(form.fields[0].buffer, "run");
        assert_eq!(form.fields[2].buffer, "B1");
        assert_eq!(form.cursor, 3);
    }
}
