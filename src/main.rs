use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use vocab_trainer::db::{Store, get_data_dir};
use vocab_trainer::models::{Entry, EntryKind};
use vocab_trainer::notify::Subscription;
use vocab_trainer::session::{QuizSession, SessionState};
use vocab_trainer::ui::{
    EntryForm, FormOutcome, MENU_ITEMS, MenuItem, draw_confirm, draw_form, draw_import, draw_list,
    draw_menu, draw_quiz, handle_form_input,
};
use vocab_trainer::{backup, csv, logger};

#[derive(Debug, PartialEq)]
enum AppState {
    Menu,
    List,
    Form,
    Quiz,
    Import,
    ConfirmReset,
}

struct App {
    store: Store,
    state: AppState,
    menu_index: usize,
    status: Option<String>,
    word_count: usize,
    idiom_count: usize,
    random_pick: Option<Entry>,
    list_kind: EntryKind,
    list_index: usize,
    entries: Vec<Entry>,
    form: Option<EntryForm>,
    quiz: Option<QuizSession>,
    quiz_error: Option<String>,
    import_files: Vec<PathBuf>,
    import_index: usize,
    dirty: Arc<AtomicBool>,
    _store_sub: Subscription,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir).ok();
    logger::init(&data_dir);

    let store = match Store::open_default() {
        Ok(store) => store,
        Err(err) => {
            logger::log(&format!("failed to open store: {err}"));
            eprintln!("Could not open the vocabulary database: {err}");
            std::process::exit(1);
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, store: Store) -> io::Result<()> {
    let dirty = Arc::new(AtomicBool::new(true));
    let dirty_flag = dirty.clone();
    let store_sub = store.on_change(move |_| dirty_flag.store(true, Ordering::SeqCst));

    let mut app = App {
        store,
        state: AppState::Menu,
        menu_index: 0,
        status: None,
        word_count: 0,
        idiom_count: 0,
        random_pick: None,
        list_kind: EntryKind::Word,
        list_index: 0,
        entries: Vec::new(),
        form: None,
        quiz: None,
        quiz_error: None,
        import_files: Vec::new(),
        import_index: 0,
        dirty,
        _store_sub: store_sub,
    };

    loop {
        if app.dirty.swap(false, Ordering::SeqCst) {
            app.refresh();
        }

        terminal.draw(|f| app.draw(f))?;

        // Short poll so timed quiz advances show up without a keypress.
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                break;
            }
        }
    }

    Ok(())
}

impl App {
    fn draw(&mut self, f: &mut ratatui::Frame) {
        match self.state {
            AppState::Menu => draw_menu(
                f,
                self.menu_index,
                self.word_count,
                self.idiom_count,
                self.random_pick.as_ref(),
                self.status.as_deref(),
            ),
            AppState::List => draw_list(f, self.list_kind, &self.entries, self.list_index),
            AppState::Form => {
                if let Some(form) = &self.form {
                    draw_form(f, form);
                }
            }
            AppState::Quiz => {
                if let Some(session) = &self.quiz {
                    draw_quiz(f, session, self.quiz_error.as_deref());
                }
            }
            AppState::Import => draw_import(f, &self.import_files, self.import_index),
            AppState::ConfirmReset => {
                draw_menu(
                    f,
                    self.menu_index,
                    self.word_count,
                    self.idiom_count,
                    self.random_pick.as_ref(),
                    self.status.as_deref(),
                );
                draw_confirm(
                    f,
                    "Erase All Data",
                    "Delete every word and idiom? This cannot be undone.",
                );
            }
        }
    }

    /// Returns true when the application should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.state {
            AppState::Menu => self.handle_menu_key(key),
            AppState::List => {
                self.handle_list_key(key);
                false
            }
            AppState::Form => {
                self.handle_form_key(key);
                false
            }
            AppState::Quiz => {
                self.handle_quiz_key(key);
                false
            }
            AppState::Import => {
                self.handle_import_key(key);
                false
            }
            AppState::ConfirmReset => {
                self.handle_confirm_key(key);
                false
            }
        }
    }

    fn refresh(&mut self) {
        self.word_count = self.store.count(EntryKind::Word).unwrap_or(0);
        self.idiom_count = self.store.count(EntryKind::Idiom).unwrap_or(0);
        self.refresh_entries();
        self.refresh_random_pick();
    }

    fn refresh_entries(&mut self) {
        let loaded = match self.list_kind {
            EntryKind::Word => self
                .store
                .words()
                .map(|words| words.into_iter().map(Entry::Word).collect()),
            EntryKind::Idiom => self
                .store
                .idioms()
                .map(|idioms| idioms.into_iter().map(Entry::Idiom).collect()),
        };
        match loaded {
            Ok(entries) => {
                self.entries = entries;
                if self.list_index >= self.entries.len() {
                    self.list_index = self.entries.len().saturating_sub(1);
                }
            }
            Err(err) => {
                logger::log(&format!("failed to load entries: {err}"));
                self.status = Some("Could not read the database".to_string());
            }
        }
    }

    fn refresh_random_pick(&mut self) {
        self.random_pick = self
            .store
            .random_word()
            .map(Entry::Word)
            .or_else(|_| self.store.random_idiom().map(Entry::Idiom))
            .ok();
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => {
                self.menu_index = self.menu_index.saturating_sub(1);
                false
            }
            KeyCode::Down => {
                if self.menu_index < MENU_ITEMS.len() - 1 {
                    self.menu_index += 1;
                }
                false
            }
            KeyCode::Enter => self.activate_menu_item(MENU_ITEMS[self.menu_index]),
            KeyCode::Char('q') | KeyCode::Esc => true,
            _ => false,
        }
    }

    fn activate_menu_item(&mut self, item: MenuItem) -> bool {
        self.status = None;
        match item {
            MenuItem::Words => {
                self.open_list(EntryKind::Word);
            }
            MenuItem::Idioms => {
                self.open_list(EntryKind::Idiom);
            }
            MenuItem::WordQuiz => {
                self.open_quiz(EntryKind::Word);
            }
            MenuItem::IdiomQuiz => {
                self.open_quiz(EntryKind::Idiom);
            }
            MenuItem::ImportCsv => {
                self.import_files = csv::find_csv_files(Path::new("."));
                self.import_index = 0;
                self.state = AppState::Import;
            }
            MenuItem::Backup => match backup::export_snapshot(&self.store, &get_data_dir()) {
                Ok(path) => {
                    self.status = Some(format!("Backup written to {}", path.display()));
                }
                Err(err) => {
                    logger::log(&format!("backup failed: {err}"));
                    self.status = Some("Backup failed".to_string());
                }
            },
            MenuItem::Reset => {
                self.state = AppState::ConfirmReset;
            }
            MenuItem::Quit => return true,
        }
        false
    }

    fn open_list(&mut self, kind: EntryKind) {
        self.list_kind = kind;
        self.list_index = 0;
        self.refresh_entries();
        self.state = AppState::List;
    }

    fn open_quiz(&mut self, kind: EntryKind) {
        self.quiz = Some(QuizSession::new(kind));
        self.quiz_error = None;
        self.state = AppState::Quiz;
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                self.list_index = self.list_index.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.list_index + 1 < self.entries.len() {
                    self.list_index += 1;
                }
            }
            KeyCode::Char('a') => {
                self.form = Some(match self.list_kind {
                    EntryKind::Word => EntryForm::new_word(),
                    EntryKind::Idiom => EntryForm::new_idiom(),
                });
                self.state = AppState::Form;
            }
            KeyCode::Enter => {
                if let Some(entry) = self.entries.get(self.list_index) {
                    self.form = Some(match entry {
                        Entry::Word(word) => EntryForm::edit_word(word),
                        Entry::Idiom(idiom) => EntryForm::edit_idiom(idiom),
                    });
                    self.state = AppState::Form;
                }
            }
            KeyCode::Char('d') => {
                if let Some(entry) = self.entries.get(self.list_index) {
                    let result = match entry {
                        Entry::Word(word) => self.store.delete_word(word.id),
                        Entry::Idiom(idiom) => self.store.delete_idiom(idiom.id),
                    };
                    if let Err(err) = result {
                        logger::log(&format!("delete failed: {err}"));
                        self.status = Some("Delete failed".to_string());
                    }
                }
            }
            KeyCode::Esc => {
                self.state = AppState::Menu;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(mut form) = self.form.take() else {
            self.state = AppState::Menu;
            return;
        };

        match handle_form_input(&mut form, key) {
            FormOutcome::Continue => {
                self.form = Some(form);
            }
            FormOutcome::Cancel => {
                self.open_list(form.kind);
            }
            FormOutcome::Submit => {
                if self.submit_form(&mut form) {
                    self.status = Some("Saved".to_string());
                    self.open_list(form.kind);
                } else {
                    self.form = Some(form);
                }
            }
        }
    }

    /// Runs the duplicate pre-check and the store write. Returns false when
    /// the form should stay open with a warning.
    fn submit_form(&mut self, form: &mut EntryForm) -> bool {
        // Pre-check for new entries so the user gets a readable warning; the
        // insert below still enforces the invariant itself.
        if form.editing_id.is_none() {
            let exists = match form.kind {
                EntryKind::Word => self.store.word_exists(form.text(), form.meaning()),
                EntryKind::Idiom => self.store.idiom_exists(form.text(), form.meaning()),
            };
            match exists {
                Ok(true) => {
                    form.warning =
                        Some(format!("This {} is already saved", form.kind.label()));
                    return false;
                }
                Ok(false) => {}
                Err(err) => {
                    logger::log(&format!("existence check failed: {err}"));
                    form.warning = Some("Could not reach the database".to_string());
                    return false;
                }
            }
        }

        let result = match (form.kind, form.editing_id) {
            (EntryKind::Word, None) => self.store.insert_word(&form.to_word_fields()).map(|_| ()),
            (EntryKind::Word, Some(id)) => self.store.update_word(id, &form.to_word_fields()),
            (EntryKind::Idiom, None) => {
                self.store.insert_idiom(&form.to_idiom_fields()).map(|_| ())
            }
            (EntryKind::Idiom, Some(id)) => self.store.update_idiom(id, &form.to_idiom_fields()),
        };

        match result {
            Ok(()) => true,
            Err(vocab_trainer::StoreError::DuplicateEntry) => {
                form.warning = Some(format!("This {} is already saved", form.kind.label()));
                false
            }
            Err(err) => {
                logger::log(&format!("save failed: {err}"));
                form.warning = Some("Could not save the entry".to_string());
                false
            }
        }
    }

    fn handle_quiz_key(&mut self, key: KeyEvent) {
        // Cloning shares the same underlying session state.
        let Some(session) = self.quiz.clone() else {
            self.state = AppState::Menu;
            return;
        };

        match key.code {
            KeyCode::Esc => {
                // Dropping the session makes any pending advance a no-op.
                self.quiz = None;
                self.quiz_error = None;
                self.state = AppState::Menu;
            }
            KeyCode::Enter if session.state() == SessionState::NotStarted => {
                if let Err(err) = session.start(&self.store) {
                    self.quiz_error = Some(err.to_string());
                }
            }
            KeyCode::Char('r') if session.state() == SessionState::Completed => {
                self.open_quiz(session.kind());
            }
            KeyCode::Char(c @ '1'..='4') if session.state() == SessionState::InProgress => {
                let option_index = c as usize - '1' as usize;
                let _ = session.answer(option_index);
            }
            _ => {}
        }
    }

    fn handle_import_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                self.import_index = self.import_index.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.import_index + 1 < self.import_files.len() {
                    self.import_index += 1;
                }
            }
            KeyCode::Char('w') => self.import_selected(EntryKind::Word),
            KeyCode::Char('i') => self.import_selected(EntryKind::Idiom),
            KeyCode::Esc => {
                self.state = AppState::Menu;
            }
            _ => {}
        }
    }

    fn import_selected(&mut self, kind: EntryKind) {
        let Some(path) = self.import_files.get(self.import_index).cloned() else {
            return;
        };

        let result = match kind {
            EntryKind::Word => csv::load_word_csv(&path)
                .map_err(|err| err.to_string())
                .and_then(|rows| {
                    csv::import_words(&self.store, &rows).map_err(|err| err.to_string())
                }),
            EntryKind::Idiom => csv::load_idiom_csv(&path)
                .map_err(|err| err.to_string())
                .and_then(|rows| {
                    csv::import_idioms(&self.store, &rows).map_err(|err| err.to_string())
                }),
        };

        match result {
            Ok(stats) => {
                self.status = Some(format!(
                    "Imported {} {}s, skipped {} duplicates",
                    stats.imported,
                    kind.label(),
                    stats.skipped
                ));
            }
            Err(err) => {
                logger::log(&format!("import of {} failed: {err}", path.display()));
                self.status = Some("Import failed".to_string());
            }
        }
        self.state = AppState::Menu;
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') => {
                match self.store.reset() {
                    Ok(()) => {
                        self.status = Some("All data erased".to_string());
                    }
                    Err(err) => {
                        logger::log(&format!("reset failed: {err}"));
                        self.status = Some("Reset failed".to_string());
                    }
                }
                self.state = AppState::Menu;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.state = AppState::Menu;
            }
            _ => {}
        }
    }
}
