use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::logger;
use crate::models::{Entry, EntryKind, Idiom, IdiomFields, Word, WordFields};
use crate::notify::{ChangeNotifier, StoreChange, Subscription};

pub mod idiom;
pub mod word;

pub fn get_data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| "C:\\Users\\User".to_string());
        PathBuf::from(home).join(".local\\share\\vocab-trainer")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/home/user".to_string());
        PathBuf::from(home).join(".local/share/vocab-trainer")
    }
}

pub fn get_db_path() -> PathBuf {
    get_data_dir().join("english.db")
}

/// Creates whichever of the two tables is missing. Existing tables and their
/// rows are left untouched, so a partially initialized file is completed
/// rather than recreated.
pub(crate) fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS words (
            id INTEGER PRIMARY KEY NOT NULL,
            english_word TEXT NOT NULL,
            meaning TEXT NOT NULL,
            level TEXT,
            usage_sentence TEXT,
            usage_sentence_meaning TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS idioms (
            id INTEGER PRIMARY KEY NOT NULL,
            idiom TEXT NOT NULL,
            meaning TEXT NOT NULL,
            usage_sentence TEXT,
            usage_sentence_meaning TEXT
        )",
        [],
    )?;

    Ok(())
}

/// The persistent record store: owns the SQLite connection for the two
/// collections and notifies subscribed views after each effective mutation.
///
/// All operations run against the local file and surface I/O failures as
/// `StoreError::Storage`; nothing is retried internally.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    notifier: ChangeNotifier,
}

impl Store {
    /// Opens (creating if needed) the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        create_tables(&conn)?;
        Ok(Store {
            conn,
            notifier: ChangeNotifier::new(),
        })
    }

    /// Opens the store at the default data directory, creating it if needed.
    pub fn open_default() -> Result<Self, StoreError> {
        let db_path = get_db_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        logger::log(&format!("opening store at {}", db_path.display()));
        Self::open(db_path)
    }

    /// An in-memory store, useful for tests and demos.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Store {
            conn,
            notifier: ChangeNotifier::new(),
        })
    }

    /// Registers a callback invoked after every effective mutation.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(StoreChange) + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    // Words

    pub fn insert_word(&self, fields: &WordFields) -> Result<Word, StoreError> {
        let word = word::insert_word(&self.conn, fields)?;
        self.notifier.notify(StoreChange::Words);
        Ok(word)
    }

    pub fn update_word(&self, id: i64, fields: &WordFields) -> Result<(), StoreError> {
        if word::update_word(&self.conn, id, fields)? > 0 {
            self.notifier.notify(StoreChange::Words);
        }
        Ok(())
    }

    pub fn delete_word(&self, id: i64) -> Result<(), StoreError> {
        if word::delete_word(&self.conn, id)? > 0 {
            self.notifier.notify(StoreChange::Words);
        }
        Ok(())
    }

    pub fn words(&self) -> Result<Vec<Word>, StoreError> {
        word::get_words(&self.conn)
    }

    pub fn random_word(&self) -> Result<Word, StoreError> {
        word::get_random_word(&self.conn)
    }

    pub fn word_exists(&self, text: &str, meaning: &str) -> Result<bool, StoreError> {
        word::word_exists(&self.conn, text, meaning)
    }

    // Idioms

    pub fn insert_idiom(&self, fields: &IdiomFields) -> Result<Idiom, StoreError> {
        let idiom = idiom::insert_idiom(&self.conn, fields)?;
        self.notifier.notify(StoreChange::Idioms);
        Ok(idiom)
    }

    pub fn update_idiom(&self, id: i64, fields: &IdiomFields) -> Result<(), StoreError> {
        if idiom::update_idiom(&self.conn, id, fields)? > 0 {
            self.notifier.notify(StoreChange::Idioms);
        }
        Ok(())
    }

    pub fn delete_idiom(&self, id: i64) -> Result<(), StoreError> {
        if idiom::delete_idiom(&self.conn, id)? > 0 {
            self.notifier.notify(StoreChange::Idioms);
        }
        Ok(())
    }

    pub fn idioms(&self) -> Result<Vec<Idiom>, StoreError> {
        idiom::get_idioms(&self.conn)
    }

    pub fn random_idiom(&self) -> Result<Idiom, StoreError> {
        idiom::get_random_idiom(&self.conn)
    }

    pub fn idiom_exists(&self, text: &str, meaning: &str) -> Result<bool, StoreError> {
        idiom::idiom_exists(&self.conn, text, meaning)
    }

    /// `count` distinct entries of the given kind, sampled uniformly without
    /// replacement. Returns fewer when the collection is smaller.
    pub fn sample(&self, kind: EntryKind, count: usize) -> Result<Vec<Entry>, StoreError> {
        let entries = match kind {
            EntryKind::Word => word::sample_words(&self.conn, count)?
                .into_iter()
                .map(Entry::Word)
                .collect(),
            EntryKind::Idiom => idiom::sample_idioms(&self.conn, count)?
                .into_iter()
                .map(Entry::Idiom)
                .collect(),
        };
        Ok(entries)
    }

    /// Number of rows in the given collection.
    pub fn count(&self, kind: EntryKind) -> Result<usize, StoreError> {
        let table = match kind {
            EntryKind::Word => "words",
            EntryKind::Idiom => "idioms",
        };
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }

    /// Drops and recreates both collections inside a single transaction, so
    /// an interruption can never leave one table present and the other gone.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute_batch("DROP TABLE IF EXISTS words; DROP TABLE IF EXISTS idioms;")?;
        create_tables(&tx)?;
        tx.commit()?;
        logger::log("store reset: both collections dropped and recreated");
        self.notifier.notify(StoreChange::All);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex;

    fn word_fields(text: &str, meaning: &str) -> WordFields {
        WordFields {
            text: text.to_string(),
            meaning: meaning.to_string(),
            ..Default::default()
        }
    }

    fn idiom_fields(text: &str, meaning: &str) -> IdiomFields {
        IdiomFields {
            text: text.to_string(),
            meaning: meaning.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_creates_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("test.db")).unwrap();

        assert!(store.words().unwrap().is_empty());
        assert!(store.idioms().unwrap().is_empty());
    }

    #[test]
    fn test_open_is_idempotent_and_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let store = Store::open(&path).unwrap();
            store.insert_word(&word_fields("run", "koşmak")).unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.words().unwrap().len(), 1);
    }

    #[test]
    fn test_open_completes_partial_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "CREATE TABLE words (
                    id INTEGER PRIMARY KEY NOT NULL,
                    english_word TEXT NOT NULL,
                    meaning TEXT NOT NULL,
                    level TEXT,
                    usage_sentence TEXT,
                    usage_sentence_meaning TEXT
                )",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO words (english_word, meaning) VALUES ('run', 'koşmak')",
                [],
            )
            .unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.words().unwrap().len(), 1);
        assert!(store.idioms().unwrap().is_empty());
    }

    #[test]
    fn test_reset_empties_both_collections() {
        let mut store = Store::open_in_memory().unwrap();
        store.insert_word(&word_fields("run", "koşmak")).unwrap();
        store
            .insert_idiom(&idiom_fields("break the ice", "havayı yumuşatmak"))
            .unwrap();

        store.reset().unwrap();
        assert!(store.words().unwrap().is_empty());
        assert!(store.idioms().unwrap().is_empty());

        // Inserting afterwards behaves like a fresh store.
        let word = store.insert_word(&word_fields("walk", "yürümek")).unwrap();
        assert_eq!(word.id, 1);
    }

    #[test]
    fn test_mutations_notify_subscribers() {
        let store = Store::open_in_memory().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _sub = store.on_change(move |change| {
            seen_clone.lock().unwrap().push(change);
        });

        let word = store.insert_word(&word_fields("run", "koşmak")).unwrap();
        store
            .update_word(word.id, &word_fields("run", "çalıştırmak"))
            .unwrap();
        store.delete_word(word.id).unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![StoreChange::Words, StoreChange::Words, StoreChange::Words]
        );
    }

    #[test]
    fn test_noop_mutations_do_not_notify() {
        let store = Store::open_in_memory().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _sub = store.on_change(move |change| {
            seen_clone.lock().unwrap().push(change);
        });

        store.delete_word(42).unwrap();
        store.update_idiom(42, &idiom_fields("x", "y")).unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_reset_notifies_all() {
        let mut store = Store::open_in_memory().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _sub = store.on_change(move |change| {
            seen_clone.lock().unwrap().push(change);
        });

        store.reset().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![StoreChange::All]);
    }

    #[test]
    fn test_sample_returns_typed_entries() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..5 {
            store
                .insert_word(&word_fields(&format!("word{i}"), &format!("anlam{i}")))
                .unwrap();
        }

        let entries = store.sample(EntryKind::Word, 3).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.kind() == EntryKind::Word));
    }

    #[test]
    fn test_count() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.count(EntryKind::Word).unwrap(), 0);
        store.insert_word(&word_fields("run", "koşmak")).unwrap();
        assert_eq!(store.count(EntryKind::Word).unwrap(), 1);
        assert_eq!(store.count(EntryKind::Idiom).unwrap(), 0);
    }
}
