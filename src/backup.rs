use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::csv::ImportStats;
use crate::db::Store;
use crate::error::StoreError;
use crate::logger;
use crate::models::{Idiom, IdiomFields, Word, WordFields};

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("backup I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backup encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A full snapshot of both collections, as written to disk.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub exported_at: String,
    pub words: Vec<Word>,
    pub idioms: Vec<Idiom>,
}

/// Writes a timestamped JSON snapshot of the whole store into `dir` and
/// returns the file path.
pub fn export_snapshot(store: &Store, dir: &Path) -> Result<PathBuf, BackupError> {
    let snapshot = Snapshot {
        exported_at: Local::now().to_rfc3339(),
        words: store.words()?,
        idioms: store.idioms()?,
    };

    let filename = format!("vocab-backup-{}.json", Local::now().format("%Y%m%d-%H%M%S"));
    let path = dir.join(filename);
    fs::write(&path, serde_json::to_string_pretty(&snapshot)?)?;
    logger::log(&format!(
        "exported {} words and {} idioms to {}",
        snapshot.words.len(),
        snapshot.idioms.len(),
        path.display()
    ));
    Ok(path)
}

/// Re-inserts a snapshot's entries into the store. Ids are reissued and
/// entries already present (case-insensitive text+meaning) are skipped, so
/// restoring into a non-empty store merges rather than duplicates.
pub fn restore_snapshot(
    store: &Store,
    path: &Path,
) -> Result<(ImportStats, ImportStats), BackupError> {
    let snapshot: Snapshot = serde_json::from_str(&fs::read_to_string(path)?)?;

    let mut word_stats = ImportStats::default();
    for word in &snapshot.words {
        let fields = WordFields {
            text: word.text.clone(),
            meaning: word.meaning.clone(),
            level: word.level,
            usage_sentence: word.usage_sentence.clone(),
            usage_sentence_meaning: word.usage_sentence_meaning.clone(),
        };
        match store.insert_word(&fields) {
            Ok(_) => word_stats.imported += 1,
            Err(StoreError::DuplicateEntry) => word_stats.skipped += 1,
            Err(err) => return Err(err.into()),
        }
    }

    let mut idiom_stats = ImportStats::default();
    for idiom in &snapshot.idioms {
        let fields = IdiomFields {
            text: idiom.text.clone(),
            meaning: idiom.meaning.clone(),
            usage_sentence: idiom.usage_sentence.clone(),
            usage_sentence_meaning: idiom.usage_sentence_meaning.clone(),
        };
        match store.insert_idiom(&fields) {
            Ok(_) => idiom_stats.imported += 1,
            Err(StoreError::DuplicateEntry) => idiom_stats.skipped += 1,
            Err(err) => return Err(err.into()),
        }
    }

    Ok((word_stats, idiom_stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_word(&WordFields {
                text: "run".to_string(),
                meaning: "koşmak".to_string(),
                ..Default::default()
            })
            .unwrap();
        store
            .insert_idiom(&IdiomFields {
                text: "break the ice".to_string(),
                meaning: "havayı yumuşatmak".to_string(),
                ..Default::default()
            })
            .unwrap();
        store
    }

    #[test]
    fn test_export_writes_parseable_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store();

        let path = export_snapshot(&store, dir.path()).unwrap();
        assert!(path.exists());

        let snapshot: Snapshot =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(snapshot.words.len(), 1);
        assert_eq!(snapshot.idioms.len(), 1);
        assert_eq!(snapshot.words[0].text, "run");
    }

    #[test]
    fn test_roundtrip_into_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_snapshot(&seeded_store(), dir.path()).unwrap();

        let fresh = Store::open_in_memory().unwrap();
        let (words, idioms) = restore_snapshot(&fresh, &path).unwrap();
        assert_eq!(words.imported, 1);
        assert_eq!(idioms.imported, 1);
        assert_eq!(fresh.words().unwrap()[0].meaning, "koşmak");
    }

    #[test]
    fn test_restore_skips_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store();
        let path = export_snapshot(&store, dir.path()).unwrap();

        let (words, idioms) = restore_snapshot(&store, &path).unwrap();
        assert_eq!(words.skipped, 1);
        assert_eq!(idioms.skipped, 1);
        assert_eq!(store.words().unwrap().len(), 1);
    }

    #[test]
    fn test_restore_missing_file_errors() {
        let store = Store::open_in_memory().unwrap();
        let err = restore_snapshot(&store, Path::new("/no/such/file.json"));
        assert!(matches!(err, Err(BackupError::Io(_))));
    }
}
