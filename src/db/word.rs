use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::StoreError;
use crate::models::{Level, Word, WordFields};

fn row_to_word(row: &Row) -> rusqlite::Result<Word> {
    let level: Option<String> = row.get(3)?;
    Ok(Word {
        id: row.get(0)?,
        text: row.get(1)?,
        meaning: row.get(2)?,
        level: level.as_deref().and_then(Level::parse),
        usage_sentence: row.get(4)?,
        usage_sentence_meaning: row.get(5)?,
    })
}

const WORD_COLUMNS: &str =
    "id, english_word, meaning, level, usage_sentence, usage_sentence_meaning";

/// Inserts a word after checking the pairwise-uniqueness invariant. Returns
/// the stored row with its freshly issued id.
pub fn insert_word(conn: &Connection, fields: &WordFields) -> Result<Word, StoreError> {
    if word_exists(conn, &fields.text, &fields.meaning)? {
        return Err(StoreError::DuplicateEntry);
    }

    conn.execute(
        "INSERT INTO words (english_word, meaning, level, usage_sentence, usage_sentence_meaning)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            fields.text,
            fields.meaning,
            fields.level.map(|l| l.as_str()),
            fields.usage_sentence,
            fields.usage_sentence_meaning,
        ],
    )?;

    Ok(Word {
        id: conn.last_insert_rowid(),
        text: fields.text.clone(),
        meaning: fields.meaning.clone(),
        level: fields.level,
        usage_sentence: fields.usage_sentence.clone(),
        usage_sentence_meaning: fields.usage_sentence_meaning.clone(),
    })
}

/// All words in insertion (id ascending) order.
pub fn get_words(conn: &Connection) -> Result<Vec<Word>, StoreError> {
    let mut stmt = conn.prepare(&format!("SELECT {WORD_COLUMNS} FROM words ORDER BY id"))?;
    let words = stmt
        .query_map([], row_to_word)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(words)
}

/// Overwrites every mutable field of the row with the given id. Updating an
/// absent id affects zero rows and is not an error. Returns the number of
/// rows changed.
pub fn update_word(conn: &Connection, id: i64, fields: &WordFields) -> Result<usize, StoreError> {
    let changed = conn.execute(
        "UPDATE words
         SET english_word = ?1,
             meaning = ?2,
             level = ?3,
             usage_sentence = ?4,
             usage_sentence_meaning = ?5
         WHERE id = ?6",
        rusqlite::params![
            fields.text,
            fields.meaning,
            fields.level.map(|l| l.as_str()),
            fields.usage_sentence,
            fields.usage_sentence_meaning,
            id,
        ],
    )?;
    Ok(changed)
}

/// Deletes the row with the given id; absent ids affect zero rows. Returns
/// the number of rows removed.
pub fn delete_word(conn: &Connection, id: i64) -> Result<usize, StoreError> {
    let removed = conn.execute("DELETE FROM words WHERE id = ?1", [id])?;
    Ok(removed)
}

/// One word chosen uniformly over all current rows.
pub fn get_random_word(conn: &Connection) -> Result<Word, StoreError> {
    conn.query_row(
        &format!("SELECT {WORD_COLUMNS} FROM words ORDER BY RANDOM() LIMIT 1"),
        [],
        row_to_word,
    )
    .optional()?
    .ok_or(StoreError::EmptyStore)
}

/// `count` distinct words sampled uniformly without replacement. Returns
/// fewer rows when the table is smaller.
pub fn sample_words(conn: &Connection, count: usize) -> Result<Vec<Word>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {WORD_COLUMNS} FROM words ORDER BY RANDOM() LIMIT ?1"
    ))?;
    let words = stmt
        .query_map([count], row_to_word)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(words)
}

/// Whether a row with this text and meaning already exists. The comparison
/// is case-insensitive and must hold for non-ASCII letters too (the stored
/// meanings are Turkish), so it happens in Rust rather than with SQL LOWER.
pub fn word_exists(conn: &Connection, text: &str, meaning: &str) -> Result<bool, StoreError> {
    let needle_text = text.to_lowercase();
    let needle_meaning = meaning.to_lowercase();

    let mut stmt = conn.prepare("SELECT english_word, meaning FROM words")?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let row_text: String = row.get(0)?;
        let row_meaning: String = row.get(1)?;
        if row_text.to_lowercase() == needle_text && row_meaning.to_lowercase() == needle_meaning {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_tables;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn fields(text: &str, meaning: &str) -> WordFields {
        WordFields {
            text: text.to_string(),
            meaning: meaning.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_and_get_words() {
        let conn = test_conn();
        let word = insert_word(
            &conn,
            &WordFields {
                text: "run".to_string(),
                meaning: "koşmak".to_string(),
                level: Some(Level::A1),
                usage_sentence: Some("I run every day.".to_string()),
                usage_sentence_meaning: Some("Her gün koşarım.".to_string()),
            },
        )
        .unwrap();
        assert_eq!(word.id, 1);

        let words = get_words(&conn).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0], word);
    }

    #[test]
    fn test_duplicate_insert_rejected_case_insensitively() {
        let conn = test_conn();
        insert_word(&conn, &fields("run", "koşmak")).unwrap();

        let err = insert_word(&conn, &fields("Run", "KOŞMAK"));
        assert!(matches!(err, Err(StoreError::DuplicateEntry)));
        assert_eq!(get_words(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_same_text_different_meaning_allowed() {
        let conn = test_conn();
        insert_word(&conn, &fields("run", "koşmak")).unwrap();
        insert_word(&conn, &fields("run", "çalıştırmak")).unwrap();
        assert_eq!(get_words(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_word_exists() {
        let conn = test_conn();
        insert_word(&conn, &fields("run", "koşmak")).unwrap();

        assert!(word_exists(&conn, "Run", "KOŞMAK").unwrap());
        assert!(word_exists(&conn, "run", "koşmak").unwrap());
        assert!(!word_exists(&conn, "walk", "yürümek").unwrap());
        assert!(!word_exists(&conn, "run", "yürümek").unwrap());
    }

    #[test]
    fn test_update_overwrites_all_fields() {
        let conn = test_conn();
        let word = insert_word(
            &conn,
            &WordFields {
                text: "run".to_string(),
                meaning: "koşmak".to_string(),
                level: Some(Level::A1),
                usage_sentence: Some("old".to_string()),
                usage_sentence_meaning: None,
            },
        )
        .unwrap();

        let changed = update_word(
            &conn,
            word.id,
            &WordFields {
                text: "sprint".to_string(),
                meaning: "depar atmak".to_string(),
                level: None,
                usage_sentence: None,
                usage_sentence_meaning: None,
            },
        )
        .unwrap();
        assert_eq!(changed, 1);

        let words = get_words(&conn).unwrap();
        assert_eq!(words[0].text, "sprint");
        assert_eq!(words[0].meaning, "depar atmak");
        assert_eq!(words[0].level, None);
        assert_eq!(words[0].usage_sentence, None);
    }

    #[test]
    fn test_update_absent_id_is_noop() {
        let conn = test_conn();
        insert_word(&conn, &fields("run", "koşmak")).unwrap();

        let changed = update_word(&conn, 999, &fields("walk", "yürümek")).unwrap();
        assert_eq!(changed, 0);
        assert_eq!(get_words(&conn).unwrap()[0].text, "run");
    }

    #[test]
    fn test_delete_word_and_absent_id() {
        let conn = test_conn();
        let word = insert_word(&conn, &fields("run", "koşmak")).unwrap();

        assert_eq!(delete_word(&conn, word.id).unwrap(), 1);
        assert!(get_words(&conn).unwrap().is_empty());
        assert_eq!(delete_word(&conn, word.id).unwrap(), 0);
    }

    #[test]
    fn test_get_random_word_empty() {
        let conn = test_conn();
        assert!(matches!(
            get_random_word(&conn),
            Err(StoreError::EmptyStore)
        ));
    }

    #[test]
    fn test_get_random_word_returns_stored_row() {
        let conn = test_conn();
        insert_word(&conn, &fields("run", "koşmak")).unwrap();
        insert_word(&conn, &fields("walk", "yürümek")).unwrap();

        let all = get_words(&conn).unwrap();
        for _ in 0..20 {
            let word = get_random_word(&conn).unwrap();
            assert!(all.contains(&word));
        }
    }

    #[test]
    fn test_get_random_word_is_roughly_uniform() {
        let conn = test_conn();
        let first = insert_word(&conn, &fields("run", "koşmak")).unwrap();
        insert_word(&conn, &fields("walk", "yürümek")).unwrap();

        let draws = 400;
        let mut first_hits = 0;
        for _ in 0..draws {
            if get_random_word(&conn).unwrap().id == first.id {
                first_hits += 1;
            }
        }
        // Mean 200, sd ~10; a 100-draw margin is far outside noise.
        assert!((100..=300).contains(&first_hits), "got {first_hits}/{draws}");
    }

    #[test]
    fn test_sample_words_distinct_and_bounded() {
        let conn = test_conn();
        for i in 0..10 {
            insert_word(&conn, &fields(&format!("word{i}"), &format!("anlam{i}"))).unwrap();
        }

        let sampled = sample_words(&conn, 4).unwrap();
        assert_eq!(sampled.len(), 4);
        let mut ids: Vec<i64> = sampled.iter().map(|w| w.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);

        // Requesting more than the table holds returns what is there.
        assert_eq!(sample_words(&conn, 50).unwrap().len(), 10);
    }
}
