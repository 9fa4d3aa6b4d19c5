use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::StoreError;
use crate::models::{Idiom, IdiomFields};

fn row_to_idiom(row: &Row) -> rusqlite::Result<Idiom> {
    Ok(Idiom {
        id: row.get(0)?,
        text: row.get(1)?,
        meaning: row.get(2)?,
        usage_sentence: row.get(3)?,
        usage_sentence_meaning: row.get(4)?,
    })
}

const IDIOM_COLUMNS: &str = "id, idiom, meaning, usage_sentence, usage_sentence_meaning";

/// Inserts an idiom after checking the pairwise-uniqueness invariant.
pub fn insert_idiom(conn: &Connection, fields: &IdiomFields) -> Result<Idiom, StoreError> {
    if idiom_exists(conn, &fields.text, &fields.meaning)? {
        return Err(StoreError::DuplicateEntry);
    }

    conn.execute(
        "INSERT INTO idioms (idiom, meaning, usage_sentence, usage_sentence_meaning)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            fields.text,
            fields.meaning,
            fields.usage_sentence,
            fields.usage_sentence_meaning,
        ],
    )?;

    Ok(Idiom {
        id: conn.last_insert_rowid(),
        text: fields.text.clone(),
        meaning: fields.meaning.clone(),
        usage_sentence: fields.usage_sentence.clone(),
        usage_sentence_meaning: fields.usage_sentence_meaning.clone(),
    })
}

/// All idioms in insertion (id ascending) order.
pub fn get_idioms(conn: &Connection) -> Result<Vec<Idiom>, StoreError> {
    let mut stmt = conn.prepare(&format!("SELECT {IDIOM_COLUMNS} FROM idioms ORDER BY id"))?;
    let idioms = stmt
        .query_map([], row_to_idiom)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(idioms)
}

/// Overwrites every mutable field of the row with the given id; absent ids
/// affect zero rows. Returns the number of rows changed.
pub fn update_idiom(conn: &Connection, id: i64, fields: &IdiomFields) -> Result<usize, StoreError> {
    let changed = conn.execute(
        "UPDATE idioms
         SET idiom = ?1,
             meaning = ?2,
             usage_sentence = ?3,
             usage_sentence_meaning = ?4
         WHERE id = ?5",
        rusqlite::params![
            fields.text,
            fields.meaning,
            fields.usage_sentence,
            fields.usage_sentence_meaning,
            id,
        ],
    )?;
    Ok(changed)
}

/// Deletes the row with the given id; absent ids affect zero rows.
pub fn delete_idiom(conn: &Connection, id: i64) -> Result<usize, StoreError> {
    let removed = conn.execute("DELETE FROM idioms WHERE id = ?1", [id])?;
    Ok(removed)
}

/// One idiom chosen uniformly over all current rows.
pub fn get_random_idiom(conn: &Connection) -> Result<Idiom, StoreError> {
    conn.query_row(
        &format!("SELECT {IDIOM_COLUMNS} FROM idioms ORDER BY RANDOM() LIMIT 1"),
        [],
        row_to_idiom,
    )
    .optional()?
    .ok_or(StoreError::EmptyStore)
}

/// `count` distinct idioms sampled uniformly without replacement.
pub fn sample_idioms(conn: &Connection, count: usize) -> Result<Vec<Idiom>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {IDIOM_COLUMNS} FROM idioms ORDER BY RANDOM() LIMIT ?1"
    ))?;
    let idioms = stmt
        .query_map([count], row_to_idiom)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(idioms)
}

/// Case-insensitive pairwise existence check, folding non-ASCII letters the
/// same way `word_exists` does.
pub fn idiom_exists(conn: &Connection, text: &str, meaning: &str) -> Result<bool, StoreError> {
    let needle_text = text.to_lowercase();
    let needle_meaning = meaning.to_lowercase();

    let mut stmt = conn.prepare("SELECT idiom, meaning FROM idioms")?;
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
