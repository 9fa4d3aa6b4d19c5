use std::fs;
use std::path::{Path, PathBuf};

use crate::db::Store;
use crate::error::StoreError;
use crate::models::{IdiomFields, Level, WordFields};

/// Outcome of a bulk import: duplicate rows are skipped, not fatal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub imported: usize,
    pub skipped: usize,
}

/// CSV files in the given directory, sorted by name.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if dir.is_dir()
        && let Ok(entries) = fs::read_dir(dir)
    {
        for entry in entries.flatten() {
            if let Some(ext) = entry.path().extension()
                && ext == "csv"
            {
                files.push(entry.path());
            }
        }
    }

    files.sort();
    files
}

/// Splits one CSV line into fields. Double quotes delimit fields that contain
/// commas; a doubled quote inside a quoted field is a literal quote.
pub fn parse_csv_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => {
                in_quotes = true;
            }
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => {
                current.push(c);
            }
        }
    }
    fields.push(current);
    fields
}

fn optional_field(fields: &[String], index: usize) -> Option<String> {
    fields
        .get(index)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Reads word rows from `text,meaning[,level][,usage][,usage_meaning]` lines.
/// Lines without both a text and a meaning are dropped.
pub fn load_word_csv(path: &Path) -> std::io::Result<Vec<WordFields>> {
    let content = fs::read_to_string(path)?;
    let mut rows = Vec::new();

    for line in content.lines() {
        let fields = parse_csv_fields(line);
        let text = fields.first().map(|s| s.trim()).unwrap_or("");
        let meaning = fields.get(1).map(|s| s.trim()).unwrap_or("");
        if text.is_empty() || meaning.is_empty() {
            continue;
        }
        rows.push(WordFields {
            text: text.to_string(),
            meaning: meaning.to_string(),
            level: fields.get(2).and_then(|s| Level::parse(s)),
            usage_sentence: optional_field(&fields, 3),
            usage_sentence_meaning: optional_field(&fields, 4),
        });
    }

    Ok(rows)
}

/// Reads idiom rows from `text,meaning[,usage][,usage_meaning]` lines.
pub fn load_idiom_csv(path: &Path) -> std::io::Result<Vec<IdiomFields>> {
    let content = fs::read_to_string(path)?;
    let mut rows = Vec::new();

    for line in content.lines() {
        let fields = parse_csv_fields(line);
        let text = fields.first().map(|s| s.trim()).unwrap_or("");
        let meaning = fields.get(1).map(|s| s.trim()).unwrap_or("");
        if text.is_empty() || meaning.is_empty() {
            continue;
        }
        rows.push(IdiomFields {
            text: text.to_string(),
            meaning: meaning.to_string(),
            usage_sentence: optional_field(&fields, 2),
            usage_sentence_meaning: optional_field(&fields, 3),
        });
    }

    Ok(rows)
}

pub fn import_words(store: &Store, rows: &[WordFields]) -> Result<ImportStats, StoreError> {
    let mut stats = ImportStats::default();
    for row in rows {
        match store.insert_word(row) {
            Ok(_) => stats.imported += 1,
            Err(StoreError::DuplicateEntry) => stats.skipped += 1,
            Err(err) => return Err(err),
        }
    }
    Ok(stats)
}

pub fn import_idioms(store: &Store, rows: &[IdiomFields]) -> Result<ImportStats, StoreError> {
    let mut stats = ImportStats::default();
    for row in rows {
        match store.insert_idiom(row) {
            Ok(_) => stats.imported += 1,
            Err(StoreError::DuplicateEntry) => stats.skipped += 1,
            Err(err) => return Err(err),
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_simple_fields() {
        assert_eq!(parse_csv_fields("run,koşmak"), vec!["run", "koşmak"]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        assert_eq!(
            parse_csv_fields("\"break the ice\",\"havayı yumuşatmak\""),
            vec!["break the ice", "havayı yumuşatmak"]
        );
    }

    #[test]
    fn test_parse_comma_inside_quotes() {
        assert_eq!(
            parse_csv_fields("\"to run, quickly\",koşmak,A1"),
            vec!["to run, quickly", "koşmak", "A1"]
        );
    }

    #[test]
    fn test_parse_escaped_quotes() {
        assert_eq!(
            parse_csv_fields("\"say \"\"hi\"\"\",selamlamak"),
            vec!["say \"hi\"", "selamlamak"]
        );
    }

    #[test]
    fn test_parse_empty_fields() {
        assert_eq!(parse_csv_fields(","), vec!["", ""]);
        assert_eq!(parse_csv_fields("a,,c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_load_word_csv_with_all_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "run,koşmak,A1,I run every day.,Her gün koşarım.").unwrap();
        writeln!(file, "improve,geliştirmek,B2").unwrap();
        writeln!(file).unwrap();
        writeln!(file, ",eksik").unwrap();

        let rows = load_word_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "run");
        assert_eq!(rows[0].level, Some(Level::A1));
        assert_eq!(rows[0].usage_sentence.as_deref(), Some("I run every day."));
        assert_eq!(rows[1].level, Some(Level::B2));
        assert_eq!(rows[1].usage_sentence, None);
    }

    #[test]
    fn test_load_word_csv_unknown_level_is_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.csv");
        fs::write(&path, "run,koşmak,intermediate\n").unwrap();

        let rows = load_word_csv(&path).unwrap();
        assert_eq!(rows[0].level, None);
    }

    #[test]
    fn test_load_idiom_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idioms.csv");
        fs::write(
            &path,
            "\"break the ice\",havayı yumuşatmak,He told a joke to break the ice.\n",
        )
        .unwrap();

        let rows = load_idiom_csv(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "break the ice");
        assert_eq!(
            rows[0].usage_sentence.as_deref(),
            Some("He told a joke to break the ice.")
        );
    }

    #[test]
    fn test_import_words_skips_duplicates() {
        let store = Store::open_in_memory().unwrap();
        let rows = vec![
            WordFields {
                text: "run".to_string(),
                meaning: "koşmak".to_string(),
                ..Default::default()
            },
            WordFields {
                text: "Run".to_string(),
                meaning: "KOŞMAK".to_string(),
                ..Default::default()
            },
            WordFields {
                text: "walk".to_string(),
                meaning: "yürümek".to_string(),
                ..Default::default()
            },
        ];

        let stats = import_words(&store, &rows).unwrap();
        assert_eq!(
            stats,
            ImportStats {
                imported: 2,
                skipped: 1,
            }
        );
        assert_eq!(store.words().unwrap().len(), 2);
    }

    #[test]
    fn test_find_csv_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "").unwrap();
        fs::write(dir.path().join("a.csv"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = find_csv_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_find_csv_files_missing_dir() {
        assert!(find_csv_files(Path::new("/definitely/not/here")).is_empty());
    }
}
