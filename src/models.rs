use serde::{Deserialize, Serialize};

/// CEFR proficiency level attached to a word. Stored as plain text in the
/// `level` column; rows may leave it unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::A1,
        Level::A2,
        Level::B1,
        Level::B2,
        Level::C1,
        Level::C2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
            Level::B2 => "B2",
            Level::C1 => "C1",
            Level::C2 => "C2",
        }
    }

    /// Parses a level string as stored in the database. Unknown values are
    /// treated as unset rather than rejected.
    pub fn parse(s: &str) -> Option<Level> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A1" => Some(Level::A1),
            "A2" => Some(Level::A2),
            "B1" => Some(Level::B1),
            "B2" => Some(Level::B2),
            "C1" => Some(Level::C1),
            "C2" => Some(Level::C2),
            _ => None,
        }
    }
}

/// A persisted word row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub text: String,
    pub meaning: String,
    pub level: Option<Level>,
    pub usage_sentence: Option<String>,
    pub usage_sentence_meaning: Option<String>,
}

/// The mutable fields of a word, used for insert and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordFields {
    pub text: String,
    pub meaning: String,
    pub level: Option<Level>,
    pub usage_sentence: Option<String>,
    pub usage_sentence_meaning: Option<String>,
}

/// A persisted idiom row. Idioms carry no level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idiom {
    pub id: i64,
    pub text: String,
    pub meaning: String,
    pub usage_sentence: Option<String>,
    pub usage_sentence_meaning: Option<String>,
}

/// The mutable fields of an idiom, used for insert and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdiomFields {
    pub text: String,
    pub meaning: String,
    pub usage_sentence: Option<String>,
    pub usage_sentence_meaning: Option<String>,
}

/// Which of the two collections an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Word,
    Idiom,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Word => "word",
            EntryKind::Idiom => "idiom",
        }
    }
}

/// A row from either collection, as handed to the quiz generator.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Word(Word),
    Idiom(Idiom),
}

impl Entry {
    pub fn id(&self) -> i64 {
        match self {
            Entry::Word(w) => w.id,
            Entry::Idiom(i) => i.id,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Entry::Word(w) => &w.text,
            Entry::Idiom(i) => &i.text,
        }
    }

    pub fn meaning(&self) -> &str {
        match self {
            Entry::Word(w) => &w.meaning,
            Entry::Idiom(i) => &i.meaning,
        }
    }

    pub fn usage_sentence(&self) -> Option<&str> {
        match self {
            Entry::Word(w) => w.usage_sentence.as_deref(),
            Entry::Idiom(i) => i.usage_sentence.as_deref(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Word(_) => EntryKind::Word,
            Entry::Idiom(_) => EntryKind::Idiom,
        }
    }
}

/// One of the four answer choices shown for a question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizOption {
    pub text: String,
    pub is_correct: bool,
}

/// A generated multiple-choice question: the prompt entry plus exactly four
/// options, one correct, all texts pairwise distinct.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub prompt: Entry,
    pub options: Vec<QuizOption>,
}

impl QuizQuestion {
    /// Index of the correct option after shuffling.
    pub fn correct_index(&self) -> usize {
        self.options.iter().position(|o| o.is_correct).unwrap_or(0)
    }
}
