pub mod backup;
pub mod csv;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod notify;
pub mod quiz;
pub mod session;
pub mod ui;
pub mod utils;

// Re-exports for convenience
pub use backup::{Snapshot, export_snapshot, restore_snapshot};
pub use csv::{ImportStats, find_csv_files, load_idiom_csv, load_word_csv};
pub use db::Store;
pub use error::{QuizError, StoreError};
pub use models::{
    Entry, EntryKind, Idiom, IdiomFields, Level, QuizOption, QuizQuestion, Word, WordFields,
};
pub use notify::{ChangeNotifier, StoreChange, Subscription};
pub use quiz::{OPTION_COUNT, QUESTION_COUNT, generate};
pub use session::{ADVANCE_DELAY, MissedAnswer, QuizSession, SessionState};
pub use utils::truncate_string;
