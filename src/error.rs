/// Failures surfaced by the store. None of these are retried internally;
/// callers decide what to do with each outcome.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An entry with the same text and meaning (case-insensitive) already
    /// exists in the target collection.
    #[error("an entry with this text and meaning already exists")]
    DuplicateEntry,

    /// A random row was requested from an empty collection.
    #[error("the collection is empty")]
    EmptyStore,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Failures surfaced by quiz generation.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// The collection holds fewer rows than the requested question count.
    #[error("not enough entries for a quiz: need {needed}, have {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The sampled pool could not yield three distinct distractors within the
    /// attempt budget (too many duplicate meanings among the sampled rows).
    #[error("could not assemble distinct answer options from the sampled entries")]
    MaxRetriesExceeded,

    #[error(transparent)]
    Store(#[from] StoreError),
}
