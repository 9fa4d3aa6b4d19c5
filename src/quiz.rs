use rand::Rng;
use rand::seq::SliceRandom;

use crate::db::Store;
use crate::error::QuizError;
use crate::models::{Entry, EntryKind, QuizOption, QuizQuestion};

/// Questions per quiz attempt.
pub const QUESTION_COUNT: usize = 15;

/// Answer options per question.
pub const OPTION_COUNT: usize = 4;

/// Samples `count` entries of the given kind and builds one question per
/// sampled entry. Question order is the sample order.
pub fn generate(
    store: &Store,
    kind: EntryKind,
    count: usize,
) -> Result<Vec<QuizQuestion>, QuizError> {
    let rows = store.sample(kind, count)?;
    if rows.len() < count {
        return Err(QuizError::InsufficientData {
            needed: count,
            available: rows.len(),
        });
    }
    build_questions(&rows, &mut rand::thread_rng())
}

/// Pure question construction over an already sampled pool. Each question
/// gets the entry's own meaning as the correct option plus three distractor
/// meanings drawn from the rest of the pool, then a uniform shuffle of the
/// four options.
pub fn build_questions<R: Rng>(
    rows: &[Entry],
    rng: &mut R,
) -> Result<Vec<QuizQuestion>, QuizError> {
    let mut questions = Vec::with_capacity(rows.len());
    for index in 0..rows.len() {
        let options = build_options(rows, index, rng)?;
        questions.push(QuizQuestion {
            prompt: rows[index].clone(),
            options,
        });
    }
    Ok(questions)
}

fn build_options<R: Rng>(
    rows: &[Entry],
    index: usize,
    rng: &mut R,
) -> Result<Vec<QuizOption>, QuizError> {
    let row = &rows[index];
    let prompt_text = row.text().to_lowercase();

    // Every meaning carried by a sampled row with the prompt's text would be
    // a second right answer, not a distractor. This includes the row's own
    // meaning.
    let excluded: Vec<&str> = rows
        .iter()
        .filter(|r| r.text().to_lowercase() == prompt_text)
        .map(|r| r.meaning())
        .collect();

    let mut options = vec![QuizOption {
        text: row.meaning().to_string(),
        is_correct: true,
    }];

    // Distractors are drawn with replacement; a pool dominated by duplicate
    // meanings may never yield three distinct ones, so the loop carries a
    // fixed attempt budget instead of spinning forever.
    let budget = 50 * rows.len().saturating_sub(1);
    let mut attempts = 0;
    while options.len() < OPTION_COUNT {
        if attempts >= budget {
            return Err(QuizError::MaxRetriesExceeded);
        }
        attempts += 1;

        // Uniform over the pool minus the prompt row.
        let mut other = rng.gen_range(0..rows.len() - 1);
        if other >= index {
            other += 1;
        }
        let candidate = rows[other].meaning();

        if excluded.contains(&candidate) {
            continue;
        }
        if options.iter().any(|o| o.text == candidate) {
            continue;
        }
        options.push(QuizOption {
            text: candidate.to_string(),
            is_correct: false,
        });
    }

    options.shuffle(rng);
    Ok(options)
}
