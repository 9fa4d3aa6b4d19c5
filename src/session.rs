use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::db::Store;
use crate::error::QuizError;
use crate::logger;
use crate::models::{EntryKind, QuizQuestion};
use crate::quiz;

/// How long the selected option stays highlighted before the session moves
/// to the next question.
pub const ADVANCE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

/// One wrong answer: which question, and which option was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissedAnswer {
    pub question_index: usize,
    pub selected_option: usize,
}

#[derive(Debug)]
struct SessionInner {
    questions: Vec<QuizQuestion>,
    current_index: usize,
    incorrect: Vec<MissedAnswer>,
    state: SessionState,
    pending_advance: bool,
    last_selection: Option<(usize, bool)>,
    generation: u64,
}

impl SessionInner {
    fn advance(&mut self) {
        self.current_index += 1;
        self.pending_advance = false;
        self.last_selection = None;
        if self.current_index >= self.questions.len() {
            self.state = SessionState::Completed;
        }
    }
}

/// A single quiz attempt over a fixed question sequence. The question set is
/// generated once by `start` and never regenerated; answering schedules a
/// timed advance to the next question on the tokio runtime.
///
/// The scheduled advance holds only a weak reference and a generation stamp,
/// so a session dropped before the timer fires is simply not touched.
#[derive(Debug, Clone)]
pub struct QuizSession {
    kind: EntryKind,
    question_count: usize,
    advance_delay: Duration,
    inner: Arc<Mutex<SessionInner>>,
}

impl QuizSession {
    pub fn new(kind: EntryKind) -> Self {
        Self::with_config(kind, quiz::QUESTION_COUNT, ADVANCE_DELAY)
    }

    pub fn with_config(kind: EntryKind, question_count: usize, advance_delay: Duration) -> Self {
        QuizSession {
            kind,
            question_count,
            advance_delay,
            inner: Arc::new(Mutex::new(SessionInner {
                questions: Vec::new(),
                current_index: 0,
                incorrect: Vec::new(),
                state: SessionState::NotStarted,
                pending_advance: false,
                last_selection: None,
                generation: 0,
            })),
        }
    }

    /// Generates the question set and moves to `InProgress`. On generator
    /// failure the session stays `NotStarted` and the error goes to the
    /// caller; a session that already started is left untouched.
    pub fn start(&self, store: &Store) -> Result<(), QuizError> {
        if self.state() != SessionState::NotStarted {
            return Ok(());
        }

        let questions = match quiz::generate(store, self.kind, self.question_count) {
            Ok(questions) => questions,
            Err(err) => {
                logger::log(&format!("quiz generation failed: {err}"));
                return Err(err);
            }
        };

        let mut inner = self.inner.lock().unwrap();
        if inner.state != SessionState::NotStarted {
            return Ok(());
        }
        inner.questions = questions;
        inner.state = SessionState::InProgress;
        Ok(())
    }

    /// Records the answer for the current question and schedules the timed
    /// advance. Exactly one answer is accepted per question: repeated calls
    /// while the advance is pending, out-of-range indices, and calls outside
    /// `InProgress` all return `None` without recording anything.
    pub fn answer(&self, option_index: usize) -> Option<bool> {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != SessionState::InProgress || inner.pending_advance {
            return None;
        }

        let question = &inner.questions[inner.current_index];
        if option_index >= question.options.len() {
            return None;
        }
        let is_correct = question.options[option_index].is_correct;

        if !is_correct {
            let question_index = inner.current_index;
            inner.incorrect.push(MissedAnswer {
                question_index,
                selected_option: option_index,
            });
        }
        inner.last_selection = Some((option_index, is_correct));
        inner.pending_advance = true;
        inner.generation += 1;
        let generation = inner.generation;
        drop(inner);

        self.schedule_advance(generation);
        Some(is_correct)
    }

    fn schedule_advance(&self, generation: u64) {
        let weak = Arc::downgrade(&self.inner);
        let delay = self.advance_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().unwrap();
                // A stale generation means the session advanced some other
                // way in the meantime; a failed upgrade means it was dropped.
                if inner.generation == generation && inner.pending_advance {
                    inner.advance();
                }
            }
        });
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().unwrap().state
    }

    pub fn current_index(&self) -> usize {
        self.inner.lock().unwrap().current_index
    }

    pub fn question_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        if inner.questions.is_empty() {
            self.question_count
        } else {
            inner.questions.len()
        }
    }

    pub fn questions(&self) -> Vec<QuizQuestion> {
        self.inner.lock().unwrap().questions.clone()
    }

    pub fn current_question(&self) -> Option<QuizQuestion> {
        let inner = self.inner.lock().unwrap();
        inner.questions.get(inner.current_index).cloned()
    }

    /// The option picked for the current question plus its correctness,
    /// present only while the advance timer is pending.
    pub fn last_selection(&self) -> Option<(usize, bool)> {
        self.inner.lock().unwrap().last_selection
    }

    pub fn incorrect(&self) -> Vec<MissedAnswer> {
        self.inner.lock().unwrap().incorrect.clone()
    }

    /// Correctly answered questions so far; `K - |incorrect|` once completed.
    pub fn score(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.questions.len().saturating_sub(inner.incorrect.len())
    }
}
