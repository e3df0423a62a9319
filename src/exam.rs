use crate::models::{Answer, Question, TopicSelection, UserResult};
use crate::store::{Scope, Store, StoreError, keys};
use std::collections::BTreeMap;
use thiserror::Error;

/// Fixed countdown: 45 minutes.
pub const EXAM_DURATION_SECS: u64 = 45 * 60;

#[derive(Debug, Error)]
pub enum ExamError {
    #[error("A generation request is already in flight.")]
    GenerationInFlight,
    #[error("An exam session is already active.")]
    SessionActive,
    #[error("Only one attempt is allowed per username.")]
    AttemptExhausted,
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamPhase {
    Idle,
    Generating,
    InProgress,
    Completed,
}

/// Owns the in-progress question list, answer map, and countdown for the
/// lifetime of one exam. All three are persisted under session-scope keys
/// on every mutation so an interrupted run resumes where it left off, and
/// cleared on finalize.
#[derive(Debug)]
pub struct ExamController {
    pub phase: ExamPhase,
    pub questions: Vec<Question>,
    answers: BTreeMap<usize, Answer>,
    pub time_left: u64,
}

impl Default for ExamController {
    fn default() -> Self {
        Self::new()
    }
}

impl ExamController {
    pub fn new() -> Self {
        Self {
            phase: ExamPhase::Idle,
            questions: Vec::new(),
            answers: BTreeMap::new(),
            time_left: 0,
        }
    }

    /// Rebuilds the controller from persisted session state. A stored
    /// question list with time remaining resumes the countdown.
    pub fn resume(store: &Store) -> Result<Self, StoreError> {
        let questions: Vec<Question> = store
            .get_json(Scope::Session, keys::ACTIVE_EXAM)?
            .unwrap_or_default();
        let answers: BTreeMap<usize, Answer> = store
            .get_json(Scope::Session, keys::ANSWERS)?
            .unwrap_or_default();
        let time_left: u64 = store
            .get_json(Scope::Session, keys::TIME_LEFT)?
            .unwrap_or(0);

        let phase = if !questions.is_empty() && time_left > 0 {
            ExamPhase::InProgress
        } else {
            ExamPhase::Idle
        };

        Ok(Self {
            phase,
            questions,
            answers,
            time_left,
        })
    }

    /// Gate for a new generation request. Rejects while a request is in
    /// flight, while a session is active, and once the user has a completed
    /// result on record. Leaves all exam state untouched on rejection.
    pub fn request_start(
        &mut self,
        history: &[UserResult],
        username: &str,
    ) -> Result<(), ExamError> {
        match self.phase {
            ExamPhase::Generating => return Err(ExamError::GenerationInFlight),
            ExamPhase::InProgress => return Err(ExamError::SessionActive),
            ExamPhase::Idle | ExamPhase::Completed => {}
        }
        if has_completed_attempt(history, username) {
            return Err(ExamError::AttemptExhausted);
        }
        self.phase = ExamPhase::Generating;
        Ok(())
    }

    /// Resets the in-flight flag after a failed generation so a retry is
    /// possible.
    pub fn generation_failed(&mut self) {
        if self.phase == ExamPhase::Generating {
            self.phase = ExamPhase::Idle;
        }
    }

    /// Installs a freshly generated question list: countdown reset to the
    /// full duration, answer map cleared, everything persisted.
    pub fn begin(&mut self, store: &Store, questions: Vec<Question>) -> Result<(), StoreError> {
        self.questions = questions;
        self.answers.clear();
        self.time_left = EXAM_DURATION_SECS;
        self.phase = ExamPhase::InProgress;

        store.set_json(Scope::Session, keys::ACTIVE_EXAM, &self.questions)?;
        store.set_json(Scope::Session, keys::ANSWERS, &self.answers)?;
        store.set_json(Scope::Session, keys::TIME_LEFT, &self.time_left)?;
        Ok(())
    }

    /// Replaces the answer for a question index. The answer's variant is
    /// the caller's responsibility: only the widget matching the question
    /// type ever records here.
    pub fn record_answer(
        &mut self,
        store: &Store,
        index: usize,
        answer: Answer,
    ) -> Result<(), StoreError> {
        self.answers.insert(index, answer);
        store.set_json(Scope::Session, keys::ANSWERS, &self.answers)
    }

    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.answers.get(&index)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|a| a.is_given()).count()
    }

    /// One countdown step. Persists the remaining time and finalizes
    /// exactly once when the clock hits zero with questions present
    /// (finalize flips the phase, so later ticks are no-ops).
    pub fn tick(
        &mut self,
        store: &Store,
        username: &str,
        topics: &TopicSelection,
    ) -> Result<Option<UserResult>, StoreError> {
        if self.phase != ExamPhase::InProgress {
            return Ok(None);
        }
        self.time_left = self.time_left.saturating_sub(1);
        store.set_json(Scope::Session, keys::TIME_LEFT, &self.time_left)?;

        if self.time_left == 0 && !self.questions.is_empty() {
            return self.finalize(store, username, topics);
        }
        Ok(None)
    }

    /// Scores the session, appends the result to history (newest first),
    /// and clears the persisted session state. Questions and answers stay
    /// in memory so the review screen can page over them; they are gone
    /// once the controller is rebuilt. No-op on an empty question list.
    pub fn finalize(
        &mut self,
        store: &Store,
        username: &str,
        topics: &TopicSelection,
    ) -> Result<Option<UserResult>, StoreError> {
        if self.questions.is_empty() {
            return Ok(None);
        }

        let correct_count = self
            .questions
            .iter()
            .enumerate()
            .filter(|(i, q)| self.answers.get(i) == Some(&q.correct_answer))
            .count();
        let total_questions = self.questions.len();
        let score = ((correct_count as f64 / total_questions as f64) * 100.0).round() as u32;

        let result = UserResult {
            username: username.to_string(),
            score,
            total_questions,
            correct_count,
            date: chrono::Local::now().format("%d/%m/%Y %H.%M").to_string(),
            topics: topics.all_topics(),
        };

        let mut history = load_history(store)?;
        history.insert(0, result.clone());
        store.set_json(Scope::Durable, keys::HISTORY, &history)?;

        store.clear_scope(Scope::Session)?;
        self.time_left = 0;
        self.phase = ExamPhase::Completed;

        Ok(Some(result))
    }
}

pub fn load_history(store: &Store) -> Result<Vec<UserResult>, StoreError> {
    Ok(store
        .get_json(Scope::Durable, keys::HISTORY)?
        .unwrap_or_default())
}

/// One completed attempt per username, enforced by scanning history.
pub fn has_completed_attempt(history: &[UserResult], username: &str) -> bool {
    history.iter().any(|r| r.username == username)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionType, Subject};

    fn question(id: &str, correct: Answer) -> Question {
        let kind = match &correct {
            Answer::Choice(_) => QuestionType::SingleChoice,
            Answer::Selection(_) => QuestionType::MultiSelect,
            Answer::Mapping(_) => QuestionType::Categorize,
        };
        Question {
            id: id.to_string(),
            subject: Subject::Matematika,
            topic: "Pecahan".to_string(),
            kind,
            cognitive_level: "L1".to_string(),
            text: format!("Soal {}", id),
            passage: None,
            options: vec![
                "satu".to_string(),
                "dua".to_string(),
                "tiga".to_string(),
                "empat".to_string(),
            ],
            categories: vec![],
            correct_answer: correct,
            explanation: None,
        }
    }

    fn single_choice_exam(count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| question(&format!("q{}", i), Answer::Choice("A".to_string())))
            .collect()
    }

    fn topics() -> TopicSelection {
        TopicSelection {
            math: vec!["Pecahan".to_string()],
            indonesian: vec!["Ide Pokok".to_string()],
        }
    }

    #[test]
    fn test_score_fifteen_of_twenty_is_seventy_five() {
        let store = Store::in_memory().unwrap();
        let mut exam = ExamController::new();
        exam.begin(&store, single_choice_exam(20)).unwrap();

        for i in 0..15 {
            exam.record_answer(&store, i, Answer::Choice("A".to_string()))
                .unwrap();
        }
        for i in 15..20 {
            exam.record_answer(&store, i, Answer::Choice("B".to_string()))
                .unwrap();
        }

        let result = exam.finalize(&store, "budi", &topics()).unwrap().unwrap();
        assert_eq!(result.correct_count, 15);
        assert_eq!(result.total_questions, 20);
        assert_eq!(result.score, 75);
    }

    #[test]
    fn test_finalize_on_empty_question_list_is_a_no_op() {
        let store = Store::in_memory().unwrap();
        let mut exam = ExamController::new();

        let result = exam.finalize(&store, "budi", &topics()).unwrap();
        assert!(result.is_none());
        assert_eq!(exam.phase, ExamPhase::Idle);
        assert!(load_history(&store).unwrap().is_empty());
    }

    #[test]
    fn test_finalize_clears_session_state_and_prepends_history() {
        let store = Store::in_memory().unwrap();
        let mut exam = ExamController::new();
        exam.begin(&store, single_choice_exam(2)).unwrap();
        exam.record_answer(&store, 0, Answer::Choice("A".to_string()))
            .unwrap();
        exam.finalize(&store, "budi", &topics()).unwrap().unwrap();

        assert_eq!(exam.phase, ExamPhase::Completed);
        assert_eq!(exam.questions.len(), 2);
        assert_eq!(exam.time_left, 0);
        assert!(store.get(Scope::Session, keys::ACTIVE_EXAM).unwrap().is_none());
        assert!(store.get(Scope::Session, keys::ANSWERS).unwrap().is_none());
        assert!(store.get(Scope::Session, keys::TIME_LEFT).unwrap().is_none());

        // Second attempt by another user lands at the head of history.
        let mut second = ExamController::new();
        second.begin(&store, single_choice_exam(2)).unwrap();
        second.finalize(&store, "siti", &topics()).unwrap().unwrap();

        let history = load_history(&store).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].username, "siti");
        assert_eq!(history[1].username, "budi");
    }

    #[test]
    fn test_completed_attempt_blocks_a_new_start() {
        let store = Store::in_memory().unwrap();
        let mut exam = ExamController::new();
        exam.begin(&store, single_choice_exam(1)).unwrap();
        exam.finalize(&store, "budi", &topics()).unwrap().unwrap();

        let history = load_history(&store).unwrap();
        let mut fresh = ExamController::new();
        fresh.record_answer(&store, 0, Answer::Choice("A".to_string()))
            .unwrap();
        let before_answers = fresh.answered_count();

        assert!(matches!(
            fresh.request_start(&history, "budi"),
            Err(ExamError::AttemptExhausted)
        ));
        assert_eq!(fresh.phase, ExamPhase::Idle);
        assert_eq!(fresh.answered_count(), before_answers);

        // A different user still may start.
        assert!(fresh.request_start(&history, "siti").is_ok());
    }

    #[test]
    fn test_in_flight_guard_blocks_second_request() {
        let mut exam = ExamController::new();
        exam.request_start(&[], "budi").unwrap();
        assert_eq!(exam.phase, ExamPhase::Generating);

        assert!(matches!(
            exam.request_start(&[], "budi"),
            Err(ExamError::GenerationInFlight)
        ));

        exam.generation_failed();
        assert_eq!(exam.phase, ExamPhase::Idle);
        assert!(exam.request_start(&[], "budi").is_ok());
    }

    #[test]
    fn test_countdown_zero_finalizes_exactly_once() {
        let store = Store::in_memory().unwrap();
        let mut exam = ExamController::new();
        exam.begin(&store, single_choice_exam(1)).unwrap();
        exam.time_left = 1;

        let finalized = exam.tick(&store, "budi", &topics()).unwrap();
        assert!(finalized.is_some());
        assert_eq!(exam.phase, ExamPhase::Completed);

        // Clock is stopped; further ticks neither score nor panic.
        let again = exam.tick(&store, "budi", &topics()).unwrap();
        assert!(again.is_none());
        assert_eq!(load_history(&store).unwrap().len(), 1);
    }

    #[test]
    fn test_multi_select_scoring_is_order_sensitive() {
        let store = Store::in_memory().unwrap();
        let key = Answer::Selection(vec!["A".to_string(), "C".to_string()]);
        let mut exam = ExamController::new();
        exam.begin(&store, vec![question("q0", key)]).unwrap();
        exam.record_answer(
            &store,
            0,
            Answer::Selection(vec!["C".to_string(), "A".to_string()]),
        )
        .unwrap();

        let result = exam.finalize(&store, "budi", &topics()).unwrap().unwrap();
        assert_eq!(result.correct_count, 0);
    }

    #[test]
    fn test_record_answer_replaces_previous_entry() {
        let store = Store::in_memory().unwrap();
        let mut exam = ExamController::new();
        exam.begin(&store, single_choice_exam(1)).unwrap();

        exam.record_answer(&store, 0, Answer::Choice("B".to_string()))
            .unwrap();
        exam.record_answer(&store, 0, Answer::Choice("A".to_string()))
            .unwrap();

        assert_eq!(exam.answer(0), Some(&Answer::Choice("A".to_string())));
        assert_eq!(exam.answered_count(), 1);
    }

    #[test]
    fn test_resume_restores_in_progress_session() {
        let store = Store::in_memory().unwrap();
        let mut exam = ExamController::new();
        exam.begin(&store, single_choice_exam(3)).unwrap();
        exam.record_answer(&store, 1, Answer::Choice("A".to_string()))
            .unwrap();
        exam.time_left = 120;
        store
            .set_json(Scope::Session, keys::TIME_LEFT, &exam.time_left)
            .unwrap();

        let resumed = ExamController::resume(&store).unwrap();
        assert_eq!(resumed.phase, ExamPhase::InProgress);
        assert_eq!(resumed.questions.len(), 3);
        assert_eq!(resumed.time_left, 120);
        assert_eq!(resumed.answer(1), Some(&Answer::Choice("A".to_string())));
    }

    #[test]
    fn test_resume_with_no_persisted_state_is_idle() {
        let store = Store::in_memory().unwrap();
        let resumed = ExamController::resume(&store).unwrap();
        assert_eq!(resumed.phase, ExamPhase::Idle);
        assert!(resumed.questions.is_empty());
    }
}
