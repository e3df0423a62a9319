use crate::accounts;
use crate::ai::QUESTIONS_PER_SUBJECT;
use crate::exam::{self, ExamController, ExamPhase};
use crate::logger;
use crate::models::{
    AiRequest, AiResponse, Answer, AppState, QuestionType, SessionUser, UserResult,
};
use crate::store::{Store, StoreError};
use crate::topics::{LANGUAGE_TOPICS, MATH_TOPICS, TopicCategory, TopicHistory};
use crate::utils::option_letter;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::mpsc::Sender;

/// User-facing banner for any generation failure. Transport errors and
/// malformed payloads collapse into this one retryable message.
pub const GENERATION_ERROR_BANNER: &str = "AI core latency error. Please re-initialize.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
    Recover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Passcode,
    Phone,
}

#[derive(Debug)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub username: String,
    pub passcode: String,
    pub phone: String,
    pub focus: AuthField,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl AuthForm {
    pub fn new() -> Self {
        Self {
            mode: AuthMode::Login,
            username: String::new(),
            passcode: String::new(),
            phone: String::new(),
            focus: AuthField::Username,
            error: None,
            notice: None,
        }
    }

    /// The fields shown for the active mode, in focus order.
    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Login => &[AuthField::Username, AuthField::Passcode],
            AuthMode::Register => &[AuthField::Username, AuthField::Phone, AuthField::Passcode],
            AuthMode::Recover => &[AuthField::Phone],
        }
    }

    fn focused_value_mut(&mut self) -> &mut String {
        match self.focus {
            AuthField::Username => &mut self.username,
            AuthField::Passcode => &mut self.passcode,
            AuthField::Phone => &mut self.phone,
        }
    }

    fn next_field(&mut self) {
        let fields = self.fields();
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(pos + 1) % fields.len()];
    }

    fn switch_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.focus = self.fields()[0];
        self.error = None;
        self.notice = None;
    }
}

impl Default for AuthForm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct App {
    pub state: AppState,
    pub store: Store,
    pub current_user: Option<SessionUser>,
    pub auth: AuthForm,
    pub topics: TopicHistory,
    pub exam: ExamController,
    pub history: Vec<UserResult>,
    pub sys_error: Option<String>,
    pub sync_step: usize,
    pub current_question: usize,
    pub category_row: usize,
    pub config_panel: usize,
    pub config_cursor: usize,
    pub last_result: Option<UserResult>,
    ai_tx: Sender<AiRequest>,
}

impl App {
    pub fn new(store: Store, ai_tx: Sender<AiRequest>) -> Result<Self, StoreError> {
        let current_user = accounts::current_session(&store)?;
        let history = exam::load_history(&store)?;
        let exam = ExamController::resume(&store)?;

        let mut topics = TopicHistory::new();
        if let Some(user) = &current_user {
            topics.set_frozen(exam::has_completed_attempt(&history, &user.username));
        }

        let state = match (&current_user, exam.phase) {
            (None, _) => AppState::Auth,
            (Some(_), ExamPhase::InProgress) => AppState::Exam,
            (Some(_), _) => AppState::Config,
        };

        Ok(Self {
            state,
            store,
            current_user,
            auth: AuthForm::new(),
            topics,
            exam,
            history,
            sys_error: None,
            sync_step: 0,
            current_question: 0,
            category_row: 0,
            config_panel: 0,
            config_cursor: 0,
            last_result: None,
            ai_tx,
        })
    }

    fn username(&self) -> String {
        self.current_user
            .as_ref()
            .map(|u| u.username.clone())
            .unwrap_or_else(|| "Guest".to_string())
    }

    /// Wall-clock second. Rotates the generation status line and drives the
    /// exam countdown.
    pub fn on_tick(&mut self) -> Result<(), StoreError> {
        match self.state {
            AppState::Generating => {
                self.sync_step = self.sync_step.wrapping_add(1);
                Ok(())
            }
            AppState::Exam => {
                let username = self.username();
                let selection = self.topics.current().clone();
                if let Some(result) = self.exam.tick(&self.store, &username, &selection)? {
                    self.apply_result(result)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn on_ai_response(&mut self, response: AiResponse) -> Result<(), StoreError> {
        match response {
            AiResponse::Generated { questions } => {
                logger::log(&format!("Received {} generated questions", questions.len()));
                self.exam.begin(&self.store, questions)?;
                self.sys_error = None;
                self.current_question = 0;
                self.category_row = 0;
                self.state = AppState::Exam;
            }
            AiResponse::Failed { error } => {
                logger::log(&format!("Generation failed: {}", error));
                self.exam.generation_failed();
                self.sys_error = Some(GENERATION_ERROR_BANNER.to_string());
                self.state = AppState::Config;
            }
        }
        Ok(())
    }

    fn apply_result(&mut self, result: UserResult) -> Result<(), StoreError> {
        self.history = exam::load_history(&self.store)?;
        self.topics.set_frozen(true);
        self.last_result = Some(result);
        self.current_question = 0;
        self.state = AppState::Result;
        Ok(())
    }

    fn start_generation(&mut self) {
        let username = self.username();
        match self.exam.request_start(&self.history, &username) {
            Ok(()) => {
                self.sys_error = None;
                self.sync_step = 0;
                self.state = AppState::Generating;
                let request = AiRequest::Generate {
                    topics: self.topics.current().clone(),
                };
                if self.ai_tx.send(request).is_err() {
                    self.exam.generation_failed();
                    self.sys_error = Some(GENERATION_ERROR_BANNER.to_string());
                    self.state = AppState::Config;
                }
            }
            Err(e) => {
                self.sys_error = Some(e.to_string());
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<(), StoreError> {
        match self.state {
            AppState::Auth => self.handle_auth_key(key),
            AppState::Config => self.handle_config_key(key),
            AppState::Generating => Ok(()),
            AppState::Exam => self.handle_exam_key(key),
            AppState::Result => self.handle_result_key(key),
            AppState::History => self.handle_history_key(key),
        }
    }

    fn handle_auth_key(&mut self, key: KeyEvent) -> Result<(), StoreError> {
        match key.code {
            KeyCode::Tab => {
                self.auth.next_field();
            }
            KeyCode::F(2) => {
                let next = if self.auth.mode == AuthMode::Login {
                    AuthMode::Register
                } else {
                    AuthMode::Login
                };
                self.auth.switch_mode(next);
            }
            KeyCode::F(3) => self.auth.switch_mode(AuthMode::Recover),
            KeyCode::Esc => self.auth.switch_mode(AuthMode::Login),
            KeyCode::Backspace => {
                self.auth.focused_value_mut().pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.auth.focused_value_mut().push(c);
            }
            KeyCode::Enter => return self.submit_auth(),
            _ => {}
        }
        Ok(())
    }

    fn submit_auth(&mut self) -> Result<(), StoreError> {
        self.auth.error = None;
        self.auth.notice = None;

        match self.auth.mode {
            AuthMode::Register => {
                match accounts::register(
                    &self.store,
                    &self.auth.username,
                    &self.auth.passcode,
                    &self.auth.phone,
                ) {
                    Ok(()) => {
                        self.auth.switch_mode(AuthMode::Login);
                        self.auth.notice = Some("Registration validated. Log in now.".to_string());
                    }
                    Err(accounts::AccountError::Store(e)) => return Err(e),
                    Err(e) => self.auth.error = Some(e.to_string()),
                }
            }
            AuthMode::Login => {
                match accounts::login(&self.store, &self.auth.username, &self.auth.passcode) {
                    Ok(session) => {
                        self.current_user = Some(session);
                        self.after_login()?;
                    }
                    Err(accounts::AccountError::Store(e)) => return Err(e),
                    Err(e) => self.auth.error = Some(e.to_string()),
                }
            }
            AuthMode::Recover => match accounts::recover(&self.store, &self.auth.phone) {
                Ok(account) => {
                    self.auth.notice = Some(format!(
                        "FOUND: [Username: {}] [Code: {}]",
                        account.username, account.passcode
                    ));
                }
                Err(accounts::AccountError::Store(e)) => return Err(e),
                Err(e) => self.auth.error = Some(e.to_string()),
            },
        }
        Ok(())
    }

    fn after_login(&mut self) -> Result<(), StoreError> {
        self.history = exam::load_history(&self.store)?;
        self.exam = ExamController::resume(&self.store)?;
        let username = self.username();
        self.topics = TopicHistory::new();
        self.topics
            .set_frozen(exam::has_completed_attempt(&self.history, &username));
        self.auth = AuthForm::new();
        self.state = if self.exam.phase == ExamPhase::InProgress {
            AppState::Exam
        } else {
            AppState::Config
        };
        Ok(())
    }

    fn logout(&mut self) -> Result<(), StoreError> {
        accounts::logout(&self.store)?;
        self.current_user = None;
        self.exam = ExamController::new();
        self.topics = TopicHistory::new();
        self.last_result = None;
        self.sys_error = None;
        self.auth = AuthForm::new();
        self.state = AppState::Auth;
        Ok(())
    }

    fn config_panel_topics(&self) -> &'static [&'static str] {
        if self.config_panel == 0 {
            &MATH_TOPICS
        } else {
            &LANGUAGE_TOPICS
        }
    }

    fn handle_config_key(&mut self, key: KeyEvent) -> Result<(), StoreError> {
        match key.code {
            KeyCode::Char('1') => {
                self.config_panel = 0;
                self.config_cursor = 0;
            }
            KeyCode::Char('2') => {
                self.config_panel = 1;
                self.config_cursor = 0;
            }
            KeyCode::Tab => {
                self.config_panel = 1 - self.config_panel;
                self.config_cursor = 0;
            }
            KeyCode::Up => {
                self.config_cursor = self.config_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                let len = self.config_panel_topics().len();
                if self.config_cursor < len.saturating_sub(1) {
                    self.config_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let topic = self.config_panel_topics()[self.config_cursor];
                let category = if self.config_panel == 0 {
                    TopicCategory::Math
                } else {
                    TopicCategory::Indonesian
                };
                self.topics.toggle(category, topic);
            }
            KeyCode::Char('u') => self.topics.undo(),
            KeyCode::Char('r') => self.topics.redo(),
            KeyCode::Char('g') => self.start_generation(),
            KeyCode::Char('h') => self.state = AppState::History,
            KeyCode::Char('l') => return self.logout(),
            _ => {}
        }
        Ok(())
    }

    fn handle_exam_key(&mut self, key: KeyEvent) -> Result<(), StoreError> {
        if self.exam.questions.is_empty() {
            self.state = AppState::Config;
            return Ok(());
        }

        match key.code {
            KeyCode::Left => {
                self.current_question = self.current_question.saturating_sub(1);
                self.category_row = 0;
            }
            KeyCode::Right => {
                if self.current_question < self.exam.questions.len() - 1 {
                    self.current_question += 1;
                    self.category_row = 0;
                }
            }
            KeyCode::Up => {
                if self.exam.questions[self.current_question].kind == QuestionType::Categorize {
                    self.category_row = self.category_row.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                let question = &self.exam.questions[self.current_question];
                if question.kind == QuestionType::Categorize
                    && self.category_row + 1 < question.categories.len()
                {
                    self.category_row += 1;
                }
            }
            KeyCode::Char('f') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let username = self.username();
                let selection = self.topics.current().clone();
                if let Some(result) = self.exam.finalize(&self.store, &username, &selection)? {
                    self.apply_result(result)?;
                }
            }
            KeyCode::Char(c) => return self.handle_answer_key(c),
            _ => {}
        }
        Ok(())
    }

    /// Routes a character key to the widget matching the current question's
    /// type. The recorded value is always the option letter (the key the
    /// generator scores against), not the option text.
    fn handle_answer_key(&mut self, c: char) -> Result<(), StoreError> {
        let index = self.current_question;
        let question = &self.exam.questions[index];

        match question.kind {
            QuestionType::SingleChoice | QuestionType::MultiSelect => {
                let letter = c.to_ascii_uppercase();
                let slot = (letter as u8).wrapping_sub(b'A') as usize;
                if slot >= question.options.len() {
                    return Ok(());
                }
                let answer = if question.kind == QuestionType::SingleChoice {
                    Answer::Choice(letter.to_string())
                } else {
                    // Toggle the letter, preserving click order.
                    let mut selection = match self.exam.answer(index) {
                        Some(Answer::Selection(items)) => items.clone(),
                        _ => Vec::new(),
                    };
                    let entry = letter.to_string();
                    if let Some(pos) = selection.iter().position(|s| *s == entry) {
                        selection.remove(pos);
                    } else {
                        selection.push(entry);
                    }
                    Answer::Selection(selection)
                };
                self.exam.record_answer(&self.store, index, answer)?;
            }
            QuestionType::Categorize => {
                let label = match c.to_ascii_lowercase() {
                    'b' => "Benar",
                    's' => "Salah",
                    _ => return Ok(()),
                };
                if question.categories.is_empty() {
                    return Ok(());
                }
                let mut mapping = match self.exam.answer(index) {
                    Some(Answer::Mapping(map)) => map.clone(),
                    _ => std::collections::BTreeMap::new(),
                };
                mapping.insert(self.category_row.to_string(), label.to_string());
                self.exam
                    .record_answer(&self.store, index, Answer::Mapping(mapping))?;
            }
        }
        Ok(())
    }

    fn handle_result_key(&mut self, key: KeyEvent) -> Result<(), StoreError> {
        match key.code {
            KeyCode::Left => {
                self.current_question = self.current_question.saturating_sub(1);
            }
            KeyCode::Right => {
                // Review pages over the questions of the finalized session
                // held by the result screen; nothing to page without them.
                if self.current_question + 1 < self.review_len() {
                    self.current_question += 1;
                }
            }
            KeyCode::Char('h') => self.state = AppState::History,
            KeyCode::Char('c') | KeyCode::Esc => self.state = AppState::Config,
            _ => {}
        }
        Ok(())
    }

    fn review_len(&self) -> usize {
        self.last_result
            .as_ref()
            .map(|r| r.total_questions)
            .unwrap_or(0)
    }

    fn handle_history_key(&mut self, key: KeyEvent) -> Result<(), StoreError> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('c') => {
                self.state = if self.current_user.is_some() {
                    AppState::Config
                } else {
                    AppState::Auth
                };
            }
            KeyCode::Char('l') => return self.logout(),
            _ => {}
        }
        Ok(())
    }

    /// Fixed total for the standard exam composition.
    pub fn expected_total_questions() -> usize {
        QUESTIONS_PER_SUBJECT * 2
    }
}
