use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The two canonical exam subjects. Anything the generator emits is
/// normalized onto one of these by the answer normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Matematika,
    BahasaIndonesia,
}

impl Subject {
    pub fn label(&self) -> &'static str {
        match self {
            Subject::Matematika => "NUMERASI",
            Subject::BahasaIndonesia => "LITERASI",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    SingleChoice,
    MultiSelect,
    Categorize,
}

impl QuestionType {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "Pilihan Ganda",
            QuestionType::MultiSelect => "Pilihan Ganda Kompleks (MCMA)",
            QuestionType::Categorize => "Pilihan Ganda Kompleks (Kategori)",
        }
    }
}

/// A submitted or correct answer. The variant is determined by the
/// question's declared type; conversion from raw generator output happens
/// in the normalizer so nothing downstream has to inspect runtime shapes.
///
/// Equality is derived: `Selection` compares element-by-element in order
/// (scores recorded by earlier releases assume order-sensitive matching),
/// `Mapping` compares key-wise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Choice(String),
    Selection(Vec<String>),
    Mapping(BTreeMap<String, String>),
}

impl Answer {
    /// Whether the answer counts as "given" for the progress counter.
    pub fn is_given(&self) -> bool {
        match self {
            Answer::Choice(s) => !s.trim().is_empty(),
            Answer::Selection(items) => !items.is_empty(),
            Answer::Mapping(map) => !map.is_empty(),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Answer::Choice(s) => s.clone(),
            Answer::Selection(items) => items.join(", "),
            Answer::Mapping(map) => map
                .iter()
                .map(|(idx, label)| {
                    let row = idx.parse::<usize>().map(|i| i + 1).unwrap_or(0);
                    format!("{}: {}", row, label)
                })
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

/// One statement of a categorize question together with its key label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryItem {
    pub statement: String,
    pub category: String,
}

/// A generated exam question. Immutable once generated for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub subject: Subject,
    pub topic: String,
    pub kind: QuestionType,
    pub cognitive_level: String,
    pub text: String,
    pub passage: Option<String>,
    pub options: Vec<String>,
    pub categories: Vec<CategoryItem>,
    pub correct_answer: Answer,
    pub explanation: Option<String>,
}

/// The user's chosen topic set. Mutated only through the undo/redo log in
/// `topics::TopicHistory`, never in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSelection {
    pub math: Vec<String>,
    pub indonesian: Vec<String>,
}

impl TopicSelection {
    pub fn all_topics(&self) -> Vec<String> {
        self.math
            .iter()
            .chain(self.indonesian.iter())
            .cloned()
            .collect()
    }
}

/// One completed attempt. History is append-only, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResult {
    pub username: String,
    pub score: u32,
    pub total_questions: usize,
    pub correct_count: usize,
    pub date: String,
    pub topics: Vec<String>,
}

/// Registry record. Stored as-is: hardening the registry is an explicit
/// non-goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub passcode: String,
    pub phone: String,
}

/// Persisted session identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Auth,
    Config,
    Generating,
    Exam,
    Result,
    History,
}

#[derive(Debug)]
pub enum AiRequest {
    Generate { topics: TopicSelection },
}

#[derive(Debug)]
pub enum AiResponse {
    Generated { questions: Vec<Question> },
    Failed { error: String },
}
