pub mod accounts;
pub mod ai;
pub mod ai_worker;
pub mod app;
pub mod exam;
pub mod logger;
pub mod models;
pub mod store;
pub mod topics;
pub mod ui;
pub mod utils;

// Re-exports for convenience
pub use ai::{DEFAULT_MODEL, ModelConfig, OpenRouterClient, parse_questions};
pub use ai_worker::spawn_ai_worker;
pub use app::App;
pub use exam::{EXAM_DURATION_SECS, ExamController, ExamPhase};
pub use models::{AiRequest, AiResponse, Answer, AppState, Question, QuestionType, Subject};
pub use store::{Scope, Store};
pub use topics::{TopicCategory, TopicHistory};
pub use utils::{format_clock, option_letter};
