pub mod client;
pub mod normalizer;

pub use client::{
    DEFAULT_MODEL, ModelConfig, OpenRouterClient, QUESTIONS_PER_SUBJECT, build_exam_prompt,
};
pub use normalizer::{NormalizeError, normalize_subject, parse_questions};
