use crate::models::TopicSelection;
use openrouter_api::{
    models::provider_preferences::ProviderPreferences,
    models::provider_preferences::ProviderSort,
    types::chat::{ChatCompletionRequest, Message},
};
use serde::Serialize;

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
pub const DEFAULT_TEMPERATURE: f32 = 0.4;
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Fixed exam composition: 10 questions per subject, 20 total.
pub const QUESTIONS_PER_SUBJECT: usize = 10;

#[derive(Debug)]
pub struct OpenRouterClient {
    client: openrouter_api::OpenRouterClient<openrouter_api::Ready>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelConfig {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Builds the generation prompt for the selected topics. Empty selections
/// fall back to the broad subject defaults so the exam always has both
/// subjects represented.
pub fn build_exam_prompt(topics: &TopicSelection) -> String {
    let math_topics = if topics.math.is_empty() {
        "Bilangan, Aljabar, Geometri".to_string()
    } else {
        topics.math.join(", ")
    };
    let language_topics = if topics.indonesian.is_empty() {
        "Literasi Teks Informasi & Sastra".to_string()
    } else {
        topics.indonesian.join(", ")
    };

    format!(
        r#"You are a national academic assessment (TKA) expert for elementary grades 5-6.
Task: produce {per_subject} Numeracy (Matematika) questions about: {math_topics}
and {per_subject} Literacy (Bahasa Indonesia) questions about: {language_topics}.

Respond ONLY with a JSON array of question objects (no markdown, no extra text).
Each object has exactly these fields:
  id, subject, topic, type, cognitiveLevel, text, passage, options, categories, correctAnswer, explanation

STRICT ANSWER-FORMAT RULES:
1. type "Pilihan Ganda": correctAnswer is a single capital letter, e.g. "A".
2. type "Pilihan Ganda Kompleks (MCMA)": correctAnswer is a JSON array of letters, e.g. ["A", "C"].
3. type "Pilihan Ganda Kompleks (Kategori)": correctAnswer is a JSON object keyed by statement index, e.g. {{"0": "Benar", "1": "Salah"}}; categories is an array of {{"statement", "category"}} objects with category "Benar" or "Salah".

QUALITY RULES:
- Use formal Indonesian (Bahasa Indonesia Baku) for question content.
- Literacy questions MUST include a relevant reading passage in "passage".
- Numeracy questions must use real-life contexts (HOTS).
- Vary cognitiveLevel across L1 (comprehension), L2 (application), L3 (reasoning).
- "Pilihan Ganda" and MCMA questions carry 4-5 options; Kategori questions carry 3-4 statements.
"#,
        per_subject = QUESTIONS_PER_SUBJECT,
        math_topics = math_topics,
        language_topics = language_topics,
    )
}

impl OpenRouterClient {
    pub fn new() -> Result<Self, String> {
        let client = openrouter_api::OpenRouterClient::quick()
            .map_err(|e| format!("Failed to create OpenRouter client: {}", e))?;

        Ok(Self { client })
    }

    /// Requests a full exam for the given topic selection and returns the
    /// raw response text. Parsing and normalization happen in
    /// `ai::normalizer`.
    pub async fn generate_exam(
        &self,
        topics: &TopicSelection,
        config: Option<&ModelConfig>,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let prompt = build_exam_prompt(topics);

        let model = config
            .map(|c| c.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let messages = vec![
            Message::text(
                "system",
                "You are an elementary-school assessment generator. Respond with valid JSON only.",
            ),
            Message::text("user", &prompt),
        ];

        let provider = ProviderPreferences::new().with_sort(ProviderSort::Throughput);

        let request = ChatCompletionRequest {
            model,
            messages,
            provider: Some(provider),
            stream: None,
            response_format: None,
            tools: None,
            tool_choice: None,
            models: None,
            transforms: None,
            route: None,
            user: None,
            max_tokens: Some(config.and_then(|c| c.max_tokens).unwrap_or(DEFAULT_MAX_TOKENS)),
            temperature: Some(
                config
                    .and_then(|c| c.temperature)
                    .unwrap_or(DEFAULT_TEMPERATURE),
            ),
            top_p: None,
            top_k: None,
            frequency_penalty: None,
            presence_penalty: None,
            repetition_penalty: None,
            min_p: None,
            top_a: None,
            seed: None,
            stop: None,
            logit_bias: None,
            logprobs: None,
            top_logprobs: None,
            prediction: None,
            parallel_tool_calls: None,
            verbosity: None,
        };

        let response = self
            .client
            .chat()?
            .chat_completion(request)
            .await
            .map_err(|e| format!("OpenRouter API error: {}", e))?;

        if let Some(choice) = response.choices.first() {
            match &choice.message.content {
                openrouter_api::MessageContent::Text(text) => Ok(text.clone()),
                openrouter_api::MessageContent::Parts(parts) => {
                    let text_parts: Vec<String> = parts
                        .iter()
                        .filter_map(|p| {
                            if let openrouter_api::ContentPart::Text(tc) = p {
                                Some(tc.text.clone())
                            } else {
                                None
                            }
                        })
                        .collect();
                    Ok(text_parts.join("\n"))
                }
            }
        } else {
            Err("No response choices received".into())
        }
    }
}
