use crate::logger;
use crate::models::{Answer, CategoryItem, Question, QuestionType, Subject};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("malformed generation payload: {0}")]
    MalformedPayload(String),
    #[error("malformed question {index}: {reason}")]
    MalformedElement { index: usize, reason: String },
}

/// Strips a leading/trailing markdown code fence (```json or bare ```),
/// independent of case and surrounding whitespace.
fn strip_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```") {
        // `get` keeps arbitrary multibyte info strings from slicing inside
        // a character.
        let rest = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
        cleaned = rest.trim_start();
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest.trim_end();
    }
    cleaned
}

/// Turns the raw text of a generation call into typed questions.
///
/// The generator wraps its JSON in fences and commentary often enough that
/// the payload is located by slicing from the first `[` to the last `]`
/// before parsing. Anything that still fails to parse as a JSON array is a
/// `MalformedPayload`; individual elements failing validation are
/// `MalformedElement` with the offending index.
pub fn parse_questions(raw: &str) -> Result<Vec<Question>, NormalizeError> {
    let cleaned = strip_fences(raw);

    let sliced = match (cleaned.find('['), cleaned.rfind(']')) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => {
            return Err(NormalizeError::MalformedPayload(
                "no JSON array found in response".to_string(),
            ));
        }
    };

    let value: Value = serde_json::from_str(sliced)
        .map_err(|e| NormalizeError::MalformedPayload(format!("invalid JSON: {}", e)))?;
    let items = value.as_array().ok_or_else(|| {
        NormalizeError::MalformedPayload("top-level value is not an array".to_string())
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| normalize_question(index, item))
        .collect()
}

/// Maps whatever the generator put in `subject` onto one of the two
/// canonical subjects. Unrecognized input defaults to the language label.
pub fn normalize_subject(raw: &str) -> Subject {
    let lowered = raw.to_lowercase();
    if lowered.contains("mat") || lowered.contains("num") {
        Subject::Matematika
    } else {
        Subject::BahasaIndonesia
    }
}

fn parse_question_type(raw: &str) -> QuestionType {
    let lowered = raw.to_lowercase();
    if lowered.contains("kategori") || lowered.contains("categor") {
        QuestionType::Categorize
    } else if lowered.contains("kompleks") || lowered.contains("mcma") || lowered.contains("multi")
    {
        QuestionType::MultiSelect
    } else {
        QuestionType::SingleChoice
    }
}

fn require_str<'a>(
    obj: &'a serde_json::Map<String, Value>,
    field: &str,
    index: usize,
) -> Result<&'a str, NormalizeError> {
    obj.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| NormalizeError::MalformedElement {
            index,
            reason: format!("missing or non-string field '{}'", field),
        })
}

/// The generator sometimes double-encodes array/object answers as a string
/// (e.g. `"[\"A\",\"C\"]"`). Reparse those; on failure keep the original
/// string. Soft failure only, never fatal for the batch.
fn recover_nested_answer(id: &str, value: &Value) -> Value {
    if let Value::String(s) = value {
        let trimmed = s.trim();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            match serde_json::from_str::<Value>(trimmed) {
                Ok(parsed) => return parsed,
                Err(_) => logger::log(&format!("soft-parse failed for question id {}", id)),
            }
        }
    }
    value.clone()
}

fn coerce_answer(value: Value, index: usize) -> Result<Answer, NormalizeError> {
    match value {
        Value::String(s) => Ok(Answer::Choice(s)),
        Value::Array(items) => {
            let mut selection = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => selection.push(s),
                    other => {
                        return Err(NormalizeError::MalformedElement {
                            index,
                            reason: format!("non-string entry in answer array: {}", other),
                        });
                    }
                }
            }
            Ok(Answer::Selection(selection))
        }
        Value::Object(map) => {
            let mut mapping = std::collections::BTreeMap::new();
            for (key, item) in map {
                match item {
                    Value::String(s) => {
                        mapping.insert(key, s);
                    }
                    other => {
                        return Err(NormalizeError::MalformedElement {
                            index,
                            reason: format!("non-string entry in answer mapping: {}", other),
                        });
                    }
                }
            }
            Ok(Answer::Mapping(mapping))
        }
        other => Err(NormalizeError::MalformedElement {
            index,
            reason: format!("unsupported answer shape: {}", other),
        }),
    }
}

/// A structured answer must agree with the declared question type. A plain
/// string is accepted for every type: it is what a failed soft-parse leaves
/// behind, and rejecting it here would turn that soft failure fatal.
fn check_answer_shape(
    answer: &Answer,
    kind: QuestionType,
    id: &str,
    index: usize,
) -> Result<(), NormalizeError> {
    let matches = match (answer, kind) {
        (Answer::Choice(_), _) => true,
        (Answer::Selection(_), QuestionType::MultiSelect) => true,
        (Answer::Mapping(_), QuestionType::Categorize) => true,
        _ => false,
    };
    if !matches {
        return Err(NormalizeError::MalformedElement {
            index,
            reason: format!("answer shape does not match question type for id {}", id),
        });
    }
    if matches!(answer, Answer::Choice(_)) && kind != QuestionType::SingleChoice {
        logger::log(&format!(
            "question id {} keeps a plain-string answer for a {:?} question",
            id, kind
        ));
    }
    Ok(())
}

fn normalize_question(index: usize, value: &Value) -> Result<Question, NormalizeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| NormalizeError::MalformedElement {
            index,
            reason: "element is not an object".to_string(),
        })?;

    let id = require_str(obj, "id", index)?.to_string();
    let subject = normalize_subject(require_str(obj, "subject", index)?);
    let topic = require_str(obj, "topic", index)?.to_string();
    let kind = parse_question_type(require_str(obj, "type", index)?);
    let cognitive_level = require_str(obj, "cognitiveLevel", index)?.to_string();
    let text = require_str(obj, "text", index)?.to_string();

    let raw_answer = obj
        .get("correctAnswer")
        .ok_or_else(|| NormalizeError::MalformedElement {
            index,
            reason: "missing field 'correctAnswer'".to_string(),
        })?;
    let correct_answer = coerce_answer(recover_nested_answer(&id, raw_answer), index)?;
    check_answer_shape(&correct_answer, kind, &id, index)?;

    let passage = obj
        .get("passage")
        .and_then(Value::as_str)
        .map(str::to_string);
    let explanation = obj
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::to_string);

    let options = obj
        .get("options")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let categories = obj
        .get("categories")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let statement = item.get("statement")?.as_str()?.to_string();
                    let category = item.get("category")?.as_str()?.to_string();
                    Some(CategoryItem {
                        statement,
                        category,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Question {
        id,
        subject,
        topic,
        kind,
        cognitive_level,
        text,
        passage,
        options,
        categories,
        correct_answer,
        explanation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_choice_element() -> &'static str {
        r#"{
            "id": "m1",
            "subject": "Matematika",
            "topic": "Pecahan",
            "type": "Pilihan Ganda",
            "cognitiveLevel": "L2",
            "text": "Berapa 1/2 + 1/4?",
            "options": ["1/2", "3/4", "2/4", "1"],
            "correctAnswer": "B",
            "explanation": "1/2 sama dengan 2/4."
        }"#
    }

    #[test]
    fn test_parse_bare_payload() {
        let raw = format!("[{}]", single_choice_element());
        let questions = parse_questions(&raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "m1");
        assert_eq!(questions[0].subject, Subject::Matematika);
        assert_eq!(questions[0].kind, QuestionType::SingleChoice);
        assert_eq!(questions[0].correct_answer, Answer::Choice("B".to_string()));
        assert_eq!(questions[0].options.len(), 4);
    }

    #[test]
    fn test_fence_variants_yield_same_result() {
        let bare = format!("[{}]", single_choice_element());
        let fenced_json = format!("```json\n{}\n```", bare);
        let fenced_plain = format!("```\n{}\n```", bare);
        let fenced_upper = format!("```JSON\n{}\n```", bare);
        let with_commentary = format!("Here are your questions:\n{}\nGood luck!", bare);

        let expected = parse_questions(&bare).unwrap();
        assert_eq!(parse_questions(&fenced_json).unwrap(), expected);
        assert_eq!(parse_questions(&fenced_plain).unwrap(), expected);
        assert_eq!(parse_questions(&fenced_upper).unwrap(), expected);
        assert_eq!(parse_questions(&with_commentary).unwrap(), expected);
    }

    #[test]
    fn test_multibyte_fence_info_string_does_not_panic() {
        // An info string whose fourth byte falls inside a multibyte
        // character must be treated as a bare fence, not sliced.
        let bare = format!("[{}]", single_choice_element());
        let fenced = format!("```jsón\n{}\n```", bare);
        assert_eq!(parse_questions(&fenced).unwrap(), parse_questions(&bare).unwrap());

        let empty = parse_questions("```abcé\n[]");
        assert_eq!(empty.unwrap(), Vec::new());
    }

    #[test]
    fn test_double_encoded_array_answer_is_recovered() {
        let raw = r#"[{
            "id": "m2",
            "subject": "Matematika",
            "topic": "Geometri",
            "type": "Pilihan Ganda Kompleks (MCMA)",
            "cognitiveLevel": "L3",
            "text": "Pilih semua bangun datar.",
            "options": ["Kubus", "Persegi", "Bola", "Segitiga"],
            "correctAnswer": "[\"B\",\"D\"]"
        }]"#;

        let questions = parse_questions(raw).unwrap();
        assert_eq!(
            questions[0].correct_answer,
            Answer::Selection(vec!["B".to_string(), "D".to_string()])
        );
    }

    #[test]
    fn test_double_encoded_mapping_answer_is_recovered() {
        let raw = r#"[{
            "id": "b1",
            "subject": "Bahasa Indonesia",
            "topic": "Teks Informasi",
            "type": "Pilihan Ganda Kompleks (Kategori)",
            "cognitiveLevel": "L2",
            "text": "Tentukan benar atau salah.",
            "categories": [
                {"statement": "Air membeku pada 0 derajat.", "category": "Benar"},
                {"statement": "Es lebih berat dari air.", "category": "Salah"}
            ],
            "correctAnswer": "{\"0\": \"Benar\", \"1\": \"Salah\"}"
        }]"#;

        let questions = parse_questions(raw).unwrap();
        match &questions[0].correct_answer {
            Answer::Mapping(map) => {
                assert_eq!(map.get("0").map(String::as_str), Some("Benar"));
                assert_eq!(map.get("1").map(String::as_str), Some("Salah"));
            }
            other => panic!("expected mapping, got {:?}", other),
        }
        assert_eq!(questions[0].categories.len(), 2);
        assert_eq!(questions[0].kind, QuestionType::Categorize);
    }

    #[test]
    fn test_unparsable_nested_answer_stays_a_string() {
        let raw = r#"[{
            "id": "b2",
            "subject": "Bahasa Indonesia",
            "topic": "Kosakata",
            "type": "Pilihan Ganda Kompleks (Kategori)",
            "cognitiveLevel": "L1",
            "text": "Tentukan kategori.",
            "correctAnswer": "{not valid json"
        }]"#;

        let questions = parse_questions(raw).unwrap();
        assert_eq!(
            questions[0].correct_answer,
            Answer::Choice("{not valid json".to_string())
        );
    }

    #[test]
    fn test_subject_normalization_defaults_to_language() {
        assert_eq!(normalize_subject("Matematika"), Subject::Matematika);
        assert_eq!(normalize_subject("NUMERASI"), Subject::Matematika);
        assert_eq!(normalize_subject("numeracy"), Subject::Matematika);
        assert_eq!(normalize_subject("Bahasa Indonesia"), Subject::BahasaIndonesia);
        assert_eq!(normalize_subject("Science"), Subject::BahasaIndonesia);
        assert_eq!(normalize_subject(""), Subject::BahasaIndonesia);
    }

    #[test]
    fn test_missing_required_field_names_the_element() {
        let raw = r#"[{
            "id": "m3",
            "subject": "Matematika",
            "topic": "Pecahan",
            "type": "Pilihan Ganda",
            "text": "Soal tanpa level kognitif.",
            "correctAnswer": "A"
        }]"#;

        match parse_questions(raw) {
            Err(NormalizeError::MalformedElement { index, reason }) => {
                assert_eq!(index, 0);
                assert!(reason.contains("cognitiveLevel"));
            }
            other => panic!("expected MalformedElement, got {:?}", other),
        }
    }

    #[test]
    fn test_prose_without_array_is_malformed_payload() {
        let result = parse_questions("The model is busy right now, please retry.");
        assert!(matches!(result, Err(NormalizeError::MalformedPayload(_))));
    }

    #[test]
    fn test_unbalanced_brackets_are_malformed_payload() {
        let result = parse_questions("] leading close, no open [");
        assert!(matches!(result, Err(NormalizeError::MalformedPayload(_))));
    }

    #[test]
    fn test_structured_answer_must_match_declared_type() {
        // A clean JSON array answer on a single-choice question is a
        // generator contract violation, not a soft failure.
        let raw = r#"[{
            "id": "m4",
            "subject": "Matematika",
            "topic": "Geometri",
            "type": "Pilihan Ganda",
            "cognitiveLevel": "L1",
            "text": "Soal pilihan tunggal.",
            "correctAnswer": ["A", "B"]
        }]"#;

        assert!(matches!(
            parse_questions(raw),
            Err(NormalizeError::MalformedElement { index: 0, .. })
        ));
    }

    #[test]
    fn test_question_type_labels() {
        assert_eq!(parse_question_type("Pilihan Ganda"), QuestionType::SingleChoice);
        assert_eq!(
            parse_question_type("Pilihan Ganda Kompleks (MCMA)"),
            QuestionType::MultiSelect
        );
        assert_eq!(
            parse_question_type("pilihan ganda kompleks (kategori)"),
            QuestionType::Categorize
        );
        assert_eq!(parse_question_type("unknown"), QuestionType::SingleChoice);
    }
}
