use crate::prelude::{
    ClassificationResult, ClassifyError, ClassifyResult, Confidence, ResponseParser,
};
use serde::{Deserialize, Serialize};

/// How the JSON candidate is located inside the completion text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JsonExtraction {
    /// First `{` through last `}`. Stray braces in surrounding prose corrupt the span.
    #[default]
    Greedy,
    /// First brace-balanced object that satisfies the schema.
    Balanced,
}

#[derive(Debug, Deserialize)]
struct ResponseSchema {
    classification: String,
    confidence: String,
    reasoning: String,
}

impl From<ResponseSchema> for ClassificationResult {
    fn from(schema: ResponseSchema) -> Self {
        Self {
            classification: Some(schema.classification),
            confidence: Some(Confidence::Reported(schema.confidence)),
            reasoning: Some(schema.reasoning),
        }
    }
}

/// Extracts a JSON object from the completion and validates it against the
/// three-field schema. Validation failure is an error for that response.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaParser {
    extraction: JsonExtraction,
}

impl JsonSchemaParser {
    pub fn new(extraction: JsonExtraction) -> Self {
        Self { extraction }
    }

    fn validate(candidate: &str) -> ClassifyResult<ClassificationResult> {
        serde_json::from_str::<ResponseSchema>(candidate)
            .map(ClassificationResult::from)
            .map_err(|err| ClassifyError::InvalidResponse(err.to_string()))
    }

    fn parse_balanced(raw: &str) -> ClassifyResult<ClassificationResult> {
        let mut first_error = None;
        for candidate in balanced_objects(raw) {
            match Self::validate(candidate) {
                Ok(result) => return Ok(result),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Self::validate("{}"),
        }
    }
}

impl ResponseParser for JsonSchemaParser {
    fn parse(&self, raw: &str) -> ClassifyResult<ClassificationResult> {
        match self.extraction {
            JsonExtraction::Greedy => Self::validate(greedy_span(raw)),
            JsonExtraction::Balanced => Self::parse_balanced(raw),
        }
    }
}

/// First `{` through last `}`, or `{}` when no such span exists.
pub fn greedy_span(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => "{}",
    }
}

/// Top-level brace-balanced spans in order of appearance. Braces inside JSON
/// string literals are ignored.
fn balanced_objects(raw: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in raw.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = index;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&raw[start..=index]);
                }
            }
            _ => {}
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_after_prose() {
        let raw = r#"Here is the result: {"classification": "Background", "confidence": "10%", "reasoning": "low signal"}"#;
        let parsed = JsonSchemaParser::default().parse(raw).unwrap();
        assert_eq!(parsed.classification.as_deref(), Some("Background"));
        assert_eq!(parsed.confidence, Some(Confidence::Reported("10%".into())));
        assert_eq!(parsed.reasoning.as_deref(), Some("low signal"));
    }

    #[test]
    fn no_braces_fails_validation() {
        let err = JsonSchemaParser::default()
            .parse("I cannot classify this event.")
            .unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidResponse(_)));
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn non_string_confidence_fails_validation() {
        let raw = r#"{"classification": "WIMP", "confidence": 90, "reasoning": "r"}"#;
        assert!(JsonSchemaParser::default().parse(raw).is_err());
    }

    #[test]
    fn greedy_span_spans_first_to_last_brace() {
        assert_eq!(greedy_span("a {x} b {y} c"), "{x} b {y}");
        assert_eq!(greedy_span("} backwards {"), "{}");
        assert_eq!(greedy_span("nothing"), "{}");
    }

    #[test]
    fn greedy_extraction_breaks_on_stray_brace() {
        let raw = r#"{"classification": "WIMP", "confidence": "80%", "reasoning": "r"} (see note})"#;
        assert!(JsonSchemaParser::new(JsonExtraction::Greedy).parse(raw).is_err());
        let parsed = JsonSchemaParser::new(JsonExtraction::Balanced)
            .parse(raw)
            .unwrap();
        assert_eq!(parsed.classification.as_deref(), Some("WIMP"));
    }

    #[test]
    fn balanced_extraction_skips_invalid_objects() {
        let raw = r#"Units {keV}. Answer: {"classification": "Axion-like particle", "confidence": "55%", "reasoning": "brace } in text"}"#;
        let parsed = JsonSchemaParser::new(JsonExtraction::Balanced)
            .parse(raw)
            .unwrap();
        assert_eq!(parsed.classification.as_deref(), Some("Axion-like particle"));
        assert_eq!(parsed.reasoning.as_deref(), Some("brace } in text"));
    }

    #[test]
    fn balanced_extraction_without_objects_fails() {
        assert!(JsonSchemaParser::new(JsonExtraction::Balanced)
            .parse("no json here")
            .is_err());
    }
}
