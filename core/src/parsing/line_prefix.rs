use crate::prelude::{ClassificationResult, ClassifyResult, Confidence, ResponseParser};

const CLASSIFICATION_PREFIX: &str = "Classification:";
const CONFIDENCE_PREFIX: &str = "Confidence:";
const REASONING_PREFIX: &str = "Reasoning:";

/// Reads `Classification:` / `Confidence:` / `Reasoning:` lines.
///
/// Prefixes are matched case-sensitively at the start of a line. Missing lines
/// leave the field unset and a later line overrides an earlier one. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinePrefixParser;

impl LinePrefixParser {
    fn parse_confidence(value: &str) -> Option<Confidence> {
        value
            .replace('%', "")
            .trim()
            .parse::<u32>()
            .ok()
            .map(Confidence::Percent)
    }
}

impl ResponseParser for LinePrefixParser {
    fn parse(&self, raw: &str) -> ClassifyResult<ClassificationResult> {
        let mut result = ClassificationResult::default();

        for line in raw.lines() {
            if let Some(rest) = line.strip_prefix(CLASSIFICATION_PREFIX) {
                result.classification = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix(CONFIDENCE_PREFIX) {
                result.confidence = Self::parse_confidence(rest.trim());
            } else if let Some(rest) = line.strip_prefix(REASONING_PREFIX) {
                result.reasoning = Some(rest.trim().to_string());
            }
        }

        Ok(result)
    }
}
