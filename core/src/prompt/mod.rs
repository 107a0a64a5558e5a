//! Prompt rendering. Each layout is paired with the parser that reads it back.

use crate::event::{ClassificationLabel, EventRecord};
use crate::parsing::{JsonExtraction, JsonSchemaParser, LinePrefixParser};
use crate::prelude::ResponseParser;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::str::FromStr;

/// Output layout requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptLayout {
    /// `Classification:` / `Confidence:` / `Reasoning:` lines.
    #[default]
    LinePrefix,
    /// A single JSON object with three string fields.
    Json,
}

impl PromptLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptLayout::LinePrefix => "line-prefix",
            PromptLayout::Json => "json",
        }
    }

    pub fn render(&self, event: &EventRecord) -> String {
        let mut prompt = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            prompt,
            "Analyze the following particle detector event data and classify it as one of the following types: {}.",
            ClassificationLabel::vocabulary()
        );
        prompt.push_str(
            "Provide a confidence score (0-100%) for your classification and detailed reasoning based on the provided features.\n",
        );
        prompt.push_str("\nEvent Data:\n");
        let _ = writeln!(prompt, "Recoil Energy (keV): {:.4}", event.recoil_energy);
        let _ = writeln!(prompt, "Scintillation Yield: {:.4}", event.scintillation_yield);
        let _ = writeln!(prompt, "Ionization Charge: {:.4}", event.ionization_charge);
        if let Some(pulse_shape) = event.pulse_shape {
            let _ = writeln!(prompt, "Pulse Shape: {:.4}", pulse_shape);
        }
        if let Some(position) = event.position {
            let _ = writeln!(
                prompt,
                "Position (x, y, z): ({:.4}, {:.4}, {:.4})",
                position.x, position.y, position.z
            );
        }

        prompt.push_str("\nOutput Format:\n");
        match self {
            PromptLayout::LinePrefix => {
                prompt.push_str("Classification: [Classification Label]\n");
                prompt.push_str("Confidence: [Confidence Score]%\n");
                prompt.push_str("Reasoning: [Detailed reasoning]\n");
            }
            PromptLayout::Json => {
                prompt.push_str(
                    "Respond with a single JSON object and nothing else, using exactly these string fields:\n",
                );
                prompt.push_str(
                    "{\"classification\": \"<Classification Label>\", \"confidence\": \"<Confidence Score>%\", \"reasoning\": \"<Detailed reasoning>\"}\n",
                );
            }
        }
        prompt
    }

    /// Parser matching this layout, with greedy JSON extraction.
    pub fn parser(&self) -> Box<dyn ResponseParser> {
        self.parser_with(JsonExtraction::default())
    }

    pub fn parser_with(&self, extraction: JsonExtraction) -> Box<dyn ResponseParser> {
        match self {
            PromptLayout::LinePrefix => Box::new(LinePrefixParser),
            PromptLayout::Json => Box::new(JsonSchemaParser::new(extraction)),
        }
    }
}

impl fmt::Display for PromptLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line-prefix" | "lines" | "text" => Ok(PromptLayout::LinePrefix),
            "json" => Ok(PromptLayout::Json),
            other => Err(format!(
                "unknown prompt layout '{}' (expected 'line-prefix' or 'json')",
                other
            )),
        }
    }
}
