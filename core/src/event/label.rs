use serde::{Deserialize, Serialize};
use std::fmt;

/// The four categories the model is asked to choose between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationLabel {
    #[serde(rename = "WIMP")]
    Wimp,
    #[serde(rename = "Axion-like particle")]
    AxionLike,
    #[serde(rename = "Sterile neutrino")]
    SterileNeutrino,
    Background,
}

impl ClassificationLabel {
    pub const ALL: [ClassificationLabel; 4] = [
        ClassificationLabel::Wimp,
        ClassificationLabel::AxionLike,
        ClassificationLabel::SterileNeutrino,
        ClassificationLabel::Background,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationLabel::Wimp => "WIMP",
            ClassificationLabel::AxionLike => "Axion-like particle",
            ClassificationLabel::SterileNeutrino => "Sterile neutrino",
            ClassificationLabel::Background => "Background",
        }
    }

    /// Matches a label as written by the model, ignoring case and trailing punctuation.
    pub fn from_response(text: &str) -> Option<Self> {
        let cleaned = text
            .trim()
            .trim_matches(|c: char| c == '*' || c == '"' || c == '\'')
            .trim_end_matches(|c: char| c == '.' || c == ',' || c == ';')
            .trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(cleaned))
    }

    /// Comma-separated vocabulary ending in "or", as used in prompts.
    pub fn vocabulary() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(|l| l.as_str()).collect();
        match names.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
            Some((last, _)) => last.to_string(),
            None => String::new(),
        }
    }
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
