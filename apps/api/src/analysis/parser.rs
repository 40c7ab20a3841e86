//! Response parsing: pull the analysis object out of free model text and
//! coerce it into a well-formed `AnalysisResult`.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::analysis::models::AnalysisResult;

/// Keys the remote payload must carry. Any missing key fails the parse.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "matchScore",
    "missingKeywords",
    "foundKeywords",
    "suggestions",
    "strengths",
    "weaknesses",
    "atsScore",
    "readabilityScore",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("No valid JSON object found in response")]
    NoJsonObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Turns raw model output into an `AnalysisResult`.
/// The engine only depends on this trait, so the extraction strategy can change
/// without touching orchestration.
pub trait ResponseParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<AnalysisResult, ParseError>;
}

/// Finds the first well-formed JSON object embedded in the text, checks the
/// required keys, and coerces values into range.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedJsonParser;

impl ResponseParser for EmbeddedJsonParser {
    fn parse(&self, text: &str) -> Result<AnalysisResult, ParseError> {
        let object = extract_first_object(text).ok_or(ParseError::NoJsonObject)?;

        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
            return Err(ParseError::MissingField(*missing));
        }

        Ok(AnalysisResult {
            match_score: coerce_score(&object["matchScore"]),
            ats_score: coerce_score(&object["atsScore"]),
            readability_score: coerce_score(&object["readabilityScore"]),
            found_keywords: coerce_list(&object["foundKeywords"]),
            missing_keywords: coerce_list(&object["missingKeywords"]),
            strengths: coerce_list(&object["strengths"]),
            weaknesses: coerce_list(&object["weaknesses"]),
            suggestions: coerce_list(&object["suggestions"]),
        })
    }
}

/// Returns the first `{`-starting span that parses as a complete JSON object.
/// Trailing prose after the object is ignored, as are code fences before it.
pub fn extract_first_object(text: &str) -> Option<Map<String, Value>> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .find_map(|(start, _)| {
            let mut stream =
                serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
            match stream.next() {
                Some(Ok(Value::Object(map))) => Some(map),
                _ => None,
            }
        })
}

/// Numbers (or numeric strings) rounded and clamped to 0..=100; anything else is 0.
fn coerce_score(value: &Value) -> u8 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() => v.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

/// Arrays keep their string elements; anything that is not an array is empty.
fn coerce_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
