use serde::{Deserialize, Serialize};

/// Result of comparing one resume against one job description.
///
/// Scores are integers in 0..=100 and the list fields are always present.
/// Field names serialize in camelCase to match the remote response schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub match_score: u8,
    pub ats_score: u8,
    pub readability_score: u8,
    #[serde(default)]
    pub found_keywords: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl AnalysisResult {
    /// Low-confidence result returned when the remote service answered but
    /// its payload could not be extracted or validated.
    pub fn placeholder() -> Self {
        Self {
            match_score: 65,
            ats_score: 60,
            readability_score: 70,
            found_keywords: vec!["Analysis completed".to_string()],
            missing_keywords: vec!["Unable to parse detailed keywords".to_string()],
            strengths: vec!["Resume submitted successfully".to_string()],
            weaknesses: vec!["Technical parsing error occurred".to_string()],
            suggestions: vec![
                "AI analysis completed but response parsing failed".to_string(),
                "Please try again or contact support".to_string(),
                "Manual review of resume recommended".to_string(),
            ],
        }
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.match_score)
    }
}

/// Which path produced an `AnalysisResult`. Reported for transparency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    Remote,
    Heuristic,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub method: AnalysisMethod,
}

impl AnalysisOutcome {
    pub fn new(result: AnalysisResult, method: AnalysisMethod) -> Self {
        Self { result, method }
    }
}

/// Coarse grouping of a match score used for labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            ScoreBand::Strong
        } else if score >= 60 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Strong => "Strong match",
            ScoreBand::Moderate => "Moderate match",
            ScoreBand::Weak => "Needs improvement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(AnalysisResult::placeholder()).unwrap();
        for key in [
            "matchScore",
            "atsScore",
            "readabilityScore",
            "foundKeywords",
            "missingKeywords",
            "strengths",
            "weaknesses",
            "suggestions",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn test_missing_lists_deserialize_as_empty() {
        let json = r#"{"matchScore": 40, "atsScore": 70, "readabilityScore": 80}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert!(result.found_keywords.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_placeholder_scores() {
        let p = AnalysisResult::placeholder();
        assert_eq!((p.match_score, p.ats_score, p.readability_score), (65, 60, 70));
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(80), ScoreBand::Strong);
        assert_eq!(ScoreBand::from_score(79), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(60), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(59), ScoreBand::Weak);
        assert_eq!(ScoreBand::from_score(0), ScoreBand::Weak);
    }

    #[test]
    fn test_method_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AnalysisMethod::Heuristic).unwrap(),
            "\"heuristic\""
        );
    }
}
