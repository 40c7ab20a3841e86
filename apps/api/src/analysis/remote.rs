//! Remote analysis: one model call per analysis, parsed into an `AnalysisResult`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::analysis::models::{AnalysisMethod, AnalysisOutcome, AnalysisResult};
use crate::analysis::parser::{EmbeddedJsonParser, ResponseParser};
use crate::analysis::prompts::{
    ANALYSIS_MAX_TOKENS, ANALYSIS_PERSONA, ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_TEMPERATURE,
};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, REALISTIC_SCORING_INSTRUCTION};
use crate::llm_client::{CompletionModel, CompletionRequest, LlmError};

pub struct RemoteAnalyzer {
    model: Arc<dyn CompletionModel>,
    parser: Arc<dyn ResponseParser>,
}

impl RemoteAnalyzer {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self::with_parser(model, Arc::new(EmbeddedJsonParser))
    }

    pub fn with_parser(model: Arc<dyn CompletionModel>, parser: Arc<dyn ResponseParser>) -> Self {
        Self { model, parser }
    }

    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    /// Calls the model once. A response that cannot be parsed yields the
    /// placeholder result; transport failures are returned for the caller to classify.
    pub async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisOutcome, LlmError> {
        let request = build_request(resume_text, job_description);

        debug!(
            "Sending analysis request to {} ({}): resume {} bytes, job description {} bytes",
            self.model.provider(),
            self.model.model(),
            resume_text.len(),
            job_description.len()
        );

        let response = self.model.complete(request).await?;
        debug!(
            "Analysis response from {}: {} input tokens, {} output tokens",
            response.model, response.usage.input_tokens, response.usage.output_tokens
        );

        match self.parser.parse(&response.text) {
            Ok(result) => {
                debug!(
                    "Remote analysis parsed: match_score={}, found={}, missing={}",
                    result.match_score,
                    result.found_keywords.len(),
                    result.missing_keywords.len()
                );
                Ok(AnalysisOutcome::new(result, AnalysisMethod::Remote))
            }
            Err(e) => {
                warn!(
                    "Could not parse analysis response ({e}); returning placeholder. Raw: {:?}",
                    response.text.chars().take(200).collect::<String>()
                );
                Ok(AnalysisOutcome::new(
                    AnalysisResult::placeholder(),
                    AnalysisMethod::Placeholder,
                ))
            }
        }
    }
}

pub fn build_request(resume_text: &str, job_description: &str) -> CompletionRequest {
    let prompt = fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("resume_text", resume_text),
            ("job_description", job_description),
            ("realistic_scoring", REALISTIC_SCORING_INSTRUCTION),
        ],
    );

    CompletionRequest::new(format!("{ANALYSIS_PERSONA} {JSON_ONLY_SYSTEM}"), prompt)
        .with_temperature(ANALYSIS_TEMPERATURE)
        .with_max_tokens(ANALYSIS_MAX_TOKENS)
        .with_json_mode()
}

/// Single-pass `{name}` substitution. Substituted text is never rescanned, so
/// braces inside a resume or job description come through verbatim.
fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(
        template.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>(),
    );
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = vars.iter().find(|(name, _)| {
            tail.strip_prefix(*name)
                .is_some_and(|after| after.starts_with('}'))
        });
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
