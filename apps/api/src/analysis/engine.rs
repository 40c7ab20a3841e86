//! Analysis Engine: produces an `AnalysisResult` from a resume and a job description.
//!
//! Flow: remote configured? → one model call → parse (placeholder on failure)
//!       otherwise, or on a silent-class failure → heuristic scorer.
//!
//! Only two failure classes ever reach the caller:
//! - rate limits and network failures (`RetryableTransient`)
//! - model / permission denials (`FatalConfiguration`)
//!
//! Everything else is absorbed and answered with the heuristic result.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::heuristic::HeuristicScorer;
use crate::analysis::models::{AnalysisMethod, AnalysisOutcome};
use crate::analysis::remote::RemoteAnalyzer;
use crate::llm_client::{CompletionModel, LlmError};

/// Failures the caller must act on. Retrying is advisory; the engine never retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("The analysis service is temporarily unavailable ({reason}). Please try again shortly.")]
    RetryableTransient { reason: String },

    #[error("The analysis model could not be accessed ({reason}). Check the account's model permissions.")]
    FatalConfiguration { reason: String },
}

/// What the engine does with a remote failure.
#[derive(Debug, PartialEq, Eq)]
enum FailurePolicy {
    Fallback,
    Surface(AnalysisError),
}

fn classify(error: &LlmError) -> FailurePolicy {
    match error {
        LlmError::RateLimited { .. } => retry_later("rate limit exceeded"),
        LlmError::Network(_) => retry_later("network connection failed"),
        LlmError::Forbidden { message } => misconfigured(message),
        LlmError::Unauthorized { .. }
        | LlmError::CrossOrigin { .. }
        | LlmError::Api { .. }
        | LlmError::Transport(_)
        | LlmError::Decode(_)
        | LlmError::EmptyContent => FailurePolicy::Fallback,
    }
}

fn retry_later(reason: &str) -> FailurePolicy {
    FailurePolicy::Surface(AnalysisError::RetryableTransient {
        reason: reason.to_string(),
    })
}

fn misconfigured(reason: &str) -> FailurePolicy {
    FailurePolicy::Surface(AnalysisError::FatalConfiguration {
        reason: reason.to_string(),
    })
}

pub struct AnalysisEngine {
    remote: Option<RemoteAnalyzer>,
    heuristic: HeuristicScorer,
}

impl AnalysisEngine {
    /// `model` is `None` when no credential is configured; the engine then
    /// runs the heuristic scorer for every request.
    pub fn new(model: Option<Arc<dyn CompletionModel>>, heuristic: HeuristicScorer) -> Self {
        Self {
            remote: model.map(RemoteAnalyzer::new),
            heuristic,
        }
    }

    pub fn is_remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    pub fn remote_model(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.model_name())
    }

    pub async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let Some(remote) = &self.remote else {
            info!("Remote analysis not configured, using heuristic analysis");
            return Ok(self.heuristic_outcome(resume_text, job_description));
        };

        match remote.analyze(resume_text, job_description).await {
            Ok(outcome) => {
                info!(
                    "Analysis complete via {:?}: match_score={}",
                    outcome.method, outcome.result.match_score
                );
                Ok(outcome)
            }
            Err(e) => match classify(&e) {
                FailurePolicy::Surface(err) => {
                    warn!("Remote analysis failed, surfacing to caller: {e}");
                    Err(err)
                }
                FailurePolicy::Fallback => {
                    warn!("Remote analysis failed, falling back to heuristic analysis: {e}");
                    Ok(self.heuristic_outcome(resume_text, job_description))
                }
            },
        }
    }

    fn heuristic_outcome(&self, resume_text: &str, job_description: &str) -> AnalysisOutcome {
        AnalysisOutcome::new(
            self.heuristic.score(resume_text, job_description),
            AnalysisMethod::Heuristic,
        )
    }
}
