//! Résumé evaluation: extract the uploaded PDF, ask the model, shape the outcome.
//!
//! Every request ends in exactly one `EvaluationOutcome`. Extraction failures and
//! missing uploads never reach the model; model failures are folded into the
//! response text so the page still renders.

pub mod handlers;
pub mod page;
pub mod prompts;

use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::extraction::extract_resume_text_blocking;
use crate::llm_client::TextGenerator;

pub const MISSING_RESUME_WARNING: &str = "Please upload a resume.";

/// Which of the two actions the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    Evaluate,
    PercentageMatch,
}

impl EvaluationKind {
    /// Parses the submitted `action` value. A missing action means `Evaluate`.
    pub fn from_action(action: Option<&str>) -> Result<Self, AppError> {
        match action.map(str::trim) {
            None | Some("") | Some("evaluate") => Ok(Self::Evaluate),
            Some("match") | Some("percentage_match") => Ok(Self::PercentageMatch),
            Some(other) => Err(AppError::Validation(format!(
                "unknown action '{other}', expected 'evaluate' or 'match'"
            ))),
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Self::Evaluate => prompts::EVALUATE_INSTRUCTION,
            Self::PercentageMatch => prompts::PERCENTAGE_MATCH_INSTRUCTION,
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Self::Evaluate => "Evaluation Response",
            Self::PercentageMatch => "Percentage Match",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    /// Model output, or the readable generation-failure text.
    Response { heading: String, text: String },
    /// The résumé could not be processed; no model call was made.
    Error { message: String },
    /// Nothing to evaluate; no model call was made.
    Warning { message: String },
}

/// Runs one evaluation end to end. Makes at most one call to `generator`.
pub async fn run_evaluation(
    generator: &dyn TextGenerator,
    job_description: &str,
    resume: Option<Bytes>,
    kind: EvaluationKind,
) -> EvaluationOutcome {
    let Some(resume) = resume.filter(|bytes| !bytes.is_empty()) else {
        warn!("Evaluation requested without a résumé upload");
        return EvaluationOutcome::Warning {
            message: MISSING_RESUME_WARNING.to_string(),
        };
    };

    let resume_text = match extract_resume_text_blocking(resume).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Résumé extraction failed: {e}");
            return EvaluationOutcome::Error {
                message: format!("Error processing resume: {e}"),
            };
        }
    };

    info!(
        kind = ?kind,
        jd_chars = job_description.len(),
        resume_chars = resume_text.len(),
        "Requesting evaluation"
    );

    let text = match generator
        .generate(job_description, &resume_text, kind.instruction())
        .await
    {
        Ok(text) => text,
        Err(e) => {
            error!("Generation failed: {e}");
            format!("Error generating response: {e}")
        }
    };

    EvaluationOutcome::Response {
        heading: kind.heading().to_string(),
        text,
    }
}
