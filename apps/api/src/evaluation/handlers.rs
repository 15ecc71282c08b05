//! Axum route handlers for the evaluation form and JSON API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Html,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::page::{render_page, PageView};
use crate::evaluation::{run_evaluation, EvaluationKind, EvaluationOutcome};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// The submitted form fields. Unknown fields are ignored.
#[derive(Debug, Default)]
pub struct EvaluationForm {
    pub job_description: String,
    pub resume: Option<UploadedResume>,
    pub action: Option<String>,
}

#[derive(Debug)]
pub struct UploadedResume {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub evaluation_id: Uuid,
    pub kind: EvaluationKind,
    #[serde(flatten)]
    pub outcome: EvaluationOutcome,
}

impl EvaluationForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = EvaluationForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().map(String::from);
            match name.as_deref() {
                Some("job_description") => {
                    form.job_description = field.text().await.map_err(multipart_error)?;
                }
                Some("action") => {
                    form.action = Some(field.text().await.map_err(multipart_error)?);
                }
                Some("resume") => {
                    let file_name = field.file_name().map(String::from);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    // Browsers send an empty part when no file was chosen.
                    if !bytes.is_empty() {
                        form.resume = Some(UploadedResume { file_name, bytes });
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn kind(&self) -> Result<EvaluationKind, AppError> {
        EvaluationKind::from_action(self.action.as_deref())
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("invalid multipart body: {}", e.body_text()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_index() -> Html<String> {
    Html(render_page(&PageView::default()))
}

/// POST /
///
/// Form submission from either button. Re-renders the page with the outcome.
pub async fn handle_submit_form(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let form = EvaluationForm::from_multipart(multipart).await?;
    let kind = form.kind()?;

    let outcome = run_evaluation(
        state.generator.as_ref(),
        &form.job_description,
        form.resume.as_ref().map(|r| r.bytes.clone()),
        kind,
    )
    .await;

    Ok(Html(render_page(&PageView {
        job_description: &form.job_description,
        uploaded_file: form
            .resume
            .as_ref()
            .map(|r| r.file_name.as_deref().unwrap_or("resume.pdf")),
        outcome: Some(&outcome),
    })))
}

/// POST /api/v1/evaluations
///
/// Same multipart fields as the form; returns the outcome as JSON.
pub async fn handle_create_evaluation(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EvaluationResponse>, AppError> {
    let form = EvaluationForm::from_multipart(multipart).await?;
    let kind = form.kind()?;
    let evaluation_id = Uuid::new_v4();

    let outcome = run_evaluation(
        state.generator.as_ref(),
        &form.job_description,
        form.resume.map(|r| r.bytes),
        kind,
    )
    .instrument(info_span!("evaluation", %evaluation_id))
    .await;

    Ok(Json(EvaluationResponse {
        evaluation_id,
        kind,
        outcome,
    }))
}
