//! Résumé text extraction from uploaded PDFs.
//!
//! The parsed document lives only inside `extract_resume_text`; it is dropped
//! before the function returns on every path.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("could not parse the upload as a PDF: {0}")]
    Parse(String),

    #[error("The uploaded PDF contains no extractable text.")]
    NoText,
}

/// Extracts the text of every page in page order and joins it into one string.
///
/// Fails when the payload is not a readable PDF or when the joined text is
/// empty or whitespace-only (e.g. scanned, image-only résumés).
pub fn extract_resume_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed font and xref structures.
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|payload| ExtractionError::Parse(panic_message(payload.as_ref())))?
    .map_err(|e| ExtractionError::Parse(e.to_string()))?;

    let page_count = pages.len();
    let text = join_pages(pages);

    if text.trim().is_empty() {
        return Err(ExtractionError::NoText);
    }

    debug!("Extracted {} chars from {page_count} page(s)", text.len());
    Ok(text)
}

/// Async wrapper that keeps the CPU-bound parse off the runtime workers.
pub async fn extract_resume_text_blocking(
    bytes: bytes::Bytes,
) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_resume_text(&bytes))
        .await
        .map_err(|e| ExtractionError::Parse(format!("extraction task failed: {e}")))?
}

fn join_pages(pages: Vec<String>) -> String {
    pages.concat()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("PDF parser panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("PDF parser panicked: {s}")
    } else {
        "PDF parser panicked".to_string()
    }
}
