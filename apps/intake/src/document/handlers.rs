use std::path::{Path, PathBuf};

use axum::{
    extract::{Multipart, State},
    response::Html,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::catalog::Group;
use crate::document::normalizer::{NormalizeWarning, RawRecord};
use crate::document::stringify::stringify;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmitFormResponse {
    pub artifact_path: PathBuf,
    pub applicant: String,
    pub sections: Vec<Group>,
    pub warnings: Vec<NormalizeWarning>,
}

/// POST /api/v1/forms
pub async fn handle_submit_form(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmitFormResponse>, AppError> {
    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        // Uploaded files (resume attachments) are stored elsewhere.
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Unreadable field '{name}': {e}")))?;
        fields.push((name, value));
    }

    let raw = RawRecord::from_text_fields(fields);
    let destination = destination_for(&state.config.output_dir, &raw)?;
    info!(
        "Form submission with {} fields → {}",
        raw.len(),
        destination.display()
    );

    let generated = state.pipeline.generate(&raw, destination).await?;
    Ok(Json(SubmitFormResponse {
        artifact_path: generated.artifact_path,
        applicant: generated.applicant,
        sections: generated.sections,
        warnings: generated.warnings,
    }))
}

/// POST /api/v1/forms/preview
pub async fn handle_preview_form(
    State(state): State<AppState>,
    Json(raw): Json<RawRecord>,
) -> Result<Html<String>, AppError> {
    Ok(Html(state.pipeline.preview(&raw)?))
}

/// `<output_dir>/<name>_<family>_form.pdf`, with anything outside letters,
/// digits and `-` replaced by `_`.
pub fn destination_for(output_dir: &Path, raw: &RawRecord) -> Result<PathBuf, AppError> {
    let parts: Vec<String> = ["name", "family"]
        .iter()
        .filter_map(|key| raw.get(key))
        .map(|value| sanitize(&stringify(value)))
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        return Err(AppError::Validation(
            "Either 'name' or 'family' is required".to_string(),
        ));
    }
    Ok(output_dir.join(format!("{}_form.pdf", parts.join("_"))))
}

fn sanitize(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
