//! Render Pipeline: one submission from raw record to artifact path.
//!
//! Flow: normalize → build model → render markup → render_to_file.
//!
//! Everything before the engine is pure and best-effort. The engine step runs
//! on its own task: if the caller's future is dropped (client disconnect),
//! the render still finishes and its session is still torn down.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::catalog::{Group, Locale};
use crate::document::model::{build, DocumentModel};
use crate::document::normalizer::{normalize, NormalizeWarning, RawRecord};
use crate::document::template::{TemplateHelpers, TemplateRenderer};
use crate::render::{RenderAdapter, RenderFailure};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Render(#[from] RenderFailure),

    #[error("render task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Pure output of the stages before the render engine.
#[derive(Debug)]
pub struct PreparedDocument {
    pub model: DocumentModel,
    pub markup: String,
    pub warnings: Vec<NormalizeWarning>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedDocument {
    pub artifact_path: PathBuf,
    pub applicant: String,
    pub sections: Vec<Group>,
    pub warnings: Vec<NormalizeWarning>,
}

pub struct RenderPipeline {
    templates: TemplateRenderer,
    adapter: RenderAdapter,
}

impl RenderPipeline {
    pub fn new(locale: Locale, adapter: RenderAdapter) -> Result<Self, tera::Error> {
        Ok(Self {
            templates: TemplateRenderer::new(locale, TemplateHelpers::default())?,
            adapter,
        })
    }

    pub fn locale(&self) -> Locale {
        self.templates.locale()
    }

    /// Runs every stage up to and including markup rendering.
    pub fn prepare(&self, raw: &RawRecord) -> Result<PreparedDocument, tera::Error> {
        let mut normalized = normalize(raw, self.locale());
        let warnings = std::mem::take(&mut normalized.warnings);
        let model = build(&normalized);
        let markup = self.templates.render(&model)?;
        Ok(PreparedDocument {
            model,
            markup,
            warnings,
        })
    }

    /// Document markup for `raw`, without touching the render engine.
    pub fn preview(&self, raw: &RawRecord) -> Result<String, PipelineError> {
        Ok(self.prepare(raw)?.markup)
    }

    /// Renders `raw` into a PDF at `destination`.
    pub async fn generate(
        &self,
        raw: &RawRecord,
        destination: PathBuf,
    ) -> Result<GeneratedDocument, PipelineError> {
        let PreparedDocument {
            model,
            markup,
            warnings,
        } = self.prepare(raw)?;

        info!(
            "Rendering document for '{}' ({} sections, {} warnings)",
            model.applicant,
            model.visible_groups().len(),
            warnings.len()
        );

        let adapter = self.adapter.clone();
        let render =
            tokio::spawn(async move { adapter.render_to_file(&markup, &destination).await });
        let artifact_path = render.await??;

        Ok(GeneratedDocument {
            artifact_path,
            sections: model.visible_groups(),
            applicant: model.applicant,
            warnings,
        })
    }
}
