//! Render Engine Adapter: markup → PDF artifact at a destination path.
//!
//! Flow: create parent dirs → stage temp file next to the destination →
//! launch session → load → bounded settle wait → print to staging file →
//! close session → verify non-empty → atomic rename onto the destination.
//!
//! The destination is only ever written by the final rename, so a failed
//! render leaves nothing behind there.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::render::engine::{EngineError, PageSetup, RenderEngine, SessionGuard};

/// Upper bound for the layout-settle wait when none is configured.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(20);

/// Staging files are created owner-only; artifacts are readable by everyone.
#[cfg(unix)]
const ARTIFACT_MODE: u32 = 0o644;

#[derive(Debug, Error)]
#[error("failed to render {}: {cause}", .destination.display())]
pub struct RenderFailure {
    pub destination: PathBuf,
    #[source]
    pub cause: EngineError,
}

#[derive(Clone)]
pub struct RenderAdapter {
    engine: Arc<dyn RenderEngine>,
    page: PageSetup,
    settle_timeout: Duration,
}

impl RenderAdapter {
    pub fn new(engine: Arc<dyn RenderEngine>, settle_timeout: Duration) -> Self {
        Self {
            engine,
            page: PageSetup::default(),
            settle_timeout,
        }
    }

    pub fn with_page_setup(mut self, page: PageSetup) -> Self {
        self.page = page;
        self
    }

    pub fn settle_timeout(&self) -> Duration {
        self.settle_timeout
    }

    /// Renders `markup` into a PDF at `destination` and returns that path.
    pub async fn render_to_file(
        &self,
        markup: &str,
        destination: &Path,
    ) -> Result<PathBuf, RenderFailure> {
        let fail = |cause: EngineError| RenderFailure {
            destination: destination.to_path_buf(),
            cause,
        };

        let parent = match destination.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| fail(e.into()))?;

        // Same directory as the destination so the final rename stays on one filesystem.
        let staging = tempfile::Builder::new()
            .prefix(".render-")
            .suffix(".pdf.part")
            .tempfile_in(parent)
            .map_err(|e| fail(e.into()))?;

        let session = self.engine.launch().await.map_err(fail)?;
        let mut guard = SessionGuard::new(session);

        let outcome = self.drive(&mut guard, markup, staging.path()).await;
        if let Err(e) = guard.close().await {
            warn!("Closing render session for {} failed: {e}", destination.display());
        }
        outcome.map_err(fail)?;

        let written = tokio::fs::metadata(staging.path())
            .await
            .map_err(|e| fail(e.into()))?
            .len();
        if written == 0 {
            return Err(fail(EngineError::EmptyOutput));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staging
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(ARTIFACT_MODE))
                .map_err(|e| fail(e.into()))?;
        }

        staging
            .persist(destination)
            .map_err(|e| fail(e.error.into()))?;

        info!(
            "Rendered {} ({} bytes) with {}",
            destination.display(),
            written,
            self.engine.name()
        );
        Ok(destination.to_path_buf())
    }

    async fn drive(
        &self,
        guard: &mut SessionGuard,
        markup: &str,
        output: &Path,
    ) -> Result<(), EngineError> {
        let session = guard.session()?;
        session.load(markup, &self.page).await?;
        tokio::time::timeout(self.settle_timeout, session.wait_until_settled())
            .await
            .map_err(|_| EngineError::SettleTimeout(self.settle_timeout))??;
        session.print_to(output).await
    }
}
