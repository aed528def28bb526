//! Render engine seam: an external process that turns markup into a PDF.
//!
//! A [`RenderEngine`] hands out one [`RenderSession`] per render. Sessions
//! are never shared or pooled. [`SessionGuard`] owns a session and makes sure
//! it is closed on every exit path, including a dropped future.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch render engine: {0}")]
    Launch(String),

    #[error("failed to load markup: {0}")]
    Load(String),

    #[error("layout did not settle within {0:?}")]
    SettleTimeout(Duration),

    #[error("render engine exited abnormally: {0}")]
    Crashed(String),

    #[error("failed to print document: {0}")]
    Print(String),

    #[error("render engine produced an empty document")]
    EmptyOutput,

    #[error("render session already closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Page setup
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaperFormat {
    A4,
}

impl PaperFormat {
    pub fn css_size(self) -> &'static str {
        match self {
            PaperFormat::A4 => "A4",
        }
    }
}

/// Print configuration applied to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageSetup {
    pub format: PaperFormat,
    /// Uniform margin on all four sides, in CSS pixels.
    pub margin_px: u32,
    pub print_background: bool,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            format: PaperFormat::A4,
            margin_px: 20,
            print_background: true,
        }
    }
}

impl PageSetup {
    /// Print stylesheet expressing this setup. Engines that honour CSS page
    /// size apply it by injecting this into the document head.
    pub fn print_css(&self) -> String {
        let mut css = format!(
            "@page {{ size: {}; margin: {}px; }}",
            self.format.css_size(),
            self.margin_px
        );
        if self.print_background {
            css.push_str(" html { -webkit-print-color-adjust: exact; print-color-adjust: exact; }");
        }
        css
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Traits
// ────────────────────────────────────────────────────────────────────────────

/// Carried in the adapter as `Arc<dyn RenderEngine>`.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Acquires a fresh, independent session.
    async fn launch(&self) -> Result<Box<dyn RenderSession>, EngineError>;
}

#[async_trait]
pub trait RenderSession: Send {
    fn id(&self) -> Uuid;

    /// Loads markup into a fresh rendering surface.
    async fn load(&mut self, markup: &str, page: &PageSetup) -> Result<(), EngineError>;

    /// Resolves once network assets and fonts have settled. Unbounded on its
    /// own; the adapter applies the timeout.
    async fn wait_until_settled(&mut self) -> Result<(), EngineError>;

    /// Writes the paginated document to `output`.
    async fn print_to(&mut self, output: &Path) -> Result<(), EngineError>;

    /// Releases every resource held by the session.
    async fn close(self: Box<Self>) -> Result<(), EngineError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Scoped session
// ────────────────────────────────────────────────────────────────────────────

/// Owns a session until [`SessionGuard::close`] is awaited. If the guard is
/// dropped first (error unwinding or a cancelled future), the close is
/// scheduled on the current tokio runtime.
pub struct SessionGuard {
    session: Option<Box<dyn RenderSession>>,
}

impl SessionGuard {
    pub fn new(session: Box<dyn RenderSession>) -> Self {
        debug!("Render session {} acquired", session.id());
        Self {
            session: Some(session),
        }
    }

    pub fn session(&mut self) -> Result<&mut (dyn RenderSession + 'static), EngineError> {
        match self.session.as_mut() {
            Some(session) => Ok(&mut **session),
            None => Err(EngineError::Closed),
        }
    }

    pub async fn close(mut self) -> Result<(), EngineError> {
        match self.session.take() {
            Some(session) => {
                let id = session.id();
                session.close().await?;
                debug!("Render session {id} closed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let id = session.id();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("Render session {id} abandoned; scheduling teardown");
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!("Deferred close of render session {id} failed: {e}");
                    }
                });
            }
            Err(_) => {
                warn!("Render session {id} dropped outside a runtime; releasing synchronously");
                drop(session);
            }
        }
    }
}
