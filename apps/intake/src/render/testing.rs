//! In-process fake engine for exercising the adapter and pipeline without a browser.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::render::engine::{EngineError, PageSetup, RenderEngine, RenderSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBehavior {
    /// Prints the loaded markup verbatim as the "document".
    Succeed,
    FailLaunch,
    /// `wait_until_settled` never resolves.
    HangOnSettle,
    FailPrint,
    /// Prints zero bytes.
    EmptyOutput,
}

#[derive(Clone)]
pub struct FakeEngine {
    behavior: FakeBehavior,
    open: Arc<AtomicUsize>,
    launched: Arc<AtomicUsize>,
}

impl FakeEngine {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            open: Arc::new(AtomicUsize::new(0)),
            launched: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sessions launched and not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderEngine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn launch(&self) -> Result<Box<dyn RenderSession>, EngineError> {
        if self.behavior == FakeBehavior::FailLaunch {
            return Err(EngineError::Launch("simulated launch failure".to_string()));
        }
        self.launched.fetch_add(1, Ordering::SeqCst);
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            id: Uuid::new_v4(),
            behavior: self.behavior,
            markup: None,
            open: Arc::clone(&self.open),
        }))
    }
}

struct FakeSession {
    id: Uuid,
    behavior: FakeBehavior,
    markup: Option<String>,
    open: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderSession for FakeSession {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn load(&mut self, markup: &str, _page: &PageSetup) -> Result<(), EngineError> {
        self.markup = Some(markup.to_string());
        Ok(())
    }

    async fn wait_until_settled(&mut self) -> Result<(), EngineError> {
        if self.behavior == FakeBehavior::HangOnSettle {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn print_to(&mut self, output: &Path) -> Result<(), EngineError> {
        let body = match self.behavior {
            FakeBehavior::FailPrint => {
                return Err(EngineError::Print("simulated print failure".to_string()))
            }
            FakeBehavior::EmptyOutput => String::new(),
            _ => self.markup.clone().unwrap_or_default(),
        };
        tokio::fs::write(output, body).await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), EngineError> {
        self.open.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
