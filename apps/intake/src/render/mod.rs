// Render Engine Adapter
// Drives an external headless browser to turn document markup into a PDF.
// One session per render; sessions are never pooled.

pub mod adapter;
pub mod chromium;
pub mod engine;
#[cfg(test)]
pub mod testing;

pub use adapter::{RenderAdapter, RenderFailure, DEFAULT_SETTLE_TIMEOUT};
pub use chromium::ChromiumEngine;
