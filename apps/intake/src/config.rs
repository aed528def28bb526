use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::catalog::Locale;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory generated PDFs are written into.
    pub output_dir: PathBuf,
    /// Program name or path of the headless browser.
    pub chromium_bin: PathBuf,
    pub render_settle_timeout: Duration,
    pub locale: Locale,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            output_dir: PathBuf::from(env_or("OUTPUT_DIR", "uploads/forms")),
            chromium_bin: PathBuf::from(env_or("CHROMIUM_BIN", "chromium")),
            render_settle_timeout: env_or("RENDER_SETTLE_TIMEOUT_SECS", "20")
                .parse::<u64>()
                .map(Duration::from_secs)
                .context("RENDER_SETTLE_TIMEOUT_SECS must be a whole number of seconds")?,
            locale: env_or("DOCUMENT_LOCALE", "en")
                .parse::<Locale>()
                .context("DOCUMENT_LOCALE must be 'en' or 'fa'")?,
        })
    }

    #[cfg(test)]
    pub fn for_tests(output_dir: impl Into<PathBuf>) -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            output_dir: output_dir.into(),
            chromium_bin: PathBuf::from("chromium"),
            render_settle_timeout: crate::render::DEFAULT_SETTLE_TIMEOUT,
            locale: Locale::En,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
