//! Check-code resolution.
//!
//! Two interchangeable resolvers: an operator prompt for the common case,
//! and a remote decoding service for unattended runs. The active variant
//! is picked from `[captcha]` config.

mod prompt;
mod remote;

pub use prompt::PromptResolver;
pub use remote::RemoteResolver;

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;

use crate::config::{CaptchaConfig, CaptchaMode};

/// Errors from a resolution attempt.
#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("decoding service balance exhausted")]
    BalanceExhausted,

    #[error("decoding service rejected the image: {0}")]
    Rejected(String),

    #[error("unexpected decoding service reply: {0}")]
    Protocol(String),

    #[error("captcha image unreadable: {0}")]
    Image(#[from] std::io::Error),

    #[error("decoding service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("operator prompt failed: {0}")]
    Prompt(String),
}

/// A strategy for turning a saved captcha crop into its text.
#[async_trait]
pub trait CaptchaResolver: Send + Sync {
    /// Human-readable name for log lines.
    fn name(&self) -> &str;

    /// Resolve the image at `image` to its check code.
    ///
    /// `Ok(None)` means the resolver declined (e.g. the operator entered
    /// nothing); the login is abandoned and retried from scratch.
    async fn resolve(&self, image: &Path) -> Result<Option<String>, CaptchaError>;
}

/// Build the resolver selected by config.
pub fn create_resolver(config: &CaptchaConfig) -> Result<Box<dyn CaptchaResolver>> {
    match config.mode {
        CaptchaMode::Prompt => Ok(Box::new(PromptResolver::new())),
        CaptchaMode::Remote => {
            let service = config
                .service
                .as_ref()
                .context("captcha.mode = \"remote\" requires a [captcha.service] section")?;
            Ok(Box::new(RemoteResolver::new(service)?))
        }
    }
}
