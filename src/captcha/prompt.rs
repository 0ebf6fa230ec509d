//! Operator-entered check codes.

use std::path::Path;

use async_trait::async_trait;
use dialoguer::Input;
use tracing::info;

use super::{CaptchaError, CaptchaResolver};

/// Asks the operator to read the saved crop and type the code.
#[derive(Debug, Default)]
pub struct PromptResolver;

impl PromptResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CaptchaResolver for PromptResolver {
    fn name(&self) -> &str {
        "prompt"
    }

    async fn resolve(&self, image: &Path) -> Result<Option<String>, CaptchaError> {
        info!(image = %image.display(), "check the saved captcha image for the code");

        let prompt = format!("Check code from {}", image.display());
        let entered = tokio::task::spawn_blocking(move || {
            Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
        })
        .await
        .map_err(|err| CaptchaError::Prompt(err.to_string()))?
        .map_err(|err| CaptchaError::Prompt(err.to_string()))?;

        let code = entered.trim().to_string();
        if code.is_empty() {
            return Ok(None);
        }
        Ok(Some(code))
    }
}
