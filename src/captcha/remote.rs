//! Remote decoding service client.
//!
//! Uploads the cropped challenge as base64 together with the service
//! account and a type code describing the captcha variant, and reads the
//! decoded text out of the JSON reply.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::CaptchaServiceConfig;

use super::{CaptchaError, CaptchaResolver};

/// Error code the service uses for an account with no credit left.
const BALANCE_EXHAUSTED_CODE: i64 = 1001;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Decoding service client.
pub struct RemoteResolver {
    client: Client,
    endpoint: String,
    account: String,
    password: String,
    type_code: String,
}

#[derive(Debug, Deserialize)]
struct DecodeReply {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error: Option<String>,
}

impl RemoteResolver {
    pub fn new(config: &CaptchaServiceConfig) -> Result<Self, CaptchaError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            account: config.account.clone(),
            password: config.password.clone(),
            type_code: config.type_code.clone(),
        })
    }
}

#[async_trait]
impl CaptchaResolver for RemoteResolver {
    fn name(&self) -> &str {
        "remote"
    }

    async fn resolve(&self, image: &Path) -> Result<Option<String>, CaptchaError> {
        let bytes = std::fs::read(image)?;
        let encoded = BASE64.encode(&bytes);

        debug!(
            endpoint = %self.endpoint,
            bytes = bytes.len(),
            "uploading captcha to decoding service"
        );

        let form = [
            ("username", self.account.as_str()),
            ("password", self.password.as_str()),
            ("typeid", self.type_code.as_str()),
            ("image", encoded.as_str()),
        ];

        let response = self.client.post(&self.endpoint).form(&form).send().await?;
        let body = response.text().await?;

        parse_decode_reply(&body)
    }
}

fn parse_decode_reply(body: &str) -> Result<Option<String>, CaptchaError> {
    let reply: DecodeReply = serde_json::from_str(body)
        .map_err(|err| CaptchaError::Protocol(format!("{err}: {body}")))?;

    if let Some(code) = reply.error_code {
        if code == BALANCE_EXHAUSTED_CODE {
            return Err(CaptchaError::BalanceExhausted);
        }
        let message = reply
            .error
            .unwrap_or_else(|| format!("error code {code}"));
        return Err(CaptchaError::Rejected(message));
    }

    Ok(reply.result.filter(|answer| !answer.is_empty()))
}
