//! Authenticated portal access over plain HTTP.
//!
//! Polling never goes back through the browser: the cookies harvested at
//! login ride along as a `Cookie:` header on an ordinary client carrying
//! the portal's expected header set.

pub mod transfers;

pub use transfers::{RecordExtractor, TransferPoll};

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use tracing::{debug, warn};

use crate::config::PortalConfig;
use crate::credentials::SessionData;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:42.0) Gecko/20100101 Firefox/42.0";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.8,en-US;q=0.5,en;q=0.3";

/// Portal client bound to one session's cookies.
pub struct PortalClient {
    client: Client,
    login_url: String,
    transfer_url: String,
    keepalive_url: Option<String>,
    cookie_header: String,
    extractor: RecordExtractor,
}

impl PortalClient {
    /// Create a client from the portal config and a captured session.
    pub fn new(portal: &PortalConfig, session: &SessionData) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            login_url: portal.login_url.clone(),
            transfer_url: portal.transfer_url.clone(),
            keepalive_url: portal.keepalive_url.clone(),
            cookie_header: session.cookie_header(),
            extractor: RecordExtractor::compile(&portal.record_selectors)?,
        })
    }

    /// Make an authenticated GET request with the portal header set.
    async fn get(&self, url: &str) -> Result<Response> {
        self.client
            .get(url)
            .header("accept", ACCEPT)
            .header("accept-language", ACCEPT_LANGUAGE)
            .header("cookie", &self.cookie_header)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))
    }

    /// Fetch and extract the transfer-history page.
    ///
    /// A response whose final URL lands back on the login page means the
    /// session has expired; the caller must log in again.
    pub async fn fetch_transfers(&self) -> Result<TransferPoll> {
        let response = self.get(&self.transfer_url).await?;

        if response.url().as_str().starts_with(&self.login_url) {
            return Ok(TransferPoll::Expired);
        }

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Transfer page returned {status}");
        }

        let body = response
            .text()
            .await
            .context("Failed to read transfer page")?;

        Ok(TransferPoll::Records(self.extractor.extract_table(&body)?))
    }

    /// Visit the keep-alive page so the portal does not idle the session
    /// out between polls. Best-effort; failures only get logged.
    pub async fn keep_alive(&self) {
        let Some(url) = &self.keepalive_url else {
            return;
        };

        match self.get(url).await {
            Ok(_) => debug!("keep-alive request sent"),
            Err(err) => warn!(error = %err, "keep-alive request failed"),
        }
    }
}
