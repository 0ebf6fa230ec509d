//! Session lifecycle: log in, poll until expiry, log in again.

use anyhow::Result;
use tracing::{info, warn};

use crate::browser;
use crate::captcha::CaptchaResolver;
use crate::config::ResolvedConfig;
use crate::credentials::{Credentials, SessionData};
use crate::portal::{PortalClient, TransferPoll};
use crate::sink::TransferSink;

/// Drives the login/poll/expire cycle until the process is interrupted.
pub struct Watcher {
    config: ResolvedConfig,
    credentials: Credentials,
    resolver: Box<dyn CaptchaResolver>,
    sink: Box<dyn TransferSink>,
}

impl Watcher {
    pub fn new(
        config: ResolvedConfig,
        resolver: Box<dyn CaptchaResolver>,
        sink: Box<dyn TransferSink>,
    ) -> Result<Self> {
        let credentials = Credentials::from_config(&config.credentials)?;
        Ok(Self {
            config,
            credentials,
            resolver,
            sink,
        })
    }

    /// Run forever: each pass logs in and polls until the session dies.
    ///
    /// Login attempts are retried back-to-back without a cap; the only
    /// exits are a hard error or the operator's interrupt, handled by the
    /// caller.
    pub async fn run(&self) -> Result<()> {
        loop {
            let session =
                browser::login(&self.config, &self.credentials, self.resolver.as_ref()).await?;

            let Some(mut session) = session else {
                warn!("login failed; retrying from scratch");
                continue;
            };

            self.poll_until_expiry(&mut session).await?;
        }
    }

    /// Poll the transfer page on the configured interval until the portal
    /// redirects us back to the login page.
    async fn poll_until_expiry(&self, session: &mut SessionData) -> Result<()> {
        let client = PortalClient::new(&self.config.portal, session)?;
        let interval = self.config.watch.interval;

        loop {
            match client.fetch_transfers().await? {
                TransferPoll::Expired => {
                    warn!(
                        lifetime_secs = session.lifetime_secs,
                        "session expired; logging in again"
                    );
                    return Ok(());
                }
                TransferPoll::Records(table) => {
                    info!(
                        records = table.as_ref().map(|t| t.len()).unwrap_or(0),
                        sink = self.sink.name(),
                        "poll complete"
                    );
                    self.sink.publish(table.as_ref()).await?;
                }
            }

            client.keep_alive().await;
            tokio::time::sleep(interval).await;
            session.advance(interval);
        }
    }
}
