//! Downstream delivery of scraped transfer tables.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::models::TransferTable;

/// Receives the freshly rebuilt table after every poll.
///
/// This is intentionally minimal: one call per poll, table absent when
/// the page listed no rows. Implement it to forward records to whatever
/// system consumes them.
#[async_trait]
pub trait TransferSink: Send + Sync {
    /// Human-readable name for this sink.
    fn name(&self) -> &str;

    /// Called once per poll with the current table.
    async fn publish(&self, table: Option<&TransferTable>) -> Result<()>;
}

/// Default sink: logs every record of the current table.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl TransferSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, table: Option<&TransferTable>) -> Result<()> {
        let Some(table) = table else {
            info!("no transfer records found");
            return Ok(());
        };

        for record in table.iter() {
            info!(
                id = %record.id,
                time = %record.time,
                income = %record.income,
                balance = %record.balance,
                sender = %record.sender,
                description = %record.description,
                "incoming transfer"
            );
        }

        Ok(())
    }
}
