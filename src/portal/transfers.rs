//! Transfer-record extraction from the history page markup.

use anyhow::{anyhow, Context, Result};
use scraper::{ElementRef, Html, Selector};

use crate::config::RecordSelectors;
use crate::models::{TransferRecord, TransferTable};

/// Outcome of one transfer-history poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPoll {
    /// The request was redirected back to the login page.
    Expired,
    /// The freshly rebuilt table; absent when the page listed no rows.
    Records(Option<TransferTable>),
}

/// Record selectors compiled for extraction.
pub struct RecordExtractor {
    row: Selector,
    income_cell: Selector,
    transaction_id: Selector,
    time: Selector,
    description: Selector,
    balance: Selector,
    sender: Selector,
}

impl RecordExtractor {
    pub fn compile(config: &RecordSelectors) -> Result<Self> {
        Ok(Self {
            row: compile(&config.row)?,
            income_cell: compile(&config.income_cell)?,
            transaction_id: compile(&config.transaction_id)?,
            time: compile(&config.time)?,
            description: compile(&config.description)?,
            balance: compile(&config.balance)?,
            sender: compile(&config.sender)?,
        })
    }

    /// Extract income rows from the history page.
    ///
    /// Rows without an income cell are skipped. A row that has one but is
    /// missing any other field is an error naming the field.
    pub fn extract(&self, html: &str) -> Result<Vec<TransferRecord>> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for row in document.select(&self.row) {
            let Some(income_cell) = row.select(&self.income_cell).next() else {
                // not an income event
                continue;
            };

            records.push(TransferRecord {
                id: field_text(row, &self.transaction_id, "transaction id")?,
                time: field_text(row, &self.time, "time")?,
                description: field_text(row, &self.description, "description")?,
                income: element_text(income_cell),
                balance: field_text(row, &self.balance, "balance")?,
                sender: field_text(row, &self.sender, "sender")?,
            });
        }

        Ok(records)
    }

    /// Extract rows into a table keyed by transaction id, absent when the
    /// page listed none.
    pub fn extract_table(&self, html: &str) -> Result<Option<TransferTable>> {
        let records = self.extract(html)?;
        if records.is_empty() {
            Ok(None)
        } else {
            Ok(Some(TransferTable::from_records(records)))
        }
    }
}

fn field_text(row: ElementRef<'_>, selector: &Selector, name: &str) -> Result<String> {
    let element = row
        .select(selector)
        .next()
        .with_context(|| format!("transfer row is missing its {name} element"))?;
    Ok(element_text(element))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|err| anyhow!("invalid CSS selector {selector:?}: {err}"))
}
