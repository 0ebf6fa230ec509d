use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One incoming transfer scraped from the history page.
///
/// Every field is the verbatim text of its markup element; amounts are not
/// parsed into numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Unique business transaction id, also the table key.
    pub id: String,
    pub time: String,
    pub description: String,
    /// Income amount text, e.g. "+ 25.00".
    pub income: String,
    /// Account balance after the transfer.
    pub balance: String,
    /// Display name of the sender.
    pub sender: String,
}

/// Transfer records keyed by transaction id.
///
/// Rebuilt from scratch on every poll; previous contents are discarded,
/// never merged. Only income rows are ever inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTable {
    records: BTreeMap<String, TransferRecord>,
}

impl TransferTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = TransferRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
        }
    }

    pub fn insert(&mut self, record: TransferRecord) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<&TransferRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransferRecord> {
        self.records.values()
    }
}

impl IntoIterator for TransferTable {
    type Item = (String, TransferRecord);
    type IntoIter = btree_map::IntoIter<String, TransferRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
