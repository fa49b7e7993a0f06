//! Ledger of intercept records plus the transfer-id index.
//!
//! Records are owned by a single ordered map keyed by [`RecordId`]; the
//! transfer index maps a host transfer id to a record id. Every index entry
//! points at a record that is still in the ledger.

mod record;

pub use record::{InterceptRecord, InterceptStatus, RecordId};

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::events::TransferId;

/// Aggregate counts over the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total: usize,
    pub downloading: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    records: BTreeMap<RecordId, InterceptRecord>,
    transfers: HashMap<TransferId, RecordId>,
    next_id: RecordId,
    max_history: usize,
}

impl Ledger {
    pub fn new(max_history: usize) -> Self {
        Self {
            records: BTreeMap::new(),
            transfers: HashMap::new(),
            next_id: 1,
            max_history: max_history.max(1),
        }
    }

    /// Id the next appended record will receive.
    pub fn next_id(&self) -> RecordId {
        self.next_id
    }

    /// Append a record, assigning its id. Evicts the oldest record (and its
    /// index entry) when the ledger is full.
    pub fn append(&mut self, mut record: InterceptRecord) -> RecordId {
        while self.records.len() >= self.max_history {
            match self.records.pop_first() {
                Some((_, evicted)) => {
                    if let Some(tid) = evicted.transfer_id {
                        self.transfers.remove(&tid);
                    }
                    tracing::debug!(record_id = evicted.id, "ledger full, evicted oldest record");
                }
                None => break,
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        record.id = id;
        self.records.insert(id, record);
        id
    }

    pub fn get(&self, id: RecordId) -> Option<&InterceptRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut InterceptRecord> {
        self.records.get_mut(&id)
    }

    /// Point `transfer_id` at record `id`. Returns false if the record is gone
    /// (evicted or cleared while the submission was in flight).
    pub fn index_transfer(&mut self, transfer_id: TransferId, id: RecordId) -> bool {
        if !self.records.contains_key(&id) {
            return false;
        }
        self.transfers.insert(transfer_id, id);
        true
    }

    pub fn by_transfer(&self, transfer_id: TransferId) -> Option<&InterceptRecord> {
        self.transfers
            .get(&transfer_id)
            .and_then(|id| self.records.get(id))
    }

    pub fn by_transfer_mut(&mut self, transfer_id: TransferId) -> Option<&mut InterceptRecord> {
        let id = *self.transfers.get(&transfer_id)?;
        self.records.get_mut(&id)
    }

    /// Records oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &InterceptRecord> {
        self.records.values()
    }

    pub fn snapshot(&self) -> Vec<InterceptRecord> {
        self.iter().cloned().collect()
    }

    pub fn stats(&self) -> LedgerStats {
        let mut stats = LedgerStats {
            total: self.records.len(),
            ..LedgerStats::default()
        };
        for r in self.records.values() {
            match r.status {
                InterceptStatus::Downloading => stats.downloading += 1,
                InterceptStatus::Completed => stats.completed += 1,
                InterceptStatus::Failed => stats.failed += 1,
                InterceptStatus::Intercepted => {}
            }
        }
        stats
    }

    /// Empty the ledger and the transfer index together. Record ids keep increasing.
    pub fn clear(&mut self) {
        self.records.clear();
        self.transfers.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }
}
