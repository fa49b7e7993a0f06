//! Bounded, insertion-ordered store of candidate records.

use std::collections::{HashMap, VecDeque};

use super::CandidateRecord;

/// Candidate records keyed by request id.
///
/// Holds at most `capacity` entries; inserting a new key into a full store
/// evicts the oldest-inserted key. Re-inserting an existing key replaces the
/// record but keeps its original position.
#[derive(Debug, Clone)]
pub struct CandidateStore {
    records: HashMap<String, CandidateRecord>,
    order: VecDeque<String>,
    capacity: usize,
}

impl CandidateStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Insert or replace; returns the evicted record, if any.
    pub fn upsert(&mut self, record: CandidateRecord) -> Option<CandidateRecord> {
        let key = record.request_id.clone();
        if let Some(existing) = self.records.get_mut(&key) {
            *existing = record;
            return None;
        }

        let evicted = if self.order.len() >= self.capacity {
            self.order
                .pop_front()
                .and_then(|oldest| self.records.remove(&oldest))
        } else {
            None
        };

        self.order.push_back(key.clone());
        self.records.insert(key, record);
        evicted
    }

    pub fn get(&self, request_id: &str) -> Option<&CandidateRecord> {
        self.records.get(request_id)
    }

    /// Records oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &CandidateRecord> {
        self.order.iter().filter_map(|k| self.records.get(k))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::HeaderBundle;

    fn record(id: &str, url: &str) -> CandidateRecord {
        CandidateRecord {
            request_id: id.to_string(),
            url: url.to_string(),
            headers: HeaderBundle::default(),
            suggested_filename: None,
            tab_id: 1,
            captured_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut store = CandidateStore::new(2);
        assert!(store.upsert(record("a", "u1")).is_none());
        assert!(store.upsert(record("b", "u2")).is_none());
        let evicted = store.upsert(record("c", "u3")).expect("eviction");
        assert_eq!(evicted.request_id, "a");
        assert_eq!(store.len(), 2);
        assert!(store.get("a").is_none());
        let ids: Vec<_> = store.iter().map(|r| r.request_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn upsert_existing_replaces_without_evicting() {
        let mut store = CandidateStore::new(2);
        store.upsert(record("a", "old"));
        store.upsert(record("b", "u2"));
        assert!(store.upsert(record("a", "new")).is_none());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap().url, "new");
        assert_eq!(store.iter().next().unwrap().request_id, "a");
    }
}
