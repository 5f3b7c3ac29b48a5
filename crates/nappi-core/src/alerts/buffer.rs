//! Bounded, newest-first alert buffer.
//!
//! Order reflects arrival at the client, not `created_at` order -- clock
//! skew between server and sensors is not corrected here.

use std::collections::VecDeque;

use super::record::AlertRecord;

/// Maximum number of alerts held client-side. The 101st insert evicts the
/// oldest record.
pub const ALERT_BUFFER_CAPACITY: usize = 100;

/// Newest-first sequence of alerts with a hard capacity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertBuffer {
    records: VecDeque<AlertRecord>,
}

impl AlertBuffer {
    pub fn new() -> Self {
        Self {
            records: VecDeque::with_capacity(ALERT_BUFFER_CAPACITY),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &AlertRecord> {
        self.records.iter()
    }

    /// The most recently arrived alert.
    pub fn latest(&self) -> Option<&AlertRecord> {
        self.records.front()
    }

    pub fn get(&self, id: i64) -> Option<&AlertRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Count of unread records. Recomputed on demand, never cached.
    pub fn unread_count(&self) -> usize {
        self.records.iter().filter(|r| !r.read).count()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Prepend a newly arrived alert, returning the evicted record when the
    /// buffer was already at capacity.
    pub fn push_front(&mut self, record: AlertRecord) -> Option<AlertRecord> {
        self.records.push_front(record);
        if self.records.len() > ALERT_BUFFER_CAPACITY {
            self.records.pop_back()
        } else {
            None
        }
    }

    /// Set the read flag on the matching record. Returns the prior value,
    /// or `None` when the record is absent (a no-op, not an error).
    pub fn set_read(&mut self, id: i64, read: bool) -> Option<bool> {
        let record = self.records.iter_mut().find(|r| r.id == id)?;
        let prior = record.read;
        record.read = read;
        Some(prior)
    }

    /// Mark every record read.
    pub fn mark_all_read(&mut self) {
        for record in &mut self.records {
            record.read = true;
        }
    }

    /// Full copy for all-or-nothing rollback.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Restore a previously taken snapshot, discarding current contents.
    pub fn restore(&mut self, snapshot: Self) {
        *self = snapshot;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::record::{AlertKind, Severity};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn alert(id: i64) -> AlertRecord {
        AlertRecord {
            id,
            subject_id: 7,
            owner_id: 42,
            kind: AlertKind::Awakening,
            title: format!("alert {id}"),
            message: "msg".to_string(),
            severity: Severity::Info,
            metadata: None,
            read: false,
            created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
        }
    }

    #[test]
    fn push_front_is_newest_first() {
        let mut buffer = AlertBuffer::new();
        buffer.push_front(alert(1));
        buffer.push_front(alert(2));
        assert_eq!(buffer.latest().unwrap().id, 2);
        let ids: Vec<i64> = buffer.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn capacity_evicts_exactly_the_oldest() {
        let mut buffer = AlertBuffer::new();
        for id in 1..=100 {
            assert!(buffer.push_front(alert(id)).is_none());
        }
        assert_eq!(buffer.len(), 100);

        let evicted = buffer.push_front(alert(101));
        assert_eq!(buffer.len(), 100);
        assert_eq!(evicted.unwrap().id, 1);
        assert!(buffer.get(1).is_none());
        assert_eq!(buffer.latest().unwrap().id, 101);
    }

    #[test]
    fn set_read_reports_prior_value() {
        let mut buffer = AlertBuffer::new();
        buffer.push_front(alert(1));
        assert_eq!(buffer.set_read(1, true), Some(false));
        assert_eq!(buffer.set_read(1, true), Some(true));
        assert_eq!(buffer.set_read(99, true), None);
        assert_eq!(buffer.unread_count(), 0);
    }

    #[test]
    fn mark_all_read_and_restore_roundtrip() {
        let mut buffer = AlertBuffer::new();
        for id in 1..=5 {
            buffer.push_front(alert(id));
        }
        let snapshot = buffer.snapshot();
        buffer.mark_all_read();
        assert_eq!(buffer.unread_count(), 0);

        buffer.restore(snapshot.clone());
        assert_eq!(buffer, snapshot);
        assert_eq!(buffer.unread_count(), 5);
    }

    proptest! {
        #[test]
        fn length_never_exceeds_capacity(count in 0usize..300) {
            let mut buffer = AlertBuffer::new();
            for id in 0..count {
                buffer.push_front(alert(id as i64));
                prop_assert!(buffer.len() <= ALERT_BUFFER_CAPACITY);
            }
            prop_assert_eq!(buffer.len(), count.min(ALERT_BUFFER_CAPACITY));
        }
    }
}
