use super::connection::{ConnectionIdentity, ConnectionRecord};
use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Remembers when each connection identity was first observed.
///
/// An entry's `first_seen` never changes while the identity keeps showing up in consecutive
/// polls, including after a termination attempt. It goes away only when a poll no longer
/// reports the identity, and a later sighting starts over from a fresh timestamp.
#[derive(Debug, Default, Clone)]
pub struct AgeRegistry {
    first_seen: HashMap<ConnectionIdentity, DateTime<Utc>>,
}

/// What a reconciliation changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub removed: usize,
    pub retained: usize,
}

impl AgeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the registry in line with one poll.
    ///
    /// Unknown identities are inserted with `now`, identities missing from `records` are
    /// dropped, and identities present on both sides are left untouched. Duplicate records are
    /// harmless.
    pub fn reconcile(&mut self, records: &[ConnectionRecord], now: DateTime<Utc>) -> ReconcileSummary {
        let current: HashSet<&ConnectionIdentity> = records.iter().map(|r| r.identity()).collect();

        let before = self.first_seen.len();
        self.first_seen.retain(|identity, _| current.contains(identity));
        let removed = before - self.first_seen.len();
        let retained = self.first_seen.len();

        let mut inserted = 0;
        for identity in current {
            if !self.first_seen.contains_key(identity) {
                debug!("Tracking new connection {}", identity);
                self.first_seen.insert(identity.clone(), now);
                inserted += 1;
            }
        }

        ReconcileSummary {
            inserted,
            removed,
            retained,
        }
    }

    pub fn first_seen(&self, identity: &ConnectionIdentity) -> Option<DateTime<Utc>> {
        self.first_seen.get(identity).copied()
    }

    /// Age of a tracked identity at `now`, `None` when it is not tracked.
    pub fn age(&self, identity: &ConnectionIdentity, now: DateTime<Utc>) -> Option<Duration> {
        self.first_seen(identity).map(|first_seen| now - first_seen)
    }

    pub fn contains(&self, identity: &ConnectionIdentity) -> bool {
        self.first_seen.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn record(port: u16) -> ConnectionRecord {
        ConnectionRecord::new("10.0.0.1", port, "10.0.0.2", 443)
    }

    #[test]
    fn test_first_seen_is_not_refreshed() {
        let mut registry = AgeRegistry::new();
        let conn = record(1000);

        registry.reconcile(&[conn.clone()], t(0));
        let summary = registry.reconcile(&[conn.clone()], t(30));

        assert_eq!(summary, ReconcileSummary { inserted: 0, removed: 0, retained: 1 });
        assert_eq!(registry.first_seen(conn.identity()), Some(t(0)));
        assert_eq!(registry.age(conn.identity(), t(90)), Some(Duration::seconds(90)));
    }

    #[test]
    fn test_vanished_identity_is_removed_and_restarts_at_zero() {
        let mut registry = AgeRegistry::new();
        let conn = record(1000);
        let other = record(2000);

        registry.reconcile(&[conn.clone(), other.clone()], t(0));
        let summary = registry.reconcile(&[other.clone()], t(30));
        assert_eq!(summary.removed, 1);
        assert!(!registry.contains(conn.identity()));

        registry.reconcile(&[conn.clone(), other.clone()], t(60));
        assert_eq!(registry.age(conn.identity(), t(60)), Some(Duration::zero()));
        assert_eq!(registry.age(other.identity(), t(60)), Some(Duration::seconds(60)));
    }

    #[test]
    fn test_duplicates_count_once() {
        let mut registry = AgeRegistry::new();
        let conn = record(1000);

        let summary = registry.reconcile(&[conn.clone(), conn.clone()], t(0));

        assert_eq!(summary.inserted, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_poll_clears_registry() {
        let mut registry = AgeRegistry::new();
        registry.reconcile(&[record(1000), record(1001)], t(0));

        let summary = registry.reconcile(&[], t(30));

        assert_eq!(summary.removed, 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_untracked_age() {
        let mut registry = AgeRegistry::new();
        let conn = record(1000);
        registry.reconcile(&[record(2000)], t(0));

        assert_eq!(registry.age(conn.identity(), t(10)), None);
        assert_eq!(registry.first_seen(conn.identity()), None);
    }
}
