use super::age_registry::AgeRegistry;
use super::connection::ConnectionRecord;
use chrono::{DateTime, Duration, Utc};

/// A record annotated with its tracked age.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgedConnection {
    pub record: ConnectionRecord,
    pub age: Duration,
}

/// Strict age threshold: a connection is evicted only once its age is greater than
/// `max_age`. Equal is not enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    max_age: Duration,
}

impl EvictionPolicy {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn is_expired(&self, age: Duration) -> bool {
        age > self.max_age
    }

    /// Every record whose registry age exceeds the threshold, in record order.
    ///
    /// Records are expected to be deduplicated and already reconciled into `registry`;
    /// untracked records are never selected.
    pub fn select(
        &self,
        records: &[ConnectionRecord],
        registry: &AgeRegistry,
        now: DateTime<Utc>,
    ) -> Vec<AgedConnection> {
        records
            .iter()
            .filter_map(|record| {
                let age = registry.age(record.identity(), now)?;
                self.is_expired(age).then(|| AgedConnection {
                    record: record.clone(),
                    age,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_threshold_is_strict() {
        let policy = EvictionPolicy::new(Duration::seconds(300));

        assert!(!policy.is_expired(Duration::seconds(299)));
        assert!(!policy.is_expired(Duration::seconds(300)));
        assert!(policy.is_expired(Duration::seconds(300) + Duration::milliseconds(1)));
    }

    #[test]
    fn test_select_only_expired_records() {
        let policy = EvictionPolicy::new(Duration::seconds(300));
        let mut registry = AgeRegistry::new();
        let old = ConnectionRecord::new("10.0.0.1", 1000, "10.0.0.2", 443);
        let young = ConnectionRecord::new("10.0.0.1", 1001, "10.0.0.2", 443);

        registry.reconcile(&[old.clone()], t(0));
        registry.reconcile(&[old.clone(), young.clone()], t(200));

        let evicted = policy.select(&[old.clone(), young.clone()], &registry, t(301));

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].record, old);
        assert_eq!(evicted[0].age, Duration::seconds(301));
    }

    #[test]
    fn test_select_ignores_untracked_records() {
        let policy = EvictionPolicy::new(Duration::seconds(1));
        let registry = AgeRegistry::new();
        let conn = ConnectionRecord::new("10.0.0.1", 1000, "10.0.0.2", 443);

        assert!(policy.select(&[conn], &registry, t(1000)).is_empty());
    }
}
