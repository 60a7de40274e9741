use std::collections::HashSet;
use std::fmt;

/// Stable key of a TCP session, `srcAddr:srcPort->dstAddr:dstPort`.
///
/// Two observations with identical endpoints always produce equal identities, which is what
/// joins the same session across polling cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionIdentity(String);

impl ConnectionIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One established TCP session as seen by a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub source_address: String,
    pub source_port: u16,
    pub dest_address: String,
    pub dest_port: u16,
    identity: ConnectionIdentity,
}

impl ConnectionRecord {
    pub fn new(
        source_address: impl Into<String>,
        source_port: u16,
        dest_address: impl Into<String>,
        dest_port: u16,
    ) -> Self {
        let source_address = source_address.into();
        let dest_address = dest_address.into();
        let identity = ConnectionIdentity(format!(
            "{}:{}->{}:{}",
            source_address, source_port, dest_address, dest_port
        ));

        Self {
            source_address,
            source_port,
            dest_address,
            dest_port,
            identity,
        }
    }

    pub fn identity(&self) -> &ConnectionIdentity {
        &self.identity
    }
}

impl fmt::Display for ConnectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.source_address, self.source_port, self.dest_address, self.dest_port
        )
    }
}

/// Drops repeated identities, keeping the first occurrence and the original order.
pub fn dedup_by_identity(records: Vec<ConnectionRecord>) -> Vec<ConnectionRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.identity().clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_stable_across_instances() {
        let first = ConnectionRecord::new("10.0.0.1", 1000, "10.0.0.2", 443);
        let second = ConnectionRecord::new(String::from("10.0.0.1"), 1000, "10.0.0.2", 443);

        assert_eq!(first.identity(), second.identity());
        assert_eq!(first.identity().as_str(), "10.0.0.1:1000->10.0.0.2:443");
    }

    #[test]
    fn test_identity_depends_on_direction() {
        let out = ConnectionRecord::new("10.0.0.1", 1000, "10.0.0.2", 443);
        let back = ConnectionRecord::new("10.0.0.2", 443, "10.0.0.1", 1000);

        assert_ne!(out.identity(), back.identity());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_in_order() {
        let records = vec![
            ConnectionRecord::new("10.0.0.1", 1000, "10.0.0.2", 443),
            ConnectionRecord::new("10.0.0.1", 1001, "10.0.0.2", 443),
            ConnectionRecord::new("10.0.0.1", 1000, "10.0.0.2", 443),
        ];

        let unique = dedup_by_identity(records);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].source_port, 1000);
        assert_eq!(unique[1].source_port, 1001);
    }
}
