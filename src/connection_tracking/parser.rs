use super::connection::ConnectionRecord;
use crate::configuration::types::EnumeratorConfig;
use log::debug;
use std::fmt;

/// Why an established line did not yield a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseIssueKind {
    MissingColumn(usize),
    MalformedEndpoint(String),
}

/// A skipped line. Issues are reported, never fatal to the rest of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// 1-based line number within the listing.
    pub line_number: usize,
    pub kind: ParseIssueKind,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseIssueKind::MissingColumn(col) => {
                write!(f, "line {}: no column {}", self.line_number, col)
            }
            ParseIssueKind::MalformedEndpoint(token) => {
                write!(f, "line {}: malformed endpoint `{}`", self.line_number, token)
            }
        }
    }
}

/// Result of parsing one listing: records in input order (duplicates kept) and skipped lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedListing {
    pub records: Vec<ConnectionRecord>,
    pub issues: Vec<ParseIssue>,
}

/// Line-oriented parser for the connection listing tool's output.
///
/// Lines are split on whitespace. A line counts only when the token at `state_column` equals
/// the established marker; headers and every other TCP state are ignored silently.
#[derive(Debug, Clone)]
pub struct ConnectionParser {
    state_column: usize,
    established_marker: String,
    local_column: usize,
    peer_column: usize,
}

impl ConnectionParser {
    pub fn new(config: &EnumeratorConfig) -> Self {
        Self {
            state_column: config.state_column,
            established_marker: config.established_marker.clone(),
            local_column: config.local_column,
            peer_column: config.peer_column,
        }
    }

    pub fn parse(&self, output: &str) -> ParsedListing {
        let mut listing = ParsedListing::default();

        for (index, line) in output.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();

            if fields.get(self.state_column).copied() != Some(self.established_marker.as_str()) {
                continue;
            }

            match self.parse_fields(&fields) {
                Ok(record) => listing.records.push(record),
                Err(kind) => {
                    let issue = ParseIssue {
                        line_number: index + 1,
                        kind,
                    };
                    debug!("Skipping connection line: {}", issue);
                    listing.issues.push(issue);
                }
            }
        }

        listing
    }

    fn parse_fields(&self, fields: &[&str]) -> Result<ConnectionRecord, ParseIssueKind> {
        let local = fields
            .get(self.local_column)
            .ok_or(ParseIssueKind::MissingColumn(self.local_column))?;
        let peer = fields
            .get(self.peer_column)
            .ok_or(ParseIssueKind::MissingColumn(self.peer_column))?;

        let (src_address, src_port) = split_endpoint(local)?;
        let (dst_address, dst_port) = split_endpoint(peer)?;

        Ok(ConnectionRecord::new(src_address, src_port, dst_address, dst_port))
    }
}

/// Splits `address:port` on the last colon. Bracketed IPv6 addresses lose their brackets.
fn split_endpoint(token: &str) -> Result<(&str, u16), ParseIssueKind> {
    let malformed = || ParseIssueKind::MalformedEndpoint(token.to_string());

    let (address, port) = token.rsplit_once(':').ok_or_else(malformed)?;
    let address = address
        .strip_prefix('[')
        .and_then(|a| a.strip_suffix(']'))
        .unwrap_or(address);

    if address.is_empty() {
        return Err(malformed());
    }
    let port = port.parse::<u16>().map_err(|_| malformed())?;

    Ok((address, port))
}
