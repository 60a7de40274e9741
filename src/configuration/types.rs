use serde::Deserialize;

/// How the connection listing tool is invoked and how its output is laid out.
///
/// The column indices are a fixed contract with the tool version deployed. The
/// defaults match `ss -tanp` output, where each line reads
/// `ESTAB 0 0 10.0.15.73:18443 174.201.120.36:64119 users:(...)`.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct EnumeratorConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Whitespace token holding the TCP state.
    pub state_column: usize,
    /// Exact token value marking an established session.
    pub established_marker: String,
    /// Whitespace token holding the local (source) `address:port`.
    pub local_column: usize,
    /// Whitespace token holding the peer (destination) `address:port`.
    pub peer_column: usize,
    pub timeout_secs: u64,
    /// Extra attempts made within the same cycle when the tool fails.
    pub retries: u32,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            program: String::from("ss"),
            args: vec![String::from("-tanp")],
            state_column: 0,
            established_marker: String::from("ESTAB"),
            local_column: 3,
            peer_column: 4,
            timeout_secs: 10,
            retries: 0,
        }
    }
}

/// How the reset injection tool is invoked.
///
/// Arguments may contain the placeholders `{src_address}`, `{src_port}`,
/// `{dst_address}` and `{dst_port}`, substituted for every eviction.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct TerminatorConfig {
    pub program: String,
    pub args: Vec<String>,
    /// How long the tool is left running to inject resets before it is killed.
    pub window_secs: u64,
}

impl Default for TerminatorConfig {
    fn default() -> Self {
        Self {
            program: String::from("tcpkill"),
            args: vec![
                String::from("-9"),
                String::from("host {src_address} and port {src_port}"),
            ],
            window_secs: 5,
        }
    }
}
