//! Connection tracking core.
//!
//! Turns raw listings of established TCP sessions into [`ConnectionRecord`]s, remembers when
//! each session was first observed, and decides which ones have lived too long.
//!
//! ```text
//! listing ─▶ ConnectionParser ─▶ records ─▶ AgeRegistry::reconcile ─▶ EvictionPolicy ─▶ evicted
//! ```
//!
//! Nothing in here touches the operating system, so every piece can be driven with synthetic
//! input and explicit timestamps.

pub mod age_registry;
pub mod connection;
pub mod eviction_policy;
pub mod parser;

pub use age_registry::AgeRegistry;
pub use connection::{dedup_by_identity, ConnectionIdentity, ConnectionRecord};
pub use eviction_policy::{AgedConnection, EvictionPolicy};
pub use parser::{ConnectionParser, ParseIssue, ParsedListing};
