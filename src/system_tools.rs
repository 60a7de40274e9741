//! Adapters around the external tools the monitor depends on.
//!
//! - [`ConnectionEnumerator`]: lists current TCP sessions as text (`ss -tanp` by default)
//! - [`ConnectionTerminator`]: injects resets into one flow (`tcpkill` by default)
//!
//! Both are traits so the monitor loop can be exercised without touching the host network.
//! The command-backed implementations bound every invocation in time; a hung tool never
//! stalls the monitor.

pub mod command;
pub mod enumerator;
pub mod terminator;

pub use enumerator::{CommandEnumerator, ConnectionEnumerator};
pub use terminator::{CommandTerminator, ConnectionTerminator};
