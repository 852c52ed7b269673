//! Front-end adapters for memtier.
//!
//! - **CLI**: verb dispatch for the `memtier` binary
//!
//! Each adapter translates store operations into the interface expected by
//! its caller.

pub mod cli;

pub use cli::{error_payload, execute, Command};
