//! Shared utilities for the Curse notification client.
//!
//! Logging setup, user-data paths and timestamp formatting used by the
//! client binary and its display layer.

pub mod logger;
pub mod paths;
pub mod time;
