//! Common types for the shared crate

/// Timestamp type (Unix seconds, UTC)
pub type Timestamp = i64;
