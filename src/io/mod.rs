//! Result export.

/// CSV time-series export.
pub mod export;
