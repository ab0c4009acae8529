//! Storage abstractions for service layer
//!
//! File-backed persistence helpers shared by in-memory stores.

pub mod json_snapshot;
