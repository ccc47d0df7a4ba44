//! Property-based tests for the graph model.
//!
//! Uses proptest to check invariants over randomly built regions.
