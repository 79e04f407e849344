//! Incremental machinery tests
//!
//! Tests for:
//! - Dirty-range accumulation and consumption
//! - Region cache hits, misses and clears
//! - Merging fragments into full trees

pub mod tests_dirty;
