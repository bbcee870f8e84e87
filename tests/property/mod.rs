//! Property-based tests using proptest
//!
//! Invariants of the probability tables, catalog and generators.

pub mod catalog_tests;
pub mod generator_tests;
pub mod probability_tests;
