//! Integration test module
//!
//! End-to-end tests against a live server on an ephemeral port.

pub mod common;
pub mod catalog_tests;
pub mod simulation_tests;
pub mod health_tests;
