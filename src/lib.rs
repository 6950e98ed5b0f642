//! PROPSCOUT: NBA player prop edge finder.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod data;
pub mod strategy;
pub mod engine;
pub mod report;
pub mod storage;
