//! Integration test entry point
//!
//! End-to-end crawls against wiremock servers and cache behavior across
//! process restarts.

mod cache_tests;
mod crawl_tests;
