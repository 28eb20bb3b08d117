//! Integration tests for AskDB.

pub mod api_test;
pub mod persistence_test;
pub mod query_test;
pub mod safety_test;
