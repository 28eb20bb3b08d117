//! Query submission for AskDB.
//!
//! Isolates guard checks, service calls and history bookkeeping from the
//! command front ends.

pub mod executor;

pub use executor::{ApiAvailability, QueryOutcome, QueryRunner, QuerySuccess};
