//! Command parsing and dispatch for AskDB.
//!
//! Parsing is kept apart from execution so commands can be unit tested
//! without a query service.

pub mod handlers;
pub mod help;
pub mod output;
pub mod router;

pub use handlers::{CommandContext, LastQuery};
pub use output::{render_table, CommandOutput, ControlAction};
pub use router::{Command, CommandRouter};
