//! Help text constants for AskDB commands.

/// Help text displayed for the /help command.
pub const HELP_TEXT: &str = r#"Type a question in plain language to query the inventory database.

Query commands:
  /sql <query>       - Execute read-only SQL directly
  /check <query>     - Classify SQL without running it
  /sanitize <query>  - Show SQL with comments stripped
  /export [path]     - Save the last result as CSV

History commands:
  /history [N]       - List recent queries
  /history [N] [--status all|success|error] [--search <text>]
  /history show <id> - Show one entry in full
  /history delete <id>
  /history clear     - Clear query history
  /rerun <id>        - Submit a history entry again

Favorites:
  /fav [name]        - Save the last question
  /favorites         - List favorites
  /favorites --search <text>
  /favorites run <id>
  /favorites remove <id>

Session:
  /stats             - Show session statistics
  /tables            - List tables
  /info              - Show database summary
  /health            - Check the query API
  /settings [name|email|notifications <value>]
  /help              - Show this help message
  /quit, /exit       - Exit the shell

Statements containing DELETE, DROP, UPDATE, TRUNCATE, ALTER, INSERT, CREATE,
REPLACE, RENAME, GRANT or REVOKE are refused in read-only mode."#;
