//! Command handlers for AskDB.
//!
//! Each handler takes a command context and returns a [`CommandOutput`].

pub mod history;
pub mod query;
pub mod system;

use super::output::CommandOutput;
use super::router::Command;
use crate::persistence::{Favorites, SettingsStore};
use crate::query::{QueryRunner, QuerySuccess};

/// What the session most recently asked and got back.
#[derive(Debug, Clone, Default)]
pub struct LastQuery {
    /// The last submitted question or statement.
    pub query: Option<String>,
    /// Rows from the last successful submission (for /export).
    pub result: Option<QuerySuccess>,
}

/// Context provided to command handlers.
pub struct CommandContext<'a> {
    pub runner: &'a mut QueryRunner,
    pub favorites: &'a mut Favorites,
    pub settings: &'a mut SettingsStore,
    pub last: &'a mut LastQuery,
    /// Render query results as JSON instead of tables.
    pub json: bool,
}

/// Dispatches a parsed command to its handler.
pub async fn execute(ctx: &mut CommandContext<'_>, command: Command) -> CommandOutput {
    match command {
        Command::Ask(question) => query::handle_ask(ctx, &question).await,
        Command::Sql(sql) => query::handle_sql(ctx, &sql).await,
        Command::Check(sql) => query::handle_check(ctx.runner.guard(), &sql),
        Command::Sanitize(sql) => query::handle_sanitize(&sql),
        Command::Rerun(id) => query::handle_rerun(ctx, id).await,
        Command::Export(path) => query::handle_export(ctx, path.as_deref()),
        Command::History { limit, filter } => history::handle_history(ctx, limit, &filter),
        Command::HistoryShow(id) => history::handle_history_show(ctx, id),
        Command::HistoryDelete(id) => history::handle_history_delete(ctx, id).await,
        Command::HistoryClear => history::handle_history_clear(ctx).await,
        Command::SaveFavorite { query, name } => {
            history::handle_save_favorite(ctx, query.as_deref(), name.as_deref()).await
        }
        Command::Favorites { search } => history::handle_favorites(ctx, search.as_deref()),
        Command::RunFavorite(id) => history::handle_run_favorite(ctx, id).await,
        Command::RemoveFavorite(id) => history::handle_remove_favorite(ctx, id).await,
        Command::Stats => system::handle_stats(ctx),
        Command::Tables => system::handle_tables(ctx).await,
        Command::Info => system::handle_info(ctx).await,
        Command::Health => system::handle_health(ctx).await,
        Command::Settings => system::handle_settings(ctx),
        Command::SettingsSet {
            display_name,
            email,
            notifications,
        } => system::handle_settings_set(ctx, display_name, email, notifications).await,
        Command::Help => system::handle_help(),
        Command::Quit => CommandOutput::exit(),
        Command::Empty => CommandOutput::Multiple(Vec::new()),
        Command::Invalid(usage) => CommandOutput::error(usage),
        Command::Unknown(command) => system::handle_unknown(&command),
    }
}
