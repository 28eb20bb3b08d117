//! History and favorites command handlers (/history, /rerun, /fav, /favorites).

use chrono::Utc;

use super::{query, CommandContext};
use crate::commands::output::CommandOutput;
use crate::persistence::{time_ago, HistoryFilter, QueryStatus};

/// Entries listed when no limit is given.
const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Handle /history command.
pub fn handle_history(
    ctx: &CommandContext<'_>,
    limit: Option<usize>,
    filter: &HistoryFilter,
) -> CommandOutput {
    let history = ctx.runner.history();
    if history.is_empty() {
        return CommandOutput::info("No history entries found.");
    }

    let matching = history.search(filter);
    if matching.is_empty() {
        return CommandOutput::info("No history entries match.");
    }

    let now = Utc::now();
    let rows = matching
        .into_iter()
        .take(limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .map(|entry| {
            let status_icon = match entry.status {
                QueryStatus::Success => "✓",
                QueryStatus::Error => "✗",
            };
            vec![
                entry.id.to_string(),
                status_icon.to_string(),
                time_ago(entry.timestamp, now),
                format!("{}ms", entry.execution_time),
                entry.rows.to_string(),
                entry.query.clone(),
            ]
        })
        .collect();

    CommandOutput::table(
        ["id", "", "when", "time", "rows", "query"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows,
    )
}

/// Handle /history show command.
pub fn handle_history_show(ctx: &CommandContext<'_>, id: i64) -> CommandOutput {
    let Some(entry) = ctx.runner.history().get(id) else {
        return CommandOutput::error(format!("No history entry with id {id}."));
    };

    let mut text = format!(
        "Query:    {}\nStatus:   {}\nWhen:     {}\nTime:     {}ms\nRows:     {}",
        entry.query,
        entry.status.as_str(),
        entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        entry.execution_time,
        entry.rows,
    );
    if !entry.sql.is_empty() {
        text.push_str(&format!("\nSQL:\n{}", entry.sql));
    }
    CommandOutput::info(text)
}

/// Handle /history delete command.
pub async fn handle_history_delete(ctx: &mut CommandContext<'_>, id: i64) -> CommandOutput {
    if ctx.runner.history_mut().delete(id).await {
        CommandOutput::info(format!("Deleted history entry {id}."))
    } else {
        CommandOutput::error(format!("No history entry with id {id}."))
    }
}

/// Handle /history clear command.
pub async fn handle_history_clear(ctx: &mut CommandContext<'_>) -> CommandOutput {
    let count = ctx.runner.history_mut().clear().await;
    CommandOutput::info(format!("Cleared {count} history entries."))
}

/// Handle /fav command.
pub async fn handle_save_favorite(
    ctx: &mut CommandContext<'_>,
    query: Option<&str>,
    name: Option<&str>,
) -> CommandOutput {
    let query = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => q.to_string(),
        None => match &ctx.last.query {
            Some(q) if !q.is_empty() => q.clone(),
            _ => return CommandOutput::error("No query to save. Ask a question first."),
        },
    };

    let favorite = ctx.favorites.save(&query, name).await;
    CommandOutput::info(format!(
        "Saved favorite {} as '{}'.",
        favorite.id, favorite.name
    ))
}

/// Handle /favorites command.
pub fn handle_favorites(ctx: &CommandContext<'_>, search: Option<&str>) -> CommandOutput {
    if ctx.favorites.list().is_empty() {
        return CommandOutput::info("No favorites saved.");
    }

    let favorites = match search {
        Some(text) => ctx.favorites.search(text),
        None => ctx.favorites.list().iter().collect(),
    };
    if favorites.is_empty() {
        return CommandOutput::info("No favorites match.");
    }

    let rows = favorites
        .into_iter()
        .map(|f| {
            vec![
                f.id.to_string(),
                f.name.clone(),
                f.query.clone(),
                f.saved_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();

    CommandOutput::table(
        vec![
            "id".to_string(),
            "name".to_string(),
            "query".to_string(),
            "saved".to_string(),
        ],
        rows,
    )
}

/// Handle /favorites run command.
pub async fn handle_run_favorite(ctx: &mut CommandContext<'_>, id: i64) -> CommandOutput {
    let Some(favorite) = ctx.favorites.get(id).cloned() else {
        return CommandOutput::error(format!("No favorite with id {id}."));
    };
    query::handle_ask(ctx, &favorite.query).await
}

/// Handle /favorites remove command.
pub async fn handle_remove_favorite(ctx: &mut CommandContext<'_>, id: i64) -> CommandOutput {
    if ctx.favorites.remove(id).await {
        CommandOutput::info(format!("Removed favorite {id}."))
    } else {
        CommandOutput::error(format!("No favorite with id {id}."))
    }
}
