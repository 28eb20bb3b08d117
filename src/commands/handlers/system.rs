//! Session command handlers (/stats, /tables, /info, /health, /settings, /help).

use tracing::warn;

use super::CommandContext;
use crate::api::FALLBACK_TABLES;
use crate::commands::help::HELP_TEXT;
use crate::commands::output::CommandOutput;
use crate::persistence::UserSettings;
use crate::query::ApiAvailability;

/// Handle /help command.
pub fn handle_help() -> CommandOutput {
    CommandOutput::info(HELP_TEXT)
}

/// Handle unknown command.
pub fn handle_unknown(command: &str) -> CommandOutput {
    CommandOutput::error(format!(
        "Unknown command: {command}. Type /help for available commands."
    ))
}

/// Handle /stats command.
pub fn handle_stats(ctx: &CommandContext<'_>) -> CommandOutput {
    let metrics = ctx.runner.session().metrics();
    let success_rate = metrics
        .success_rate()
        .map(|rate| format!("{rate:.1}%"))
        .unwrap_or_else(|| "-".to_string());

    let rows = vec![
        vec!["Total queries".to_string(), metrics.total_queries.to_string()],
        vec![
            "Successful".to_string(),
            metrics.successful_queries.to_string(),
        ],
        vec!["Success rate".to_string(), success_rate],
        vec![
            "Average time".to_string(),
            format!("{}ms", metrics.average_time()),
        ],
        vec![
            "History entries".to_string(),
            ctx.runner.history().len().to_string(),
        ],
        vec!["Favorites".to_string(), ctx.favorites.list().len().to_string()],
        vec![
            "Query API".to_string(),
            format!(
                "{} ({})",
                ctx.runner.service().name(),
                ctx.runner.availability().as_str()
            ),
        ],
    ];

    CommandOutput::table(vec!["metric".to_string(), "value".to_string()], rows)
}

/// Handle /tables command. Falls back to the default table list when the
/// service cannot list tables.
pub async fn handle_tables(ctx: &CommandContext<'_>) -> CommandOutput {
    match ctx.runner.service().tables().await {
        Ok(tables) => tables_output(&tables),
        Err(e) => {
            warn!("Failed to list tables: {e}");
            let fallback: Vec<String> = FALLBACK_TABLES.iter().map(|t| t.to_string()).collect();
            CommandOutput::multiple(vec![
                CommandOutput::info(format!("Could not list tables ({e}); showing defaults.")),
                tables_output(&fallback),
            ])
        }
    }
}

fn tables_output(tables: &[String]) -> CommandOutput {
    CommandOutput::table(
        vec!["table".to_string()],
        tables.iter().map(|t| vec![t.clone()]).collect(),
    )
}

/// Handle /info command. Database info and the table list are fetched
/// concurrently; either may fail without hiding the other.
pub async fn handle_info(ctx: &CommandContext<'_>) -> CommandOutput {
    let service = ctx.runner.service();
    let (info, tables) = futures::join!(service.database_info(), service.tables());

    let mut parts = Vec::new();
    match info {
        Ok(info) => parts.push(CommandOutput::info(format!(
            "Tables: {}\nTotal rows: {}\nLast sync: {}",
            info.tables,
            info.total_rows,
            info.last_sync.as_deref().unwrap_or("unknown")
        ))),
        Err(e) => parts.push(CommandOutput::error(format!(
            "Could not load database info: {e}"
        ))),
    }
    match tables {
        Ok(tables) => parts.push(tables_output(&tables)),
        Err(e) => parts.push(CommandOutput::error(format!("Could not list tables: {e}"))),
    }

    CommandOutput::multiple(parts)
}

/// Handle /health command.
pub async fn handle_health(ctx: &mut CommandContext<'_>) -> CommandOutput {
    let name = ctx.runner.service().name().to_string();
    match ctx.runner.refresh_health().await {
        ApiAvailability::Available => CommandOutput::info(format!("Query API {name} is available.")),
        other => CommandOutput::error(format!("Query API {name} is {}.", other.as_str())),
    }
}

/// Handle /settings command.
pub fn handle_settings(ctx: &CommandContext<'_>) -> CommandOutput {
    settings_output(ctx.settings.settings())
}

fn settings_output(settings: &UserSettings) -> CommandOutput {
    CommandOutput::info(format!(
        "Name:          {} ({})\nEmail:         {}\nNotifications: {}",
        settings.display_name,
        settings.initials(),
        settings.email,
        if settings.notifications { "on" } else { "off" }
    ))
}

/// Handle /settings <field> <value> command.
pub async fn handle_settings_set(
    ctx: &mut CommandContext<'_>,
    display_name: Option<String>,
    email: Option<String>,
    notifications: Option<bool>,
) -> CommandOutput {
    let mut updated = ctx.settings.settings().clone();
    if let Some(name) = display_name {
        updated.display_name = name;
    }
    if let Some(email) = email {
        updated.email = email;
    }
    if let Some(on) = notifications {
        updated.notifications = on;
    }

    if ctx.settings.save(updated).await {
        CommandOutput::multiple(vec![
            CommandOutput::info("Settings saved."),
            settings_output(ctx.settings.settings()),
        ])
    } else {
        CommandOutput::error("Settings changed for this session but could not be saved.")
    }
}
