//! Command parsing and routing for the AskDB shell.
//!
//! Parses user input into structured commands that can be dispatched to handlers.

use crate::persistence::{HistoryFilter, StatusFilter};

/// Parsed command with arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Natural language question (not a slash command).
    Ask(String),
    /// Execute raw SQL directly.
    Sql(String),
    /// Classify SQL without running it.
    Check(String),
    /// Show SQL with comments stripped.
    Sanitize(String),
    /// Show query history, newest first, narrowed by `filter`.
    History {
        limit: Option<usize>,
        filter: HistoryFilter,
    },
    /// Show one history entry in full.
    HistoryShow(i64),
    /// Delete one history entry.
    HistoryDelete(i64),
    /// Clear query history.
    HistoryClear,
    /// Submit a history entry again.
    Rerun(i64),
    /// Save a query as a favorite; the last question when `query` is absent.
    SaveFavorite {
        query: Option<String>,
        name: Option<String>,
    },
    /// List favorites, optionally only those whose query contains `search`.
    Favorites { search: Option<String> },
    /// Ask a favorite query.
    RunFavorite(i64),
    /// Remove a favorite.
    RemoveFavorite(i64),
    /// Show session statistics.
    Stats,
    /// List tables.
    Tables,
    /// Show database summary and tables.
    Info,
    /// Check API health.
    Health,
    /// Show user settings.
    Settings,
    /// Update user settings; absent fields are left unchanged.
    SettingsSet {
        display_name: Option<String>,
        email: Option<String>,
        notifications: Option<bool>,
    },
    /// Export the last result as CSV; a generated filename when absent.
    Export(Option<String>),
    /// Show help message.
    Help,
    /// Exit the shell.
    Quit,
    /// Blank input.
    Empty,
    /// Known command with bad arguments; carries the usage line.
    Invalid(&'static str),
    /// Unknown command.
    Unknown(String),
}

/// Command router for parsing user input.
pub struct CommandRouter;

impl CommandRouter {
    /// Parse user input into a Command.
    pub fn parse(input: &str) -> Command {
        let input = input.trim();

        if input.is_empty() {
            return Command::Empty;
        }

        if !input.starts_with('/') {
            return Command::Ask(input.to_string());
        }

        let parts: Vec<&str> = input.splitn(2, char::is_whitespace).collect();
        let command = parts[0].to_lowercase();
        let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

        match command.as_str() {
            "/sql" => Self::with_text(args, Command::Sql, "Usage: /sql <query>"),
            "/check" => Self::with_text(args, Command::Check, "Usage: /check <query>"),
            "/sanitize" => Self::with_text(args, Command::Sanitize, "Usage: /sanitize <query>"),
            "/history" => Self::parse_history_command(args),
            "/rerun" => Self::with_id(args, Command::Rerun, "Usage: /rerun <id>"),
            "/fav" => Command::SaveFavorite {
                query: None,
                name: (!args.is_empty()).then(|| args.to_string()),
            },
            "/favorites" => Self::parse_favorites_command(args),
            "/stats" => Command::Stats,
            "/tables" => Command::Tables,
            "/info" => Command::Info,
            "/health" => Command::Health,
            "/settings" => Self::parse_settings_command(args),
            "/export" => Command::Export((!args.is_empty()).then(|| args.to_string())),
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Unknown(command),
        }
    }

    fn with_text(args: &str, make: fn(String) -> Command, usage: &'static str) -> Command {
        if args.is_empty() {
            Command::Invalid(usage)
        } else {
            make(args.to_string())
        }
    }

    fn with_id(args: &str, make: fn(i64) -> Command, usage: &'static str) -> Command {
        match args.parse::<i64>() {
            Ok(id) => make(id),
            Err(_) => Command::Invalid(usage),
        }
    }

    /// Parse /history subcommands.
    fn parse_history_command(args: &str) -> Command {
        const USAGE: &str = "Usage: /history [N] [--status all|success|error] [--search <text>] | /history show <id> | /history delete <id> | /history clear";

        let (subcommand, rest) = split_first(args);
        match subcommand.to_lowercase().as_str() {
            "clear" => Command::HistoryClear,
            "show" => Self::with_id(rest, Command::HistoryShow, USAGE),
            "delete" => Self::with_id(rest, Command::HistoryDelete, USAGE),
            _ => Self::parse_history_listing(args).unwrap_or(Command::Invalid(USAGE)),
        }
    }

    /// Parse `[N] [--status S] [--search <text>]`. The search text runs to
    /// the end of the line.
    fn parse_history_listing(args: &str) -> Option<Command> {
        let mut limit = None;
        let mut filter = HistoryFilter::default();
        let mut rest = args;

        loop {
            let (word, tail) = split_first(rest);
            match word {
                "" => break,
                "--search" => {
                    if tail.is_empty() {
                        return None;
                    }
                    filter.search = Some(tail.to_string());
                    break;
                }
                "--status" => {
                    let (value, tail) = split_first(tail);
                    filter.status = value.parse::<StatusFilter>().ok()?;
                    rest = tail;
                }
                number if limit.is_none() => {
                    limit = Some(number.parse::<usize>().ok()?);
                    rest = tail;
                }
                _ => return None,
            }
        }

        Some(Command::History { limit, filter })
    }

    /// Parse /favorites subcommands.
    fn parse_favorites_command(args: &str) -> Command {
        const USAGE: &str =
            "Usage: /favorites [--search <text>] | /favorites run <id> | /favorites remove <id>";

        let (subcommand, rest) = split_first(args);
        match subcommand.to_lowercase().as_str() {
            "" => Command::Favorites { search: None },
            "--search" if !rest.is_empty() => Command::Favorites {
                search: Some(rest.to_string()),
            },
            "run" => Self::with_id(rest, Command::RunFavorite, USAGE),
            "remove" | "delete" => Self::with_id(rest, Command::RemoveFavorite, USAGE),
            _ => Command::Invalid(USAGE),
        }
    }

    /// Parse /settings [name <value>|email <value>|notifications on|off].
    fn parse_settings_command(args: &str) -> Command {
        const USAGE: &str =
            "Usage: /settings | /settings name <name> | /settings email <email> | /settings notifications on|off";

        let (field, value) = split_first(args);
        if field.is_empty() {
            return Command::Settings;
        }
        if value.is_empty() {
            return Command::Invalid(USAGE);
        }

        match field.to_lowercase().as_str() {
            "name" => Command::SettingsSet {
                display_name: Some(value.to_string()),
                email: None,
                notifications: None,
            },
            "email" => Command::SettingsSet {
                display_name: None,
                email: Some(value.to_string()),
                notifications: None,
            },
            "notifications" => match parse_toggle(value) {
                Some(on) => Command::SettingsSet {
                    display_name: None,
                    email: None,
                    notifications: Some(on),
                },
                None => Command::Invalid(USAGE),
            },
            _ => Command::Invalid(USAGE),
        }
    }
}

/// Splits off the first word, returning it and the trimmed remainder.
fn split_first(args: &str) -> (&str, &str) {
    let args = args.trim();
    match args.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (args, ""),
    }
}

/// Parses on/off style values.
pub fn parse_toggle(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
