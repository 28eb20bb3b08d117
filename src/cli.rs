//! Command-line argument parsing for AskDB.

use crate::commands::router::parse_toggle;
use crate::commands::Command;
use crate::config::Overrides;
use crate::persistence::{HistoryFilter, StatusFilter};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Ask an inventory database questions in plain language or read-only SQL.
#[derive(Parser, Debug)]
#[command(name = "askdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// State database path (history, favorites, settings)
    #[arg(long, value_name = "PATH", global = true)]
    pub state_db: Option<PathBuf>,

    /// Query API base URL
    #[arg(long, value_name = "URL", env = "ASKDB_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Query API key
    #[arg(
        long,
        value_name = "KEY",
        env = "ASKDB_API_KEY",
        hide_env_values = true,
        global = true
    )]
    pub api_key: Option<String>,

    /// Answer from built-in sample data instead of the query API
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Ask a question in plain language
    Ask {
        question: String,
        #[command(flatten)]
        output: ResultOutput,
    },
    /// Execute read-only SQL
    Sql {
        sql: String,
        #[command(flatten)]
        output: ResultOutput,
    },
    /// Classify SQL without running it (exit code 2 when blocked)
    Check {
        sql: String,
        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print SQL with comments stripped
    Sanitize { sql: String },
    /// Inspect query history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Manage favorite questions
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },
    /// Show or change user settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// List database tables
    Tables,
    /// Show a database summary
    Info,
    /// Check the query API
    Health,
    /// Start the interactive shell (default)
    Shell,
}

/// Output options for commands that return rows.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ResultOutput {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write the rows to a CSV file
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    /// List recent entries
    List {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Only entries whose question contains this text (any case)
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,
        /// all, success or error
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Show one entry in full
    Show { id: i64 },
    /// Delete one entry
    Delete { id: i64 },
    /// Delete every entry
    Clear,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FavoritesAction {
    /// List favorites
    List {
        /// Only favorites whose question contains this text (any case)
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,
    },
    /// Save a question
    Add {
        query: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove a favorite
    Remove { id: i64 },
    /// Ask a favorite question
    Run { id: i64 },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    /// Show settings
    Show,
    /// Change one or more settings
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// on/off
        #[arg(long, value_parser = parse_notifications)]
        notifications: Option<bool>,
    },
}

fn parse_notifications(value: &str) -> Result<bool, String> {
    parse_toggle(value).ok_or_else(|| format!("expected on or off, got '{value}'"))
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }

    /// Values that take precedence over the config file.
    pub fn to_overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            state_db: self.state_db.clone(),
            demo: self.demo,
        }
    }

    /// Returns true when the interactive shell should run.
    pub fn is_shell(&self) -> bool {
        matches!(self.command, None | Some(CliCommand::Shell))
    }
}

impl CliCommand {
    /// Maps a one-shot subcommand onto the shell command it runs.
    ///
    /// Returns `None` for [`CliCommand::Shell`].
    pub fn to_command(&self) -> Option<Command> {
        let command = match self {
            Self::Ask { question, .. } => Command::Ask(question.clone()),
            Self::Sql { sql, .. } => Command::Sql(sql.clone()),
            Self::Check { sql, .. } => Command::Check(sql.clone()),
            Self::Sanitize { sql } => Command::Sanitize(sql.clone()),
            Self::History { action } => match action {
                None => Command::History {
                    limit: None,
                    filter: HistoryFilter::default(),
                },
                Some(HistoryAction::List {
                    limit,
                    search,
                    status,
                }) => Command::History {
                    limit: *limit,
                    filter: HistoryFilter {
                        search: search.clone(),
                        status: *status,
                    },
                },
                Some(HistoryAction::Show { id }) => Command::HistoryShow(*id),
                Some(HistoryAction::Delete { id }) => Command::HistoryDelete(*id),
                Some(HistoryAction::Clear) => Command::HistoryClear,
            },
            Self::Favorites { action } => match action {
                None => Command::Favorites { search: None },
                Some(FavoritesAction::List { search }) => Command::Favorites {
                    search: search.clone(),
                },
                Some(FavoritesAction::Add { query, name }) => Command::SaveFavorite {
                    query: Some(query.clone()),
                    name: name.clone(),
                },
                Some(FavoritesAction::Remove { id }) => Command::RemoveFavorite(*id),
                Some(FavoritesAction::Run { id }) => Command::RunFavorite(*id),
            },
            Self::Settings { action } => match action {
                None | Some(SettingsAction::Show) => Command::Settings,
                Some(SettingsAction::Set {
                    name,
                    email,
                    notifications,
                }) => Command::SettingsSet {
                    display_name: name.clone(),
                    email: email.clone(),
                    notifications: *notifications,
                },
            },
            Self::Tables => Command::Tables,
            Self::Info => Command::Info,
            Self::Health => Command::Health,
            Self::Shell => return None,
        };
        Some(command)
    }

    /// Output options, for commands that return rows.
    pub fn result_output(&self) -> Option<&ResultOutput> {
        match self {
            Self::Ask { output, .. } | Self::Sql { output, .. } => Some(output),
            _ => None,
        }
    }
}
