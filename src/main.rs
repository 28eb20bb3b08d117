//! AskDB - ask an inventory database questions from the terminal.

use std::io::IsTerminal;
use std::process::ExitCode;

use askdb::app::App;
use askdb::cli::{Cli, CliCommand};
use askdb::commands::{Command, CommandOutput};
use askdb::config::{Config, ResolvedConfig};
use askdb::error::{AskDbError, Result};
use askdb::safety::{sanitize, ReadOnlyGuard};
use askdb::{logging, shell};
use tokio::io::BufReader;
use tracing::{error, info};

/// Exit code for `check` when the statement is refused.
const EXIT_BLOCKED: u8 = 2;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    if cli.is_shell() {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?.resolve(&cli.to_overrides())?;

    match &cli.command {
        // Classification needs neither the query service nor local state.
        Some(CliCommand::Check { sql, json }) => Ok(check(&config, sql, *json)),
        Some(CliCommand::Sanitize { sql }) => {
            println!("{}", sanitize(sql));
            Ok(ExitCode::SUCCESS)
        }
        Some(command @ CliCommand::Ask { .. }) | Some(command @ CliCommand::Sql { .. }) => {
            run_query(&config, command).await
        }
        Some(command) => match command.to_command() {
            Some(parsed) => run_once(&config, parsed).await,
            None => run_shell(&config).await,
        },
        None => run_shell(&config).await,
    }
}

fn check(config: &ResolvedConfig, sql: &str, json: bool) -> ExitCode {
    let verdict = ReadOnlyGuard::new(config.inspect_comments).check(sql);
    if json {
        println!("{}", serde_json::json!(verdict));
    } else {
        match verdict.message() {
            Some(message) => println!("{message}"),
            None => println!("Allowed: no destructive keywords found."),
        }
    }

    if verdict.is_blocked() {
        ExitCode::from(EXIT_BLOCKED)
    } else {
        ExitCode::SUCCESS
    }
}

async fn run_shell(config: &ResolvedConfig) -> Result<ExitCode> {
    let mut app = App::open(config).await?;
    let interactive = std::io::stdin().is_terminal();
    let mut stdout = tokio::io::stdout();

    let result = shell::run(&mut app, BufReader::new(tokio::io::stdin()), &mut stdout, interactive).await;
    app.close().await;
    result.map(|executed| {
        info!("Shell finished after {executed} lines");
        ExitCode::SUCCESS
    })
}

async fn run_once(config: &ResolvedConfig, command: Command) -> Result<ExitCode> {
    let mut app = App::open(config).await?;
    let output = app.execute(command).await;
    app.close().await;

    print_output(&output);
    Ok(exit_code(failed(&output)))
}

async fn run_query(config: &ResolvedConfig, command: &CliCommand) -> Result<ExitCode> {
    let parsed = command
        .to_command()
        .ok_or_else(|| AskDbError::internal("Not a query command"))?;
    let options = command.result_output().cloned().unwrap_or_default();

    let mut app = App::open(config).await?;
    app.set_json_output(options.json);

    let output = app.execute(parsed).await;
    print_output(&output);
    let mut failure = failed(&output);

    if let Some(path) = options.export.as_ref().filter(|_| !failure) {
        let exported = app
            .execute(Command::Export(Some(path.display().to_string())))
            .await;
        // Keep stdout parseable when it carries JSON.
        eprintln!("{}", exported.render());
        failure = exported.is_error();
    }

    app.close().await;
    Ok(exit_code(failure))
}

fn print_output(output: &CommandOutput) {
    let rendered = output.render();
    if rendered.is_empty() {
        return;
    }
    if output.is_error() {
        eprintln!("{rendered}");
    } else {
        println!("{rendered}");
    }
}

/// True for error output and for JSON results that did not succeed.
fn failed(output: &CommandOutput) -> bool {
    match output {
        CommandOutput::Json(value) => value["status"] != "success",
        other => other.is_error(),
    }
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
