//! Query command handlers (questions, /sql, /check, /rerun, /export).

use chrono::Utc;
use serde_json::json;
use std::path::PathBuf;

use super::CommandContext;
use crate::commands::output::CommandOutput;
use crate::export::{generate_filename, to_csv, write_export};
use crate::query::QueryOutcome;
use crate::safety::{sanitize, ReadOnlyGuard};

/// Handle a natural-language question.
pub async fn handle_ask(ctx: &mut CommandContext<'_>, question: &str) -> CommandOutput {
    begin(ctx, question.trim().to_string());
    match ctx.runner.ask(question).await {
        Ok(outcome) => present(ctx, outcome),
        Err(e) => CommandOutput::error(e.to_string()),
    }
}

/// Handle /sql command.
pub async fn handle_sql(ctx: &mut CommandContext<'_>, sql: &str) -> CommandOutput {
    begin(ctx, sql.trim().to_string());
    match ctx.runner.run_sql(sql).await {
        Ok(outcome) => present(ctx, outcome),
        Err(e) => CommandOutput::error(e.to_string()),
    }
}

/// Handle /rerun command.
pub async fn handle_rerun(ctx: &mut CommandContext<'_>, id: i64) -> CommandOutput {
    if let Some(query) = ctx.runner.history().get(id).map(|e| e.query.clone()) {
        begin(ctx, query);
    }
    match ctx.runner.rerun(id).await {
        Ok(outcome) => present(ctx, outcome),
        Err(e) => CommandOutput::error(e.to_string()),
    }
}

/// Handle /check command.
pub fn handle_check(guard: &ReadOnlyGuard, sql: &str) -> CommandOutput {
    match guard.check(sql).message() {
        Some(message) => CommandOutput::error(message),
        None => CommandOutput::info("Allowed: no destructive keywords found."),
    }
}

/// Handle /sanitize command.
pub fn handle_sanitize(sql: &str) -> CommandOutput {
    CommandOutput::info(sanitize(sql))
}

/// Handle /export command.
pub fn handle_export(ctx: &CommandContext<'_>, path: Option<&str>) -> CommandOutput {
    let Some(result) = &ctx.last.result else {
        return CommandOutput::error("No results to export. Run a query first.");
    };
    if result.results.is_empty() {
        return CommandOutput::error("The last query returned no rows.");
    }

    let now = Utc::now();
    let csv = match to_csv(&result.results, &result.query, now) {
        Ok(csv) => csv,
        Err(e) => return CommandOutput::error(e.to_string()),
    };

    let path = path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(generate_filename(&result.query, now)));

    match write_export(&path, &csv) {
        Ok(_) => CommandOutput::info(format!(
            "Exported {} rows to {}",
            result.results.len(),
            path.display()
        )),
        Err(e) => CommandOutput::error(e.to_string()),
    }
}

/// Starts a submission. The previous result is dropped so that a blocked or
/// failed query leaves nothing to export.
fn begin(ctx: &mut CommandContext<'_>, query: String) {
    ctx.last.query = Some(query);
    ctx.last.result = None;
}

/// Remembers a successful result and renders the outcome.
fn present(ctx: &mut CommandContext<'_>, outcome: QueryOutcome) -> CommandOutput {
    let output = render_outcome(&outcome, ctx.json);
    if let QueryOutcome::Success(success) = outcome {
        ctx.last.result = Some(success);
    }
    output
}

/// Renders a query outcome as text or JSON.
pub fn render_outcome(outcome: &QueryOutcome, as_json: bool) -> CommandOutput {
    if as_json {
        return CommandOutput::Json(outcome_json(outcome));
    }

    match outcome {
        QueryOutcome::Success(success) => {
            let mut parts = vec![CommandOutput::info(format!("SQL: {}", success.sql))];
            if let Some(answer) = &success.answer {
                parts.push(CommandOutput::info(answer.clone()));
            }
            parts.push(CommandOutput::from_rows(&success.results));
            parts.push(CommandOutput::info(format!(
                "Completed in {}ms",
                success.execution_time
            )));
            CommandOutput::multiple(parts)
        }
        QueryOutcome::Blocked { sql, verdict } => CommandOutput::multiple(vec![
            CommandOutput::error(verdict.message().unwrap_or_default()),
            CommandOutput::info(format!("SQL: {sql}")),
        ]),
        QueryOutcome::Failed(e) => CommandOutput::error(e.user_message()),
    }
}

fn outcome_json(outcome: &QueryOutcome) -> serde_json::Value {
    match outcome {
        QueryOutcome::Success(success) => json!({
            "status": "success",
            "query": success.query,
            "sql": success.sql,
            "answer": success.answer,
            "rows": success.rows,
            "executionTime": success.execution_time,
            "results": success.results,
        }),
        QueryOutcome::Blocked { sql, verdict } => json!({
            "status": "blocked",
            "sql": sql,
            "verdict": verdict,
            "message": verdict.message(),
        }),
        QueryOutcome::Failed(e) => json!({
            "status": "error",
            "kind": e.failure_kind().as_str(),
            "message": e.user_message(),
        }),
    }
}
