//! Query submission with safety classification.
//!
//! Runs one natural-language question or raw SQL statement through the
//! read-only guard and the query service, then records the outcome in the
//! history log and the session metrics.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::api::{QueryService, Row};
use crate::error::{AskDbError, FailureKind, Result};
use crate::persistence::{HistoryEntry, QueryHistory, QueryStatus, SessionTracker};
use crate::safety::{ReadOnlyGuard, Verdict};

/// Whether the query API has been reachable during this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiAvailability {
    /// No request has completed yet.
    #[default]
    Unknown,
    /// The last request reached the API.
    Available,
    /// The last request failed with an auth or connectivity failure.
    Unavailable,
}

impl ApiAvailability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }

    /// Availability implied by a completed request.
    fn after(result: std::result::Result<(), &AskDbError>) -> Self {
        match result {
            Ok(()) => Self::Available,
            Err(e) => match e.failure_kind() {
                FailureKind::AuthInvalid | FailureKind::ServiceUnavailable => Self::Unavailable,
                FailureKind::Generic => Self::Available,
            },
        }
    }
}

/// Rows returned by an accepted submission.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySuccess {
    /// The question or statement as submitted.
    pub query: String,
    /// The SQL that was executed.
    pub sql: String,
    /// Prose answer from the backend, if any.
    pub answer: Option<String>,
    pub results: Vec<Row>,
    pub rows: u64,
    /// Milliseconds from submission to response.
    pub execution_time: u64,
}

/// Result of submitting a query.
#[derive(Debug)]
pub enum QueryOutcome {
    /// The statement ran and returned rows.
    Success(QuerySuccess),
    /// The statement was refused by the read-only guard.
    Blocked { sql: String, verdict: Verdict },
    /// The query service failed.
    Failed(AskDbError),
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Submits queries and keeps the session's bookkeeping.
pub struct QueryRunner {
    service: Arc<dyn QueryService>,
    guard: ReadOnlyGuard,
    history: QueryHistory,
    session: SessionTracker,
    availability: ApiAvailability,
}

impl QueryRunner {
    pub fn new(
        service: Arc<dyn QueryService>,
        guard: ReadOnlyGuard,
        history: QueryHistory,
        session: SessionTracker,
    ) -> Self {
        Self {
            service,
            guard,
            history,
            session,
            availability: ApiAvailability::Unknown,
        }
    }

    pub fn service(&self) -> &Arc<dyn QueryService> {
        &self.service
    }

    pub fn guard(&self) -> &ReadOnlyGuard {
        &self.guard
    }

    pub fn history(&self) -> &QueryHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut QueryHistory {
        &mut self.history
    }

    pub fn session(&self) -> &SessionTracker {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionTracker {
        &mut self.session
    }

    pub fn availability(&self) -> ApiAvailability {
        self.availability
    }

    /// Checks the API health endpoint and updates availability.
    pub async fn refresh_health(&mut self) -> ApiAvailability {
        let result = self.service.health().await;
        if let Err(e) = &result {
            warn!("Query API health check failed: {e}");
        }
        self.availability = ApiAvailability::after(result.as_ref().map(|_| ()));
        self.availability
    }

    /// Asks a natural-language question.
    ///
    /// The generated SQL is classified after the round trip; rows for a
    /// blocked statement are discarded.
    pub async fn ask(&mut self, question: &str) -> Result<QueryOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AskDbError::query("Please enter a question"));
        }

        let start = Instant::now();
        let result = self.service.ask(question).await;
        let execution_time = start.elapsed().as_millis() as u64;
        self.availability = ApiAvailability::after(result.as_ref().map(|_| ()));

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Question failed after {execution_time}ms: {e}");
                self.record(question, QueryStatus::Error, execution_time, 0, "")
                    .await;
                return Ok(QueryOutcome::Failed(e));
            }
        };

        let verdict = self.guard.check(&response.sql);
        if verdict.is_blocked() {
            info!("Blocked generated SQL: {}", verdict.keyword().map_or("", |k| k.as_str()));
            self.record(question, QueryStatus::Error, execution_time, 0, &response.sql)
                .await;
            return Ok(QueryOutcome::Blocked {
                sql: response.sql,
                verdict,
            });
        }

        let rows = response.results.len() as u64;
        self.record(question, QueryStatus::Success, execution_time, rows, &response.sql)
            .await;

        Ok(QueryOutcome::Success(QuerySuccess {
            query: question.to_string(),
            sql: response.sql,
            answer: response.answer,
            results: response.results,
            rows,
            execution_time,
        }))
    }

    /// Executes raw SQL.
    ///
    /// The statement is classified before any request is made; a blocked
    /// statement is not recorded.
    pub async fn run_sql(&mut self, sql: &str) -> Result<QueryOutcome> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(AskDbError::query("Please enter a SQL query"));
        }

        let verdict = self.guard.check(sql);
        if verdict.is_blocked() {
            debug!("Refused SQL before execution");
            return Ok(QueryOutcome::Blocked {
                sql: sql.to_string(),
                verdict,
            });
        }

        let start = Instant::now();
        let result = self.service.execute_sql(sql).await;
        let execution_time = start.elapsed().as_millis() as u64;
        self.availability = ApiAvailability::after(result.as_ref().map(|_| ()));

        match result {
            Ok(response) => {
                let rows = response.rows();
                self.record(sql, QueryStatus::Success, execution_time, rows, sql)
                    .await;
                Ok(QueryOutcome::Success(QuerySuccess {
                    query: sql.to_string(),
                    sql: sql.to_string(),
                    answer: None,
                    results: response.results,
                    rows,
                    execution_time,
                }))
            }
            Err(e) => {
                warn!("SQL failed after {execution_time}ms: {e}");
                self.record(sql, QueryStatus::Error, execution_time, 0, sql)
                    .await;
                Ok(QueryOutcome::Failed(e))
            }
        }
    }

    /// Submits a history entry again.
    ///
    /// Entries whose query is their SQL were raw statements and run as SQL;
    /// everything else is asked as a question.
    pub async fn rerun(&mut self, id: i64) -> Result<QueryOutcome> {
        let entry: HistoryEntry = self
            .history
            .get(id)
            .cloned()
            .ok_or_else(|| AskDbError::query(format!("No history entry with id {id}")))?;

        if !entry.sql.is_empty() && entry.sql == entry.query {
            self.run_sql(&entry.query).await
        } else {
            self.ask(&entry.query).await
        }
    }

    async fn record(
        &mut self,
        query: &str,
        status: QueryStatus,
        execution_time: u64,
        rows: u64,
        sql: &str,
    ) {
        self.session
            .record(status == QueryStatus::Success, execution_time)
            .await;
        self.history
            .add(query, status, execution_time, rows, sql)
            .await;
    }
}
