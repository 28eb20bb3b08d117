//! Integration tests for the HTTP query service against a local server.

use askdb::api::{HttpConfig, HttpQueryService, QueryService};
use askdb::error::{AskDbError, FailureKind};
use askdb::persistence::{KeyValueStore, MemoryStore, QueryHistory, SessionTracker};
use askdb::query::{ApiAvailability, QueryOutcome, QueryRunner};
use askdb::safety::ReadOnlyGuard;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// A canned reply for requests whose path ends with `path`.
#[derive(Clone)]
struct Route {
    path: &'static str,
    status: u16,
    body: &'static str,
}

fn route(path: &'static str, status: u16, body: &'static str) -> Route {
    Route { path, status, body }
}

/// A request as the server saw it.
#[derive(Debug, Clone)]
struct Captured {
    request_line: String,
    headers: String,
    body: String,
}

type Log = Arc<Mutex<Vec<Captured>>>;

/// Starts a server answering from `routes`; unknown paths get a 404.
async fn serve(routes: Vec<Route>) -> (String, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let server_log = log.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let routes = routes.clone();
            let log = server_log.clone();
            tokio::spawn(async move { handle(stream, &routes, &log).await });
        }
    });

    (format!("http://{addr}/api"), log)
}

async fn handle(mut stream: TcpStream, routes: &[Route], log: &Log) {
    let Some(captured) = read_request(&mut stream).await else {
        return;
    };

    let path = captured
        .request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_string();
    let (status, body) = routes
        .iter()
        .find(|r| path.ends_with(r.path))
        .map(|r| (r.status, r.body))
        .unwrap_or((404, r#"{"error":"not found"}"#));

    log.lock().await.push(captured);

    let response = format!(
        "HTTP/1.1 {status} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Reads the head and the full body (by Content-Length).
async fn read_request(stream: &mut TcpStream) -> Option<Captured> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = head_end + 4;
    while buf.len() < body_start + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let (request_line, headers) = head.split_once("\r\n").unwrap_or((head.as_str(), ""));
    Some(Captured {
        request_line: request_line.to_string(),
        headers: headers.to_lowercase(),
        body: String::from_utf8_lossy(&buf[body_start..]).to_string(),
    })
}

fn client(base_url: &str) -> HttpQueryService {
    HttpQueryService::new(HttpConfig::new(base_url, Some("test-key".to_string())).with_timeout(5))
        .unwrap()
}

#[tokio::test]
async fn test_ask_sends_question_with_bearer_key() {
    let (url, log) = serve(vec![route(
        "/query",
        200,
        r#"{"answer":"Three rows","sql":"SELECT * FROM t_shirts","results":[{"brand":"Nike","stock":150}]}"#,
    )])
    .await;

    let response = client(&url).ask("how many nike shirts?").await.unwrap();
    assert_eq!(response.sql, "SELECT * FROM t_shirts");
    assert_eq!(response.answer.as_deref(), Some("Three rows"));
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0]["stock"], 150);

    let captured = log.lock().await[0].clone();
    assert_eq!(captured.request_line, "POST /api/query HTTP/1.1");
    assert!(captured.headers.contains("authorization: bearer test-key"));
    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(body["query"], "how many nike shirts?");
}

#[tokio::test]
async fn test_execute_sql_sends_statement() {
    let (url, log) = serve(vec![route(
        "/execute-sql",
        200,
        r#"{"results":[{"n":1},{"n":2}],"row_count":2}"#,
    )])
    .await;

    let response = client(&url).execute_sql("SELECT n FROM t").await.unwrap();
    assert_eq!(response.rows(), 2);

    let captured = log.lock().await[0].clone();
    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(body["sql"], "SELECT n FROM t");
}

#[tokio::test]
async fn test_auth_failures() {
    let (url, _log) = serve(vec![
        route("/query", 401, r#"{"error":"bad key"}"#),
        route("/execute-sql", 403, ""),
    ])
    .await;
    let service = client(&url);

    let err = service.ask("anything").await.unwrap_err();
    assert!(matches!(err, AskDbError::AuthInvalid));

    let err = service.execute_sql("SELECT 1").await.unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::AuthInvalid);
}

#[tokio::test]
async fn test_gateway_errors_are_unavailable() {
    let (url, _log) = serve(vec![route("/health", 503, "")]).await;

    let err = client(&url).health().await.unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::ServiceUnavailable);
}

#[tokio::test]
async fn test_server_error_uses_body_message() {
    let (url, _log) = serve(vec![route("/query", 500, r#"{"error":"relation missing"}"#)]).await;

    let err = client(&url).ask("anything").await.unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::ServiceUnavailable);
    assert!(err.to_string().contains("relation missing"));
}

#[tokio::test]
async fn test_undecodable_success_body_is_generic() {
    let (url, _log) = serve(vec![route("/tables", 200, "not json")]).await;

    let err = client(&url).tables().await.unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::Generic);
}

#[tokio::test]
async fn test_connection_refused_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}/api"))
        .tables()
        .await
        .unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::ServiceUnavailable);
}

#[tokio::test]
async fn test_database_endpoints() {
    let (url, _log) = serve(vec![
        route(
            "/database/info",
            200,
            r#"{"tables":2,"totalRows":10,"lastSync":"2024-03-01T12:00:00Z"}"#,
        ),
        route("/database/tables", 200, r#"{"tables":["t_shirts","orders"]}"#),
    ])
    .await;
    let service = client(&url);

    let info = service.database_info().await.unwrap();
    assert_eq!(info.tables, 2);
    assert_eq!(info.total_rows, 10);
    assert_eq!(info.last_sync.as_deref(), Some("2024-03-01T12:00:00Z"));

    assert_eq!(service.tables().await.unwrap(), vec!["t_shirts", "orders"]);
}

#[tokio::test]
async fn test_runner_blocks_generated_sql_and_tracks_availability() {
    let (url, _log) = serve(vec![
        route(
            "/query",
            200,
            r#"{"sql":"DELETE FROM t_shirts","results":[{"deleted":3}]}"#,
        ),
        route("/execute-sql", 401, ""),
    ])
    .await;

    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let mut runner = QueryRunner::new(
        Arc::new(client(&url)),
        ReadOnlyGuard::default(),
        QueryHistory::open(store.clone()).await,
        SessionTracker::open(store).await,
    );

    let outcome = runner.ask("remove all shirts").await.unwrap();
    let QueryOutcome::Blocked { sql, verdict } = outcome else {
        panic!("Expected blocked outcome");
    };
    assert_eq!(sql, "DELETE FROM t_shirts");
    assert!(verdict.is_blocked());
    assert_eq!(runner.availability(), ApiAvailability::Available);

    let outcome = runner.run_sql("SELECT 1").await.unwrap();
    assert!(matches!(outcome, QueryOutcome::Failed(AskDbError::AuthInvalid)));
    assert_eq!(runner.availability(), ApiAvailability::Unavailable);
    assert_eq!(runner.history().len(), 2);
}
