//! End-to-end tests: commands through the app on demo data and a state file.

use askdb::app::App;
use askdb::commands::{Command, CommandOutput, CommandRouter};
use askdb::config::{Backend, Config, Overrides, ResolvedConfig};
use askdb::export::{generate_filename, to_csv};
use askdb::api::{DemoQueryService, QueryService};
use chrono::{TimeZone, Utc};
use std::path::Path;
use tempfile::tempdir;

fn demo_config(state_db: &Path) -> ResolvedConfig {
    ResolvedConfig {
        backend: Backend::Demo,
        inspect_comments: true,
        state_db: Some(state_db.to_path_buf()),
    }
}

async fn run(app: &mut App, line: &str) -> CommandOutput {
    app.execute(CommandRouter::parse(line)).await
}

#[tokio::test]
async fn test_session_persists_history_and_favorites() {
    let dir = tempdir().unwrap();
    let config = demo_config(&dir.path().join("state.db"));

    let mut app = App::open(&config).await.unwrap();
    assert!(!run(&mut app, "What is our revenue?").await.is_error());
    assert!(!run(&mut app, "/fav Revenue").await.is_error());
    assert!(!run(&mut app, "/settings name Grace Hopper").await.is_error());
    app.close().await;

    let mut app = App::open(&config).await.unwrap();
    assert_eq!(app.runner().history().len(), 1);
    assert!(run(&mut app, "/favorites").await.render().contains("Revenue"));
    assert_eq!(app.user().display_name, "Grace Hopper");
    // Session metrics start over with each app.
    assert_eq!(app.runner().session().metrics().total_queries, 0);
    app.close().await;
}

#[tokio::test]
async fn test_rerun_keeps_submission_mode() {
    let dir = tempdir().unwrap();
    let mut app = App::open(&demo_config(&dir.path().join("state.db")))
        .await
        .unwrap();

    run(&mut app, "/sql SELECT brand FROM t_shirts").await;
    run(&mut app, "stock by brand").await;

    let entries = app.runner().history().entries().to_vec();
    let question = &entries[0];
    let raw_sql = &entries[1];
    assert_eq!(raw_sql.sql, raw_sql.query);
    assert_ne!(question.sql, question.query);

    let output = run(&mut app, &format!("/rerun {}", raw_sql.id)).await;
    assert!(output.render().contains("SQL: SELECT brand FROM t_shirts"));

    let output = run(&mut app, &format!("/rerun {}", question.id)).await;
    assert!(output.render().contains("Adidas"));

    assert_eq!(app.runner().history().len(), 4);
    assert!(run(&mut app, "/rerun 1").await.is_error());
    app.close().await;
}

#[tokio::test]
async fn test_blocked_sql_never_reaches_history() {
    let dir = tempdir().unwrap();
    let mut app = App::open(&demo_config(&dir.path().join("state.db")))
        .await
        .unwrap();

    let output = run(&mut app, "/sql SELECT 1; /**/DROP/**/TABLE t_shirts").await;
    assert!(output.is_error());
    assert!(output.render().contains("DROP operations are not allowed"));
    assert!(app.runner().history().is_empty());
    assert_eq!(app.runner().session().metrics().total_queries, 0);
    app.close().await;
}

#[tokio::test]
async fn test_export_last_result() {
    let dir = tempdir().unwrap();
    let mut app = App::open(&demo_config(&dir.path().join("state.db")))
        .await
        .unwrap();

    assert!(run(&mut app, "/export").await.is_error());

    run(&mut app, "show me nike shirts").await;
    let path = dir.path().join("nike.csv");
    let output = app
        .execute(Command::Export(Some(path.display().to_string())))
        .await;
    assert_eq!(
        output.render(),
        format!("Exported 3 rows to {}", path.display())
    );

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "# AskDB - Query Results Export");
    assert!(lines[1].starts_with("# Generated: "));
    assert_eq!(lines[2], "# Query: show me nike shirts");
    assert_eq!(lines[3], "# Total Rows: 3");
    assert_eq!(lines.len(), 4 + 1 + 3);
    app.close().await;
}

#[tokio::test]
async fn test_csv_matches_demo_rows() {
    let demo = DemoQueryService::new();
    let response = demo.ask("revenue").await.unwrap();
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 9).unwrap();

    let csv = to_csv(&response.results, "revenue", at).unwrap();
    assert!(csv.contains("# Generated: 2024-03-01 14:05:09 UTC\n"));
    assert!(csv.contains("\"$45,892.50\""));
    assert_eq!(
        generate_filename("Revenue?", at),
        "askdb_revenue__2024-03-01T14-05-09.csv"
    );
}

#[test]
fn test_config_file_and_overrides() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[api]
url = "https://askdb.example.com/api"
key = "file-key"
timeout_secs = 10

[safety]
inspect_comments = false
"#,
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();
    let resolved = config.resolve(&Overrides::default()).unwrap();
    assert_eq!(
        resolved.backend,
        Backend::Http {
            url: "https://askdb.example.com/api".to_string(),
            key: "file-key".to_string(),
            timeout_secs: 10,
        }
    );
    assert!(!resolved.inspect_comments);

    let demo = config
        .resolve(&Overrides {
            demo: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(demo.backend, Backend::Demo);

    let missing = Config::load_from_file(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(
        missing.resolve(&Overrides::default()).unwrap().backend,
        Backend::Demo
    );
}
