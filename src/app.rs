//! Core orchestrator for AskDB.
//!
//! Owns the query runner, the persisted stores and the state database, and
//! routes parsed commands to their handlers.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{DemoQueryService, HttpConfig, HttpQueryService, QueryService};
use crate::commands::handlers::{self, CommandContext, LastQuery};
use crate::commands::{Command, CommandOutput};
use crate::config::{Backend, ResolvedConfig};
use crate::error::Result;
use crate::persistence::{
    Favorites, KeyValueStore, MemoryStore, QueryHistory, SessionTracker, SettingsStore, StateDb,
    UserSettings,
};
use crate::query::QueryRunner;
use crate::safety::ReadOnlyGuard;

/// The main orchestrator that coordinates all components.
pub struct App {
    runner: QueryRunner,
    favorites: Favorites,
    settings: SettingsStore,
    last: LastQuery,
    /// Render query results as JSON.
    json: bool,
    /// Backing database for local stores, when it could be opened.
    state_db: Option<Arc<StateDb>>,
}

impl App {
    /// Builds the app from resolved configuration.
    ///
    /// If the state database cannot be opened the session continues with
    /// in-memory stores.
    pub async fn open(config: &ResolvedConfig) -> Result<Self> {
        let service = build_service(&config.backend)?;
        let guard = ReadOnlyGuard::new(config.inspect_comments);

        let opened = match &config.state_db {
            Some(path) => StateDb::open(path).await,
            None => StateDb::open_default().await,
        };

        let (local, state_db) = match opened {
            Ok(db) => {
                let db = Arc::new(db);
                let store: Arc<dyn KeyValueStore> = db.clone();
                (store, Some(db))
            }
            Err(e) => {
                warn!("State database unavailable, nothing will be saved: {e}");
                let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
                (store, None)
            }
        };

        let mut app = Self::with_stores(service, guard, local, Arc::new(MemoryStore::new())).await;
        app.state_db = state_db;
        Ok(app)
    }

    /// Builds the app on explicit stores. `local` keeps history, favorites
    /// and settings; `session` keeps the session metrics.
    pub async fn with_stores(
        service: Arc<dyn QueryService>,
        guard: ReadOnlyGuard,
        local: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
    ) -> Self {
        let runner = QueryRunner::new(
            service,
            guard,
            QueryHistory::open(local.clone()).await,
            SessionTracker::open(session).await,
        );

        Self {
            runner,
            favorites: Favorites::open(local.clone()).await,
            settings: SettingsStore::open(local).await,
            last: LastQuery::default(),
            json: false,
            state_db: None,
        }
    }

    /// Switches query results between tables and JSON.
    pub fn set_json_output(&mut self, json: bool) {
        self.json = json;
    }

    /// Executes one command.
    pub async fn execute(&mut self, command: Command) -> CommandOutput {
        debug!("Executing command: {:?}", command);
        let mut ctx = CommandContext {
            runner: &mut self.runner,
            favorites: &mut self.favorites,
            settings: &mut self.settings,
            last: &mut self.last,
            json: self.json,
        };
        handlers::execute(&mut ctx, command).await
    }

    pub fn runner(&self) -> &QueryRunner {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut QueryRunner {
        &mut self.runner
    }

    pub fn user(&self) -> &UserSettings {
        self.settings.settings()
    }

    /// Returns true when queries go to the built-in sample data.
    pub fn is_demo(&self) -> bool {
        self.runner.service().name() == DemoQueryService::NAME
    }

    /// Closes the state database.
    pub async fn close(&mut self) {
        if let Some(db) = self.state_db.take() {
            db.close().await;
            info!("State database closed");
        }
    }
}

fn build_service(backend: &Backend) -> Result<Arc<dyn QueryService>> {
    match backend {
        Backend::Demo => {
            info!("Using demo data");
            Ok(Arc::new(DemoQueryService::new()))
        }
        Backend::Http {
            url,
            key,
            timeout_secs,
        } => {
            info!("Using query API at {url}");
            let config = HttpConfig::new(url.clone(), Some(key.clone())).with_timeout(*timeout_secs);
            Ok(Arc::new(HttpQueryService::new(config)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandRouter;
    use crate::persistence::HISTORY_KEY;

    async fn demo_app(local: Arc<dyn KeyValueStore>) -> App {
        App::with_stores(
            Arc::new(DemoQueryService::new()),
            ReadOnlyGuard::default(),
            local,
            Arc::new(MemoryStore::new()),
        )
        .await
    }

    #[tokio::test]
    async fn test_question_then_favorite() {
        let mut app = demo_app(Arc::new(MemoryStore::new())).await;

        let output = app.execute(CommandRouter::parse("nike t-shirts")).await;
        assert!(!output.is_error());

        let output = app.execute(CommandRouter::parse("/fav Nike")).await;
        assert!(output.render().contains("'Nike'"));
        assert_eq!(app.runner().history().len(), 1);
    }

    #[tokio::test]
    async fn test_history_survives_restart() {
        let local: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let mut app = demo_app(local.clone()).await;
        app.execute(CommandRouter::parse("/sql SELECT 1")).await;
        assert!(local.load(HISTORY_KEY).await.unwrap().is_some());

        let app = demo_app(local).await;
        assert_eq!(app.runner().history().len(), 1);
    }

    #[tokio::test]
    async fn test_json_output() {
        let mut app = demo_app(Arc::new(MemoryStore::new())).await;
        app.set_json_output(true);

        let output = app.execute(CommandRouter::parse("revenue")).await;
        let CommandOutput::Json(value) = output else {
            panic!("Expected JSON output");
        };
        assert_eq!(value["status"], "success");
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = demo_app(Arc::new(MemoryStore::new())).await;
        assert!(app.execute(CommandRouter::parse("/quit")).await.is_exit());
        assert!(app.is_demo());
    }

    #[tokio::test]
    async fn test_open_with_state_db_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = ResolvedConfig {
            backend: Backend::Demo,
            inspect_comments: true,
            state_db: Some(dir.path().join("state.db")),
        };

        let mut app = App::open(&config).await.unwrap();
        app.execute(CommandRouter::parse("stock levels")).await;
        app.close().await;

        let mut reopened = App::open(&config).await.unwrap();
        assert_eq!(reopened.runner().history().len(), 1);
        reopened.close().await;
    }
}
