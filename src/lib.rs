pub mod api;
pub mod cli;
pub mod core;
pub mod pipeline;
pub mod providers;
pub mod scheduler;
pub mod store;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::{CacheManager, MetadataProvider, NavFeedProvider};
use crate::pipeline::Pipeline;
use crate::store::{DiskStore, GenerationStore, MemoryStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Serve,
    Refresh,
    Prefixes,
}

/// Wired application components, built once per process.
pub struct App {
    pub config: AppConfig,
    pub cache: Arc<CacheManager>,
    pub feed: Arc<dyn NavFeedProvider>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub pipeline: Arc<Pipeline>,
}

impl App {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let timeout = config.pipeline.request_timeout();
        let retries = config.pipeline.retries;

        let feed: Arc<dyn NavFeedProvider> = Arc::new(providers::AmfiFeedProvider::new(
            &config.providers.amfi.feed_url,
            timeout,
            retries,
        )?);
        let metadata: Arc<dyn MetadataProvider> = Arc::new(
            providers::MfApiProvider::new(
                &config.providers.mfapi.base_url,
                timeout,
                retries,
                Arc::new(Cache::new()),
            )?
            .with_refresh_schedule(config.schedule.clone()),
        );

        let store = Self::open_store(&config);
        let cache = Arc::new(CacheManager::new(store));
        let pipeline = Arc::new(Pipeline::new(
            Arc::clone(&feed),
            Arc::clone(&metadata),
            Arc::clone(&cache),
            config.pipeline.clone(),
        ));

        Ok(Self {
            config,
            cache,
            feed,
            metadata,
            pipeline,
        })
    }

    fn open_store(config: &AppConfig) -> Arc<dyn GenerationStore> {
        match config.cache_dir().and_then(DiskStore::new) {
            Ok(store) => {
                info!(dir = %store.dir().display(), "Using on-disk NAV cache");
                Arc::new(store)
            }
            Err(e) => {
                warn!(error = ?e, "No usable data directory, NAV cache will not survive restarts");
                Arc::new(MemoryStore::new())
            }
        }
    }

    /// Loads the cached data, starts the daily refresh and serves HTTP until
    /// Ctrl+C.
    pub async fn serve(self) -> Result<()> {
        scheduler::load_on_startup(&self.cache).await;
        let _refresh = scheduler::spawn_daily(Arc::clone(&self.pipeline), self.config.schedule.clone())?;

        let state = api::AppState::new(Arc::clone(&self.cache), Arc::clone(&self.metadata));
        let cors = api::cors_layer(self.config.server.cors_origin.as_deref())?;
        let router = api::router(state).layer(cors);

        let listener = tokio::net::TcpListener::bind(&self.config.server.bind)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.server.bind))?;
        info!("Server started at {}", self.config.server.bind);

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutting down");
            })
            .await
            .context("HTTP server failed")
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("navfeed starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let app = App::from_config(config)?;
    match command {
        AppCommand::Serve => app.serve().await,
        AppCommand::Refresh => cli::refresh::run(&app).await,
        AppCommand::Prefixes => cli::prefixes::run(app.feed.as_ref()).await,
    }
}
