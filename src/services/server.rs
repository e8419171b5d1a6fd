use anyhow::Result;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::cache::SnapshotCache;
use crate::config::settings::AppConfig;
use crate::database::{self, DbPool, SqliteStore};
use crate::processing::OfficeProcessor;
use crate::services::ladder::LadderService;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        let pool = database::create_pool(&self.config.database)?;
        {
            let conn = database::get_connection(&pool)?;
            database::setup::init_database(&conn)?;
        }

        let state = build_state(pool, &self.config);
        let app = create_router(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {} (database {})", addr, self.config.database.path);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Wire the store, cache, processor and write path around one pool
pub fn build_state(pool: DbPool, config: &AppConfig) -> Arc<AppState> {
    let store = Arc::new(SqliteStore::new(pool.clone()));
    let processor = Arc::new(OfficeProcessor::new(
        store,
        Arc::new(SnapshotCache::new()),
        config.rating.clone(),
    ));

    Arc::new(AppState {
        ladder: LadderService::new(pool, Arc::clone(&processor)),
        processor,
        config: config.clone(),
    })
}
