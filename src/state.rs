use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;

/// Shared application state, injected into handlers and middleware via
/// axum's `State` extractor. There is no global database handle.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        Self { db, config: Arc::new(config) }
    }
}
