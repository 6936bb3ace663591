use anyhow::Context;
use tokio::net::TcpListener;

use campus_lostfound_api::{app, config::AppConfig, db, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_lostfound_api=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    let port = config.port;

    let pool = db::connect(&config)
        .await
        .context("failed to connect to database")?;
    db::init_schema(&pool)
        .await
        .context("failed to initialize schema")?;

    let state = AppState::new(pool, config);
    let router = app(state);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .await
        .context("server error")?;

    Ok(())
}
