use neofindr::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    oauth::{HttpOAuthGateway, OAuthState},
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::{error::Error, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, connects to Postgres and applies pending
/// migrations, then serves the API until the process is stopped.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // 1. Configuration (.env first, so it can fill in unset variables).
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    // 2. Logging. RUST_LOG wins over LOG_VERBOSITY.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.verbosity.filter_directives().into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // One JSON object per line for the log collector.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!(
        "Application starting in {:?} mode ({:?} verbosity)",
        config.env,
        config.verbosity
    );

    // 3. Database.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "failed to connect to Postgres"))?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database migrations applied");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 4. OAuth providers. Unconfigured providers are rejected per request.
    let oauth = Arc::new(HttpOAuthGateway::new(config.oauth.clone())) as OAuthState;
    for (name, configured) in [
        ("google", config.oauth.google.is_some()),
        ("github", config.oauth.github.is_some()),
        ("facebook", config.oauth.facebook.is_some()),
        ("linkedin", config.oauth.linkedin.is_some()),
    ] {
        if !configured {
            tracing::warn!(provider = name, "OAuth provider not configured");
        }
    }

    // 5. Router and server.
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        repo,
        oauth,
        config,
    });

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
