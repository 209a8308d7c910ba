// src/bin/api_server.rs

use contacts_api::infra::config::{self, DatabaseSettings};
use contacts_api::infra::logging::init_tracing;
use contacts_api::transport;
use contacts_api::{ContactRepository, PgContactRepository};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    init_tracing("info");

    // --- Storage Initialization ---
    let settings = DatabaseSettings::from_env();
    tracing::info!(
        max_connections = settings.max_connections,
        max_lifetime_secs = settings.max_lifetime.as_secs(),
        "connecting to database"
    );
    let repository = PgContactRepository::connect(&settings)
        .await
        .map_err(|e| anyhow::anyhow!("open db: {}", e))?;

    repository
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("db ping: {}", e))?;

    repository
        .ensure_schema()
        .await
        .map_err(|e| anyhow::anyhow!("db migrate: {}", e))?;
    tracing::info!("contacts schema ready");

    // --- API Server Initialization ---
    let app_state = transport::http::AppState::new(repository.clone());
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Contacts API listening");
    tracing::info!("Swagger UI available at /swagger-ui");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received, closing database pool");
            repository.close().await;
            tracing::info!("graceful shutdown complete");
        }
    }

    Ok(())
}
