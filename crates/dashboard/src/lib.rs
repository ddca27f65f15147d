pub mod errors;
pub mod handlers;
pub mod request_id;

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use seed_data::{data::Dataset, db::Seeder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use utoipa::OpenApi;

use crate::{
    handlers::{health_check, seed_database},
    request_id::request_id_middleware,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Dashboard API", description = "Seeding endpoint for the invoice dashboard"),
    paths(handlers::health_check, handlers::seed_database),
    components(schemas(errors::ErrorResponse)),
    tags(
        (name = "health", description = "Liveness"),
        (name = "seed", description = "Database seeding")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Builds the router. Every `GET /seed` writes `dataset` through `seeder`.
pub fn create_router(seeder: Seeder, dataset: Dataset) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/seed", get(seed_database))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(Extension(seeder))
        .layer(Extension(Arc::new(dataset)))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(CompressionLayer::new())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
}

pub async fn run_server(seeder: Seeder, dataset: Dataset, port: u16) -> anyhow::Result<()> {
    let app = create_router(seeder, dataset);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    tracing::info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
