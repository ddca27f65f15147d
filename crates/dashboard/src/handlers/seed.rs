//! Database seeding handler.

use std::sync::Arc;

use axum::{Extension, response::Json};
use seed_data::{api::SeedResponse, data::Dataset, db::Seeder};
use tracing::info;

use crate::errors::AppError;

pub const SEED_SUCCESS_MESSAGE: &str = "Database seeded successfully";

/// Create the dashboard tables if needed and insert the placeholder dataset.
///
/// Rows that already exist are left as they are, so calling this again is a
/// no-op. Any failure rolls the whole run back.
#[utoipa::path(
    get,
    path = "/seed",
    tag = "seed",
    responses(
        (status = 200, description = "Database seeded; per-table counts of attempted and inserted rows"),
        (status = 500, description = "Seeding failed and was rolled back", body = crate::errors::ErrorResponse)
    )
)]
pub async fn seed_database(
    Extension(seeder): Extension<Seeder>,
    Extension(dataset): Extension<Arc<Dataset>>,
) -> Result<Json<SeedResponse>, AppError> {
    let summary = seeder.seed(&dataset).await?;
    info!("Seeded database, {} new rows", summary.total_inserted());

    Ok(Json(SeedResponse {
        message: SEED_SUCCESS_MESSAGE.to_string(),
        summary,
    }))
}
