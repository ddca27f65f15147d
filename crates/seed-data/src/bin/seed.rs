//! Seeds the dashboard database with the placeholder dataset.
//!
//! Run with:
//! ```sh
//! POSTGRES_URL=postgres://... cargo run -p seed-data --bin seed
//! ```
//!
//! Set `SEED_API_URL` (e.g. `http://localhost:3000`) to trigger `GET /seed`
//! on a running dashboard server instead of connecting directly.

use anyhow::Context;
use seed_data::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let summary = match std::env::var("SEED_API_URL") {
        Ok(base_url) => {
            let api = ApiSeeder::new(base_url);
            api.check_health().await?;
            tracing::info!("Backend is up, triggering seed");
            api.trigger_seed().await?.summary
        }
        Err(_) => {
            let pool = DatabaseConfig::from_env()?
                .connect_pool()
                .await
                .context("failed to connect to the database")?;
            tracing::info!("Connected to database");

            Seeder::new(pool)
                .with_config(SeedConfig::from_env()?)
                .seed(&PlaceholderData.dataset())
                .await?
        }
    };

    tracing::info!("Seed completed!");
    for table in Table::ALL {
        let outcome = summary.table(table);
        tracing::info!(
            "  {}: {} new, {} already present",
            table.name(),
            outcome.inserted,
            outcome.skipped()
        );
    }

    Ok(())
}
