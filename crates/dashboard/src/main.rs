use dashboard::run_server;
use seed_data::prelude::*;
use std::env;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let database = DatabaseConfig::from_env()?;
    tracing::info!(ssl_mode = ?database.ssl_mode, "Using database configuration");

    // Connections are opened per seeding request; an unreachable database
    // surfaces as a failed /seed response, not a startup failure.
    let pool = database.lazy_pool()?;
    let seeder = Seeder::new(pool).with_config(SeedConfig::from_env()?);

    let port = env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);

    run_server(seeder, PlaceholderData.dataset(), port).await
}
