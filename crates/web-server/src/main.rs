use std::sync::Arc;

use booking::Resolver;
use database::PgStore;
use tracing_subscriber::EnvFilter;

// This main function is the entry point when running `cargo run -p web-server`.
// Its only job is to wire a Postgres-backed resolver into `run_server`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = configuration::load_config()?;

    let db_pool = database::connect().await?;
    database::run_migrations(&db_pool).await?;
    let resolver = Resolver::new(Arc::new(PgStore::new(db_pool)));

    web_server::run_server(settings, resolver).await
}
