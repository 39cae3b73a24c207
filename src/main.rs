use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use ledgerline::app;
use ledgerline::config::Config;
use ledgerline::consumers::{AnalyticsConsumer, AuditConsumer, CategorizationConsumer};
use ledgerline::events::InProcessEventBus;
use ledgerline::logging::{self, LoggingConfig};
use ledgerline::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    logging::init_logging(LoggingConfig::from_env())?;

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let bus = InProcessEventBus::new(pool.clone(), config.max_retries, config.categorization_disabled)
        .register("transaction.created", Arc::new(CategorizationConsumer))
        .register("*", Arc::new(AuditConsumer))
        .register("transaction.*", Arc::new(AnalyticsConsumer))
        .register("file.*", Arc::new(AnalyticsConsumer));

    let bind_addr = config.bind_addr;
    let state = AppState {
        pool,
        bus: Arc::new(bus),
        config: Arc::new(config),
    };

    let app = app::create_app(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 ledgerline backend running at http://{}/", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
