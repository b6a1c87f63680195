use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &lifeflow::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        loglevel = %cfg.loglevel,
    );

    let pool = lifeflow::db::spawn(&cfg.database_url).await?;
    let owner_id = lifeflow::bootstrap::run(&pool).await?;

    let state = lifeflow::FlowState::new(pool, owner_id, cfg.api_key.clone());
    let app = lifeflow::flow_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
