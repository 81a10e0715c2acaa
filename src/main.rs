use anyhow::Context;
use library_lending::{
    adapters::{
        SystemClock,
        memory::{InMemoryBookRepository, InMemoryMemberRepository, InMemoryTransactionRepository},
    },
    api::{handlers::AppState, router::create_router},
    application::lending::{ServiceDependencies, check_overdue_transactions},
    config::AppConfig,
};
use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading configuration
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // In-memory stores, system clock
    let service_deps = ServiceDependencies::new(
        Arc::new(InMemoryBookRepository::new()),
        Arc::new(InMemoryMemberRepository::new()),
        Arc::new(InMemoryTransactionRepository::new()),
        Arc::new(SystemClock::new()),
    );

    // The engine does not schedule itself; run the overdue sweep here
    spawn_overdue_checker(
        service_deps.clone(),
        Duration::from_secs(config.overdue.check_interval_secs.max(1)),
    );

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;

    Ok(())
}

fn spawn_overdue_checker(deps: ServiceDependencies, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = check_overdue_transactions(&deps) {
                tracing::error!("Overdue check failed: {}", e);
            }
        }
    });
}
