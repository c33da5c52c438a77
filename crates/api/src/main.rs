use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chefmatch_api::config::ServerConfig;
use chefmatch_api::state::AppState;
use chefmatch_api::{background, router};
use chefmatch_core::ports::{Catalog, PreferenceStore, RecommendationStore};
use chefmatch_db::{PgCatalog, PgPreferenceStore, PgRecommendationStore};
use chefmatch_events::backoff::{connect_with_backoff, BackoffConfig};
use chefmatch_events::{MessageQueue, PgQueue, PreferencePublisher};
use chefmatch_pipeline::{RecommendationGenerator, RecommendationQuery};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chefmatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    // --- Shutdown ---
    // One token stops the HTTP server, the consumers and the retention job.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            cancel.cancel();
        });
    }

    // --- Database ---
    let Some(pool) = connect_with_backoff(&database_url, &BackoffConfig::default(), &cancel).await
    else {
        tracing::info!("Shut down before the database became reachable");
        return Ok(());
    };

    chefmatch_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Pipeline ---
    let catalog: Arc<dyn Catalog> = Arc::new(PgCatalog::new(pool.clone()));
    let preferences: Arc<dyn PreferenceStore> = Arc::new(PgPreferenceStore::new(pool.clone()));
    let store: Arc<dyn RecommendationStore> = Arc::new(PgRecommendationStore::new(pool.clone()));

    let generator = Arc::new(RecommendationGenerator::new(
        Arc::clone(&catalog),
        Arc::clone(&store),
        config.pipeline(),
    ));
    let query = Arc::new(RecommendationQuery::new(
        generator,
        catalog,
        Arc::clone(&preferences),
        store,
        config.pipeline(),
    ));

    let queue: Arc<dyn MessageQueue> =
        Arc::new(PgQueue::new(pool.clone(), config.worker.queue.clone()));
    let publisher = PreferencePublisher::new(queue, config.worker.topic.clone());

    // --- Background tasks ---
    let mut handles = chefmatch_worker::spawn_consumers(pool.clone(), &config.worker, cancel.clone());
    handles.push(tokio::spawn(background::recommendation_retention::run(
        pool.clone(),
        config.pipeline().ttl,
        cancel.clone(),
    )));
    tracing::info!("Background tasks started (event consumers, recommendation retention)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        query,
        preferences,
        publisher,
    };

    let app = router::build_app_router(state, &config);

    // --- Start server ---
    let host: IpAddr = config.host.parse().context("Invalid HOST address")?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.clone().cancelled_owned())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, draining background tasks");
    cancel.cancel();

    let drain = async {
        for handle in handles {
            let _ = handle.await;
        }
    };
    if tokio::time::timeout(Duration::from_secs(config.shutdown_timeout_secs), drain)
        .await
        .is_err()
    {
        tracing::warn!("Background tasks did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
