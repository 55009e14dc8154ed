use std::process;
use std::sync::Arc;

use stagno::{
    application::{
        error::AppError, inventory::InventoryService, ponds::PondService,
        readings::ReadingService,
    },
    cache::{CacheConfig, CacheInvalidator, CacheState, ResponseStore},
    config,
    infra::{db::PostgresRepositories, error::InfraError, http, telemetry},
};
use tokio::task::JoinHandle;
use tracing::{Dispatch, Level, debug, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let url = settings.database.url.as_deref().ok_or_else(|| {
        AppError::from(InfraError::configuration(
            "database.url is required to serve",
        ))
    })?;

    let pool = PostgresRepositories::connect(url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    let repositories = Arc::new(PostgresRepositories::new(pool));

    let cache_config = CacheConfig::from(&settings.cache);
    let store = Arc::new(ResponseStore::new(&cache_config));
    let invalidator = Arc::new(CacheInvalidator::new(cache_config.clone(), store.clone()));

    let inventory = InventoryService::new(repositories.clone())
        .with_invalidator_opt(Some(invalidator.clone()));
    let ponds =
        PondService::new(repositories.clone()).with_invalidator_opt(Some(invalidator.clone()));
    let readings =
        ReadingService::new(repositories.clone(), repositories.clone(), inventory.clone())
            .with_invalidator_opt(Some(invalidator.clone()));

    let api_state = http::ApiState {
        inventory,
        ponds,
        readings,
        invalidator: invalidator.clone(),
    };
    let cache_state = CacheState {
        config: cache_config.clone(),
        store: store.clone(),
    };

    let sweeper = spawn_cache_sweeper(&cache_config, store);

    let router =
        http::build_api_router(api_state, cache_state).merge(http::health_router(repositories));

    let result = serve_http(&settings, router).await;

    if let Some(handle) = sweeper {
        handle.abort();
        let _ = handle.await;
    }

    result
}

/// Periodically drop TTL-expired cache entries so idle keys do not linger
/// until their next lookup.
fn spawn_cache_sweeper(
    config: &CacheConfig,
    store: Arc<ResponseStore>,
) -> Option<JoinHandle<()>> {
    if !config.enabled {
        return None;
    }

    let interval = config.sweep_interval();
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // Skip the first immediate tick
        loop {
            ticker.tick().await;
            let purged = store.purge_expired();
            if purged > 0 {
                debug!(purged, "expired cache entries swept");
            }
        }
    }))
}

async fn serve_http(settings: &config::Settings, router: axum::Router) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(addr = %settings.server.addr, "stagno listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(error = %error, "failed to listen for shutdown signal");
    }
}
