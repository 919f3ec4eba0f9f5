//! RP portal backend entrypoint wiring REST, SSE, mini-game sessions and the community backend.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rp_portal_back::{
    build_router,
    config::AppConfig,
    dao::community_store::memory::MemoryCommunityStore,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    start_storage(app_state.clone()).await;
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Start the backend supervisor when the BaaS is configured, otherwise fall back to the in-memory store.
#[cfg(feature = "rest-store")]
async fn start_storage(state: SharedState) {
    use rp_portal_back::{
        dao::{
            community_store::{
                CommunityStore,
                rest::{RestCommunityStore, RestConfig},
            },
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    match RestConfig::from_env() {
        Ok(rest_config) => {
            info!(base_url = %rest_config.base_url, "using remote community backend");
            tokio::spawn(storage_supervisor::run(state, move || {
                let rest_config = rest_config.clone();
                async move {
                    let store = RestCommunityStore::connect(rest_config).await?;
                    Ok::<_, StorageError>(Arc::new(store) as Arc<dyn CommunityStore>)
                }
            }));
        }
        Err(err) => {
            warn!(error = %err, "backend not configured; using the in-memory store");
            use_memory_store(&state).await;
        }
    }
}

#[cfg(not(feature = "rest-store"))]
async fn start_storage(state: SharedState) {
    warn!("built without a remote backend; using the in-memory store");
    use_memory_store(&state).await;
}

async fn use_memory_store(state: &SharedState) {
    state.set_store(Arc::new(MemoryCommunityStore::new())).await;
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
