use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use walkto_service::bootstrap::load_simulation;
use walkto_service::config::Config;
use walkto_service::tick::spawn_tick_loop;
use walkto_service::{build_router, AppState, TracingNotifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cfg = Config::from_env()?;
    let sim = load_simulation(&cfg, Arc::new(TracingNotifier))?;
    let state = AppState::new(sim);
    let ticker = spawn_tick_loop(Arc::clone(&state.sim), cfg.tick);

    let app = build_router(state);
    tracing::info!(core_version = %walkto_core::version(), addr = %cfg.addr(), tick_ms = cfg.tick.as_millis() as u64, "starting walkto-service");
    let listener = tokio::net::TcpListener::bind(cfg.addr()).await.with_context(|| format!("bind {}", cfg.addr()))?;
    axum::serve(listener, app).await.context("server error")?;
    ticker.abort();
    Ok(())
}
