use anyhow::Context;
use idscan_server::config::Config;
use idscan_server::{build_backend, build_pipeline, routes, telemetry, AppState};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os("IDSCAN_CONFIG").map(PathBuf::from);
    let mut config = Config::load(config_path.as_deref())?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    telemetry::init(config.log.format);

    let pipeline = build_pipeline(&config, build_backend(&config)).context("failed to load correction tables")?;
    let state = AppState::new(pipeline, &config)?;

    let sessions = state.sessions.clone();
    let sweep_every = config.session.sweep_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        loop {
            ticker.tick().await;
            let dropped = sessions.sweep_expired(chrono::Utc::now()).await;
            if dropped > 0 {
                tracing::info!(dropped, "expired sessions swept");
            }
        }
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!(
        addr = %config.server.bind,
        merge_policy = ?config.session.merge_policy,
        ttl_secs = config.session.ttl_secs,
        "idscan server listening"
    );
    axum::serve(listener, routes::router(state, config.server.max_body_bytes)).await?;
    Ok(())
}
