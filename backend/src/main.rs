//! Backend entry-point: loads settings, prepares storage and runs the HTTP server.

mod server;

use std::path::Path;

use actix_web::cookie::Key;
use actix_web::web;
use color_eyre::eyre::{Context, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use eduquest::inbound::http::health::HealthState;
use eduquest::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load configuration")?;
    let key = load_session_key(&settings.session_key_file(), settings.session_allow_ephemeral)?;

    let mut config = ServerConfig::new(
        key,
        settings.cookie_secure,
        settings.same_site()?,
        settings.bind_addr()?,
    )
    .with_integrations(settings.integrations()?);

    match settings.database_url.as_deref() {
        Some(url) => {
            run_pending_migrations(url)
                .await
                .wrap_err("failed to apply database migrations")?;
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .wrap_err("failed to build database pool")?;
            config = config.with_db_pool(pool);
        }
        None => warn!("database_url not set; using the in-memory store"),
    }

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %config.bind_addr(), "starting HTTP server");
    create_server(health_state, config)?.await?;
    Ok(())
}

/// Minimum key material accepted by [`Key::derive_from`].
const SESSION_KEY_MIN_BYTES: usize = 32;

/// Read the session key, falling back to a generated key in debug builds
/// or when ephemeral keys are explicitly allowed.
fn load_session_key(path: &Path, allow_ephemeral: bool) -> color_eyre::Result<Key> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.len() < SESSION_KEY_MIN_BYTES => Err(eyre!(
            "session key at {} must hold at least {SESSION_KEY_MIN_BYTES} bytes",
            path.display()
        )),
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) if cfg!(debug_assertions) || allow_ephemeral => {
            warn!(path = %path.display(), error = %e, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(e) => Err(eyre!(
            "failed to read session key at {}: {e}",
            path.display()
        )),
    }
}
