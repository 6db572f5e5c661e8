//! Backend entry-point: wires ports, session state, and the HTTP server.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::SameSite;
use actix_web::web;
use clap::{Parser, ValueEnum};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use anonbox_backend::domain::SessionWatch;
use anonbox_backend::domain::ports::{AuthGateway, ConfessionStore, FixtureAuthGateway};
use anonbox_backend::inbound::http::health::HealthState;
use anonbox_backend::inbound::http::state::HttpState;
use anonbox_backend::outbound::{HttpAuthGateway, HttpConfessionStore, MemoryConfessionStore};
use anonbox_backend::server::{ServerConfig, cookie_secure_from_env, create_server, load_session_key};

/// Backing services to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreMode {
    /// Seeded in-memory store plus the fixture auth account; no credentials
    /// required. Data does not survive a restart.
    Memory,
    /// Document store and auth provider over HTTP, configured via
    /// `ANONBOX_STORE_URL`, `ANONBOX_STORE_API_KEY`, `ANONBOX_AUTH_URL`, and
    /// `ANONBOX_AUTH_API_KEY`.
    Http,
}

/// AnonBox backend server.
#[derive(Debug, Parser)]
#[command(name = "anonbox", about = "Anonymous confession box backend")]
struct Args {
    /// Socket address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Backing store selection.
    #[arg(long, value_enum, default_value_t = StoreMode::Memory)]
    store: StoreMode,
}

fn required_env(name: &str) -> std::io::Result<String> {
    env::var(name)
        .map_err(|_| std::io::Error::other(format!("{name} must be set for --store http")))
}

fn parse_env_url(name: &str) -> std::io::Result<Url> {
    let raw = required_env(name)?;
    Url::parse(&raw).map_err(|e| std::io::Error::other(format!("{name} is not a valid URL: {e}")))
}

fn build_ports(
    mode: StoreMode,
    clock: Arc<dyn Clock>,
) -> std::io::Result<(Arc<dyn ConfessionStore>, Arc<dyn AuthGateway>)> {
    match mode {
        StoreMode::Memory => {
            warn!("running with the in-memory store and fixture auth account (dev only)");
            Ok((
                Arc::new(MemoryConfessionStore::with_seed_data(clock)),
                Arc::new(FixtureAuthGateway),
            ))
        }
        StoreMode::Http => {
            let store = HttpConfessionStore::new(
                parse_env_url("ANONBOX_STORE_URL")?,
                required_env("ANONBOX_STORE_API_KEY")?,
                clock,
            )
            .map_err(|e| std::io::Error::other(format!("store client build failed: {e}")))?;
            let auth = HttpAuthGateway::new(
                parse_env_url("ANONBOX_AUTH_URL")?,
                required_env("ANONBOX_AUTH_API_KEY")?,
            )
            .map_err(|e| std::io::Error::other(format!("auth client build failed: {e}")))?;
            Ok((Arc::new(store), Arc::new(auth)))
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Args::parse();
    let key = load_session_key()?;
    let cookie_secure = cookie_secure_from_env();

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let (store, auth) = build_ports(args.store, clock.clone())?;

    let sessions = SessionWatch::new();
    // Keep the handle alive for the process lifetime; dropping it would
    // unsubscribe the transition log.
    let _session_log = sessions.subscribe(|session| match session {
        Some(session) => info!(uid = session.uid(), "admin session active"),
        None => info!("admin session ended"),
    });

    let http_state = web::Data::new(HttpState::new(store, auth, sessions, clock));
    let health_state = web::Data::new(HealthState::new());

    info!(bind = %args.bind, store = ?args.store, "starting server");
    let server = create_server(
        health_state,
        http_state,
        ServerConfig::new(key, cookie_secure, SameSite::Lax, args.bind),
    )?;
    server.await
}
