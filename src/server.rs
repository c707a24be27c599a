use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::core_auth::credentials::CredentialStore;
use crate::core_network::network;
use crate::core_network::pasv::PortPool;
use crate::session::SessionRegistry;
use crate::watchdog;

/// Shared server-wide state handed to every command handler.
#[derive(Debug)]
pub struct ServerState {
    pub config: Config,
    pub credentials: CredentialStore,
    pub registry: Mutex<SessionRegistry>,
    pub port_pool: Mutex<PortPool>,
    pub start_time: Instant,
}

/// Loads the credential list, starts the idle watchdog, and runs the
/// control-channel listener until the process exits.
pub async fn run(config: Config) -> Result<()> {
    let credentials = CredentialStore::load(&config.server.credentials)
        .context("Failed to load credential records")?;
    if credentials.is_empty() {
        warn!("No credentials configured; all logins are anonymous.");
    }

    let port_pool = PortPool::new(config.server.pasv_port_start, config.server.pasv_port_end);
    info!(
        "Passive port pool: {}-{} ({} ports)",
        config.server.pasv_port_start,
        config.server.pasv_port_end,
        port_pool.len()
    );

    let state = std::sync::Arc::new(ServerState {
        config,
        credentials,
        registry: Mutex::new(SessionRegistry::new()),
        port_pool: Mutex::new(port_pool),
        start_time: Instant::now(),
    });

    watchdog::start_watchdog(std::sync::Arc::clone(&state));

    network::start_server(state).await
}
