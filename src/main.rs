mod config;
mod constants;
mod core_auth;
mod core_cli;
mod core_ftpcommand;
mod core_network;
mod core_path;
mod helpers;
mod server;
mod session;
mod watchdog;

use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::{info, warn};
use std::io::Write;

use crate::config::Config;
use crate::core_cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
    let default_level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let default_config_path = "/etc/ferroftpd.conf";

    // An explicit --config must load; the default path may be absent, in
    // which case the built-in defaults apply.
    let mut config = if args.config.is_empty() {
        match Config::load_from_file(default_config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}; using built-in defaults", e);
                Config::default()
            }
        }
    } else {
        Config::load_from_file(&args.config)?
    };

    if args.readonly {
        config.server.readonly = true;
    }

    log_config(&config);

    // Run the FTP server
    server::run(config).await
}

// Helper function to log configuration options
fn log_config(config: &Config) {
    info!(
        "  Listen: {}:{}",
        config.server.listen_address, config.server.listen_port
    );
    info!("  PASV Address: {}", config.server.pasv_address);
    info!(
        "  PASV Ports: {}-{}",
        config.server.pasv_port_start, config.server.pasv_port_end
    );
    info!("  Max Sessions: {}", config.server.max_sessions);
    info!(
        "  Idle Timeout: {} minute(s)",
        config.server.idle_timeout_minutes
    );
    info!("  Read-only: {}", config.server.readonly);
    info!(
        "  Credentials: {} record(s)",
        config.server.credentials.len()
    );
}
