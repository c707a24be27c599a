use std::sync::Arc;

use log::info;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_ftpcommand::site::helper::require_privileged;
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// SITE SHUTDOWN: privileged process exit. The only path that is fatal
/// to the server itself.
pub async fn handle_site_shutdown_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
) -> Result<bool, std::io::Error> {
    if !require_privileged(&writer, &session).await? {
        return Ok(true);
    }

    let username = session.lock().await.username.clone();
    info!("Shutdown requested by {}", username);
    send_response(&writer, b"221 Server shutting down.\r\n").await?;
    std::process::exit(0)
}
