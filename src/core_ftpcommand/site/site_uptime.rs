use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::{format_uptime, send_response};
use crate::server::ServerState;
use crate::session::Session;

/// SITE UPTIME: how long the server has been running.
pub async fn handle_site_uptime_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    _session: Arc<Mutex<Session>>,
) -> Result<bool, std::io::Error> {
    let response = format!(
        "211 Uptime: {}\r\n",
        format_uptime(state.start_time.elapsed().as_secs())
    );
    send_response(&writer, response.as_bytes()).await?;
    Ok(true)
}
