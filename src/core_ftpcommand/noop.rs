use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the NOOP command. Some clients use it to keep the control
/// connection from idling out.
pub async fn handle_noop_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    _session: Arc<Mutex<Session>>,
    _param: Option<String>,
) -> Result<bool, std::io::Error> {
    send_response(&writer, b"200 Take your time. I'll wait.\r\n").await?;
    Ok(true)
}
