use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the HELP command. Help is offered only in a general sense,
/// not per individual command.
pub async fn handle_help_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    _session: Arc<Mutex<Session>>,
    _param: Option<String>,
) -> Result<bool, std::io::Error> {
    let response = format!(
        "211 {} speaks RFC 959 with PASV/EPSV extensions.\r\n",
        state.config.server.server_name
    );
    send_response(&writer, response.as_bytes()).await?;
    Ok(true)
}
