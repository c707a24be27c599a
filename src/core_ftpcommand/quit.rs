use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the QUIT command. Returning false tells the command loop to
/// end the session.
pub async fn handle_quit_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    _param: Option<String>,
) -> Result<bool, std::io::Error> {
    let username = session.lock().await.username.clone();
    let response = format!("221 Bye, {}.\r\n", username);
    send_response(&writer, response.as_bytes()).await?;
    Ok(false)
}
