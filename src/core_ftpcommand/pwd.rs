use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the PWD command: report the current working directory.
pub async fn handle_pwd_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    _param: Option<String>,
) -> Result<bool, std::io::Error> {
    let current_dir = session.lock().await.current_dir.clone();
    let response = format!("257 \"{}\"\r\n", current_dir);
    send_response(&writer, response.as_bytes()).await?;
    Ok(true)
}
