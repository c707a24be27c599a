use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::path_context;
use crate::core_path::resolver::resolve;
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the SIZE command: number of bytes in a file, RFC 3659.
pub async fn handle_size_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let (current_dir, home_dir, _, _) = path_context(&session).await;
    let filepath = resolve(&current_dir, &home_dir, param.as_deref());

    match tokio::fs::metadata(&filepath).await {
        Ok(metadata) if metadata.is_file() => {
            let response = format!("213 {}\r\n", metadata.len());
            send_response(&writer, response.as_bytes()).await?;
        }
        _ => {
            send_response(&writer, b"550 No such file.\r\n").await?;
        }
    }
    Ok(true)
}
